// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Vendor-neutral network model produced by the fabric lowering engine:
//! per-device routing instances, interfaces and access lists, plus the
//! links that connect devices.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod acl;
pub mod device;
pub mod display;
pub mod errors;
pub mod flow;
pub mod interface;
pub mod link;
pub mod routing;

// re-exports
pub use acl::{Acl, AclLine, AclTable, LineAction, MatchExpr, PortRange};
pub use device::DeviceConfig;
pub use errors::{ModelError, ModelResult};
pub use flow::Flow;
pub use interface::{Interface, InterfaceType};
pub use link::Link;
pub use routing::{DEFAULT_VRF, RoutingInstance, StaticRoute};
