// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Lowering of a finalized policy graph into vendor-neutral device configurations:
//! routing instances, interfaces and access lists compiled from contracts, plus the
//! spine/leaf topology of the fabric.

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
pub mod config;
pub mod engine;
pub mod hostnames;
pub mod matching;
pub mod topology;

// re-exports
pub use acl::{
    CONTRACT_ACL_PREFIX, Direction, EPG_POLICY_ACL_PREFIX, PolicyAcls, TABOO_ACL_PREFIX,
};
pub use config::{LowerConfig, LowerConfigBuilder};
pub use engine::{lower, lower_with};
pub use hostnames::device_hostnames;
pub use topology::derive_topology;
