// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Fabric policy model: ingestion of a policy-universe export into an open
//! [`PolicyGraphBuilder`], reference resolution, and the frozen [`PolicyGraph`]
//! consumed by the lowering engine.

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

pub mod attributes;
pub mod builder;
pub mod diagnostics;
pub mod display;
pub mod errors;
pub mod graph;
pub mod ingest;
pub mod keys;
pub mod node;
pub mod objects;
mod resolve;

// re-exports
pub use attributes::Attributes;
pub use builder::PolicyGraphBuilder;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::IngestError;
pub use graph::{Idx, PolicyGraph, Ref, Table};
pub use ingest::{ingest, ingest_str};
pub use node::{NodeKind, RawNode};
