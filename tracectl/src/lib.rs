// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Runtime control of tracing levels for the fabric lowering tools.
//!
//! Modules declare their tracing target once with [`trace_target!`]. Targets are
//! gathered at link time and may then be tuned by tag with strings such as
//! `default=warn,ingest=debug`.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

pub mod control;
pub mod display;
pub mod errors;
pub mod targets;

// re-exports
pub use control::TracingControl;
pub use control::get_trace_ctl;
pub use errors::TraceCtlError;
pub use tracing_subscriber::filter::LevelFilter;

#[doc(hidden)]
pub use linkme as linkme_reexport;
