// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors returned when tracing configuration strings are rejected

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TraceCtlError {
    #[error("Invalid tracing directive '{0}': expected tag=level")]
    BadSyntax(String),
    #[error("Invalid level '{level}' for tag '{tag}'")]
    BadLevel { tag: String, level: String },
    #[error("Unknown tracing tag '{0}'")]
    UnknownTag(String),
}
