// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Structural errors: the only conditions that abort an ingestion.
//! Anything semantically incomplete is reported as a [`Diagnostic`](crate::Diagnostic) instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("Input is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Root of '{0}' is not an object")]
    RootNotObject(String),
    #[error("Node at {path} is not an object with exactly one type tag")]
    MalformedNode { path: String },
    #[error("Field '{field}' of node at {path} must be {expected}")]
    MalformedField {
        path: String,
        field: &'static str,
        expected: &'static str,
    },
}
