// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors raised when a device model would become inconsistent

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Device '{device}' already has an interface named '{name}'")]
    DuplicateInterface { device: String, name: String },
    #[error("Device '{device}' already has an access list named '{name}'")]
    DuplicateAcl { device: String, name: String },
    #[error("Device '{device}' already has a routing instance named '{name}'")]
    DuplicateRoutingInstance { device: String, name: String },
    #[error("Interface '{interface}' of device '{device}' refers to unknown access list '{acl}'")]
    UnknownAcl {
        device: String,
        interface: String,
        acl: String,
    },
    #[error("Interface '{interface}' of device '{device}' is in unknown routing instance '{vrf}'")]
    UnknownRoutingInstance {
        device: String,
        interface: String,
        vrf: String,
    },
    #[error("Invalid port range {0}-{1}: start is above end")]
    InvalidPortRange(u16, u16),
    #[error("Missing identifier: {0}")]
    MissingIdentifier(&'static str),
}

pub type ModelResult = Result<(), ModelError>;
