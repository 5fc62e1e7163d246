// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use policy::errors::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("No input file given")]
    MissingInput,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("Failed to serialize the result: {0}")]
    Serialize(#[from] serde_json::Error),
}
