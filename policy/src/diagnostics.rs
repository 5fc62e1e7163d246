// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Append-only sink of non-fatal findings

use serde::Serialize;
use std::fmt::Display;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub tag: &'static str,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
        };
        write!(f, "{severity} [{}] {}", self.tag, self.message)
    }
}

#[derive(Debug, Default)]
/// Collects diagnostics in the order they are raised. Each diagnostic is also
/// forwarded to `tracing`. Nothing in the ingestion or lowering reads it back.
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, severity: Severity, tag: &'static str, message: String) {
        match severity {
            Severity::Info => info!(tag, "{message}"),
            Severity::Warning => warn!(tag, "{message}"),
        }
        self.entries.push(Diagnostic {
            severity,
            tag,
            message,
        });
    }
    pub fn warn(&mut self, tag: &'static str, message: impl Into<String>) {
        self.push(Severity::Warning, tag, message.into());
    }
    pub fn info(&mut self, tag: &'static str, message: impl Into<String>) {
        self.push(Severity::Info, tag, message.into());
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.iter().filter(move |d| d.tag == tag)
    }
    /// True if some warning message contains `needle`
    #[must_use]
    pub fn any_warning_contains(&self, needle: &str) -> bool {
        self.warnings().any(|d| d.message.contains(needle))
    }
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
