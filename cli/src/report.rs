// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! What the tool prints: devices, links and, on demand, diagnostics

use model::{DeviceConfig, Link};
use policy::{Diagnostic, Severity};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

#[derive(Debug, Serialize)]
pub(crate) struct Report {
    pub name: String,
    pub source: String,
    pub devices: BTreeMap<String, DeviceConfig>,
    pub topology: BTreeSet<Link>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable rendering. Diagnostics are listed only if `warnings` is set.
    pub fn render(&self, warnings: bool) -> String {
        ReportText {
            report: self,
            warnings,
        }
        .to_string()
    }
}

struct ReportText<'a> {
    report: &'a Report,
    warnings: bool,
}

impl Display for ReportText<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let report = self.report;
        for device in report.devices.values() {
            writeln!(f, "{device}")?;
        }
        writeln!(
            f,
            "━━━━━━━━━ topology ({} links) ━━━━━━━━━",
            report.topology.len()
        )?;
        for link in &report.topology {
            writeln!(f, "  {link}")?;
        }
        if self.warnings {
            writeln!(f, "━━━━━━━━━ diagnostics ━━━━━━━━━")?;
            for diag in &report.diagnostics {
                writeln!(f, "  {diag}")?;
            }
        }
        writeln!(
            f,
            "{} ({}): {} devices, {} links, {} warnings",
            report.name,
            report.source,
            report.devices.len(),
            report.topology.len(),
            report.warning_count()
        )
    }
}
