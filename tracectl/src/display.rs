// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Display implementations

use crate::control::{TargetDb, TargetState};
use std::fmt::{Display, Formatter};

macro_rules! TARGET_FMT {
    () => {
        " {:<24} {:>6}  {:<40} {}"
    };
}

impl Display for TargetState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            TARGET_FMT!(),
            self.name,
            self.level,
            self.module,
            self.tags.join(",")
        )
    }
}

impl Display for TargetDb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, " ─────── tracing targets ───────")?;
        writeln!(f, TARGET_FMT!(), "NAME", "LEVEL", "MODULE", "TAGS")?;
        for state in self.targets.values() {
            writeln!(f, "{state}")?;
        }
        write!(f, TARGET_FMT!(), "(default)", self.default, "--", "--")
    }
}
