// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use std::path::{Path, PathBuf};

pub(crate) use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "fabric-lower")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Lower a fabric policy export into vendor-neutral device configurations",
    long_about = None
)]
pub(crate) struct CmdArgs {
    #[arg(
        value_name = "FILE",
        help = "Policy export in JSON",
        required_unless_present_any = ["show_tracing_tags", "show_tracing_targets"]
    )]
    input: Option<PathBuf>,

    #[arg(
        long,
        value_name = "name",
        help = "Name to report the input as, instead of its path"
    )]
    source_name: Option<String>,

    #[arg(long, default_value_t = false, help = "Print the result as JSON")]
    json: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Print the warnings raised while ingesting and lowering"
    )]
    warnings: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show the available tracing tags and exit"
    )]
    show_tracing_tags: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Show configurable tracing targets and exit"
    )]
    show_tracing_targets: bool,

    #[arg(
        long,
        value_name = "tracing configuration",
        help = "Tracing config string as comma-separated sequence of tag=level, with level one in [off,error,warn,info,debug,trace].
Passing default=level sets the default log-level.
Passing all=level allows setting the log-level of all targets to level.
E.g. default=error,all=info,lower=debug will set the default target to error, and all the registered targets to info, but enable debug for lower"
    )]
    tracing: Option<String>,
}

impl CmdArgs {
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
    /// How the input is named in the graph and in diagnostics
    pub fn source_name(&self) -> Option<String> {
        self.source_name
            .clone()
            .or_else(|| self.input.as_ref().map(|p| p.display().to_string()))
    }
    pub fn json(&self) -> bool {
        self.json
    }
    pub fn warnings(&self) -> bool {
        self.warnings
    }
    pub fn show_tracing_tags(&self) -> bool {
        self.show_tracing_tags
    }
    pub fn show_tracing_targets(&self) -> bool {
        self.show_tracing_targets
    }
    pub fn tracing(&self) -> Option<&String> {
        self.tracing.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // valid in tests
mod test {
    use super::{CmdArgs, Parser};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_parse_args() {
        let args = CmdArgs::try_parse_from([
            "fabric-lower",
            "exports/lab.json",
            "--json",
            "--tracing",
            "default=warn,lower=debug",
        ])
        .unwrap();
        assert_eq!(args.input(), Some(Path::new("exports/lab.json")));
        assert_eq!(args.source_name().as_deref(), Some("exports/lab.json"));
        assert!(args.json());
        assert!(!args.warnings());
        assert_eq!(
            args.tracing().map(String::as_str),
            Some("default=warn,lower=debug")
        );

        let args =
            CmdArgs::try_parse_from(["fabric-lower", "x.json", "--source-name", "dc1"]).unwrap();
        assert_eq!(args.source_name().as_deref(), Some("dc1"));
    }

    #[test]
    fn test_input_required() {
        assert!(CmdArgs::try_parse_from(["fabric-lower"]).is_err());
        let args = CmdArgs::try_parse_from(["fabric-lower", "--show-tracing-tags"]).unwrap();
        assert!(args.show_tracing_tags());
        assert_eq!(args.input(), None);
    }
}
