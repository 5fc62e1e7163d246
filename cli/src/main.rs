// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

mod args;
mod errors;
mod report;

use crate::args::{CmdArgs, Parser};
use crate::errors::CliError;
use crate::report::Report;

use lower::{derive_topology, lower};
use policy::{Diagnostics, ingest_str};
use std::process::ExitCode;
use tracectl::{LevelFilter, TracingControl, get_trace_ctl, trace_target};
use tracing::{error, info};

trace_target!("fabric-lower", LevelFilter::INFO, &[]);

fn init_logging() {
    TracingControl::init();
    get_trace_ctl().set_default_level(LevelFilter::WARN);
}

fn run(args: &CmdArgs) -> Result<String, CliError> {
    let input = args.input().ok_or(CliError::MissingInput)?;
    let text = std::fs::read_to_string(input).map_err(|source| CliError::Read {
        path: input.display().to_string(),
        source,
    })?;
    let source = args.source_name().unwrap_or_default();

    let mut diags = Diagnostics::new();
    let graph = ingest_str(&text, &source, &mut diags)?;
    let devices = lower(&graph, &mut diags);
    let topology = derive_topology(&graph);
    let report = Report {
        name: graph.name().to_owned(),
        source,
        devices,
        topology,
        diagnostics: diags.into_vec(),
    };
    info!(
        "Lowered {}: {} devices, {} warnings",
        report.name,
        report.devices.len(),
        report.warning_count()
    );
    if args.json() {
        Ok(report.to_json()?)
    } else {
        Ok(report.render(args.warnings()))
    }
}

fn main() -> ExitCode {
    /* parse cmd line args */
    let args = CmdArgs::parse();

    /* initialize logging */
    init_logging();
    if let Some(tracing) = args.tracing()
        && let Err(e) = get_trace_ctl().setup_from_string(tracing)
    {
        error!("Invalid tracing configuration: {e}");
        return ExitCode::FAILURE;
    }
    if args.show_tracing_tags() {
        for tag in get_trace_ctl().tags() {
            println!("{tag}");
        }
        return ExitCode::SUCCESS;
    }
    if args.show_tracing_targets() {
        for target in get_trace_ctl().targets() {
            println!(
                "{:<16} {:<6} [{}]",
                target.name(),
                target.level().to_string(),
                target.tags().join(",")
            );
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("fabric-lower: {e}");
            ExitCode::FAILURE
        }
    }
}
