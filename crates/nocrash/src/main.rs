//! nocrash CLI
//!
//! Thin wrapper over nocrash-core: loads configuration, wires the Bugzilla
//! and Socorro connectors, runs one triage pass and prints the report. Bugs
//! are never modified; the report carries the change a scheduler would apply.

#![forbid(unsafe_code)]

mod cli;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nocrash_bugzilla::BugzillaClient;
use nocrash_core::{Config, NoCrashes, QueryWindow};
use nocrash_socorro::SuperSearchClient;
use tracing::{error, info};

use crate::cli::{Cli, Command, OutputFormat, OverrideArgs, RunArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("nocrash: {err:#}");
        return ExitCode::FAILURE;
    }

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "nocrash failed");
            eprintln!("nocrash: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Run(args) => {
            let config = load_config(&cli, &args.overrides)?;
            run(config, args.clone()).await
        }
        Command::Config(overrides) => {
            let config = load_config(&cli, overrides)?;
            let rendered = toml::to_string_pretty(&config).context("failed to render config")?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn load_config(cli: &Cli, overrides: &OverrideArgs) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(config: Config, args: RunArgs) -> anyhow::Result<()> {
    let bugzilla = BugzillaClient::new(&config.bugzilla).map_err(nocrash_core::Error::from)?;
    let socorro = SuperSearchClient::new(&config.socorro).map_err(nocrash_core::Error::from)?;

    let weeks = config.no_crashes.number_of_weeks;
    let window = match args.end_date {
        Some(end) => QueryWindow::new(end, weeks)?,
        None => QueryWindow::ending_today(weeks)?,
    };
    info!(
        end = %window.end,
        weeks,
        bugzilla = %bugzilla.search_url(),
        socorro = %socorro.search_url(),
        "starting no-crash triage"
    );

    let rule = NoCrashes::new(Arc::new(bugzilla), Arc::new(socorro), config.no_crashes)
        .with_max_concurrency(config.socorro.max_concurrency)
        .with_bug_ids(args.bug_ids);
    let report = rule
        .run(window.end)
        .await
        .context("no-crash triage aborted")?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to render report")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", report.to_text()),
    }
    Ok(())
}
