//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nocrash_core::Config;

/// Report open crash bugs whose signatures have not crashed recently.
#[derive(Debug, Parser)]
#[command(name = "nocrash", version, about)]
pub struct Cli {
    /// Path to nocrash.toml
    #[arg(short, long, global = true, env = "NOCRASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log line format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one triage pass and print the closure candidates
    Run(RunArgs),
    /// Print the effective configuration as TOML
    Config(OverrideArgs),
}

/// Values that override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct OverrideArgs {
    /// Lookback window in weeks
    #[arg(long)]
    pub weeks: Option<u32>,

    /// Bugzilla base URL
    #[arg(long, env = "NOCRASH_BUGZILLA_URL")]
    pub bugzilla_url: Option<String>,

    /// Socorro base URL
    #[arg(long, env = "NOCRASH_SOCORRO_URL")]
    pub socorro_url: Option<String>,

    /// Crash searches in flight at once
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

impl OverrideArgs {
    /// Apply the overrides that were given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if let Some(weeks) = self.weeks {
            config.no_crashes.number_of_weeks = weeks;
        }
        if let Some(url) = &self.bugzilla_url {
            config.bugzilla.url.clone_from(url);
        }
        if let Some(url) = &self.socorro_url {
            config.socorro.url.clone_from(url);
        }
        if let Some(max) = self.max_concurrency {
            config.socorro.max_concurrency = max;
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Last day of the window (YYYY-MM-DD); defaults to today (UTC)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Restrict the search to this bug (repeatable)
    #[arg(long = "bug-id", value_name = "ID")]
    pub bug_ids: Vec<u64>,

    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_repeatable_bug_ids_and_date() {
        let cli = Cli::try_parse_from([
            "nocrash",
            "run",
            "--bug-id",
            "1",
            "--bug-id",
            "22",
            "--end-date",
            "2024-04-01",
            "--weeks",
            "6",
            "--format",
            "text",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.bug_ids, vec![1, 22]);
        assert_eq!(args.end_date, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(args.overrides.weeks, Some(6));
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["nocrash", "run", "--end-date", "April"]).is_err());
    }

    #[test]
    fn overrides_only_touch_given_fields() {
        let mut config = Config::default();
        OverrideArgs {
            weeks: Some(3),
            socorro_url: Some("http://localhost:8000".into()),
            ..OverrideArgs::default()
        }
        .apply(&mut config);

        assert_eq!(config.no_crashes.number_of_weeks, 3);
        assert_eq!(config.socorro.url, "http://localhost:8000");
        assert_eq!(config.bugzilla, Config::default().bugzilla);
    }
}
