use std::io::{IsTerminal, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;

use viability_cli::app::{self, ShowOptions};
use viability_cli::config::{Config, Overrides};
use viability_cli::logging;
use viability_core::Formatter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Plan viability calculator for NDIS support budgets.
///
/// Projects how long the current balance lasts at the planned weekly
/// billing and compares it with the time left in the plan.
#[derive(Debug, Parser)]
#[command(name = "viability", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to `viability.toml` when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Store connection string.
    /// For SQLite this is a file path (e.g. `viability.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Key the client record is stored under.
    #[arg(long, global = true)]
    key: Option<String>,

    /// Display locale: en-AU, en-GB or en-US.
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Log filter, e.g. `debug` or `viability_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append logs to this file as well as stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the dashboard for the stored record.
    Show {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Trajectory rows to print.
        #[arg(long, default_value_t = 8)]
        weeks: usize,
    },

    /// Update fields, save, and show the result.
    Set {
        /// One or more `field=value` assignments.
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Delete the stored record and return to the defaults.
    Reset,

    /// Analyse every client in a CSV file.
    Batch {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Request a narrative analysis of the stored record.
    Report,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    let settings = Config::load(cli.config.as_deref())?
        .resolve(Overrides {
            backend: cli.backend,
            db: cli.db,
            key: cli.key,
            locale: cli.locale,
            log_level: cli.log_level,
            log_file: cli.log_file,
        })
        .context("invalid configuration")?;

    if let Some(level) = &settings.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(backend = %settings.store.backend, locale = settings.locale.tag(), "resolved settings");

    let engine = app::build_engine(cli.today);
    let fmt = Formatter::new(settings.locale);
    let ansi = stdout().is_terminal();

    let output = match cli.command.unwrap_or(Command::Show {
        json: false,
        weeks: 8,
    }) {
        Command::Show { json, weeks } => {
            let session = app::open_session(&settings, engine).await?;
            app::show(&session, fmt, ShowOptions { json, weeks, ansi })?
        }
        Command::Set { assignments, json } => {
            let mut session = app::open_session(&settings, engine).await?;
            let options = ShowOptions {
                json,
                weeks: 0,
                ansi,
            };
            app::set(&mut session, &assignments, fmt, options).await?
        }
        Command::Reset => {
            let mut session = app::open_session(&settings, engine).await?;
            app::reset(&mut session).await?
        }
        Command::Batch { file, json } => app::batch(&file, &settings, &engine, json)?,
        Command::Report => {
            let mut session = app::open_session(&settings, engine).await?;
            let reporter = app::build_reporter(&settings.report);
            app::report(&mut session, reporter.as_deref(), &settings).await
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}
