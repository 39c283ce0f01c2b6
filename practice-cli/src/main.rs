use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use practice_cli::app::{self, Command};
use practice_cli::logging::{self, LogOptions};
use practice_cli::settings::Settings;
use practice_cli::state::AppState;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Practice management for a single shiatsu practitioner.
///
/// Keeps customers, bookings and invoices in one local database and derives
/// the dashboard, the calendar and the year-end report from it.
#[derive(Debug, Parser)]
#[command(name = "shiatsu-practice", version, about)]
struct Cli {
    /// TOML settings file. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend to use (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Storage connection string.
    /// For SQLite this is a file path (e.g. `practice.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `practice_core=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Keep log records off the terminal.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Answer every confirmation with yes.
    #[arg(long, short, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&LogOptions {
        filter: cli.log_level.clone(),
        quiet: cli.quiet,
        file: cli.log_file.clone(),
    })?;

    let mut settings = Settings::load(cli.config.as_deref()).context("cannot load settings")?;
    if let Some(backend) = cli.backend {
        settings.db.backend = backend;
    }
    if let Some(db) = cli.db {
        settings.db.connection_string = db;
    }

    debug!("connecting to {} backend", settings.db.backend);
    let registry = app::build_registry();
    let state = AppState::open(&settings, &registry).await?;

    let assume_yes = cli.yes;
    let gate = move |prompt: &str| assume_yes || app::confirm_on_stdin(prompt);

    let output = app::run(&state, cli.command, &gate).await?;
    print!("{output}");

    Ok(())
}
