use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;

use mail_ingest::config::{self, Config};
use mail_ingest::store::{EmailRepository, SqliteStore};

#[derive(Parser)]
#[command(name = "mail_ingest", version)]
#[command(about = "Store sender/subject/date of unread IMAP mail in SQLite", long_about = None)]
struct Cli {
    /// Load variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("loading {}", path.display()))?;
        }
        None => {
            let _ = dotenvy::dotenv();
        }
    }

    let log_path = config::log_path()?;
    mail_ingest::logging::init(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let store = SqliteStore::new(config::db_path()?);
    if let Err(e) = store.initialize() {
        error!("Failed to initialize database {}: {}", store.path().display(), e);
        return Err(e.into());
    }

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    match mail_ingest::run(&cfg, &store) {
        Ok(report) => {
            if report.failed() > 0 {
                error!(
                    "{} of {} unseen emails failed",
                    report.failed(),
                    report.results.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            // Connection errors are already logged where they happen.
            if !matches!(e, mail_ingest::Error::Connection(_)) {
                error!("{}", e);
            }
            Err(e.into())
        }
    }
}
