//! Tripbudget CLI
//!
//! Reads a trip snapshot exported by the planner and prints budget status,
//! a seeded budget, or the result of allocation edits as JSON.

mod commands;
mod snapshot;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripbudget_shared::AppConfig;

use crate::commands::{Command, execute, snapshot_path};
use crate::snapshot::Snapshot;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing; logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = Command::parse(&args).and_then(|command| {
        let path = snapshot_path(&command);
        let snapshot = Snapshot::load(path)?;
        info!(
            path = %path.display(),
            cost_items = snapshot.cost_items.len(),
            destinations = snapshot.destinations.len(),
            "Snapshot loaded"
        );
        execute(&command, &snapshot, &config)
    });

    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            error!(code = err.error_code(), "{err}");
            eprintln!("{err}");
            std::process::exit(i32::from(err.exit_code()));
        }
    }
}
