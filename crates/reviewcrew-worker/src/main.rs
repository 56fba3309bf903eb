//! reviewcrew worker — runs one scoring-pipeline task.
//!
//! Reads a JSON task envelope from the file named by the first argument (or
//! stdin), executes it with bounded retries, and writes the JSON outcome to
//! stdout. Logs go to stderr.

mod config;
mod retry;
mod task;

use std::io::Read;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use task::{TaskEnvelope, TaskFailure};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reviewcrew=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("reviewcrew worker {}", env!("CARGO_PKG_VERSION"));

    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    let catalog = config.catalog()?;
    info!(
        categories = catalog.categories.len(),
        audiences = catalog.audiences.len(),
        method = %config.scoring.default_method,
        "Configuration loaded"
    );

    let input = read_input(std::env::args().nth(1))?;
    let task: TaskEnvelope = match serde_json::from_str(&input) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Rejected malformed task envelope");
            println!("{}", serde_json::to_string(&TaskFailure::new(None, &e))?);
            anyhow::bail!("malformed task envelope: {e}");
        }
    };

    let review_id = task.review_id();
    let result = retry::execute_with_retry(&config.scoring.retry, task.name(), || {
        task.run(&catalog, &config.scoring)
    })
    .await;

    match result {
        Ok(outcome) => {
            println!("{}", serde_json::to_string(&outcome)?);
            Ok(())
        }
        Err(e) => {
            error!(%review_id, task = task.name(), error = %e, "Task failed");
            println!("{}", serde_json::to_string(&TaskFailure::new(Some(review_id), &e))?);
            Err(e.into())
        }
    }
}

fn read_input(path: Option<String>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != "-" => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
