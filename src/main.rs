//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `table_etl` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use table_etl::app::{print_report, render_record_set};
use table_etl::config::{Cli, Command};
use table_etl::initialization::init_logger_with;
use table_etl::{run_pipeline, PipelineConfig, Store};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), e.g. RUST_LOG
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    let outcome = match cli.command {
        Command::Run { config } => run(&config).await,
        Command::Query {
            db_path,
            statements,
        } => query(&db_path, &statements).await,
    };

    if let Err(e) = outcome {
        eprintln!("table_etl error: {e:#}");
        process::exit(1);
    }
    Ok(())
}

async fn run(config_path: &Path) -> Result<()> {
    let config = PipelineConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let report = run_pipeline(config).await?;
    print_report(&report);
    Ok(())
}

async fn query(db_path: &Path, statements: &[String]) -> Result<()> {
    if !db_path.exists() {
        anyhow::bail!("Database {} does not exist", db_path.display());
    }
    let store = Store::open(db_path)
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    let mut result = Ok(());
    for statement in statements {
        match store.run_query(statement).await {
            Ok(records) => {
                println!("{statement}");
                println!("{}", render_record_set(&records));
            }
            Err(e) => {
                result = Err(e.into());
                break;
            }
        }
    }
    store.close().await;
    result
}
