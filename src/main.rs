//! Parquet Restore Tool
//!
//! Loads a columnar S3 backup (one directory of parquet files per table)
//! back into an existing MySQL database.

// parquetrestore/src/main.rs
mod config;
mod errors;
mod restore;
mod sink;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use config::{RestoreArgs, load_restore_config};
use dotenv::dotenv;
use std::process::ExitCode;
use tracing::info;

/// Main entry point for the restore tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    utils::init_logging();

    match run_app().await {
        Ok(true) => {
            println!("✅ Restore completed successfully.");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!("❌ Restore finished with failed tables.");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one restore; `Ok(false)` means some tables failed.
async fn run_app() -> Result<bool> {
    let args = RestoreArgs::parse();
    let restore_config = load_restore_config(&args).context("Failed to load restore configuration")?;

    info!(
        "🔄 Starting Restore Process: s3://{}/{} -> {}",
        restore_config.source.bucket,
        restore_config.source.prefix,
        restore_config.destination.redacted()
    );

    let report = restore::run_restore_flow(&restore_config)
        .await
        .context("Restore process failed")?;
    report.log_summary();

    Ok(report.is_success())
}
