pub(crate) mod chunking;
pub(crate) mod decode;
pub(crate) mod grouping;
pub(crate) mod loader;
mod logic;
pub(crate) mod report;

use tracing::{info, warn};

use crate::config::RestoreConfig;
use crate::errors::Result;
use crate::sink::mysql::MySqlSink;
use crate::storage::s3::S3ObjectStore;
use report::RestoreReport;

/// Public entry point for the restore process.
///
/// Discovers the backup files, connects to the destination once and appends
/// every table in turn. Per-table failures are collected in the report; only
/// discovery and connection failures abort the run.
pub async fn run_restore_flow(config: &RestoreConfig) -> Result<RestoreReport> {
    let store = S3ObjectStore::connect(&config.region, &config.s3).await;
    let plan = logic::discover(config, &store).await?;

    if config.dry_run {
        logic::log_plan(&plan, config);
        info!("Dry run: nothing written to {}", config.destination.redacted());
        return Ok(plan.empty_report());
    }

    if plan.groups.is_empty() {
        info!("No backup files to restore");
        return Ok(plan.empty_report());
    }

    let mut sink = MySqlSink::connect(&config.destination, config.insert_batch_rows).await?;
    let report = logic::restore_tables(&plan, config, &store, &mut sink).await;

    if let Err(e) = sink.close().await {
        warn!("Failed to close destination connection cleanly: {}", e);
    }
    Ok(report)
}
