//! Export Module
//!
//! Runs the configured log search and saves the hits as CSV.

mod csv_export;

pub use csv_export::write_records;

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::core::OpsError;
use crate::domain::search::ExportSettings;
use crate::infrastructure::cluster::ClusterClient;
use crate::infrastructure::http::Transport;

/// Search with the window ending on `today` and write every hit to `output`.
pub async fn export_logs<T: Transport>(
    client: &ClusterClient<T>,
    settings: &ExportSettings,
    today: NaiveDate,
    output: &Path,
) -> Result<usize, OpsError> {
    let query = settings.query(today);
    let result = client.search(&settings.index, &query).await?;
    if result.total > result.hits.len() as u64 {
        info!(
            "Search matched {} records, exporting the first {}",
            result.total,
            result.hits.len()
        );
    }
    info!("Exporting results to csv file {}", output.display());
    let written = write_records(output, &result.hits, settings.timestamp_offset_hours)?;
    info!("{} record(s) written", written);
    Ok(written)
}
