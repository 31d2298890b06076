//! Monitor provisioning from a hosts CSV

use std::path::Path;

use tracing::{error, info};

use crate::core::{ItemStatus, OpsError, RunReport};
use crate::domain::monitor::{build_monitor, MetricKind, MonitorDefinition, MonitorSettings};
use crate::infrastructure::cluster::ClusterClient;
use crate::infrastructure::http::Transport;

const BOM: char = '\u{feff}';

/// Host identities from the first column, in row order. Blank rows are skipped.
pub fn read_hosts(path: &Path) -> Result<Vec<String>, OpsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut hosts = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };
        let host = first.trim_start_matches(BOM).trim();
        if !host.is_empty() {
            hosts.push(host.to_string());
        }
    }
    info!("Read {} host(s) from {}", hosts.len(), path.display());
    Ok(hosts)
}

/// Every definition to submit, in submission order: per host, storage then RAM then CPU.
pub fn plan(hosts: &[String], settings: &MonitorSettings) -> Vec<(String, MetricKind, MonitorDefinition)> {
    let mut planned = Vec::new();
    for host in hosts {
        for kind in MetricKind::ALL {
            if kind.is_enabled(settings) {
                planned.push((host.clone(), kind, build_monitor(kind, host, settings)));
            }
        }
    }
    planned
}

/// Pretty JSON array of the planned definitions
pub fn render_plan(hosts: &[String], settings: &MonitorSettings) -> Result<String, OpsError> {
    let definitions: Vec<MonitorDefinition> = plan(hosts, settings)
        .into_iter()
        .map(|(_, _, definition)| definition)
        .collect();
    Ok(serde_json::to_string_pretty(&definitions)?)
}

/// Submit every planned monitor. A failed submission is recorded and the loop moves on.
pub async fn submit_all<T: Transport>(
    client: &ClusterClient<T>,
    hosts: &[String],
    settings: &MonitorSettings,
) -> RunReport {
    let mut report = RunReport::new("Monitors");
    for (host, kind, definition) in plan(hosts, settings) {
        let label = format!("{} {}", host, kind);
        info!("Creating {} monitor for {}", kind, host);
        match client.create_monitor(&definition).await {
            Ok(id) => report.add(label, id, ItemStatus::Ok),
            Err(err) => {
                error!("{} monitor for {} failed: {}", kind, host, err);
                report.add(label, err.to_string(), ItemStatus::Failed);
            }
        }
    }
    report
}
