//! Refresh interval maintenance on today's daily indices

use chrono::NaiveDate;
use tracing::{error, info};

use crate::core::{ItemStatus, RunReport};
use crate::infrastructure::cluster::{ClusterClient, IndexSettings};
use crate::infrastructure::http::Transport;

/// Date suffix used by the beats daily indices
const INDEX_DATE: &str = "%Y.%m.%d";

/// Expand `{version}` and `{date}` in each template, e.g. `filebeat-7.9.0-2021.08.27`.
pub fn daily_indices(templates: &[String], version: &str, day: NaiveDate) -> Vec<String> {
    let date = day.format(INDEX_DATE).to_string();
    templates
        .iter()
        .map(|template| template.replace("{version}", version).replace("{date}", &date))
        .collect()
}

/// Apply `interval` to each index in turn. A failure on one index does not stop the rest.
pub async fn apply_refresh_interval<T: Transport>(
    client: &ClusterClient<T>,
    indices: &[String],
    interval: &str,
) -> RunReport {
    let mut report = RunReport::new("Refresh interval");
    let settings = IndexSettings::refresh_interval(interval);
    for index in indices {
        match client.apply_settings(index, &settings).await {
            Ok(_) => {
                info!("refresh_interval={} set on {}", interval, index);
                report.add(index.as_str(), interval, ItemStatus::Ok);
            }
            Err(err) => {
                error!("Could not update {}: {}", index, err);
                report.add(index.as_str(), err.to_string(), ItemStatus::Failed);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cluster::ResolvePolicy;
    use crate::infrastructure::http::testing::ScriptedTransport;

    fn templates() -> Vec<String> {
        vec![
            "filebeat-{version}-{date}".to_string(),
            "wazuh-alerts-4.x-{date}".to_string(),
        ]
    }

    #[test]
    fn test_daily_indices() {
        let day = NaiveDate::from_ymd_opt(2021, 8, 27).unwrap();
        assert_eq!(
            daily_indices(&templates(), "7.9.0", day),
            vec!["filebeat-7.9.0-2021.08.27", "wazuh-alerts-4.x-2021.08.27"]
        );
    }

    #[tokio::test]
    async fn test_missing_index_is_recorded_and_skipped() {
        let transport = ScriptedTransport::new()
            .reply("GET", "https://es1:9200/_cluster/health", 200, "{}")
            .reply(
                "PUT",
                "https://es1:9200/filebeat-7.9.0-2021.08.27/_settings?pretty",
                404,
                r#"{"error":{"root_cause":[{"type":"index_not_found_exception","reason":"no such index"}]}}"#,
            )
            .reply(
                "PUT",
                "https://es1:9200/wazuh-alerts-4.x-2021.08.27/_settings?pretty",
                200,
                r#"{"acknowledged":true}"#,
            );
        let client = ClusterClient::connect(
            transport,
            &["es1:9200".to_string()],
            &ResolvePolicy::default(),
        )
        .await
        .unwrap();
        let day = NaiveDate::from_ymd_opt(2021, 8, 27).unwrap();
        let indices = daily_indices(&templates(), "7.9.0", day);

        let report = apply_refresh_interval(&client, &indices, "60s").await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.failures().next().unwrap().label,
            "filebeat-7.9.0-2021.08.27"
        );
        let puts = client
            .transport()
            .calls()
            .into_iter()
            .filter(|call| call.method == "PUT")
            .count();
        assert_eq!(puts, 2);
    }
}
