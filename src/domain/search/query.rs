//! Log export query and timestamp handling

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};

const ELASTIC_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const EXPORT_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Which log lines the export pulls
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub index: String,
    /// `query_string` pattern matched against `agent.hostname`
    pub host_pattern: String,
    pub module: String,
    pub dataset: String,
    /// Start of the window, in days before today at 22:00 UTC
    pub lookback_days: u32,
    pub size: u32,
    pub histogram_interval: String,
    pub time_zone: String,
    /// Applied to every exported timestamp
    pub timestamp_offset_hours: i64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            index: "filebeat-*".to_string(),
            host_pattern: "SRVPN\\-LBBDD\\-*".to_string(),
            module: "mysql".to_string(),
            dataset: "mysql.error".to_string(),
            lookback_days: 2,
            size: 10_000,
            histogram_interval: "30m".to_string(),
            time_zone: "Europe/Madrid".to_string(),
            timestamp_offset_hours: 2,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.index.trim().is_empty() {
            return Err("export.index must not be empty".into());
        }
        if self.size == 0 {
            return Err("export.size must be > 0".into());
        }
        Ok(())
    }

    /// Lower bound of the range filter, e.g. `2021-10-03T22:00:00.000Z`
    pub fn window_start(&self, today: NaiveDate) -> String {
        let start = today - Duration::days(i64::from(self.lookback_days));
        format!("{}T22:00:00.000Z", start.format("%Y-%m-%d"))
    }

    pub fn query(&self, today: NaiveDate) -> Value {
        json!({
            "size": self.size,
            "sort": [{"@timestamp": {"order": "desc", "unmapped_type": "boolean"}}],
            "aggs": {
                "2": {
                    "date_histogram": {
                        "field": "@timestamp",
                        "fixed_interval": self.histogram_interval,
                        "time_zone": self.time_zone,
                        "min_doc_count": 1
                    }
                }
            },
            "query": {
                "bool": {
                    "must": [],
                    "filter": [
                        {"bool": {
                            "should": [{"query_string": {
                                "fields": ["agent.hostname"],
                                "query": self.host_pattern
                            }}],
                            "minimum_should_match": 1
                        }},
                        {"match_phrase": {"event.module": self.module}},
                        {"match_phrase": {"event.dataset": self.dataset}},
                        {"range": {"@timestamp": {
                            "gte": self.window_start(today),
                            "lte": "now"
                        }}}
                    ],
                    "should": [],
                    "must_not": []
                }
            }
        })
    }
}

/// Shift an index timestamp by `offset_hours`. Unparsable input is returned as-is.
pub fn shift_timestamp(raw: &str, offset_hours: i64) -> String {
    match NaiveDateTime::parse_from_str(raw, ELASTIC_TIMESTAMP) {
        Ok(parsed) => (parsed + Duration::hours(offset_hours))
            .format(EXPORT_TIMESTAMP)
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
