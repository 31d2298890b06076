//! Search response decoding

use serde::Deserialize;

/// One log hit, flattened to the columns the CSV export writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub hostname: String,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub total: u64,
    pub hits: Vec<LogRecord>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    total: TotalHits,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is an object on 7.x and a bare number on older clusters
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: HitSource,
}

#[derive(Debug, Default, Deserialize)]
struct HitSource {
    #[serde(rename = "@timestamp", default)]
    timestamp: Option<String>,
    #[serde(default)]
    agent: Option<Agent>,
    #[serde(default)]
    log: Option<Log>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Agent {
    hostname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Log {
    level: Option<String>,
}

impl SearchResult {
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let response: SearchResponse = serde_json::from_str(body)?;
        let total = match response.hits.total {
            TotalHits::Object { value } | TotalHits::Count(value) => value,
        };
        let hits = response
            .hits
            .hits
            .into_iter()
            .map(|hit| {
                let source = hit.source;
                LogRecord {
                    timestamp: source.timestamp.unwrap_or_default(),
                    hostname: source.agent.and_then(|a| a.hostname).unwrap_or_default(),
                    level: source.log.and_then(|l| l.level).unwrap_or_default(),
                    message: source.message.unwrap_or_default(),
                }
            })
            .collect();
        Ok(Self { total, hits })
    }
}
