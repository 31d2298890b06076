//! Cluster client bound to the resolved endpoint
//!
//! A `ClusterClient` only exists once resolution succeeded, so every call it
//! issues targets the active endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use super::health::{ClusterHealth, HealthOutcome, UnknownStatusPolicy};
use super::resolver::{resolve, ResolvePolicy, HEALTH_PATH};
use crate::core::{OpsError, RemoteCause};
use crate::domain::monitor::MonitorDefinition;
use crate::domain::search::SearchResult;
use crate::infrastructure::http::{HttpResponse, Transport};

pub const MONITORS_PATH: &str = "_opendistro/_alerting/monitors";

/// Body for `PUT <index>/_settings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSettings {
    pub index: IndexSettingsBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSettingsBody {
    pub refresh_interval: String,
}

impl IndexSettings {
    pub fn refresh_interval(interval: impl Into<String>) -> Self {
        Self {
            index: IndexSettingsBody {
                refresh_interval: interval.into(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedMonitor {
    #[serde(rename = "_id")]
    id: String,
}

pub struct ClusterClient<T: Transport> {
    transport: T,
    endpoint: String,
}

impl<T: Transport> ClusterClient<T> {
    /// Resolve the active endpoint from `candidates`.
    pub async fn connect(
        transport: T,
        candidates: &[String],
        policy: &ResolvePolicy,
    ) -> Result<Self, OpsError> {
        let endpoint = resolve(&transport, candidates, policy).await?;
        Ok(Self {
            transport,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// One health probe. A failed request or an unreadable 200 body is `ClusterUnreachable`.
    async fn check_health(&self) -> Result<HealthOutcome, OpsError> {
        info!("Checking cluster status...");
        let response = self
            .transport
            .get(&self.url(HEALTH_PATH), None)
            .await
            .map_err(|err| OpsError::ClusterUnreachable {
                reason: err.to_string(),
            })?;
        HealthOutcome::from_response(&response).map_err(|err| OpsError::ClusterUnreachable {
            reason: format!("unreadable health response: {err}"),
        })
    }

    /// Health gate: the run continues only on `Ok`.
    pub async fn ensure_healthy(
        &self,
        policy: UnknownStatusPolicy,
    ) -> Result<ClusterHealth, OpsError> {
        self.check_health().await?.gate(policy)
    }

    /// Submit a monitor; returns the id assigned by the alerting plugin.
    pub async fn create_monitor(&self, monitor: &MonitorDefinition) -> Result<String, OpsError> {
        debug!("Submitting monitor {}", monitor.name);
        let payload = serde_json::to_value(monitor)?;
        let response = self.transport.post(&self.url(MONITORS_PATH), &payload).await?;
        if response.status == 201 {
            let created: CreatedMonitor = serde_json::from_str(&response.body)?;
            info!("Monitor {} created with id {}", monitor.name, created.id);
            Ok(created.id)
        } else {
            Err(remote_failure("create monitor", &response))
        }
    }

    pub async fn apply_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<Value, OpsError> {
        info!("Applying settings on index {}", index);
        let payload = serde_json::to_value(settings)?;
        let path = format!("{}/_settings?pretty", index);
        let response = self.transport.put(&self.url(&path), &payload).await?;
        if response.is_ok() {
            let body = response.json()?;
            info!("Settings applied on {}", index);
            Ok(body)
        } else {
            Err(remote_failure(&format!("apply settings on {index}"), &response))
        }
    }

    pub async fn search(&self, index: &str, query: &Value) -> Result<SearchResult, OpsError> {
        info!("Searching index {}", index);
        let path = format!("{}/_search", index);
        let response = self.transport.post(&self.url(&path), query).await?;
        if response.is_ok() {
            let result = SearchResult::from_body(&response.body)?;
            info!("Search on {} found {} hits", index, result.total);
            Ok(result)
        } else {
            Err(remote_failure(&format!("search on {index}"), &response))
        }
    }
}

/// Extract `error.root_cause[0]`, falling back to the `error` object or the raw body.
pub fn remote_cause(body: &str) -> RemoteCause {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return RemoteCause::new("unparsable_response", body.trim());
    };
    let error = &value["error"];
    let root = &error["root_cause"][0];
    match (root["type"].as_str(), root["reason"].as_str()) {
        (Some(kind), Some(reason)) => RemoteCause::new(kind, reason),
        _ => match (error["type"].as_str(), error["reason"].as_str()) {
            (Some(kind), Some(reason)) => RemoteCause::new(kind, reason),
            _ if !error.is_null() => RemoteCause::new("error", error.to_string()),
            _ => RemoteCause::new("unexpected_response", body.trim()),
        },
    }
}

fn remote_failure(operation: &str, response: &HttpResponse) -> OpsError {
    let cause = remote_cause(&response.body);
    error!(
        "{} failed: HTTP {} - type: {}, reason: {}",
        operation, response.status, cause.kind, cause.reason
    );
    OpsError::RemoteOperationFailed {
        operation: operation.to_string(),
        status: response.status,
        cause,
    }
}
