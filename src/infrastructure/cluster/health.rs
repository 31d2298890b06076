//! Cluster health interpretation and the go/no-go gate

use std::fmt;

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::OpsError;
use crate::infrastructure::http::HttpResponse;

/// Status reported by `_cluster/health`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterHealthStatus {
    Green,
    Yellow,
    Red,
    Unknown(String),
}

impl ClusterHealthStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "red" => Self::Red,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ClusterHealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => f.write_str("green"),
            Self::Yellow => f.write_str("yellow"),
            Self::Red => f.write_str("red"),
            Self::Unknown(raw) => write!(f, "unknown ({raw})"),
        }
    }
}

/// What to do when the cluster reports a status outside green/yellow/red
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStatusPolicy {
    #[default]
    Abort,
    Proceed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: ClusterHealthStatus,
}

/// Three-way interpretation of a health probe, plus the transport-level miss
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthOutcome {
    /// green or yellow
    Safe(ClusterHealth),
    /// red
    Unsafe(ClusterHealth),
    /// any other status string
    Unknown(ClusterHealth),
    /// non-200 answer
    Unreachable { status: u16 },
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    cluster_name: String,
    status: String,
}

impl HealthOutcome {
    pub fn from_response(response: &HttpResponse) -> Result<Self, OpsError> {
        if !response.is_ok() {
            return Ok(Self::Unreachable {
                status: response.status,
            });
        }
        let body: HealthBody = serde_json::from_str(&response.body)?;
        let health = ClusterHealth {
            cluster_name: body.cluster_name,
            status: ClusterHealthStatus::parse(&body.status),
        };
        Ok(match health.status {
            ClusterHealthStatus::Green | ClusterHealthStatus::Yellow => Self::Safe(health),
            ClusterHealthStatus::Red => Self::Unsafe(health),
            ClusterHealthStatus::Unknown(_) => Self::Unknown(health),
        })
    }

    /// Decide whether the run may continue; logs one status line either way.
    pub fn gate(self, policy: UnknownStatusPolicy) -> Result<ClusterHealth, OpsError> {
        match self {
            Self::Safe(health) => {
                if health.status == ClusterHealthStatus::Yellow {
                    warn!("Cluster {} status is yellow (degraded)", health.cluster_name);
                } else {
                    info!("Cluster {} status is green", health.cluster_name);
                }
                Ok(health)
            }
            Self::Unsafe(health) => {
                warn!("Cluster {} status is red", health.cluster_name);
                Err(OpsError::ClusterUnsafe {
                    cluster: health.cluster_name,
                    status: health.status.to_string(),
                })
            }
            Self::Unknown(health) => {
                warn!(
                    "Cluster {} status is {}",
                    health.cluster_name, health.status
                );
                match policy {
                    UnknownStatusPolicy::Proceed => Ok(health),
                    UnknownStatusPolicy::Abort => Err(OpsError::ClusterUnsafe {
                        cluster: health.cluster_name,
                        status: health.status.to_string(),
                    }),
                }
            }
            Self::Unreachable { status } => {
                warn!("Health probe returned HTTP {}", status);
                Err(OpsError::ClusterUnreachable {
                    reason: format!("health probe returned HTTP {status}"),
                })
            }
        }
    }
}
