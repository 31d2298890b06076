//! Endpoint resolution: first candidate answering the health probe wins

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::OpsError;
use crate::infrastructure::http::Transport;

pub const HEALTH_PATH: &str = "_cluster/health";

/// Bounds for the resolution pass
#[derive(Debug, Clone, Copy)]
pub struct ResolvePolicy {
    /// Timeout applied to each individual probe
    pub probe_timeout: Duration,
    /// Total time allowed across all probes
    pub budget: Duration,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            budget: Duration::from_secs(30),
        }
    }
}

/// Normalize a base URL so resource paths can be appended directly.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    if with_scheme.ends_with('/') {
        with_scheme
    } else {
        format!("{}/", with_scheme)
    }
}

/// Probe candidates in order, once each, and return the first answering HTTP 200.
///
/// Transport failures (refused, timed out, TLS) count as a failed probe.
/// Candidates left unprobed when the budget runs out are never contacted and
/// are not reported in `NoLiveEndpoint::tried`.
pub async fn resolve(
    transport: &dyn Transport,
    candidates: &[String],
    policy: &ResolvePolicy,
) -> Result<String, OpsError> {
    info!("Looking for a live endpoint among {} candidate(s)", candidates.len());
    let started = Instant::now();
    let mut tried = Vec::new();

    for candidate in candidates {
        let elapsed = started.elapsed();
        if elapsed >= policy.budget {
            warn!(
                "Resolution budget of {:?} exhausted, skipping remaining candidates",
                policy.budget
            );
            break;
        }
        let timeout = policy.probe_timeout.min(policy.budget - elapsed);

        let endpoint = normalize_endpoint(candidate);
        let url = format!("{}{}", endpoint, HEALTH_PATH);
        tried.push(endpoint.clone());
        match transport.get(&url, Some(timeout)).await {
            Ok(response) if response.is_ok() => {
                info!("Live endpoint found at {}", endpoint);
                return Ok(endpoint);
            }
            Ok(response) => {
                debug!("Endpoint {} answered HTTP {}", endpoint, response.status);
            }
            Err(err) => {
                debug!("Endpoint {} unreachable: {}", endpoint, err);
            }
        }
    }

    Err(OpsError::NoLiveEndpoint { tried })
}
