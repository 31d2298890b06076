//! Cluster health check shared by every cluster command

use tracing::info;

use crate::config::ClusterConfig;
use crate::core::OpsError;
use crate::infrastructure::cluster::{ClusterClient, ClusterHealth};
use crate::infrastructure::http::Transport;

/// Resolve the active endpoint and pass the health gate.
///
/// Nothing else may touch the cluster before this returns `Ok`.
pub async fn open_cluster<T: Transport>(
    transport: T,
    config: &ClusterConfig,
) -> Result<(ClusterClient<T>, ClusterHealth), OpsError> {
    let client =
        ClusterClient::connect(transport, &config.endpoints, &config.resolve_policy()).await?;
    let health = client.ensure_healthy(config.unknown_status).await?;
    info!(
        "Cluster {} at {} is {}",
        health.cluster_name,
        client.endpoint(),
        health.status
    );
    Ok((client, health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cluster::{ClusterHealthStatus, UnknownStatusPolicy};
    use crate::infrastructure::http::testing::ScriptedTransport;

    fn config(policy: UnknownStatusPolicy) -> ClusterConfig {
        ClusterConfig {
            endpoints: vec!["es1:9200".into(), "es2:9200".into()],
            unknown_status: policy,
            ..ClusterConfig::default()
        }
    }

    const ES1: &str = "https://es1:9200/_cluster/health";
    const ES2: &str = "https://es2:9200/_cluster/health";

    #[tokio::test]
    async fn test_fails_over_then_gates() {
        let transport = ScriptedTransport::new()
            .fail("GET", ES1, "connection refused")
            .reply("GET", ES2, 200, "{}")
            .reply("GET", ES2, 200, r#"{"cluster_name":"logs","status":"green"}"#);

        let (client, health) = open_cluster(transport, &config(UnknownStatusPolicy::Abort))
            .await
            .unwrap();

        assert_eq!(client.endpoint(), "https://es2:9200/");
        assert_eq!(health.status, ClusterHealthStatus::Green);
    }

    #[tokio::test]
    async fn test_red_cluster_aborts() {
        let transport = ScriptedTransport::new()
            .reply("GET", ES1, 200, "{}")
            .reply("GET", ES1, 200, r#"{"cluster_name":"logs","status":"red"}"#);

        let err = open_cluster(transport, &config(UnknownStatusPolicy::Proceed))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, OpsError::ClusterUnsafe { .. }));
        assert_eq!(err.exit_status(), 4);
    }

    #[tokio::test]
    async fn test_unknown_status_follows_policy() {
        let script = || {
            ScriptedTransport::new()
                .reply("GET", ES1, 200, "{}")
                .reply("GET", ES1, 200, r#"{"cluster_name":"logs","status":"purple"}"#)
        };

        let aborted = open_cluster(script(), &config(UnknownStatusPolicy::Abort)).await;
        assert!(aborted.is_err());

        let (_, health) = open_cluster(script(), &config(UnknownStatusPolicy::Proceed))
            .await
            .unwrap();
        assert_eq!(health.status, ClusterHealthStatus::Unknown("purple".into()));
    }

    #[tokio::test]
    async fn test_health_request_failure_is_unreachable() {
        let transport = ScriptedTransport::new()
            .reply("GET", ES1, 200, "{}")
            .fail("GET", ES1, "timed out");

        let err = open_cluster(transport, &config(UnknownStatusPolicy::Proceed))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, OpsError::ClusterUnreachable { .. }));
        assert!(err.is_fatal());
        assert_eq!(err.exit_status(), 4);
        assert_eq!(err.to_string(), "cluster unreachable: transport error: timed out");
    }

    #[tokio::test]
    async fn test_unreadable_health_body_is_unreachable() {
        let transport = ScriptedTransport::new()
            .reply("GET", ES1, 200, "{}")
            .reply("GET", ES1, 200, "{}");

        let err = open_cluster(transport, &config(UnknownStatusPolicy::Proceed))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, OpsError::ClusterUnreachable { .. }));
        assert!(err.is_fatal());
        assert_eq!(err.exit_status(), 4);
        assert!(err.to_string().contains("missing field `cluster_name`"));
    }

    #[tokio::test]
    async fn test_no_endpoint() {
        let err = open_cluster(ScriptedTransport::new(), &config(UnknownStatusPolicy::Abort))
            .await
            .err()
            .unwrap();
        assert_eq!(err.exit_status(), 3);
    }
}
