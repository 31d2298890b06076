//! Error kinds shared by every operation

use std::process::ExitCode;

/// Structured error body returned by the cluster (`error.root_cause[0]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCause {
    pub kind: String,
    pub reason: String,
}

impl RemoteCause {
    pub fn new(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("no live endpoint among {} candidate(s): {}", .tried.len(), .tried.join(", "))]
    NoLiveEndpoint { tried: Vec<String> },

    #[error("cluster unreachable: {reason}")]
    ClusterUnreachable { reason: String },

    #[error("cluster {cluster} is not safe to operate on (status: {status})")]
    ClusterUnsafe { cluster: String, status: String },

    #[error("{operation} failed with HTTP {status}: {} ({})", .cause.kind, .cause.reason)]
    RemoteOperationFailed {
        operation: String,
        status: u16,
        cause: RemoteCause,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("configuration: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("mail: {0}")]
    Mail(String),
}

impl OpsError {
    /// Errors raised while resolving and gating the cluster abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoLiveEndpoint { .. } | Self::ClusterUnreachable { .. } | Self::ClusterUnsafe { .. }
        )
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::NoLiveEndpoint { .. } => 3,
            Self::ClusterUnreachable { .. } | Self::ClusterUnsafe { .. } => 4,
            Self::RemoteOperationFailed { .. } | Self::Transport(_) | Self::Decode(_) => 5,
            Self::Io(_) | Self::Csv(_) => 7,
            Self::Mail(_) => 8,
        }
    }
}

/// Exit status used when a run completed but some items failed.
pub const PARTIAL_FAILURE_STATUS: u8 = 6;

impl From<reqwest::Error> for OpsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<lettre::error::Error> for OpsError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Mail(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for OpsError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Mail(err.to_string())
    }
}

impl From<lettre::address::AddressError> for OpsError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::Mail(err.to_string())
    }
}
