use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::core::OpsError;
use crate::domain::monitor::MonitorSettings;
use crate::domain::search::ExportSettings;
use crate::infrastructure::cluster::{ResolvePolicy, UnknownStatusPolicy};
use crate::infrastructure::http::TransportConfig;
use crate::infrastructure::mail::MailConfig;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Candidate base URLs, probed in this order
    pub endpoints: Vec<String>,
    pub username: String,
    pub password: Option<String>,
    /// PEM bundle trusted in addition to the system roots
    pub ca_cert: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub resolve_budget_secs: u64,
    pub unknown_status: UnknownStatusPolicy,
    pub accept_invalid_certs: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            username: "admin".to_string(),
            password: None,
            ca_cert: None,
            request_timeout_secs: 30,
            probe_timeout_secs: 5,
            resolve_budget_secs: 30,
            unknown_status: UnknownStatusPolicy::default(),
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("endpoints", &self.endpoints)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ca_cert", &self.ca_cert)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("resolve_budget_secs", &self.resolve_budget_secs)
            .field("unknown_status", &self.unknown_status)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ClusterConfig {
    pub fn resolve_policy(&self) -> ResolvePolicy {
        ResolvePolicy {
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            budget: Duration::from_secs(self.resolve_budget_secs),
        }
    }

    pub fn transport_config(&self, username: String, password: String) -> TransportConfig {
        TransportConfig {
            username,
            password,
            ca_cert: self.ca_cert.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Daily index maintenance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexMaintenance {
    pub refresh_interval: String,
    /// Index name templates; `{version}` and `{date}` are substituted per run
    pub index_templates: Vec<String>,
}

impl Default for IndexMaintenance {
    fn default() -> Self {
        Self {
            refresh_interval: "60s".to_string(),
            index_templates: [
                "filebeat-{version}-{date}",
                "metricbeat-{version}-{date}",
                "heartbeat-{version}-{date}",
                "wazuh-monitoring-{date}",
                "wazuh-alerts-4.x-{date}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub monitors: MonitorSettings,

    #[serde(default)]
    pub settings: IndexMaintenance,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, OpsError> {
        let config: Config =
            toml::from_str(content).map_err(|err| OpsError::Config(err.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OpsError> {
        if self.cluster.endpoints.is_empty() {
            return Err(OpsError::Config(
                "cluster.endpoints needs at least one candidate".into(),
            ));
        }
        if let Some(position) = self.cluster.endpoints.iter().position(|e| e.trim().is_empty()) {
            return Err(OpsError::Config(format!(
                "cluster.endpoints[{position}] is blank"
            )));
        }
        if self.cluster.probe_timeout_secs == 0
            || self.cluster.request_timeout_secs == 0
            || self.cluster.resolve_budget_secs == 0
        {
            return Err(OpsError::Config(
                "cluster timeouts and resolve_budget_secs must be > 0".into(),
            ));
        }
        self.monitors.validate().map_err(OpsError::Config)?;
        self.export.validate().map_err(OpsError::Config)?;
        if self.settings.refresh_interval.trim().is_empty() {
            return Err(OpsError::Config(
                "settings.refresh_interval must not be empty".into(),
            ));
        }
        if let Some(mail) = &self.mail {
            mail.validate().map_err(OpsError::Config)?;
        }
        Ok(())
    }

    /// Mail section, required by the commands that send anything.
    pub fn mail(&self) -> Result<&MailConfig, OpsError> {
        self.mail
            .as_ref()
            .ok_or_else(|| OpsError::Config("missing [mail] section".into()))
    }
}

/// Load from `explicit`, falling back to the default location.
pub fn load(explicit: Option<&Path>) -> Result<Config, OpsError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_path()
            .ok_or_else(|| OpsError::Config("no configuration path could be determined".into()))?,
    };
    let content = fs::read_to_string(&path).map_err(|err| {
        OpsError::Config(format!("cannot read {}: {}", path.display(), err))
    })?;
    Config::parse(&content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SONDE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("sonde").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("sonde").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "sonde", "sonde")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
