//! Tunable monitor parameters, loaded once from configuration

use serde::Deserialize;

use super::condition::Percent;
use super::types::TimeUnit;

/// One notification channel configured in the alerting plugin
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Destination {
    /// Action name shown in the alerting UI
    pub name: String,
    /// Opaque destination id
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Window {
    pub interval: u32,
    pub unit: TimeUnit,
}

impl Window {
    pub fn minutes(interval: u32) -> Self {
        Self {
            interval,
            unit: TimeUnit::Minutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostCase {
    Lower,
    Upper,
    Preserve,
}

/// Which document field carries the host identity, and how it is cased there
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostFilter {
    pub field: String,
    pub case: HostCase,
}

impl HostFilter {
    pub fn new(field: &str, case: HostCase) -> Self {
        Self {
            field: field.to_string(),
            case,
        }
    }

    pub fn term_value(&self, host: &str) -> String {
        match self.case {
            HostCase::Lower => host.to_lowercase(),
            HostCase::Upper => host.to_uppercase(),
            HostCase::Preserve => host.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub window: Window,
    pub warning: Percent,
    pub critical: Percent,
    pub host_filter: HostFilter,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            window: Window::minutes(30),
            warning: Percent::saturating(80),
            critical: Percent::saturating(90),
            host_filter: HostFilter::new("host.name", HostCase::Lower),
        }
    }
}

/// Single-threshold average monitor (RAM, CPU)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UsageSettings {
    pub enabled: bool,
    pub window: Window,
    pub threshold: Percent,
    pub host_filter: HostFilter,
}

impl Default for UsageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            window: Window::minutes(10),
            threshold: Percent::saturating(90),
            host_filter: HostFilter::new("agent.hostname", HostCase::Upper),
        }
    }
}

fn default_cpu() -> UsageSettings {
    UsageSettings {
        enabled: false,
        ..UsageSettings::default()
    }
}

/// Everything the builder needs besides the host identity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub index_pattern: String,
    pub subject_prefix: String,
    pub destinations: Vec<Destination>,
    pub storage: StorageSettings,
    pub ram: UsageSettings,
    #[serde(default = "default_cpu")]
    pub cpu: UsageSettings,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            index_pattern: "metricbeat-*".to_string(),
            subject_prefix: "[ELK Alerts]".to_string(),
            destinations: Vec::new(),
            storage: StorageSettings::default(),
            ram: UsageSettings::default(),
            cpu: default_cpu(),
        }
    }
}

impl MonitorSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.index_pattern.trim().is_empty() {
            return Err("monitors.index_pattern must not be empty".into());
        }
        if self.destinations.is_empty() {
            return Err("monitors.destinations must list at least one destination".into());
        }
        for (idx, dest) in self.destinations.iter().enumerate() {
            if dest.id.trim().is_empty() || dest.name.trim().is_empty() {
                return Err(format!("monitors.destinations[{idx}] needs a name and an id"));
            }
            if self.destinations[..idx].iter().any(|d| d.id == dest.id) {
                return Err(format!("monitors.destinations[{idx}] repeats id {}", dest.id));
            }
        }
        if self.storage.critical <= self.storage.warning {
            return Err(format!(
                "monitors.storage.critical ({}) must be above warning ({})",
                self.storage.critical, self.storage.warning
            ));
        }
        let windows = [
            ("storage", self.storage.window),
            ("ram", self.ram.window),
            ("cpu", self.cpu.window),
        ];
        for (name, window) in windows {
            if window.interval == 0 {
                return Err(format!("monitors.{name}.window.interval must be > 0"));
            }
        }
        Ok(())
    }
}
