//! Alert monitor definitions for the Open Distro alerting plugin

mod builder;
mod condition;
mod settings;
mod template;
mod types;

pub use builder::{build_monitor, MetricKind};
pub use settings::MonitorSettings;
pub use types::MonitorDefinition;

#[cfg(test)]
pub use settings::{Destination, HostCase};
#[cfg(test)]
pub use types::TimeUnit;
