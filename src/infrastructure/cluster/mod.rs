//! Endpoint resolution, health gate and the cluster operations built on them

mod client;
mod health;
mod resolver;

pub use client::{ClusterClient, IndexSettings};
pub use health::{ClusterHealth, UnknownStatusPolicy};
pub use resolver::ResolvePolicy;

#[cfg(test)]
pub use health::ClusterHealthStatus;
