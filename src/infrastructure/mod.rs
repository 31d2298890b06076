//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The HTTP transport used for every cluster call
//! - Endpoint resolution, health gate and cluster operations
//! - SMTP delivery

pub mod cluster;
pub mod http;
pub mod mail;
