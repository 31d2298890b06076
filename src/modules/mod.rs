//! Command modules
//!
//! Each module implements one operation over an already gated cluster client
//! (or the mailer) and reports what happened per item:
//! - health: endpoint resolution plus the health gate
//! - monitors: alert monitor provisioning from a hosts CSV
//! - refresh: refresh interval on today's daily indices
//! - export: log search saved as CSV
//! - email: HTML mail with an optional attachment

pub mod email;
pub mod export;
pub mod health;
pub mod monitors;
pub mod refresh;
