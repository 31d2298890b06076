//! Domain layer - pure data models with no I/O
//!
//! - Monitor definitions and the builder that generates them
//! - Log search queries and decoded results

pub mod monitor;
pub mod search;
