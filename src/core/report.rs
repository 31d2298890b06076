//! Per-item outcome tracking for best-effort loops

use super::error::PARTIAL_FAILURE_STATUS;

/// Outcome of a single item within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ReportItem {
    pub label: String,
    pub detail: String,
    pub status: ItemStatus,
}

/// Collects per-item results so a loop keeps going after a failure
#[derive(Debug, Clone)]
pub struct RunReport {
    pub title: String,
    pub items: Vec<ReportItem>,
}

impl RunReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn add(&mut self, label: impl Into<String>, detail: impl Into<String>, status: ItemStatus) {
        self.items.push(ReportItem {
            label: label.into(),
            detail: detail.into(),
            status,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Ok)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// One-line summary, e.g. `Monitors - 3 ok, 1 failed`
    pub fn summary(&self) -> String {
        format!(
            "{} - {} ok, {} failed",
            self.title,
            self.succeeded(),
            self.failed()
        )
    }

    /// Failed item labels with their detail, in the order they were recorded
    pub fn failures(&self) -> impl Iterator<Item = &ReportItem> {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Failed)
    }

    pub fn exit_status(&self) -> u8 {
        if self.failed() == 0 {
            0
        } else {
            PARTIAL_FAILURE_STATUS
        }
    }
}
