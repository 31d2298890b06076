//! Notification text. Mustache placeholders are emitted verbatim and filled
//! in by the alerting engine when the trigger fires.

use super::builder::MetricKind;
use super::condition::Percent;

const HEADER: &str = r#"Monitor "{{ctx.monitor.name}}" just entered alert status. Please investigate the issue.
    - Trigger: {{ctx.trigger.name}}
    - Severity: {{ctx.trigger.severity}}
    - Period start: {{ctx.periodStart}}
    - Period end: {{ctx.periodEnd}}
"#;

fn detail_lines(kind: MetricKind) -> &'static [&'static str] {
    match kind {
        MetricKind::Storage => &[
            "Total storage (bytes): {{ctx.results.0.aggregations.total.value}}",
            "Used storage (bytes): {{ctx.results.0.aggregations.used.value}}",
            "Free storage (bytes): {{ctx.results.0.aggregations.free.value}}",
        ],
        MetricKind::Ram => &["Average RAM percentage: {{ctx.results.0.aggregations.when.value}}"],
        MetricKind::Cpu => &["Average CPU percentage: {{ctx.results.0.aggregations.when.value}}"],
    }
}

pub fn subject(prefix: &str, kind: MetricKind, host: &str, threshold: Percent) -> String {
    format!(
        "{} {} - {} above {}%",
        prefix,
        host.to_uppercase(),
        kind.label(),
        threshold
    )
}

pub fn body(kind: MetricKind, threshold: Percent) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    text.push_str(&format!("{} reached the {}% threshold:\n", kind.label(), threshold));
    for line in detail_lines(kind) {
        text.push_str("    - ");
        text.push_str(line);
        text.push('\n');
    }
    text
}
