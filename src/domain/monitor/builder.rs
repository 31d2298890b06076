//! Monitor definition builder
//!
//! Pure: the same host and settings always produce the same definition, so a
//! re-run submits byte-identical payloads.

use std::collections::BTreeMap;
use std::fmt;

use super::condition::{Percent, ThresholdCondition};
use super::settings::{HostFilter, MonitorSettings, Window};
use super::template;
use super::types::{
    Action, Aggregation, BoolFilter, Condition, FieldRef, Filter, Input, MonitorDefinition,
    MonitorQuery, Period, QueryClause, RangeBounds, Schedule, Script, SearchInput, Severity,
    TermValue, Trigger,
};

const STORAGE_USED: &str = "system.fsstat.total_size.used";
const STORAGE_FREE: &str = "system.fsstat.total_size.free";
const STORAGE_TOTAL: &str = "system.fsstat.total_size.total";
const MEMORY_USED_PCT: &str = "system.memory.used.pct";
const CPU_TOTAL_PCT: &str = "system.cpu.total.pct";

/// Aggregation name used by single-value average monitors
const AVERAGE_AGG: &str = "when";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Storage,
    Ram,
    Cpu,
}

impl MetricKind {
    /// Submission order within a host
    pub const ALL: [MetricKind; 3] = [MetricKind::Storage, MetricKind::Ram, MetricKind::Cpu];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Storage => "Storage",
            MetricKind::Ram => "RAM",
            MetricKind::Cpu => "CPU",
        }
    }

    pub fn is_enabled(self, settings: &MonitorSettings) -> bool {
        match self {
            MetricKind::Storage => true,
            MetricKind::Ram => settings.ram.enabled,
            MetricKind::Cpu => settings.cpu.enabled,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn monitor_name(kind: MetricKind, host: &str) -> String {
    format!("[{}] {} usage", host.to_uppercase(), kind.label())
}

pub fn build_monitor(kind: MetricKind, host: &str, settings: &MonitorSettings) -> MonitorDefinition {
    match kind {
        MetricKind::Storage => build_storage(host, settings),
        MetricKind::Ram => build_average(kind, host, settings, MEMORY_USED_PCT),
        MetricKind::Cpu => build_average(kind, host, settings, CPU_TOTAL_PCT),
    }
}

fn build_storage(host: &str, settings: &MonitorSettings) -> MonitorDefinition {
    let storage = &settings.storage;
    let aggregations = BTreeMap::from([
        ("used".to_string(), max(STORAGE_USED)),
        ("free".to_string(), max(STORAGE_FREE)),
        ("total".to_string(), max(STORAGE_TOTAL)),
    ]);
    let tiers = [
        (storage.critical, Severity::Critical),
        (storage.warning, Severity::Warning),
    ];
    let triggers = tiers
        .into_iter()
        .map(|(threshold, severity)| {
            let condition = ThresholdCondition::UsageOverTotal {
                used: "used".to_string(),
                total: "total".to_string(),
                threshold,
            };
            trigger(MetricKind::Storage, host, severity, condition, settings)
        })
        .collect();

    assemble(
        MetricKind::Storage,
        host,
        settings,
        storage.window,
        &storage.host_filter,
        aggregations,
        triggers,
    )
}

fn build_average(
    kind: MetricKind,
    host: &str,
    settings: &MonitorSettings,
    field: &str,
) -> MonitorDefinition {
    let usage = match kind {
        MetricKind::Cpu => &settings.cpu,
        _ => &settings.ram,
    };
    let aggregations = BTreeMap::from([(
        AVERAGE_AGG.to_string(),
        Aggregation::Avg(FieldRef {
            field: field.to_string(),
        }),
    )]);
    let condition = ThresholdCondition::AverageAbove {
        aggregation: AVERAGE_AGG.to_string(),
        threshold: usage.threshold,
    };
    let triggers = vec![trigger(kind, host, Severity::Critical, condition, settings)];

    assemble(
        kind,
        host,
        settings,
        usage.window,
        &usage.host_filter,
        aggregations,
        triggers,
    )
}

fn assemble(
    kind: MetricKind,
    host: &str,
    settings: &MonitorSettings,
    window: Window,
    host_filter: &HostFilter,
    aggregations: BTreeMap<String, Aggregation>,
    triggers: Vec<Trigger>,
) -> MonitorDefinition {
    let range = RangeBounds {
        from: format!(
            "{{{{period_end}}}}||-{}{}",
            window.interval,
            window.unit.date_math_suffix()
        ),
        to: "{{period_end}}".to_string(),
        include_lower: true,
        include_upper: true,
        format: "epoch_millis".to_string(),
        boost: 1.0,
    };
    let term = TermValue {
        value: host_filter.term_value(host),
        boost: 1.0,
    };
    let filter = vec![
        Filter::Range(BTreeMap::from([("@timestamp".to_string(), range)])),
        Filter::Term(BTreeMap::from([(host_filter.field.clone(), term)])),
    ];

    MonitorDefinition {
        kind: "monitor".to_string(),
        name: monitor_name(kind, host),
        enabled: true,
        schedule: Schedule {
            period: Period {
                interval: window.interval,
                unit: window.unit,
            },
        },
        inputs: vec![Input {
            search: SearchInput {
                indices: vec![settings.index_pattern.clone()],
                query: MonitorQuery {
                    size: 0,
                    query: QueryClause {
                        bool: BoolFilter {
                            filter,
                            adjust_pure_negative: true,
                            boost: 1.0,
                        },
                    },
                    aggregations,
                },
            },
        }],
        triggers,
    }
}

fn trigger(
    kind: MetricKind,
    host: &str,
    severity: Severity,
    condition: ThresholdCondition,
    settings: &MonitorSettings,
) -> Trigger {
    let threshold = condition.threshold();
    Trigger {
        name: trigger_name(kind, threshold),
        severity,
        condition: Condition {
            script: Script::painless(condition.script()),
        },
        actions: actions(kind, host, threshold, settings),
    }
}

fn trigger_name(kind: MetricKind, threshold: Percent) -> String {
    format!("{}_{}%", kind.label(), threshold)
}

fn actions(kind: MetricKind, host: &str, threshold: Percent, settings: &MonitorSettings) -> Vec<Action> {
    let subject = template::subject(&settings.subject_prefix, kind, host, threshold);
    let body = template::body(kind, threshold);
    settings
        .destinations
        .iter()
        .map(|dest| Action {
            name: dest.name.clone(),
            destination_id: dest.id.clone(),
            message_template: Script::mustache(body.clone()),
            throttle_enabled: false,
            subject_template: Script::mustache(subject.clone()),
        })
        .collect()
}

fn max(field: &str) -> Aggregation {
    Aggregation::Max(FieldRef {
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::monitor::settings::Destination;
    use serde_json::json;

    fn settings() -> MonitorSettings {
        let mut settings = MonitorSettings {
            destinations: vec![
                Destination {
                    name: "ops-mail".into(),
                    id: "dest-a".into(),
                },
                Destination {
                    name: "support-mail".into(),
                    id: "dest-b".into(),
                },
            ],
            ..MonitorSettings::default()
        };
        settings.storage.window = Window::minutes(30);
        settings.storage.warning = Percent::new(80).unwrap();
        settings.storage.critical = Percent::new(90).unwrap();
        settings.ram.window = Window::minutes(10);
        settings.ram.threshold = Percent::new(90).unwrap();
        settings
    }

    #[test]
    fn test_storage_monitor_shape() {
        let monitor = build_monitor(MetricKind::Storage, "srv01", &settings());

        assert_eq!(monitor.name, "[SRV01] Storage usage");
        assert_eq!(monitor.kind, "monitor");
        assert_eq!(monitor.schedule.period.interval, 30);
        let names: Vec<_> = monitor.triggers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Storage_90%", "Storage_80%"]);
        assert_eq!(monitor.triggers[0].severity, Severity::Critical);
        assert_eq!(monitor.triggers[1].severity, Severity::Warning);
        assert!(monitor.triggers[0].condition.script.source.ends_with("> 90"));
        assert!(monitor.triggers[1].condition.script.source.ends_with("> 80"));
    }

    #[test]
    fn test_storage_search_input() {
        let monitor = build_monitor(MetricKind::Storage, "SRV01", &settings());
        let value = serde_json::to_value(&monitor.inputs[0]).unwrap();

        assert_eq!(value["search"]["indices"], json!(["metricbeat-*"]));
        let filter = &value["search"]["query"]["query"]["bool"]["filter"];
        assert_eq!(
            filter[0]["range"]["@timestamp"]["from"],
            json!("{{period_end}}||-30m")
        );
        assert_eq!(filter[0]["range"]["@timestamp"]["to"], json!("{{period_end}}"));
        assert_eq!(filter[1]["term"]["host.name"]["value"], json!("srv01"));
        let aggs = &value["search"]["query"]["aggregations"];
        assert_eq!(aggs["used"]["max"]["field"], json!(STORAGE_USED));
        assert_eq!(aggs["free"]["max"]["field"], json!(STORAGE_FREE));
        assert_eq!(aggs["total"]["max"]["field"], json!(STORAGE_TOTAL));
    }

    #[test]
    fn test_ram_monitor_shape() {
        let monitor = build_monitor(MetricKind::Ram, "srv01", &settings());

        assert_eq!(monitor.name, "[SRV01] RAM usage");
        assert_eq!(monitor.triggers.len(), 1);
        let trigger = &monitor.triggers[0];
        assert_eq!(trigger.name, "RAM_90%");
        assert_eq!(trigger.severity, Severity::Critical);
        assert!(trigger.condition.script.source.ends_with("> 0.90"));

        let value = serde_json::to_value(&monitor).unwrap();
        let filter = &value["inputs"][0]["search"]["query"]["query"]["bool"]["filter"];
        assert_eq!(filter[1]["term"]["agent.hostname"]["value"], json!("SRV01"));
        assert_eq!(
            value["inputs"][0]["search"]["query"]["aggregations"]["when"]["avg"]["field"],
            json!(MEMORY_USED_PCT)
        );
        assert_eq!(value["schedule"], json!({"period": {"interval": 10, "unit": "MINUTES"}}));
    }

    #[test]
    fn test_cpu_monitor_uses_cpu_field() {
        let mut settings = settings();
        settings.cpu.enabled = true;
        let monitor = build_monitor(MetricKind::Cpu, "srv01", &settings);
        assert_eq!(monitor.name, "[SRV01] CPU usage");
        assert_eq!(monitor.triggers[0].name, "CPU_90%");
        let value = serde_json::to_value(&monitor).unwrap();
        assert_eq!(
            value["inputs"][0]["search"]["query"]["aggregations"]["when"]["avg"]["field"],
            json!(CPU_TOTAL_PCT)
        );
    }

    #[test]
    fn test_each_trigger_notifies_every_destination() {
        let monitor = build_monitor(MetricKind::Storage, "srv01", &settings());
        for trigger in &monitor.triggers {
            let ids: Vec<_> = trigger
                .actions
                .iter()
                .map(|a| a.destination_id.as_str())
                .collect();
            assert_eq!(ids, vec!["dest-a", "dest-b"]);
            for action in &trigger.actions {
                assert!(!action.throttle_enabled);
                assert_eq!(action.subject_template.lang, "mustache");
                assert!(action.subject_template.source.contains("SRV01"));
            }
        }
        let critical = &monitor.triggers[0].actions[0];
        assert_eq!(
            critical.subject_template.source,
            "[ELK Alerts] SRV01 - Storage above 90%"
        );
        assert!(critical.message_template.source.contains("Storage reached the 90% threshold"));
    }

    #[test]
    fn test_builder_is_deterministic() {
        let settings = settings();
        for kind in MetricKind::ALL {
            let first = build_monitor(kind, "srv01", &settings);
            let second = build_monitor(kind, "srv01", &settings);
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_window_unit_drives_date_math() {
        let mut settings = settings();
        settings.storage.window = Window {
            interval: 2,
            unit: crate::domain::monitor::TimeUnit::Hours,
        };
        let value = serde_json::to_value(build_monitor(MetricKind::Storage, "srv01", &settings)).unwrap();
        assert_eq!(
            value["inputs"][0]["search"]["query"]["query"]["bool"]["filter"][0]["range"]["@timestamp"]["from"],
            json!("{{period_end}}||-2h")
        );
        assert_eq!(value["schedule"]["period"]["unit"], json!("HOURS"));
    }
}
