//! Wire records understood by the Open Distro alerting plugin

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub enabled: bool,
    pub schedule: Schedule,
    pub inputs: Vec<Input>,
    pub triggers: Vec<Trigger>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub interval: u32,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Unit suffix in date-math expressions (`now-30m`)
    pub fn date_math_suffix(self) -> char {
        match self {
            TimeUnit::Minutes => 'm',
            TimeUnit::Hours => 'h',
            TimeUnit::Days => 'd',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Input {
    pub search: SearchInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchInput {
    pub indices: Vec<String>,
    pub query: MonitorQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorQuery {
    pub size: u32,
    pub query: QueryClause,
    pub aggregations: BTreeMap<String, Aggregation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryClause {
    pub bool: BoolFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolFilter {
    pub filter: Vec<Filter>,
    pub adjust_pure_negative: bool,
    pub boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Range(BTreeMap<String, RangeBounds>),
    Term(BTreeMap<String, TermValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBounds {
    pub from: String,
    pub to: String,
    pub include_lower: bool,
    pub include_upper: bool,
    pub format: String,
    pub boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermValue {
    pub value: String,
    pub boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Max(FieldRef),
    Avg(FieldRef),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRef {
    pub field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    #[serde(rename = "5")]
    Critical,
    #[serde(rename = "3")]
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trigger {
    pub name: String,
    pub severity: Severity,
    pub condition: Condition,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub script: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub name: String,
    pub destination_id: String,
    pub message_template: Script,
    pub throttle_enabled: bool,
    pub subject_template: Script,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub source: String,
    pub lang: String,
}

impl Script {
    pub fn painless(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: "painless".to_string(),
        }
    }

    pub fn mustache(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: "mustache".to_string(),
        }
    }
}
