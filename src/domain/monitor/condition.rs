//! Trigger conditions and the painless script sent to the cluster

#[cfg(test)]
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Whole-number percentage in `1..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u8")]
pub struct Percent(u8);

impl Percent {
    pub fn new(value: u8) -> Option<Self> {
        (1..=100).contains(&value).then_some(Self(value))
    }

    /// Clamp into range; for compile-time defaults.
    pub const fn saturating(value: u8) -> Self {
        if value == 0 {
            Self(1)
        } else if value > 100 {
            Self(100)
        } else {
            Self(value)
        }
    }

    #[cfg(test)]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Fraction with two decimals: 90 -> `0.90`, 5 -> `0.05`, 100 -> `1.00`
    pub fn as_ratio(self) -> String {
        format!("{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl TryFrom<u8> for Percent {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Percent::new(value).ok_or_else(|| format!("percentage must be within 1..=100, got {value}"))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregation name -> value (`None` when the engine reports null)
#[cfg(test)]
pub type AggregationValues = BTreeMap<String, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdCondition {
    /// `(used * 100) / total > threshold`
    UsageOverTotal {
        used: String,
        total: String,
        threshold: Percent,
    },
    /// `aggregation > threshold / 100`
    AverageAbove {
        aggregation: String,
        threshold: Percent,
    },
}

fn agg_ref(name: &str) -> String {
    format!("ctx.results[0].aggregations.{name}.value")
}

impl ThresholdCondition {
    pub fn threshold(&self) -> Percent {
        match self {
            Self::UsageOverTotal { threshold, .. } | Self::AverageAbove { threshold, .. } => {
                *threshold
            }
        }
    }

    /// Painless source. Null values and a zero total evaluate to `false`.
    pub fn script(&self) -> String {
        match self {
            Self::UsageOverTotal {
                used,
                total,
                threshold,
            } => {
                let (used, total) = (agg_ref(used), agg_ref(total));
                format!(
                    "return {total} == null || {used} == null || {total} == 0 ? false : \
                     (({used}*100)/{total}) > {threshold}"
                )
            }
            Self::AverageAbove {
                aggregation,
                threshold,
            } => {
                let value = agg_ref(aggregation);
                format!(
                    "return {value} == null ? false : {value} > {}",
                    threshold.as_ratio()
                )
            }
        }
    }

    /// Local evaluation against aggregation results; missing data never alerts.
    #[cfg(test)]
    pub fn evaluate(&self, values: &AggregationValues) -> bool {
        let lookup = |name: &str| values.get(name).copied().flatten();
        match self {
            Self::UsageOverTotal {
                used,
                total,
                threshold,
            } => match (lookup(used), lookup(total)) {
                (Some(used), Some(total)) if total != 0.0 => {
                    (used * 100.0) / total > f64::from(threshold.value())
                }
                _ => false,
            },
            Self::AverageAbove {
                aggregation,
                threshold,
            } => lookup(aggregation)
                .map(|value| value > f64::from(threshold.value()) / 100.0)
                .unwrap_or(false),
        }
    }
}
