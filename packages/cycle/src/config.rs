//! Cycle tuning, read from the `[cycle]` section of the application
//! config.

use std::time::Duration;

use polaris_geometry::SimplifyOptions;
use serde::{Deserialize, Serialize};

use crate::CycleError;

/// How categories that pass the population gate are combined.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MergePolicy {
    /// Every gated category contributes its features, in category order.
    #[default]
    Union,
    /// Each gated category replaces the previous one; only the last
    /// category processed survives.
    LastWins,
}

/// Tuning for one danger-zone cycle and the loop around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Delay between the end of one iteration and the start of the next.
    pub interval_secs: u64,
    /// Vertex budget per simplified ring.
    pub max_points: usize,
    /// Simplification tolerance in decimal degrees.
    pub tolerance: f64,
    /// A category is merged only if `0 < resolved < gate_ceiling`.
    pub gate_ceiling: usize,
    /// News articles sent for extraction per iteration.
    pub max_articles: usize,
    /// Minimum danger level for a news record to contribute a location.
    pub min_danger_level: u8,
    /// Upper bound on any single external call.
    pub call_timeout_secs: u64,
    /// How gated categories are combined.
    pub merge_policy: MergePolicy,
    /// Disaster type used when no news record qualifies.
    pub default_disaster_type: String,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 45,
            max_points: polaris_geometry::DEFAULT_MAX_POINTS,
            tolerance: polaris_geometry::DEFAULT_TOLERANCE,
            gate_ceiling: 40,
            max_articles: 6,
            min_danger_level: 5,
            call_timeout_secs: 120,
            merge_policy: MergePolicy::Union,
            default_disaster_type: "bushfire".to_string(),
        }
    }
}

impl CycleConfig {
    /// Checks the values that would make the loop or the simplifier
    /// misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), CycleError> {
        let problem = if self.interval_secs == 0 {
            Some("interval_secs must be at least 1".to_string())
        } else if self.max_points < 3 {
            Some(format!(
                "max_points must be at least 3, got {}",
                self.max_points
            ))
        } else if self.gate_ceiling < 2 {
            Some(format!(
                "gate_ceiling must be at least 2, got {}",
                self.gate_ceiling
            ))
        } else if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            Some(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            ))
        } else if self.call_timeout_secs == 0 {
            Some("call_timeout_secs must be at least 1".to_string())
        } else {
            None
        };

        problem.map_or(Ok(()), |message| Err(CycleError::Config { message }))
    }

    /// Simplifier settings derived from this config.
    #[must_use]
    pub const fn simplify_options(&self) -> SimplifyOptions {
        SimplifyOptions {
            tolerance: self.tolerance,
            max_points: self.max_points,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CycleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interval(), Duration::from_secs(45));
        assert_eq!(config.max_points, 40);
        assert_eq!(config.merge_policy, MergePolicy::Union);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: CycleConfig =
            toml::de::from_str("max_points = 25\nmerge_policy = \"last_wins\"\n").unwrap();
        assert_eq!(config.max_points, 25);
        assert_eq!(config.merge_policy, MergePolicy::LastWins);
        assert_eq!(config.gate_ceiling, 40);
        assert_eq!(config.default_disaster_type, "bushfire");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cases = [
            CycleConfig {
                interval_secs: 0,
                ..CycleConfig::default()
            },
            CycleConfig {
                max_points: 2,
                ..CycleConfig::default()
            },
            CycleConfig {
                gate_ceiling: 1,
                ..CycleConfig::default()
            },
            CycleConfig {
                tolerance: -0.1,
                ..CycleConfig::default()
            },
            CycleConfig {
                tolerance: f64::NAN,
                ..CycleConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(CycleError::Config { .. })),
                "{config:?} should be rejected"
            );
        }
    }
}
