//! Rocket stat profiles.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;
use crate::events::AffectedStat;

/// Stable identifier for a rocket in the host's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RocketId(pub String);

impl RocketId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable per-flight stats of the rocket being flown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocketProfile {
    /// Lower is stronger acceleration.
    pub acceleration_stat: f64,
    /// Lower takes less hull damage.
    pub durability_stat: f64,
    /// Higher burns less fuel.
    pub efficiency_stat: f64,
}

impl RocketProfile {
    #[must_use]
    pub const fn new(acceleration_stat: f64, durability_stat: f64, efficiency_stat: f64) -> Self {
        Self {
            acceleration_stat,
            durability_stat,
            efficiency_stat,
        }
    }

    /// Reject stats that would divide by zero or flip a formula's sign.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] naming the first bad stat.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (field, value) in [
            ("acceleration_stat", self.acceleration_stat),
            ("durability_stat", self.durability_stat),
            ("efficiency_stat", self.efficiency_stat),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::validation(
                    field,
                    format!("{value} must be a positive number"),
                ));
            }
        }
        Ok(())
    }

    /// Stat value an event's `affectedStat` refers to; events without one read 0.
    #[must_use]
    pub const fn stat(&self, stat: Option<AffectedStat>) -> f64 {
        match stat {
            Some(AffectedStat::Boost) => self.acceleration_stat,
            Some(AffectedStat::Armor) => self.durability_stat,
            Some(AffectedStat::FuelEco) => self.efficiency_stat,
            None => 0.0,
        }
    }
}

impl Default for RocketProfile {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_lookup_maps_each_affected_stat() {
        let profile = RocketProfile::new(2.0, 1.5, 0.8);
        assert!((profile.stat(Some(AffectedStat::Boost)) - 2.0).abs() < f64::EPSILON);
        assert!((profile.stat(Some(AffectedStat::Armor)) - 1.5).abs() < f64::EPSILON);
        assert!((profile.stat(Some(AffectedStat::FuelEco)) - 0.8).abs() < f64::EPSILON);
        assert!(profile.stat(None).abs() < f64::EPSILON);
    }

    #[test]
    fn non_positive_stats_fail_validation() {
        assert!(RocketProfile::new(1.0, 1.0, 1.0).validate().is_ok());
        let err = RocketProfile::new(1.0, 1.0, 0.0).validate().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation {
                field: "efficiency_stat",
                ..
            }
        ));
        assert!(RocketProfile::new(-1.0, 1.0, 1.0).validate().is_err());
        assert!(RocketProfile::new(1.0, f64::NAN, 1.0).validate().is_err());
    }

    #[test]
    fn profile_reads_camel_case_json() {
        let profile: RocketProfile = serde_json::from_str(
            r#"{ "accelerationStat": 2.0, "durabilityStat": 1.0, "efficiencyStat": 1.2 }"#,
        )
        .expect("profile parses");
        assert_eq!(profile, RocketProfile::new(2.0, 1.0, 1.2));
    }
}
