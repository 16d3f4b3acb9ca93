//! Engine configuration injected into [`crate::FlightEngine`] at construction.
//!
//! Every field carries a serde default so hosts can ship partial JSON
//! overlays. [`EngineConfig::from_json`] parses and validates in one step.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Tier;
use crate::constants;

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} bounds invalid (min {min:.2} > max {max:.2})")]
    BoundsInverted {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("tier table entry {index} ({tier}) is out of order")]
    TierOrder { index: usize, tier: Tier },
    #[error("tier table must end with a D grade that accepts any fuel and hull")]
    TierFloorMissing,
    #[error("ending thresholds must strictly descend (top {top}, second {second}, third {third})")]
    EndingOrder { top: u8, second: u8, third: u8 },
    #[error("round count must be at least 1")]
    NoRounds,
    #[error("configuration could not be parsed: {message}")]
    Parse { message: String },
}

fn ensure_min(field: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min {
        Ok(())
    } else {
        Err(ConfigError::MinViolation { field, min, value })
    }
}

fn ensure_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::MinViolation {
            field,
            min: f64::MIN_POSITIVE,
            value,
        })
    }
}

fn ensure_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub stability: StabilityCfg,
    #[serde(default)]
    pub physics: PhysicsCfg,
    #[serde(default)]
    pub events: EventCfg,
    #[serde(default)]
    pub rounds: RoundCfg,
    #[serde(default)]
    pub flight: FlightCfg,
    #[serde(default)]
    pub tiers: TierCfg,
    #[serde(default)]
    pub archetypes: ArchetypeCfg,
    #[serde(default)]
    pub endings: EndingCfg,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the relevant
    /// invariant error when a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every section's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stability.validate()?;
        self.physics.validate()?;
        self.events.validate()?;
        self.rounds.validate()?;
        self.flight.validate()?;
        self.tiers.validate()?;
        self.archetypes.validate()?;
        self.endings.validate()
    }
}

/// Stability zone classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityCfg {
    /// Change rate (percent) at or above which an interval counts as stable.
    #[serde(default = "StabilityCfg::default_threshold")]
    pub threshold: f64,
}

impl StabilityCfg {
    const fn default_threshold() -> f64 {
        constants::STABILITY_THRESHOLD
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::MinViolation {
                field: "stability.threshold",
                min: f64::MIN,
                value: self.threshold,
            })
        }
    }
}

impl Default for StabilityCfg {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
        }
    }
}

/// Continuous-tick physics tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsCfg {
    #[serde(default = "PhysicsCfg::default_base_consumption_rate")]
    pub base_consumption_rate: f64,
    #[serde(default = "PhysicsCfg::default_reference_efficiency")]
    pub reference_efficiency: f64,
    #[serde(default = "PhysicsCfg::default_consumption_scale")]
    pub consumption_scale: f64,
    #[serde(default = "PhysicsCfg::default_distance_multiplier")]
    pub distance_multiplier: f64,
    #[serde(default = "PhysicsCfg::default_reference_acceleration")]
    pub reference_acceleration: f64,
    #[serde(default = "PhysicsCfg::default_hull_damage_base")]
    pub hull_damage_base: f64,
    /// Inputs strictly below this floor never take hull damage.
    #[serde(default = "PhysicsCfg::default_defensive_input_floor")]
    pub defensive_input_floor: f64,
    #[serde(default = "PhysicsCfg::default_unstable_setback_ratio")]
    pub unstable_setback_ratio: f64,
}

impl PhysicsCfg {
    const fn default_base_consumption_rate() -> f64 {
        constants::BASE_CONSUMPTION_RATE
    }

    const fn default_reference_efficiency() -> f64 {
        constants::REFERENCE_EFFICIENCY
    }

    const fn default_consumption_scale() -> f64 {
        constants::CONSUMPTION_SCALE
    }

    const fn default_distance_multiplier() -> f64 {
        constants::DISTANCE_MULTIPLIER
    }

    const fn default_reference_acceleration() -> f64 {
        constants::REFERENCE_ACCELERATION
    }

    const fn default_hull_damage_base() -> f64 {
        constants::HULL_DAMAGE_BASE
    }

    const fn default_defensive_input_floor() -> f64 {
        constants::DEFENSIVE_INPUT_FLOOR
    }

    const fn default_unstable_setback_ratio() -> f64 {
        constants::UNSTABLE_SETBACK_RATIO
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_min("physics.base_consumption_rate", self.base_consumption_rate, 0.0)?;
        ensure_positive("physics.reference_efficiency", self.reference_efficiency)?;
        ensure_min("physics.consumption_scale", self.consumption_scale, 0.0)?;
        ensure_min("physics.distance_multiplier", self.distance_multiplier, 0.0)?;
        ensure_positive("physics.reference_acceleration", self.reference_acceleration)?;
        ensure_min("physics.hull_damage_base", self.hull_damage_base, 0.0)?;
        ensure_range(
            "physics.defensive_input_floor",
            self.defensive_input_floor,
            constants::FUEL_INPUT_MIN,
            constants::FUEL_INPUT_MAX,
        )?;
        ensure_min("physics.unstable_setback_ratio", self.unstable_setback_ratio, 0.0)
    }
}

impl Default for PhysicsCfg {
    fn default() -> Self {
        Self {
            base_consumption_rate: Self::default_base_consumption_rate(),
            reference_efficiency: Self::default_reference_efficiency(),
            consumption_scale: Self::default_consumption_scale(),
            distance_multiplier: Self::default_distance_multiplier(),
            reference_acceleration: Self::default_reference_acceleration(),
            hull_damage_base: Self::default_hull_damage_base(),
            defensive_input_floor: Self::default_defensive_input_floor(),
            unstable_setback_ratio: Self::default_unstable_setback_ratio(),
        }
    }
}

/// Event modifier tuning and the clamp bounds applied to every resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCfg {
    #[serde(default = "EventCfg::default_bear_trap_durability_threshold")]
    pub bear_trap_durability_threshold: f64,
    #[serde(default = "EventCfg::default_bear_trap_penalty_thrust")]
    pub bear_trap_penalty_thrust: f64,
    #[serde(default = "EventCfg::default_bear_trap_hull_penalty")]
    pub bear_trap_hull_penalty: f64,
    #[serde(default = "EventCfg::default_bull_run_fuel_modifier")]
    pub bull_run_fuel_modifier: f64,
    #[serde(default = "EventCfg::default_fuel_eco_scale")]
    pub fuel_eco_scale: f64,
    #[serde(default = "EventCfg::default_thrust_floor")]
    pub thrust_floor: f64,
    #[serde(default = "EventCfg::default_fuel_modifier_min")]
    pub fuel_modifier_min: f64,
    #[serde(default = "EventCfg::default_fuel_modifier_max")]
    pub fuel_modifier_max: f64,
    /// Thrust at or above this line reads as a favourable outcome.
    #[serde(default = "EventCfg::default_positive_thrust_line")]
    pub positive_thrust_line: f64,
}

impl EventCfg {
    const fn default_bear_trap_durability_threshold() -> f64 {
        constants::BEAR_TRAP_DURABILITY_THRESHOLD
    }

    const fn default_bear_trap_penalty_thrust() -> f64 {
        constants::BEAR_TRAP_PENALTY_THRUST
    }

    const fn default_bear_trap_hull_penalty() -> f64 {
        constants::BEAR_TRAP_HULL_PENALTY
    }

    const fn default_bull_run_fuel_modifier() -> f64 {
        constants::BULL_RUN_FUEL_MODIFIER
    }

    const fn default_fuel_eco_scale() -> f64 {
        constants::FUEL_ECO_SCALE
    }

    const fn default_thrust_floor() -> f64 {
        constants::THRUST_FLOOR
    }

    const fn default_fuel_modifier_min() -> f64 {
        constants::FUEL_MODIFIER_MIN
    }

    const fn default_fuel_modifier_max() -> f64 {
        constants::FUEL_MODIFIER_MAX
    }

    const fn default_positive_thrust_line() -> f64 {
        constants::POSITIVE_THRUST_LINE
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_min(
            "events.bear_trap_durability_threshold",
            self.bear_trap_durability_threshold,
            0.0,
        )?;
        ensure_min("events.bear_trap_penalty_thrust", self.bear_trap_penalty_thrust, 0.0)?;
        ensure_min("events.bear_trap_hull_penalty", self.bear_trap_hull_penalty, 0.0)?;
        ensure_min("events.bull_run_fuel_modifier", self.bull_run_fuel_modifier, 0.0)?;
        ensure_min("events.fuel_eco_scale", self.fuel_eco_scale, 0.0)?;
        ensure_positive("events.thrust_floor", self.thrust_floor)?;
        ensure_positive("events.fuel_modifier_min", self.fuel_modifier_min)?;
        ensure_positive("events.fuel_modifier_max", self.fuel_modifier_max)?;
        if self.fuel_modifier_min > self.fuel_modifier_max {
            return Err(ConfigError::BoundsInverted {
                field: "events.fuel_modifier",
                min: self.fuel_modifier_min,
                max: self.fuel_modifier_max,
            });
        }
        ensure_positive("events.positive_thrust_line", self.positive_thrust_line)
    }
}

impl Default for EventCfg {
    fn default() -> Self {
        Self {
            bear_trap_durability_threshold: Self::default_bear_trap_durability_threshold(),
            bear_trap_penalty_thrust: Self::default_bear_trap_penalty_thrust(),
            bear_trap_hull_penalty: Self::default_bear_trap_hull_penalty(),
            bull_run_fuel_modifier: Self::default_bull_run_fuel_modifier(),
            fuel_eco_scale: Self::default_fuel_eco_scale(),
            thrust_floor: Self::default_thrust_floor(),
            fuel_modifier_min: Self::default_fuel_modifier_min(),
            fuel_modifier_max: Self::default_fuel_modifier_max(),
            positive_thrust_line: Self::default_positive_thrust_line(),
        }
    }
}

/// Round-mode baselines, scaled by composed event multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundCfg {
    #[serde(default = "RoundCfg::default_total_rounds")]
    pub total_rounds: u8,
    /// Fuel burned by a full-input round before modifiers.
    #[serde(default = "RoundCfg::default_fuel_burn")]
    pub fuel_burn: f64,
    /// Distance gained by a full-input round at thrust 1.0.
    #[serde(default = "RoundCfg::default_distance")]
    pub distance: f64,
    /// Hull wear taken by a full-input round at hull modifier 1.0.
    #[serde(default = "RoundCfg::default_hull_wear")]
    pub hull_wear: f64,
}

impl RoundCfg {
    const fn default_total_rounds() -> u8 {
        constants::TOTAL_ROUNDS
    }

    const fn default_fuel_burn() -> f64 {
        constants::ROUND_FUEL_BURN
    }

    const fn default_distance() -> f64 {
        constants::ROUND_DISTANCE
    }

    const fn default_hull_wear() -> f64 {
        constants::ROUND_HULL_WEAR
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.total_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        ensure_min("rounds.fuel_burn", self.fuel_burn, 0.0)?;
        ensure_min("rounds.distance", self.distance, 0.0)?;
        ensure_min("rounds.hull_wear", self.hull_wear, 0.0)
    }
}

impl Default for RoundCfg {
    fn default() -> Self {
        Self {
            total_rounds: Self::default_total_rounds(),
            fuel_burn: Self::default_fuel_burn(),
            distance: Self::default_distance(),
            hull_wear: Self::default_hull_wear(),
        }
    }
}

/// Session start values and input thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightCfg {
    #[serde(default = "FlightCfg::default_target_distance")]
    pub target_distance: f64,
    #[serde(default = "FlightCfg::default_starting_fuel")]
    pub starting_fuel: f64,
    #[serde(default = "FlightCfg::default_starting_hull")]
    pub starting_hull: f64,
    /// Inputs at or above this count as a high-input action for archetypes.
    #[serde(default = "FlightCfg::default_high_input_threshold")]
    pub high_input_threshold: f64,
    /// Inputs at or above this count as "chose fuel" for the choice judge.
    #[serde(default = "FlightCfg::default_choice_threshold")]
    pub choice_threshold: f64,
}

impl FlightCfg {
    const fn default_target_distance() -> f64 {
        constants::TARGET_DISTANCE
    }

    const fn default_starting_fuel() -> f64 {
        constants::STARTING_FUEL
    }

    const fn default_starting_hull() -> f64 {
        constants::STARTING_HULL
    }

    const fn default_high_input_threshold() -> f64 {
        constants::HIGH_INPUT_THRESHOLD
    }

    const fn default_choice_threshold() -> f64 {
        constants::CHOICE_FUEL_THRESHOLD
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("flight.target_distance", self.target_distance)?;
        ensure_range("flight.starting_fuel", self.starting_fuel, 1.0, constants::GAUGE_MAX)?;
        ensure_range("flight.starting_hull", self.starting_hull, 1.0, constants::GAUGE_MAX)?;
        ensure_range(
            "flight.high_input_threshold",
            self.high_input_threshold,
            constants::FUEL_INPUT_MIN,
            constants::FUEL_INPUT_MAX,
        )?;
        ensure_range(
            "flight.choice_threshold",
            self.choice_threshold,
            constants::FUEL_INPUT_MIN,
            constants::FUEL_INPUT_MAX,
        )
    }
}

impl Default for FlightCfg {
    fn default() -> Self {
        Self {
            target_distance: Self::default_target_distance(),
            starting_fuel: Self::default_starting_fuel(),
            starting_hull: Self::default_starting_hull(),
            high_input_threshold: Self::default_high_input_threshold(),
            choice_threshold: Self::default_choice_threshold(),
        }
    }
}

/// Minimum remaining fuel and hull required for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThreshold {
    pub tier: Tier,
    pub min_fuel: f64,
    pub min_hull: f64,
}

impl TierThreshold {
    #[must_use]
    pub const fn new(tier: Tier, (min_fuel, min_hull): (f64, f64)) -> Self {
        Self {
            tier,
            min_fuel,
            min_hull,
        }
    }
}

/// Grade table checked from best to worst; the first satisfied row wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCfg {
    #[serde(default = "TierCfg::default_table")]
    pub table: Vec<TierThreshold>,
}

impl TierCfg {
    fn default_table() -> Vec<TierThreshold> {
        vec![
            TierThreshold::new(Tier::S, constants::TIER_S),
            TierThreshold::new(Tier::A, constants::TIER_A),
            TierThreshold::new(Tier::B, constants::TIER_B),
            TierThreshold::new(Tier::C, constants::TIER_C),
            TierThreshold::new(Tier::D, constants::TIER_D),
        ]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (index, pair) in self.table.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            if next.tier.rank() >= prev.tier.rank()
                || next.min_fuel > prev.min_fuel
                || next.min_hull > prev.min_hull
            {
                return Err(ConfigError::TierOrder {
                    index: index + 1,
                    tier: next.tier,
                });
            }
        }
        for (index, row) in self.table.iter().enumerate() {
            if row.tier == Tier::F {
                return Err(ConfigError::TierOrder {
                    index,
                    tier: row.tier,
                });
            }
            ensure_range("tiers.min_fuel", row.min_fuel, 0.0, constants::GAUGE_MAX)?;
            ensure_range("tiers.min_hull", row.min_hull, 0.0, constants::GAUGE_MAX)?;
        }
        match self.table.last() {
            Some(last) if last.tier == Tier::D && last.min_fuel <= 0.0 && last.min_hull <= 0.0 => {
                Ok(())
            }
            _ => Err(ConfigError::TierFloorMissing),
        }
    }
}

impl Default for TierCfg {
    fn default() -> Self {
        Self {
            table: Self::default_table(),
        }
    }
}

/// Ratios and fuel totals used by the archetype rule chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeCfg {
    #[serde(default = "ArchetypeCfg::default_risk_taker_low_ratio")]
    pub risk_taker_low_ratio: f64,
    #[serde(default = "ArchetypeCfg::default_aggressive_high_ratio")]
    pub aggressive_high_ratio: f64,
    #[serde(default = "ArchetypeCfg::default_aggressive_min_fuel_used")]
    pub aggressive_min_fuel_used: f64,
    #[serde(default = "ArchetypeCfg::default_defensive_max_fuel_used")]
    pub defensive_max_fuel_used: f64,
    #[serde(default = "ArchetypeCfg::default_cautious_high_ratio")]
    pub cautious_high_ratio: f64,
    #[serde(default = "ArchetypeCfg::default_cautious_low_ratio")]
    pub cautious_low_ratio: f64,
}

impl ArchetypeCfg {
    const fn default_risk_taker_low_ratio() -> f64 {
        constants::RISK_TAKER_LOW_RATIO
    }

    const fn default_aggressive_high_ratio() -> f64 {
        constants::AGGRESSIVE_HIGH_RATIO
    }

    const fn default_aggressive_min_fuel_used() -> f64 {
        constants::AGGRESSIVE_MIN_FUEL_USED
    }

    const fn default_defensive_max_fuel_used() -> f64 {
        constants::DEFENSIVE_MAX_FUEL_USED
    }

    const fn default_cautious_high_ratio() -> f64 {
        constants::CAUTIOUS_HIGH_RATIO
    }

    const fn default_cautious_low_ratio() -> f64 {
        constants::CAUTIOUS_LOW_RATIO
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure_range("archetypes.risk_taker_low_ratio", self.risk_taker_low_ratio, 0.0, 1.0)?;
        ensure_range("archetypes.aggressive_high_ratio", self.aggressive_high_ratio, 0.0, 1.0)?;
        ensure_min(
            "archetypes.aggressive_min_fuel_used",
            self.aggressive_min_fuel_used,
            0.0,
        )?;
        ensure_min(
            "archetypes.defensive_max_fuel_used",
            self.defensive_max_fuel_used,
            0.0,
        )?;
        ensure_range("archetypes.cautious_high_ratio", self.cautious_high_ratio, 0.0, 1.0)?;
        ensure_range("archetypes.cautious_low_ratio", self.cautious_low_ratio, 0.0, 1.0)
    }
}

impl Default for ArchetypeCfg {
    fn default() -> Self {
        Self {
            risk_taker_low_ratio: Self::default_risk_taker_low_ratio(),
            aggressive_high_ratio: Self::default_aggressive_high_ratio(),
            aggressive_min_fuel_used: Self::default_aggressive_min_fuel_used(),
            defensive_max_fuel_used: Self::default_defensive_max_fuel_used(),
            cautious_high_ratio: Self::default_cautious_high_ratio(),
            cautious_low_ratio: Self::default_cautious_low_ratio(),
        }
    }
}

/// Correct-answer thresholds for the narrative endings (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndingCfg {
    #[serde(default = "EndingCfg::default_top_min")]
    pub top_min: u8,
    #[serde(default = "EndingCfg::default_second_min")]
    pub second_min: u8,
    #[serde(default = "EndingCfg::default_third_min")]
    pub third_min: u8,
}

impl EndingCfg {
    const fn default_top_min() -> u8 {
        constants::ENDING_TOP_MIN
    }

    const fn default_second_min() -> u8 {
        constants::ENDING_SECOND_MIN
    }

    const fn default_third_min() -> u8 {
        constants::ENDING_THIRD_MIN
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_min > self.second_min && self.second_min > self.third_min {
            Ok(())
        } else {
            Err(ConfigError::EndingOrder {
                top: self.top_min,
                second: self.second_min,
                third: self.third_min,
            })
        }
    }
}

impl Default for EndingCfg {
    fn default() -> Self {
        Self {
            top_min: Self::default_top_min(),
            second_min: Self::default_second_min(),
            third_min: Self::default_third_min(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        EngineConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn partial_overlay_keeps_other_defaults() {
        let cfg = EngineConfig::from_json(
            r#"{ "events": { "bear_trap_durability_threshold": 2.5 }, "rounds": { "total_rounds": 4 } }"#,
        )
        .expect("overlay parses");
        assert!((cfg.events.bear_trap_durability_threshold - 2.5).abs() < f64::EPSILON);
        assert_eq!(cfg.rounds.total_rounds, 4);
        assert_eq!(cfg.physics, PhysicsCfg::default());
        assert_eq!(cfg.tiers.table.len(), 5);
    }

    #[test]
    fn inverted_fuel_bounds_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.events.fuel_modifier_min = 3.0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::BoundsInverted {
                field: "events.fuel_modifier",
                min: 3.0,
                max: 2.0,
            })
        );
    }

    #[test]
    fn zero_reference_efficiency_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.physics.reference_efficiency = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MinViolation {
                field: "physics.reference_efficiency",
                ..
            })
        ));
    }

    #[test]
    fn tier_table_must_descend_and_end_at_d() {
        let mut cfg = EngineConfig::default();
        cfg.tiers.table.swap(0, 1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TierOrder { index: 1, .. })
        ));

        let mut cfg = EngineConfig::default();
        cfg.tiers.table.pop();
        assert_eq!(cfg.validate(), Err(ConfigError::TierFloorMissing));
    }

    #[test]
    fn ending_thresholds_must_strictly_descend() {
        let mut cfg = EngineConfig::default();
        cfg.endings.second_min = cfg.endings.third_min;
        assert!(matches!(cfg.validate(), Err(ConfigError::EndingOrder { .. })));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.rounds.total_rounds = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::NoRounds));
    }
}
