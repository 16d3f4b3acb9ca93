//! Default balance and tuning values for the Liftoff flight engine.
//!
//! These are only the defaults that seed [`crate::config::EngineConfig`].
//! The engine never reads them directly once a configuration value has been
//! constructed, so tests and hosts can vary any of them per engine instance.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_EVENTS: &str = "liftoff::events";
pub(crate) const LOG_TARGET_ROUND: &str = "liftoff::round";
pub(crate) const LOG_TARGET_FLIGHT: &str = "liftoff::flight";

// Input scale --------------------------------------------------------------
pub(crate) const FUEL_INPUT_MIN: f64 = 0.0;
pub(crate) const FUEL_INPUT_MAX: f64 = 100.0;
pub(crate) const GAUGE_MAX: f64 = 100.0;

// Stability ----------------------------------------------------------------
pub(crate) const STABILITY_THRESHOLD: f64 = 0.0;

// Continuous-tick physics --------------------------------------------------
pub(crate) const BASE_CONSUMPTION_RATE: f64 = 1.0;
pub(crate) const REFERENCE_EFFICIENCY: f64 = 1.0;
pub(crate) const CONSUMPTION_SCALE: f64 = 10.0;
pub(crate) const DISTANCE_MULTIPLIER: f64 = 10.0;
pub(crate) const REFERENCE_ACCELERATION: f64 = 1.0;
pub(crate) const HULL_DAMAGE_BASE: f64 = 5.0;
pub(crate) const DEFENSIVE_INPUT_FLOOR: f64 = 20.0;
pub(crate) const UNSTABLE_SETBACK_RATIO: f64 = 0.5;

// Event modifiers ----------------------------------------------------------
pub(crate) const BEAR_TRAP_DURABILITY_THRESHOLD: f64 = 1.5;
pub(crate) const BEAR_TRAP_PENALTY_THRUST: f64 = 0.5;
pub(crate) const BEAR_TRAP_HULL_PENALTY: f64 = 1.5;
pub(crate) const BULL_RUN_FUEL_MODIFIER: f64 = 0.8;
pub(crate) const FUEL_ECO_SCALE: f64 = 0.1;
pub(crate) const THRUST_FLOOR: f64 = 0.1;
pub(crate) const FUEL_MODIFIER_MIN: f64 = 0.5;
pub(crate) const FUEL_MODIFIER_MAX: f64 = 2.0;
pub(crate) const POSITIVE_THRUST_LINE: f64 = 1.0;

// Round mode ---------------------------------------------------------------
pub(crate) const TOTAL_ROUNDS: u8 = 6;
pub(crate) const ROUND_FUEL_BURN: f64 = 15.0;
pub(crate) const ROUND_DISTANCE: f64 = 200.0;
pub(crate) const ROUND_HULL_WEAR: f64 = 5.0;

// Flight -------------------------------------------------------------------
pub(crate) const TARGET_DISTANCE: f64 = 1_000.0;
pub(crate) const STARTING_FUEL: f64 = 100.0;
pub(crate) const STARTING_HULL: f64 = 100.0;
pub(crate) const HIGH_INPUT_THRESHOLD: f64 = 50.0;
pub(crate) const CHOICE_FUEL_THRESHOLD: f64 = 50.0;

// Tier table: (min fuel, min hull) per grade, S through D ------------------
pub(crate) const TIER_S: (f64, f64) = (80.0, 80.0);
pub(crate) const TIER_A: (f64, f64) = (60.0, 60.0);
pub(crate) const TIER_B: (f64, f64) = (40.0, 40.0);
pub(crate) const TIER_C: (f64, f64) = (20.0, 20.0);
pub(crate) const TIER_D: (f64, f64) = (0.0, 0.0);

// Archetype rules ----------------------------------------------------------
pub(crate) const RISK_TAKER_LOW_RATIO: f64 = 0.4;
pub(crate) const AGGRESSIVE_HIGH_RATIO: f64 = 0.7;
pub(crate) const AGGRESSIVE_MIN_FUEL_USED: f64 = 50.0;
pub(crate) const DEFENSIVE_MAX_FUEL_USED: f64 = 30.0;
pub(crate) const CAUTIOUS_HIGH_RATIO: f64 = 0.6;
pub(crate) const CAUTIOUS_LOW_RATIO: f64 = 0.2;

// Ending thresholds (correct answers, inclusive lower bounds) --------------
pub(crate) const ENDING_TOP_MIN: u8 = 6;
pub(crate) const ENDING_SECOND_MIN: u8 = 4;
pub(crate) const ENDING_THIRD_MIN: u8 = 2;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
