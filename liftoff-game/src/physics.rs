//! Continuous-tick flight physics.
//!
//! Pure per-tick deltas. Clamping the session gauges after applying them is
//! the caller's job (see [`crate::session::FlightSession::apply_deltas`]).
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::constants::FUEL_INPUT_MAX;
use crate::error::{EngineError, ensure_finite, ensure_fuel_input};
use crate::profile::RocketProfile;
use crate::stability::{StabilityZone, classify_zone};

/// Deltas produced by a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub zone: StabilityZone,
    pub fuel_consumed: f64,
    /// Signed; unstable ticks always set the rocket back.
    pub distance_change: f64,
    pub hull_damage: f64,
}

/// Fuel burned for the given input; higher efficiency burns strictly less.
#[must_use]
pub fn fuel_consumption(fuel_input: f64, profile: &RocketProfile, cfg: &EngineConfig) -> f64 {
    let physics = &cfg.physics;
    physics.base_consumption_rate
        * (fuel_input / FUEL_INPUT_MAX)
        * (physics.reference_efficiency / profile.efficiency_stat)
        * physics.consumption_scale
}

#[must_use]
pub fn distance_change(
    fuel_input: f64,
    change_rate: f64,
    zone: StabilityZone,
    profile: &RocketProfile,
    cfg: &EngineConfig,
) -> f64 {
    let physics = &cfg.physics;
    let input = fuel_input / FUEL_INPUT_MAX;
    match zone {
        StabilityZone::Stable => {
            change_rate.abs()
                * input
                * physics.distance_multiplier
                * (physics.reference_acceleration / profile.acceleration_stat)
        }
        StabilityZone::Unstable => -(change_rate.abs() * input * physics.unstable_setback_ratio),
    }
}

#[must_use]
pub fn hull_damage(
    fuel_input: f64,
    change_rate: f64,
    zone: StabilityZone,
    profile: &RocketProfile,
    cfg: &EngineConfig,
) -> f64 {
    let physics = &cfg.physics;
    if zone.is_stable() || fuel_input < physics.defensive_input_floor {
        return 0.0;
    }
    physics.hull_damage_base * (fuel_input / FUEL_INPUT_MAX) * change_rate.abs() / 10.0
        * profile.durability_stat
}

/// Compute one tick's fuel, distance and hull deltas.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for an out-of-range fuel input, a
/// non-finite change rate, or a non-positive rocket stat.
pub fn tick_physics(
    fuel_input: f64,
    change_rate: f64,
    profile: &RocketProfile,
    cfg: &EngineConfig,
) -> Result<TickOutcome, EngineError> {
    let fuel_input = ensure_fuel_input(fuel_input)?;
    let change_rate = ensure_finite("change_rate", change_rate)?;
    profile.validate()?;

    let zone = classify_zone(change_rate, &cfg.stability);
    Ok(TickOutcome {
        zone,
        fuel_consumed: fuel_consumption(fuel_input, profile, cfg),
        distance_change: distance_change(fuel_input, change_rate, zone, profile, cfg),
        hull_damage: hull_damage(fuel_input, change_rate, zone, profile, cfg),
    })
}
