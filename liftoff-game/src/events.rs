//! Event definitions and the modifier resolver.
//!
//! Each [`EventDefinition`] is resolved against one rocket into an
//! [`EventResolution`]: a thrust multiplier, a fuel modifier, a hull damage
//! modifier and an outcome polarity. Twists invert what the headline implies.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EventCfg;
use crate::constants::LOG_TARGET_EVENTS;
use crate::error::{EngineError, ensure_finite};
use crate::profile::{RocketId, RocketProfile};

/// Market-wide scenario applied to every rocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalType {
    BearTrap,
    BullRun,
    BubbleBurst,
    Neutral,
}

/// Rocket stat an event scales with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AffectedStat {
    /// Acceleration.
    Boost,
    /// Durability.
    Armor,
    /// Efficiency.
    FuelEco,
}

/// Direction a twist flips the apparent news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TwistType {
    #[default]
    None,
    /// Bad-sounding news that actually helps.
    Positive,
    /// Good-sounding news that actually hurts.
    Negative,
}

/// Externally supplied event for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    #[serde(default)]
    pub id: String,
    /// Briefing text shown during the news phase.
    #[serde(default)]
    pub headline: String,
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_rocket_id: Option<RocketId>,
    #[serde(default = "EventDefinition::default_thrust_mod")]
    pub thrust_mod: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_type: Option<GlobalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_stat: Option<AffectedStat>,
    #[serde(default)]
    pub stat_multiplier: f64,
    #[serde(default)]
    pub is_twist: bool,
    #[serde(default)]
    pub twist_type: TwistType,
}

impl EventDefinition {
    const fn default_thrust_mod() -> f64 {
        1.0
    }

    /// Global event of the given scenario type.
    #[must_use]
    pub fn global(global_type: GlobalType, thrust_mod: f64, stat_multiplier: f64) -> Self {
        Self {
            id: String::new(),
            headline: String::new(),
            is_global: true,
            target_rocket_id: None,
            thrust_mod,
            global_type: Some(global_type),
            affected_stat: None,
            stat_multiplier,
            is_twist: false,
            twist_type: TwistType::None,
        }
    }

    /// Rocket-specific event scaling with `affected_stat`.
    #[must_use]
    pub fn specific(
        target: Option<RocketId>,
        affected_stat: Option<AffectedStat>,
        thrust_mod: f64,
        stat_multiplier: f64,
    ) -> Self {
        Self {
            id: String::new(),
            headline: String::new(),
            is_global: false,
            target_rocket_id: target,
            thrust_mod,
            global_type: None,
            affected_stat,
            stat_multiplier,
            is_twist: false,
            twist_type: TwistType::None,
        }
    }

    #[must_use]
    pub fn with_twist(mut self, twist_type: TwistType) -> Self {
        self.is_twist = !matches!(twist_type, TwistType::None);
        self.twist_type = twist_type;
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>, headline: impl Into<String>) -> Self {
        self.id = id.into();
        self.headline = headline.into();
        self
    }

    /// Twist direction that actually applies; a twist type without the twist flag is ignored.
    #[must_use]
    pub const fn effective_twist(&self) -> TwistType {
        if self.is_twist {
            self.twist_type
        } else {
            TwistType::None
        }
    }

    /// True when this event skips `rocket_id`.
    #[must_use]
    pub fn misses(&self, rocket_id: &RocketId) -> bool {
        !self.is_global
            && self
                .target_rocket_id
                .as_ref()
                .is_some_and(|target| target != rocket_id)
    }

    /// Reject non-finite modifiers before they reach the arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] naming the bad field.
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_finite("thrust_mod", self.thrust_mod)?;
        ensure_finite("stat_multiplier", self.stat_multiplier)?;
        Ok(())
    }
}

/// Which rule of the resolver produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionBranch {
    Untargeted,
    BearTrapReward,
    BearTrapPenalty,
    BullRun,
    BubbleBurst,
    GlobalPassThrough,
    TwistPositive,
    TwistNegative,
    Direct,
}

impl fmt::Display for ResolutionBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Untargeted => "untargeted",
            Self::BearTrapReward => "bear_trap_reward",
            Self::BearTrapPenalty => "bear_trap_penalty",
            Self::BullRun => "bull_run",
            Self::BubbleBurst => "bubble_burst",
            Self::GlobalPassThrough => "global_pass_through",
            Self::TwistPositive => "twist_positive",
            Self::TwistNegative => "twist_negative",
            Self::Direct => "direct",
        };
        f.write_str(label)
    }
}

/// Composite outcome of one event for one rocket. Never cached across rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResolution {
    pub thrust_multiplier: f64,
    pub fuel_modifier: f64,
    pub hull_damage_modifier: f64,
    pub is_positive_outcome: bool,
    pub branch: ResolutionBranch,
    /// Advisory rationale for the briefing screen.
    pub description: String,
}

impl EventResolution {
    /// The `{1, 1, 1, positive}` result of an event that does not touch this rocket.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            thrust_multiplier: 1.0,
            fuel_modifier: 1.0,
            hull_damage_modifier: 1.0,
            is_positive_outcome: true,
            branch: ResolutionBranch::Untargeted,
            description: String::from("Event targets another rocket; no effect."),
        }
    }

    fn clamped(mut self, cfg: &EventCfg) -> Self {
        self.thrust_multiplier = self.thrust_multiplier.max(cfg.thrust_floor);
        self.fuel_modifier = self
            .fuel_modifier
            .clamp(cfg.fuel_modifier_min, cfg.fuel_modifier_max);
        self.hull_damage_modifier = self.hull_damage_modifier.max(0.0);
        self
    }
}

struct Draft {
    thrust: f64,
    fuel: f64,
    hull: f64,
    positive: bool,
    branch: ResolutionBranch,
    description: String,
}

impl Draft {
    fn new(thrust: f64, positive: bool, branch: ResolutionBranch, description: String) -> Self {
        Self {
            thrust,
            fuel: 1.0,
            hull: 1.0,
            positive,
            branch,
            description,
        }
    }

    fn finish(self, cfg: &EventCfg) -> EventResolution {
        EventResolution {
            thrust_multiplier: self.thrust,
            fuel_modifier: self.fuel,
            hull_damage_modifier: self.hull,
            is_positive_outcome: self.positive,
            branch: self.branch,
            description: self.description,
        }
        .clamped(cfg)
    }
}

/// Resolve one event against one rocket.
///
/// Rules are checked in order and the first match wins: targeting guard,
/// global scenario dispatch, then twist dispatch for rocket-specific events.
/// The final clamp applies to every branch.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when the profile has a non-positive
/// stat or the event carries non-finite modifiers.
pub fn resolve_event(
    event: &EventDefinition,
    profile: &RocketProfile,
    rocket_id: &RocketId,
    cfg: &EventCfg,
) -> Result<EventResolution, EngineError> {
    profile.validate()?;
    event.validate()?;

    if event.misses(rocket_id) {
        log::debug!(
            target: LOG_TARGET_EVENTS,
            "event '{}' skips rocket {rocket_id}",
            event.id
        );
        return Ok(EventResolution::neutral());
    }

    let draft = if event.is_global {
        resolve_global(event, profile, cfg)
    } else {
        resolve_specific(event, profile, cfg)
    };
    let resolution = draft.finish(cfg);
    log::debug!(
        target: LOG_TARGET_EVENTS,
        "event '{}' -> {} thrust {:.3} fuel {:.3} hull {:.3} positive {}",
        event.id,
        resolution.branch,
        resolution.thrust_multiplier,
        resolution.fuel_modifier,
        resolution.hull_damage_modifier,
        resolution.is_positive_outcome
    );
    Ok(resolution)
}

fn resolve_global(event: &EventDefinition, profile: &RocketProfile, cfg: &EventCfg) -> Draft {
    let thrust_mod = event.thrust_mod;
    match event.global_type {
        Some(GlobalType::BearTrap) => {
            let durability = profile.durability_stat;
            if durability >= cfg.bear_trap_durability_threshold {
                let thrust = thrust_mod + durability * event.stat_multiplier;
                Draft::new(
                    thrust,
                    true,
                    ResolutionBranch::BearTrapReward,
                    format!(
                        "Bear trap sprung, but durability {durability:.1} rides it out: thrust {thrust:.2}."
                    ),
                )
            } else {
                let mut draft = Draft::new(
                    thrust_mod * cfg.bear_trap_penalty_thrust,
                    false,
                    ResolutionBranch::BearTrapPenalty,
                    format!(
                        "Bear trap caught a light hull (durability {durability:.1}): thrust halved, hull exposed."
                    ),
                );
                draft.hull = cfg.bear_trap_hull_penalty;
                draft
            }
        }
        Some(GlobalType::BullRun) => {
            let thrust = thrust_mod + profile.acceleration_stat * event.stat_multiplier;
            let mut draft = Draft::new(
                thrust,
                true,
                ResolutionBranch::BullRun,
                format!("Bull run tailwind: thrust {thrust:.2} with reduced burn."),
            );
            draft.fuel = cfg.bull_run_fuel_modifier;
            draft
        }
        Some(GlobalType::BubbleBurst) => {
            let thrust = (thrust_mod - profile.acceleration_stat * event.stat_multiplier.abs())
                .max(cfg.thrust_floor);
            Draft::new(
                thrust,
                false,
                ResolutionBranch::BubbleBurst,
                format!(
                    "Bubble burst: overextended acceleration {:.1} drags thrust to {thrust:.2}.",
                    profile.acceleration_stat
                ),
            )
        }
        Some(GlobalType::Neutral) | None => Draft::new(
            thrust_mod,
            thrust_mod >= cfg.positive_thrust_line,
            ResolutionBranch::GlobalPassThrough,
            format!("Markets drift: thrust holds at {thrust_mod:.2}."),
        ),
    }
}

fn resolve_specific(event: &EventDefinition, profile: &RocketProfile, cfg: &EventCfg) -> Draft {
    let thrust_mod = event.thrust_mod;
    let multiplier = event.stat_multiplier;
    let stat_value = profile.stat(event.affected_stat);

    let mut draft = match event.effective_twist() {
        TwistType::Positive => {
            let thrust = thrust_mod + stat_value * multiplier.abs();
            Draft::new(
                thrust,
                true,
                ResolutionBranch::TwistPositive,
                format!("Twist! The scary headline was a setup: thrust {thrust:.2}."),
            )
        }
        TwistType::Negative => {
            let thrust = (thrust_mod - stat_value * multiplier.abs()).max(cfg.thrust_floor);
            Draft::new(
                thrust,
                false,
                ResolutionBranch::TwistNegative,
                format!("Twist! The good news was a trap: thrust {thrust:.2}."),
            )
        }
        TwistType::None => {
            let thrust = thrust_mod + stat_value * multiplier;
            Draft::new(
                thrust,
                thrust >= cfg.positive_thrust_line,
                ResolutionBranch::Direct,
                format!("Direct hit on this rocket: thrust {thrust:.2}."),
            )
        }
    };

    if event.affected_stat == Some(AffectedStat::FuelEco) {
        let shift = stat_value * multiplier.abs() * cfg.fuel_eco_scale;
        draft.fuel *= if multiplier > 0.0 {
            1.0 - shift
        } else {
            1.0 + shift
        };
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    fn rocket() -> RocketId {
        RocketId::new("falcon")
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < FLOAT_EPSILON
    }

    #[test]
    fn bear_trap_rewards_durable_rockets() {
        let event = EventDefinition::global(GlobalType::BearTrap, 1.0, 0.2);
        let profile = RocketProfile::new(1.0, 2.0, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert!(result.is_positive_outcome);
        assert!(close(result.thrust_multiplier, 1.4));
        assert_eq!(result.branch, ResolutionBranch::BearTrapReward);
    }

    #[test]
    fn bear_trap_penalises_fragile_rockets() {
        let event = EventDefinition::global(GlobalType::BearTrap, 1.0, 0.2);
        let profile = RocketProfile::new(1.0, 1.0, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert!(!result.is_positive_outcome);
        assert!(close(result.thrust_multiplier, 0.5));
        assert!(close(result.hull_damage_modifier, 1.5));
    }

    #[test]
    fn bear_trap_threshold_is_inclusive_and_configurable() {
        let event = EventDefinition::global(GlobalType::BearTrap, 1.0, 0.2);
        let profile = RocketProfile::new(1.0, 1.5, 1.0);
        let cfg = EventCfg::default();
        assert!(resolve_event(&event, &profile, &rocket(), &cfg).unwrap().is_positive_outcome);

        let strict = EventCfg {
            bear_trap_durability_threshold: 1.6,
            ..EventCfg::default()
        };
        assert!(!resolve_event(&event, &profile, &rocket(), &strict).unwrap().is_positive_outcome);
    }

    #[test]
    fn bull_run_boosts_and_saves_fuel() {
        let event = EventDefinition::global(GlobalType::BullRun, 1.1, 0.25);
        let profile = RocketProfile::new(2.0, 1.0, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert!(result.is_positive_outcome);
        assert!(close(result.thrust_multiplier, 1.6));
        assert!(close(result.fuel_modifier, 0.8));
    }

    #[test]
    fn bubble_burst_hits_strong_acceleration_harder() {
        let event = EventDefinition::global(GlobalType::BubbleBurst, 1.0, -0.3);
        let cfg = EventCfg::default();
        let light = resolve_event(&event, &RocketProfile::new(1.0, 1.0, 1.0), &rocket(), &cfg)
            .unwrap();
        let heavy = resolve_event(&event, &RocketProfile::new(3.0, 1.0, 1.0), &rocket(), &cfg)
            .unwrap();
        assert!(!light.is_positive_outcome);
        assert!(close(light.thrust_multiplier, 0.7));
        assert!(close(heavy.thrust_multiplier, 0.1));
    }

    #[test]
    fn neutral_global_passes_thrust_through() {
        let cfg = EventCfg::default();
        let calm = EventDefinition::global(GlobalType::Neutral, 1.0, 5.0);
        let result = resolve_event(&calm, &RocketProfile::default(), &rocket(), &cfg).unwrap();
        assert!(close(result.thrust_multiplier, 1.0));
        assert!(result.is_positive_outcome);

        let mut untyped = EventDefinition::global(GlobalType::Neutral, 0.9, 0.0);
        untyped.global_type = None;
        let result = resolve_event(&untyped, &RocketProfile::default(), &rocket(), &cfg).unwrap();
        assert!(close(result.thrust_multiplier, 0.9));
        assert!(!result.is_positive_outcome);
    }

    #[test]
    fn targeting_guard_returns_neutral_for_other_rockets() {
        let event = EventDefinition::specific(
            Some(RocketId::new("other")),
            Some(AffectedStat::Boost),
            0.2,
            -5.0,
        )
        .with_twist(TwistType::Negative);
        let result =
            resolve_event(&event, &RocketProfile::default(), &rocket(), &EventCfg::default())
                .unwrap();
        assert_eq!(result, EventResolution::neutral());
    }

    #[test]
    fn untargeted_specific_event_applies_to_everyone() {
        let event = EventDefinition::specific(None, Some(AffectedStat::Armor), 1.0, 0.5);
        let profile = RocketProfile::new(1.0, 2.0, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert_eq!(result.branch, ResolutionBranch::Direct);
        assert!(close(result.thrust_multiplier, 2.0));
    }

    #[test]
    fn negative_twist_inverts_good_news() {
        let event = EventDefinition::specific(
            Some(rocket()),
            Some(AffectedStat::Boost),
            1.2,
            0.3,
        )
        .with_twist(TwistType::Negative);
        let profile = RocketProfile::new(2.0, 1.0, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert!(close(result.thrust_multiplier, 0.6));
        assert!(!result.is_positive_outcome);
    }

    #[test]
    fn positive_twist_inverts_bad_news() {
        let event =
            EventDefinition::specific(None, Some(AffectedStat::Armor), 0.6, -0.4)
                .with_twist(TwistType::Positive);
        let profile = RocketProfile::new(1.0, 1.5, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert!(close(result.thrust_multiplier, 1.2));
        assert!(result.is_positive_outcome);
    }

    #[test]
    fn twist_type_without_flag_resolves_directly() {
        let mut event = EventDefinition::specific(None, Some(AffectedStat::Boost), 1.2, 0.3);
        event.twist_type = TwistType::Negative;
        let profile = RocketProfile::new(2.0, 1.0, 1.0);
        let result = resolve_event(&event, &profile, &rocket(), &EventCfg::default()).unwrap();
        assert_eq!(result.branch, ResolutionBranch::Direct);
        assert!(close(result.thrust_multiplier, 1.8));
    }

    #[test]
    fn direct_polarity_follows_thrust_line() {
        let cfg = EventCfg::default();
        let profile = RocketProfile::new(1.0, 1.0, 1.0);
        let weak = EventDefinition::specific(None, Some(AffectedStat::Boost), 0.8, 0.1);
        assert!(!resolve_event(&weak, &profile, &rocket(), &cfg).unwrap().is_positive_outcome);
        let even = EventDefinition::specific(None, Some(AffectedStat::Boost), 0.9, 0.1);
        let result = resolve_event(&even, &profile, &rocket(), &cfg).unwrap();
        assert!(result.thrust_multiplier >= 0.999_999);
    }

    #[test]
    fn fuel_eco_adjusts_burn_both_ways() {
        let cfg = EventCfg::default();
        let profile = RocketProfile::new(1.0, 1.0, 2.0);
        let gain = EventDefinition::specific(None, Some(AffectedStat::FuelEco), 1.0, 1.5);
        let result = resolve_event(&gain, &profile, &rocket(), &cfg).unwrap();
        assert!(close(result.fuel_modifier, 0.7));

        let loss = EventDefinition::specific(None, Some(AffectedStat::FuelEco), 1.0, -1.5);
        let result = resolve_event(&loss, &profile, &rocket(), &cfg).unwrap();
        assert!(close(result.fuel_modifier, 1.3));
    }

    #[test]
    fn clamps_hold_for_extreme_modifiers() {
        let cfg = EventCfg::default();
        let profile = RocketProfile::new(5.0, 5.0, 9.0);
        let crater = EventDefinition::specific(None, Some(AffectedStat::FuelEco), 1.0, 30.0)
            .with_twist(TwistType::Negative);
        let result = resolve_event(&crater, &profile, &rocket(), &cfg).unwrap();
        assert!(close(result.thrust_multiplier, 0.1));
        assert!(close(result.fuel_modifier, 0.5));

        let guzzle = EventDefinition::specific(None, Some(AffectedStat::FuelEco), 1.0, -30.0);
        let result = resolve_event(&guzzle, &profile, &rocket(), &cfg).unwrap();
        assert!(close(result.fuel_modifier, 2.0));
    }

    #[test]
    fn invalid_profile_or_event_is_rejected() {
        let cfg = EventCfg::default();
        let event = EventDefinition::global(GlobalType::BullRun, 1.0, 0.1);
        assert!(resolve_event(&event, &RocketProfile::new(0.0, 1.0, 1.0), &rocket(), &cfg).is_err());
        let bad = EventDefinition::global(GlobalType::BullRun, f64::NAN, 0.1);
        assert!(resolve_event(&bad, &RocketProfile::default(), &rocket(), &cfg).is_err());
    }

    #[test]
    fn definitions_parse_from_wire_names() {
        let json = r#"{
            "isGlobal": false,
            "targetRocketId": "falcon",
            "thrustMod": 1.2,
            "affectedStat": "fuelEco",
            "statMultiplier": 0.3,
            "isTwist": true,
            "twistType": "NEGATIVE"
        }"#;
        let event: EventDefinition = serde_json::from_str(json).expect("event parses");
        assert_eq!(event.affected_stat, Some(AffectedStat::FuelEco));
        assert_eq!(event.effective_twist(), TwistType::Negative);
        assert_eq!(event.target_rocket_id, Some(rocket()));

        let global: EventDefinition =
            serde_json::from_str(r#"{ "isGlobal": true, "globalType": "BEAR_TRAP" }"#)
                .expect("global parses");
        assert_eq!(global.global_type, Some(GlobalType::BearTrap));
        assert!(close(global.thrust_mod, 1.0));

        let unknown = serde_json::from_str::<EventDefinition>(
            r#"{ "isGlobal": true, "globalType": "MOON_SHOT" }"#,
        );
        assert!(unknown.is_err());
    }
}
