//! Round orchestration and continuous tick sync.
//!
//! Both entry points take the current session by reference and hand back an
//! updated copy together with a result record. Every check runs before the
//! copy is touched, so a rejected call never leaves a half-applied session.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::choice::{ChoiceResult, judge_choice_with};
use crate::classify::{EndingDescriptor, final_ending};
use crate::config::EngineConfig;
use crate::constants::{FUEL_INPUT_MAX, LOG_TARGET_FLIGHT, LOG_TARGET_ROUND};
use crate::error::{EngineError, ensure_fuel_input};
use crate::events::{EventDefinition, EventResolution, resolve_event};
use crate::physics::{TickOutcome, tick_physics};
use crate::profile::{RocketId, RocketProfile};
use crate::session::{FlightMode, FlightSession, FlightStatus, RoundPhase};
use crate::stability::resolve_stability;

/// Resolutions for a single round; rounds rarely carry more than a handful of events.
pub type ResolutionSet = SmallVec<[EventResolution; 4]>;

/// Product of every event's multipliers plus the AND of their polarities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComposedModifiers {
    pub thrust_multiplier: f64,
    pub fuel_modifier: f64,
    pub hull_damage_modifier: f64,
    pub overall_positive: bool,
    pub event_count: usize,
}

impl Default for ComposedModifiers {
    fn default() -> Self {
        Self {
            thrust_multiplier: 1.0,
            fuel_modifier: 1.0,
            hull_damage_modifier: 1.0,
            overall_positive: true,
            event_count: 0,
        }
    }
}

impl ComposedModifiers {
    #[must_use]
    fn absorb(self, resolution: &EventResolution) -> Self {
        Self {
            thrust_multiplier: self.thrust_multiplier * resolution.thrust_multiplier,
            fuel_modifier: self.fuel_modifier * resolution.fuel_modifier,
            hull_damage_modifier: self.hull_damage_modifier * resolution.hull_damage_modifier,
            // non-short-circuiting: every event is folded in
            overall_positive: self.overall_positive & resolution.is_positive_outcome,
            event_count: self.event_count + 1,
        }
    }
}

/// Fold simultaneous resolutions into one set of round modifiers.
#[must_use]
pub fn compose(resolutions: &[EventResolution]) -> ComposedModifiers {
    resolutions
        .iter()
        .fold(ComposedModifiers::default(), ComposedModifiers::absorb)
}

/// Resolve every event of a round against one rocket, in order.
///
/// # Errors
///
/// Returns the first [`EngineError::Validation`] raised by an event or the profile.
pub fn resolve_events(
    events: &[EventDefinition],
    profile: &RocketProfile,
    rocket_id: &RocketId,
    cfg: &EngineConfig,
) -> Result<ResolutionSet, EngineError> {
    events
        .iter()
        .map(|event| resolve_event(event, profile, rocket_id, &cfg.events))
        .collect()
}

/// Persisted trace of one resolved round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u8,
    pub fuel_input: f64,
    pub overall_positive: bool,
    pub user_chose_fuel: bool,
    pub is_correct_choice: bool,
    pub thrust_multiplier: f64,
    pub fuel_modifier: f64,
    pub hull_damage_modifier: f64,
    pub fuel_burned: f64,
    pub distance_gained: f64,
    pub hull_damage: f64,
}

/// Outcome of [`resolve_round`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u8,
    pub resolutions: ResolutionSet,
    pub modifiers: ComposedModifiers,
    pub choice: ChoiceResult,
    pub fuel_burned: f64,
    pub distance_gained: f64,
    pub hull_damage: f64,
    pub status: FlightStatus,
    /// Round the flight moves on to, if it continues.
    pub next_round: Option<u8>,
    #[serde(skip_deserializing)]
    pub ending: Option<EndingDescriptor>,
}

/// Move a rounds-mode flight from the briefing to the decision phase.
///
/// # Errors
///
/// Returns [`EngineError::Conflict`] for a terminal or continuous flight or
/// when the round is not in its briefing phase.
pub fn view_briefing(session: &FlightSession) -> Result<FlightSession, EngineError> {
    session.ensure_in_progress()?;
    session.ensure_mode(FlightMode::Rounds)?;
    session.ensure_phase(RoundPhase::News)?;

    let mut next = session.clone();
    next.round_phase = RoundPhase::Playing;
    next.bump_version();
    log::debug!(
        target: LOG_TARGET_ROUND,
        "flight {} briefed for round {}",
        next.id,
        next.current_round
    );
    Ok(next)
}

/// Resolve the current round of a rounds-mode flight.
///
/// Events are resolved one by one, folded into a single set of modifiers,
/// and applied to the round's baseline burn, distance and wear. The choice is
/// judged against the composed polarity before termination is evaluated.
///
/// # Errors
///
/// Returns [`EngineError::Conflict`] when the flight is finished, in another
/// mode, on another round or not in its decision phase, and
/// [`EngineError::Validation`] for a bad fuel input, profile or event.
pub fn resolve_round(
    session: &FlightSession,
    round: u8,
    events: &[EventDefinition],
    profile: &RocketProfile,
    fuel_input: f64,
    cfg: &EngineConfig,
) -> Result<(FlightSession, RoundResult), EngineError> {
    session.ensure_in_progress()?;
    session.ensure_mode(FlightMode::Rounds)?;
    session.ensure_round(round)?;
    session.ensure_phase(RoundPhase::Playing)?;
    let fuel_input = ensure_fuel_input(fuel_input)?;

    let resolutions = resolve_events(events, profile, &session.rocket_id, cfg)?;
    let modifiers = compose(&resolutions);
    let choice = judge_choice_with(fuel_input, modifiers.overall_positive, &cfg.flight)?;

    let input = fuel_input / FUEL_INPUT_MAX;
    let fuel_burned = input * cfg.rounds.fuel_burn * modifiers.fuel_modifier;
    let distance_gained = input * cfg.rounds.distance * modifiers.thrust_multiplier;
    let hull_damage = input * cfg.rounds.hull_wear * modifiers.hull_damage_modifier;

    let mut next = session.clone();
    next.apply_deltas(fuel_burned, distance_gained, hull_damage);
    if fuel_input >= cfg.flight.high_input_threshold {
        next.record_high_input(modifiers.overall_positive);
    }
    if choice.is_correct_choice {
        next.correct_answers = next.correct_answers.saturating_add(1);
    }
    next.rounds.push(RoundRecord {
        round,
        fuel_input,
        overall_positive: modifiers.overall_positive,
        user_chose_fuel: choice.user_chose_fuel,
        is_correct_choice: choice.is_correct_choice,
        thrust_multiplier: modifiers.thrust_multiplier,
        fuel_modifier: modifiers.fuel_modifier,
        hull_damage_modifier: modifiers.hull_damage_modifier,
        fuel_burned,
        distance_gained,
        hull_damage,
    });

    log::debug!(
        target: LOG_TARGET_ROUND,
        "flight {} round {round}: {} events, thrust {:.3}, fuel x{:.3}, positive {}, correct {}",
        next.id,
        modifiers.event_count,
        modifiers.thrust_multiplier,
        modifiers.fuel_modifier,
        modifiers.overall_positive,
        choice.is_correct_choice
    );

    let mut ending = None;
    let mut next_round = None;
    if next.is_exhausted() {
        next.status = FlightStatus::Failed;
        next.round_phase = RoundPhase::Result;
    } else if next.is_final_round() {
        let descriptor = final_ending(next.correct_answers, &cfg.endings);
        next.status = FlightStatus::Completed;
        next.round_phase = RoundPhase::Result;
        next.final_ending = Some(descriptor.ending);
        ending = Some(descriptor);
    } else {
        next.current_round += 1;
        next.round_phase = RoundPhase::News;
        next_round = Some(next.current_round);
    }
    next.bump_version();

    if next.is_terminal() {
        log::info!(
            target: LOG_TARGET_FLIGHT,
            "flight {} {} after round {round} with {} correct",
            next.id,
            next.status,
            next.correct_answers
        );
    }

    let result = RoundResult {
        round,
        resolutions,
        modifiers,
        choice,
        fuel_burned,
        distance_gained,
        hull_damage,
        status: next.status,
        next_round,
        ending,
    };
    Ok((next, result))
}

/// Outcome of [`sync_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub tick: u32,
    pub change_rate: f64,
    pub outcome: TickOutcome,
    pub status: FlightStatus,
}

/// Apply one continuous-mode tick driven by two consecutive signal values.
///
/// # Errors
///
/// Returns [`EngineError::Conflict`] for a finished or rounds-mode flight and
/// [`EngineError::Validation`] for a bad fuel input, signal or profile.
pub fn sync_tick(
    session: &FlightSession,
    (previous, current): (f64, f64),
    profile: &RocketProfile,
    fuel_input: f64,
    cfg: &EngineConfig,
) -> Result<(FlightSession, TickResult), EngineError> {
    session.ensure_in_progress()?;
    session.ensure_mode(FlightMode::Continuous)?;
    let change_rate = resolve_stability(current, previous)?;
    let outcome = tick_physics(fuel_input, change_rate, profile, cfg)?;

    let mut next = session.clone();
    next.apply_deltas(
        outcome.fuel_consumed,
        outcome.distance_change,
        outcome.hull_damage,
    );
    next.ticks = next.ticks.saturating_add(1);
    if fuel_input >= cfg.flight.high_input_threshold {
        next.record_high_input(outcome.zone.is_stable());
    }
    if next.is_exhausted() {
        next.status = FlightStatus::Failed;
    } else if next.has_arrived() {
        next.status = FlightStatus::Completed;
    }
    next.bump_version();

    if next.is_terminal() {
        log::info!(
            target: LOG_TARGET_FLIGHT,
            "flight {} {} at tick {} ({:.1} of {:.1})",
            next.id,
            next.status,
            next.ticks,
            next.distance,
            next.target_distance
        );
    }

    let result = TickResult {
        tick: next.ticks,
        change_rate,
        outcome,
        status: next.status,
    };
    Ok((next, result))
}
