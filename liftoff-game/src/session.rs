//! Flight session aggregate and its phase/status enums.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{Ending, SessionStats};
use crate::config::EngineConfig;
use crate::constants::GAUGE_MAX;
use crate::error::{ConflictReason, EngineError};
use crate::profile::RocketId;
use crate::round::RoundRecord;

/// Stable identifier for a flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physics model a flight runs under. A session never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightMode {
    /// Six news-driven rounds resolved through the event pipeline.
    Rounds,
    /// Free-running ticks driven by consecutive signal values.
    Continuous,
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rounds => write!(f, "rounds"),
            Self::Continuous => write!(f, "continuous"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightStatus {
    InProgress,
    Completed,
    Failed,
}

impl FlightStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in progress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Per-round phase: briefing, decision, outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    News,
    Playing,
    Result,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::News => write!(f, "news"),
            Self::Playing => write!(f, "playing"),
            Self::Result => write!(f, "result"),
        }
    }
}

/// Mutable flight aggregate.
///
/// Only the round orchestrator and tick sync mutate it, and each successful
/// mutation bumps `version` so a store can reject stale writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSession {
    pub id: SessionId,
    pub rocket_id: RocketId,
    pub mode: FlightMode,
    pub current_fuel: f64,
    pub current_hull: f64,
    pub distance: f64,
    pub target_distance: f64,
    pub total_fuel_used: f64,
    pub high_stability_thrust_count: u32,
    pub low_stability_thrust_count: u32,
    pub status: FlightStatus,
    pub current_round: u8,
    pub total_rounds: u8,
    pub round_phase: RoundPhase,
    pub correct_answers: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_ending: Option<Ending>,
    #[serde(default)]
    pub ticks: u32,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
    #[serde(default)]
    pub version: u64,
}

impl FlightSession {
    /// Fresh in-progress flight on round 1, briefing phase.
    #[must_use]
    pub fn new(id: SessionId, rocket_id: RocketId, mode: FlightMode, cfg: &EngineConfig) -> Self {
        Self {
            id,
            rocket_id,
            mode,
            current_fuel: cfg.flight.starting_fuel,
            current_hull: cfg.flight.starting_hull,
            distance: 0.0,
            target_distance: cfg.flight.target_distance,
            total_fuel_used: 0.0,
            high_stability_thrust_count: 0,
            low_stability_thrust_count: 0,
            status: FlightStatus::InProgress,
            current_round: 1,
            total_rounds: cfg.rounds.total_rounds,
            round_phase: RoundPhase::News,
            correct_answers: 0,
            final_ending: None,
            ticks: 0,
            rounds: Vec::new(),
            version: 0,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[must_use]
    pub fn is_final_round(&self) -> bool {
        self.current_round >= self.total_rounds
    }

    /// Refuse any change to a finished flight.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictReason::Terminal`] once the status has left `InProgress`.
    pub fn ensure_in_progress(&self) -> Result<(), EngineError> {
        if self.is_terminal() {
            log::warn!(
                target: crate::constants::LOG_TARGET_FLIGHT,
                "rejecting mutation of {} flight {}",
                self.status,
                self.id
            );
            return Err(ConflictReason::Terminal {
                session: self.id.clone(),
                status: self.status,
            }
            .into());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConflictReason::ModeMismatch`] when the flight runs another model.
    pub fn ensure_mode(&self, expected: FlightMode) -> Result<(), EngineError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(ConflictReason::ModeMismatch {
                expected,
                actual: self.mode,
            }
            .into())
        }
    }

    /// # Errors
    ///
    /// Returns [`ConflictReason::RoundMismatch`] unless `round` is the current round.
    pub fn ensure_round(&self, round: u8) -> Result<(), EngineError> {
        if round == self.current_round {
            Ok(())
        } else {
            Err(ConflictReason::RoundMismatch {
                requested: round,
                current: self.current_round,
            }
            .into())
        }
    }

    /// # Errors
    ///
    /// Returns [`ConflictReason::PhaseMismatch`] when the round is elsewhere.
    pub fn ensure_phase(&self, expected: RoundPhase) -> Result<(), EngineError> {
        if self.round_phase == expected {
            Ok(())
        } else {
            Err(ConflictReason::PhaseMismatch {
                expected,
                actual: self.round_phase,
            }
            .into())
        }
    }

    /// Apply deltas and clamp: fuel and hull to `[0, 100]`, distance to `[0, target]`.
    pub fn apply_deltas(&mut self, fuel_used: f64, distance_delta: f64, hull_damage: f64) {
        let fuel_used = fuel_used.max(0.0);
        self.current_fuel = (self.current_fuel - fuel_used).clamp(0.0, GAUGE_MAX);
        self.current_hull = (self.current_hull - hull_damage.max(0.0)).clamp(0.0, GAUGE_MAX);
        self.distance = (self.distance + distance_delta).clamp(0.0, self.target_distance);
        self.total_fuel_used += fuel_used;
    }

    /// Count a high-input action as riding a favourable or an unfavourable interval.
    pub fn record_high_input(&mut self, favourable: bool) {
        if favourable {
            self.high_stability_thrust_count = self.high_stability_thrust_count.saturating_add(1);
        } else {
            self.low_stability_thrust_count = self.low_stability_thrust_count.saturating_add(1);
        }
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.current_fuel <= 0.0 || self.current_hull <= 0.0
    }

    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.distance >= self.target_distance
    }

    pub(crate) const fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Snapshot of the statistics the post-flight classifier reads.
    #[must_use]
    pub const fn stats(&self) -> SessionStats {
        SessionStats {
            distance: self.distance,
            target_distance: self.target_distance,
            fuel: self.current_fuel,
            hull: self.current_hull,
            total_fuel_used: self.total_fuel_used,
            high_stability_thrust_count: self.high_stability_thrust_count,
            low_stability_thrust_count: self.low_stability_thrust_count,
            correct_answers: self.correct_answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    fn session() -> FlightSession {
        FlightSession::new(
            SessionId::new("s-1"),
            RocketId::new("falcon"),
            FlightMode::Rounds,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn new_session_starts_full_on_round_one() {
        let session = session();
        assert!((session.current_fuel - 100.0).abs() < FLOAT_EPSILON);
        assert!((session.current_hull - 100.0).abs() < FLOAT_EPSILON);
        assert_eq!(session.current_round, 1);
        assert_eq!(session.total_rounds, 6);
        assert_eq!(session.round_phase, RoundPhase::News);
        assert_eq!(session.status, FlightStatus::InProgress);
        assert!(session.final_ending.is_none());
    }

    #[test]
    fn deltas_clamp_every_gauge() {
        let mut session = session();
        session.apply_deltas(250.0, 5_000.0, 400.0);
        assert!(session.current_fuel.abs() < FLOAT_EPSILON);
        assert!(session.current_hull.abs() < FLOAT_EPSILON);
        assert!((session.distance - session.target_distance).abs() < FLOAT_EPSILON);
        assert!((session.total_fuel_used - 250.0).abs() < FLOAT_EPSILON);

        let mut session = self::session();
        session.apply_deltas(0.0, -30.0, 0.0);
        assert!(session.distance.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn negative_usage_never_refuels() {
        let mut session = session();
        session.apply_deltas(-20.0, 0.0, -5.0);
        assert!((session.current_fuel - 100.0).abs() < FLOAT_EPSILON);
        assert!((session.current_hull - 100.0).abs() < FLOAT_EPSILON);
        assert!(session.total_fuel_used.abs() < FLOAT_EPSILON);
    }

    #[test]
    fn terminal_sessions_refuse_mutation() {
        let mut session = session();
        assert!(session.ensure_in_progress().is_ok());
        session.status = FlightStatus::Completed;
        let err = session.ensure_in_progress().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[test]
    fn high_input_counters_split_by_favourability() {
        let mut session = session();
        session.record_high_input(true);
        session.record_high_input(true);
        session.record_high_input(false);
        assert_eq!(session.high_stability_thrust_count, 2);
        assert_eq!(session.low_stability_thrust_count, 1);
    }

    #[test]
    fn status_serializes_in_wire_case() {
        let json = serde_json::to_string(&FlightStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let phase: RoundPhase = serde_json::from_str("\"PLAYING\"").unwrap();
        assert_eq!(phase, RoundPhase::Playing);
    }
}
