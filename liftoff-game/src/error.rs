//! Engine error taxonomy.
//!
//! Out-of-band inputs raise errors before any state is touched; out-of-band
//! results are clamped instead.
use thiserror::Error;

use crate::config::ConfigError;
use crate::profile::RocketId;
use crate::session::{FlightMode, FlightStatus, RoundPhase, SessionId};

/// Coarse class of an [`EngineError`], used by hosts to map onto transport codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Config,
}

/// Errors returned by every fallible engine operation.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictReason),
    #[error("not found: {0}")]
    NotFound(#[from] MissingResource),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Why a state-changing request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("flight {session} has already {status}")]
    Terminal {
        session: SessionId,
        status: FlightStatus,
    },
    #[error("flight {session} is still in progress")]
    StillInProgress { session: SessionId },
    #[error("round {requested} requested but flight is on round {current}")]
    RoundMismatch { requested: u8, current: u8 },
    #[error("flight is in the {actual} phase, expected {expected}")]
    PhaseMismatch {
        expected: RoundPhase,
        actual: RoundPhase,
    },
    #[error("operation needs a {expected} flight but this one is {actual}")]
    ModeMismatch {
        expected: FlightMode,
        actual: FlightMode,
    },
    #[error("flight {session} changed underneath the writer (expected version {expected}, found {found})")]
    StaleVersion {
        session: SessionId,
        expected: u64,
        found: u64,
    },
}

/// Resource a collaborator could not supply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingResource {
    #[error("session {0}")]
    Session(SessionId),
    #[error("rocket profile {0}")]
    Rocket(RocketId),
    #[error("event set for round {round} of flight {session}")]
    EventSet { session: SessionId, round: u8 },
    #[error("signal pair for tick {tick} of flight {session}")]
    SignalPair { session: SessionId, tick: u32 },
}

/// Reject fuel inputs outside the 0-100 dial.
pub(crate) fn ensure_fuel_input(fuel_input: f64) -> Result<f64, EngineError> {
    use crate::constants::{FUEL_INPUT_MAX, FUEL_INPUT_MIN};
    if fuel_input.is_finite() && (FUEL_INPUT_MIN..=FUEL_INPUT_MAX).contains(&fuel_input) {
        Ok(fuel_input)
    } else {
        Err(EngineError::validation(
            "fuel_input",
            format!("{fuel_input} is outside {FUEL_INPUT_MIN}..={FUEL_INPUT_MAX}"),
        ))
    }
}

/// Reject non-finite signal values.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::validation(field, format!("{value} is not a finite number")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(
            EngineError::validation("fuel_input", "bad").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EngineError::from(ConflictReason::RoundMismatch {
                requested: 2,
                current: 3
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            EngineError::from(MissingResource::Rocket(RocketId::new("falcon"))).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::from(ConfigError::NoRounds).kind(),
            ErrorKind::Config
        );
    }

    #[test]
    fn fuel_input_bounds_are_inclusive() {
        assert!(ensure_fuel_input(0.0).is_ok());
        assert!(ensure_fuel_input(100.0).is_ok());
        assert!(ensure_fuel_input(-0.5).is_err());
        assert!(ensure_fuel_input(100.5).is_err());
        assert!(ensure_fuel_input(f64::NAN).is_err());
    }

    #[test]
    fn messages_name_the_session() {
        let err = EngineError::from(ConflictReason::Terminal {
            session: SessionId::new("flight-7"),
            status: FlightStatus::Failed,
        });
        assert_eq!(err.to_string(), "conflict: flight flight-7 has already failed");
    }
}
