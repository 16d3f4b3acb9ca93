//! Stability evaluation over two consecutive signal values.
use serde::{Deserialize, Serialize};

use crate::config::StabilityCfg;
use crate::error::{EngineError, ensure_finite};

/// Classification of a signal interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityZone {
    Stable,
    Unstable,
}

impl StabilityZone {
    #[must_use]
    pub const fn is_stable(self) -> bool {
        matches!(self, Self::Stable)
    }
}

/// Percent change from `previous` to `current`; a zero baseline reads as no change.
#[must_use]
pub fn stability_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Validate a signal pair and return its change rate.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when either reading is not finite.
pub fn resolve_stability(current: f64, previous: f64) -> Result<f64, EngineError> {
    let current = ensure_finite("current_signal", current)?;
    let previous = ensure_finite("previous_signal", previous)?;
    Ok(stability_change(current, previous))
}

/// True when the change rate meets the configured threshold.
#[must_use]
pub fn is_stable(change_rate: f64, cfg: &StabilityCfg) -> bool {
    change_rate >= cfg.threshold
}

#[must_use]
pub fn classify_zone(change_rate: f64, cfg: &StabilityCfg) -> StabilityZone {
    if is_stable(change_rate, cfg) {
        StabilityZone::Stable
    } else {
        StabilityZone::Unstable
    }
}
