//! Choice judge: the single correctness rule of the round game.
//!
//! Supplying fuel is correct exactly when the round nets out favourable, and
//! withholding it is correct exactly when it does not.
use serde::{Deserialize, Serialize};

use crate::config::FlightCfg;
use crate::error::{EngineError, ensure_fuel_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResult {
    pub user_chose_fuel: bool,
    pub is_correct_choice: bool,
}

/// Judge a round using the configured "chose fuel" threshold.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for a fuel input outside 0-100.
pub fn judge_choice_with(
    fuel_input: f64,
    is_positive_outcome: bool,
    cfg: &FlightCfg,
) -> Result<ChoiceResult, EngineError> {
    let fuel_input = ensure_fuel_input(fuel_input)?;
    let user_chose_fuel = fuel_input >= cfg.choice_threshold;
    Ok(ChoiceResult {
        user_chose_fuel,
        is_correct_choice: is_positive_outcome == user_chose_fuel,
    })
}

/// Judge a round with the default threshold of 50.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for a fuel input outside 0-100.
pub fn judge_choice(fuel_input: f64, is_positive_outcome: bool) -> Result<ChoiceResult, EngineError> {
    judge_choice_with(fuel_input, is_positive_outcome, &FlightCfg::default())
}
