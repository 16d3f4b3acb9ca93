//! Post-flight classification: grade tier, pilot archetype and narrative ending.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ArchetypeCfg, EndingCfg, EngineConfig, TierCfg};
use crate::error::{ConflictReason, EngineError};
use crate::numbers::{percent, round_to, usize_to_f64};
use crate::seed::{FlightCode, fnv1a64};
use crate::session::{FlightMode, FlightSession, FlightStatus};

/// Final letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Tier {
    pub const ALL: [Self; 6] = [Self::S, Self::A, Self::B, Self::C, Self::D, Self::F];

    /// Higher is better; used to check the tier table ordering.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::S => 5,
            Self::A => 4,
            Self::B => 3,
            Self::C => 2,
            Self::D => 1,
            Self::F => 0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// Behavioural classification of how a pilot spent fuel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Archetype {
    Defensive,
    RiskTaker,
    AggressiveGrowth,
    CautiousValue,
    BalancedInvestor,
}

impl Archetype {
    pub const ALL: [Self; 5] = [
        Self::Defensive,
        Self::RiskTaker,
        Self::AggressiveGrowth,
        Self::CautiousValue,
        Self::BalancedInvestor,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Defensive => "DEFENSIVE",
            Self::RiskTaker => "RISK_TAKER",
            Self::AggressiveGrowth => "AGGRESSIVE_GROWTH",
            Self::CautiousValue => "CAUTIOUS_VALUE",
            Self::BalancedInvestor => "BALANCED_INVESTOR",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Defensive => "Defensive",
            Self::RiskTaker => "Risk Taker",
            Self::AggressiveGrowth => "Aggressive Growth",
            Self::CautiousValue => "Cautious Value",
            Self::BalancedInvestor => "Balanced Investor",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Narrative outcome of the six-round mode, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Every call right.
    DeepSpace,
    StableOrbit,
    Suborbital,
    /// Fewer correct calls than the lowest threshold.
    Scrubbed,
}

impl Ending {
    pub const ALL: [Self; 4] = [
        Self::DeepSpace,
        Self::StableOrbit,
        Self::Suborbital,
        Self::Scrubbed,
    ];

    #[must_use]
    pub const fn descriptor(self) -> EndingDescriptor {
        let (key, title, epilogue) = match self {
            Self::DeepSpace => (
                "ending.deep_space",
                "Beyond the Heliopause",
                "You read every headline right and rode the market clean out of the solar system.",
            ),
            Self::StableOrbit => (
                "ending.stable_orbit",
                "Stable Orbit",
                "A few misreads, but the craft settled into a comfortable, profitable orbit.",
            ),
            Self::Suborbital => (
                "ending.suborbital",
                "Suborbital Hop",
                "The rocket cleared the pad and touched space before gravity called it home.",
            ),
            Self::Scrubbed => (
                "ending.scrubbed",
                "Launch Scrubbed",
                "The news moved faster than your throttle hand. Mission control calls it a day.",
            ),
        };
        EndingDescriptor {
            ending: self,
            key,
            title,
            epilogue,
        }
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeepSpace => write!(f, "deep_space"),
            Self::StableOrbit => write!(f, "stable_orbit"),
            Self::Suborbital => write!(f, "suborbital"),
            Self::Scrubbed => write!(f, "scrubbed"),
        }
    }
}

/// Presentation data for an ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndingDescriptor {
    pub ending: Ending,
    pub key: &'static str,
    pub title: &'static str,
    pub epilogue: &'static str,
}

/// Final statistics the classifiers read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub distance: f64,
    pub target_distance: f64,
    pub fuel: f64,
    pub hull: f64,
    pub total_fuel_used: f64,
    pub high_stability_thrust_count: u32,
    pub low_stability_thrust_count: u32,
    pub correct_answers: u8,
}

/// Grade a flight. Falling short of the target is an `F` whatever remains in the tanks.
#[must_use]
pub fn classify_tier(stats: &SessionStats, cfg: &TierCfg) -> Tier {
    if stats.distance < stats.target_distance {
        return Tier::F;
    }
    cfg.table
        .iter()
        .find(|row| stats.fuel >= row.min_fuel && stats.hull >= row.min_hull)
        .map_or(Tier::D, |row| row.tier)
}

/// Classify pilot behaviour. Rules run in a fixed order; the first match wins.
#[must_use]
pub fn classify_archetype(stats: &SessionStats, cfg: &ArchetypeCfg) -> Archetype {
    let high = f64::from(stats.high_stability_thrust_count);
    let low = f64::from(stats.low_stability_thrust_count);
    let total = high + low;
    if total == 0.0 {
        return Archetype::Defensive;
    }
    let high_ratio = high / total;
    let low_ratio = low / total;
    let fuel_used = stats.total_fuel_used;

    if low_ratio > cfg.risk_taker_low_ratio {
        Archetype::RiskTaker
    } else if high_ratio > cfg.aggressive_high_ratio && fuel_used > cfg.aggressive_min_fuel_used {
        Archetype::AggressiveGrowth
    } else if fuel_used < cfg.defensive_max_fuel_used {
        Archetype::Defensive
    } else if high_ratio > cfg.cautious_high_ratio && low_ratio < cfg.cautious_low_ratio {
        Archetype::CautiousValue
    } else {
        Archetype::BalancedInvestor
    }
}

/// Narrative ending for a count of correct rounds; thresholds are inclusive.
#[must_use]
pub const fn final_ending(correct_answers: u8, cfg: &EndingCfg) -> EndingDescriptor {
    let ending = if correct_answers >= cfg.top_min {
        Ending::DeepSpace
    } else if correct_answers >= cfg.second_min {
        Ending::StableOrbit
    } else if correct_answers >= cfg.third_min {
        Ending::Suborbital
    } else {
        Ending::Scrubbed
    };
    ending.descriptor()
}

/// Summary of a finished flight for the result screen and QA reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightReport {
    pub session_id: String,
    pub flight_code: String,
    pub mode: FlightMode,
    pub status: FlightStatus,
    pub tier: Tier,
    pub archetype: Archetype,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending: Option<EndingDescriptor>,
    pub distance: f64,
    pub target_distance: f64,
    pub fuel: f64,
    pub hull: f64,
    pub total_fuel_used: f64,
    pub correct_answers: u8,
    pub rounds_played: usize,
    pub ticks: u32,
    /// Correct calls as a share of rounds played, one decimal.
    pub accuracy_pct: f64,
}

/// Build the report for a terminal flight.
///
/// # Errors
///
/// Returns [`ConflictReason::StillInProgress`] while the flight is running.
pub fn summarize_flight(
    session: &FlightSession,
    cfg: &EngineConfig,
) -> Result<FlightReport, EngineError> {
    if !session.is_terminal() {
        return Err(ConflictReason::StillInProgress {
            session: session.id.clone(),
        }
        .into());
    }
    let stats = session.stats();
    // only a completed rounds flight carries an ending
    let ending = session.final_ending.map(Ending::descriptor);
    let rounds_played = session.rounds.len();
    let accuracy_pct = round_to(
        percent(f64::from(session.correct_answers), usize_to_f64(rounds_played)),
        1,
    );
    let code = FlightCode::from_entropy(session.mode, fnv1a64(session.id.0.as_bytes()));

    Ok(FlightReport {
        session_id: session.id.to_string(),
        flight_code: code.to_string(),
        mode: session.mode,
        status: session.status,
        tier: classify_tier(&stats, &cfg.tiers),
        archetype: classify_archetype(&stats, &cfg.archetypes),
        ending,
        distance: stats.distance,
        target_distance: stats.target_distance,
        fuel: stats.fuel,
        hull: stats.hull,
        total_fuel_used: stats.total_fuel_used,
        correct_answers: session.correct_answers,
        rounds_played,
        ticks: session.ticks,
        accuracy_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierThreshold;
    use crate::profile::RocketId;
    use crate::session::SessionId;

    fn stats(distance: f64, fuel: f64, hull: f64) -> SessionStats {
        SessionStats {
            distance,
            target_distance: 1_000.0,
            fuel,
            hull,
            total_fuel_used: 0.0,
            high_stability_thrust_count: 0,
            low_stability_thrust_count: 0,
            correct_answers: 0,
        }
    }

    fn behaviour(high: u32, low: u32, fuel_used: f64) -> SessionStats {
        SessionStats {
            total_fuel_used: fuel_used,
            high_stability_thrust_count: high,
            low_stability_thrust_count: low,
            ..stats(1_000.0, 50.0, 50.0)
        }
    }

    #[test]
    fn distance_gate_dominates() {
        let cfg = TierCfg::default();
        assert_eq!(classify_tier(&stats(999.0, 100.0, 100.0), &cfg), Tier::F);
        assert_eq!(classify_tier(&stats(1_000.0, 100.0, 100.0), &cfg), Tier::S);
    }

    #[test]
    fn tier_needs_both_gauges() {
        let cfg = TierCfg::default();
        assert_eq!(classify_tier(&stats(1_000.0, 85.0, 61.0), &cfg), Tier::A);
        assert_eq!(classify_tier(&stats(1_000.0, 45.0, 90.0), &cfg), Tier::B);
        assert_eq!(classify_tier(&stats(1_000.0, 20.0, 20.0), &cfg), Tier::C);
        assert_eq!(classify_tier(&stats(1_000.0, 5.0, 80.0), &cfg), Tier::D);
    }

    #[test]
    fn tier_defaults_to_d_when_no_row_matches() {
        let cfg = TierCfg {
            table: vec![TierThreshold::new(Tier::S, (90.0, 90.0))],
        };
        assert_eq!(classify_tier(&stats(1_000.0, 10.0, 10.0), &cfg), Tier::D);
    }

    #[test]
    fn archetype_rules_apply_in_order() {
        let cfg = ArchetypeCfg::default();
        assert_eq!(classify_archetype(&behaviour(0, 0, 90.0), &cfg), Archetype::Defensive);
        assert_eq!(classify_archetype(&behaviour(5, 5, 90.0), &cfg), Archetype::RiskTaker);
        assert_eq!(
            classify_archetype(&behaviour(8, 2, 60.0), &cfg),
            Archetype::AggressiveGrowth
        );
        // high ratio qualifies for aggressive but fuel does not, so the defensive rule catches it
        assert_eq!(classify_archetype(&behaviour(8, 2, 20.0), &cfg), Archetype::Defensive);
        assert_eq!(
            classify_archetype(&behaviour(9, 1, 40.0), &cfg),
            Archetype::CautiousValue
        );
        assert_eq!(
            classify_archetype(&behaviour(13, 7, 40.0), &cfg),
            Archetype::BalancedInvestor
        );
    }

    #[test]
    fn risk_taker_beats_aggressive_when_both_apply() {
        let cfg = ArchetypeCfg {
            aggressive_high_ratio: 0.1,
            ..ArchetypeCfg::default()
        };
        assert_eq!(classify_archetype(&behaviour(5, 5, 90.0), &cfg), Archetype::RiskTaker);
    }

    #[test]
    fn ending_thresholds_are_inclusive() {
        let cfg = EndingCfg::default();
        let ending = |correct| final_ending(correct, &cfg).ending;
        assert_eq!(ending(6), Ending::DeepSpace);
        assert_eq!(ending(5), Ending::StableOrbit);
        assert_eq!(ending(4), Ending::StableOrbit);
        assert_eq!(ending(3), Ending::Suborbital);
        assert_eq!(ending(2), Ending::Suborbital);
        assert_eq!(ending(1), Ending::Scrubbed);
        assert_eq!(ending(0), Ending::Scrubbed);
    }

    #[test]
    fn summary_requires_a_finished_flight() {
        let cfg = EngineConfig::default();
        let mut session = FlightSession::new(
            SessionId::new("report-1"),
            RocketId::new("falcon"),
            FlightMode::Rounds,
            &cfg,
        );
        let err = summarize_flight(&session, &cfg).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);

        session.status = FlightStatus::Completed;
        session.distance = 1_000.0;
        session.correct_answers = 4;
        session.final_ending = Some(Ending::StableOrbit);
        let report = summarize_flight(&session, &cfg).unwrap();
        assert_eq!(report.tier, Tier::S);
        assert_eq!(report.archetype, Archetype::Defensive);
        assert_eq!(report.ending.map(|d| d.ending), Some(Ending::StableOrbit));
        assert!(report.flight_code.starts_with("RD-"));
        assert!(report.accuracy_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn continuous_flights_have_no_ending() {
        let cfg = EngineConfig::default();
        let mut session = FlightSession::new(
            SessionId::new("report-2"),
            RocketId::new("falcon"),
            FlightMode::Continuous,
            &cfg,
        );
        session.status = FlightStatus::Failed;
        let report = summarize_flight(&session, &cfg).unwrap();
        assert!(report.ending.is_none());
        assert_eq!(report.tier, Tier::F);
        assert!(report.flight_code.starts_with("CT-"));
    }
}
