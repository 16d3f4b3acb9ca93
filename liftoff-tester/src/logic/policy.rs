use std::fmt;
use std::str::FromStr;

use liftoff_game::{ComposedModifiers, FlightSession};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

const FULL_BURN: f64 = 100.0;
const IDLE_BURN: f64 = 0.0;
const COAST_BURN: f64 = 20.0;
const CRUISE_BURN: f64 = 60.0;
/// Coasting pilots stop feeding the engine below this much fuel.
const FUEL_RESERVE: f64 = 10.0;

/// Decision returned by a [`PilotPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub struct PilotDecision {
    pub fuel_input: f64,
    pub rationale: Option<String>,
}

impl PilotDecision {
    #[must_use]
    pub fn new(fuel_input: f64, rationale: Option<String>) -> Self {
        Self {
            fuel_input,
            rationale,
        }
    }
}

/// What a pilot can see while a round is in its decision phase.
#[derive(Debug, Clone, Copy)]
pub struct RoundView<'a> {
    pub session: &'a FlightSession,
    pub round: u8,
    /// Composed outcome of this round's news; only honest pilots ignore it.
    pub preview: ComposedModifiers,
}

/// What a pilot can see before a continuous tick.
#[derive(Debug, Clone, Copy)]
pub struct TickView<'a> {
    pub session: &'a FlightSession,
    /// Change rate of the tick just flown.
    pub last_change: Option<f64>,
    /// Change rate the coming tick will read.
    pub upcoming_change: Option<f64>,
}

/// Policy interface for automated pilots.
pub trait PilotPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Fuel input for a rounds-mode decision.
    fn round_input(&mut self, view: &RoundView<'_>) -> PilotDecision;

    /// Fuel input for a continuous tick.
    fn tick_input(&mut self, view: &TickView<'_>) -> PilotDecision;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (try --list-strategies)")]
pub struct UnknownStrategy(pub String);

/// Built-in pilot strategies for automated flights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PilotStrategy {
    FullThrottle,
    Coast,
    Contrarian,
    Oracle,
    CoinFlip,
    Momentum,
}

impl PilotStrategy {
    pub const ALL: [Self; 6] = [
        Self::FullThrottle,
        Self::Coast,
        Self::Contrarian,
        Self::Oracle,
        Self::CoinFlip,
        Self::Momentum,
    ];

    /// CLI key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FullThrottle => "full-throttle",
            Self::Coast => "coast",
            Self::Contrarian => "contrarian",
            Self::Oracle => "oracle",
            Self::CoinFlip => "coin-flip",
            Self::Momentum => "momentum",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullThrottle => "Full Throttle",
            Self::Coast => "Coast",
            Self::Contrarian => "Contrarian",
            Self::Oracle => "Oracle",
            Self::CoinFlip => "Coin Flip",
            Self::Momentum => "Momentum",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FullThrottle => "Always burns at maximum input",
            Self::Coast => "Idles through rounds, trickles fuel on ticks",
            Self::Contrarian => "Bets against whatever just happened",
            Self::Oracle => "Peeks at the round's composed outcome or the next signal",
            Self::CoinFlip => "Seeded random input",
            Self::Momentum => "Follows whatever just happened",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PilotPolicy> {
        match self {
            Self::FullThrottle => Box::new(FullThrottlePolicy),
            Self::Coast => Box::new(CoastPolicy),
            Self::Contrarian => Box::new(ContrarianPolicy),
            Self::Oracle => Box::new(OraclePolicy),
            Self::CoinFlip => Box::new(CoinFlipPolicy::new(seed)),
            Self::Momentum => Box::new(MomentumPolicy),
        }
    }
}

impl fmt::Display for PilotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PilotStrategy {
    type Err = UnknownStrategy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key() == wanted)
            .ok_or_else(|| UnknownStrategy(value.to_string()))
    }
}

/// Whether the previous round of this flight went the pilot's way.
fn last_round_positive(session: &FlightSession) -> Option<bool> {
    session.rounds.last().map(|record| record.overall_positive)
}

struct FullThrottlePolicy;
struct CoastPolicy;
struct ContrarianPolicy;
struct OraclePolicy;
struct MomentumPolicy;

struct CoinFlipPolicy {
    rng: ChaCha20Rng,
}

impl CoinFlipPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PilotPolicy for FullThrottlePolicy {
    fn name(&self) -> &'static str {
        "Full Throttle"
    }

    fn round_input(&mut self, _view: &RoundView<'_>) -> PilotDecision {
        PilotDecision::new(FULL_BURN, None)
    }

    fn tick_input(&mut self, _view: &TickView<'_>) -> PilotDecision {
        PilotDecision::new(FULL_BURN, None)
    }
}

impl PilotPolicy for CoastPolicy {
    fn name(&self) -> &'static str {
        "Coast"
    }

    fn round_input(&mut self, _view: &RoundView<'_>) -> PilotDecision {
        PilotDecision::new(IDLE_BURN, None)
    }

    fn tick_input(&mut self, view: &TickView<'_>) -> PilotDecision {
        if view.session.current_fuel < FUEL_RESERVE {
            PilotDecision::new(IDLE_BURN, Some("holding the reserve".to_string()))
        } else {
            PilotDecision::new(COAST_BURN, None)
        }
    }
}

impl PilotPolicy for ContrarianPolicy {
    fn name(&self) -> &'static str {
        "Contrarian"
    }

    fn round_input(&mut self, view: &RoundView<'_>) -> PilotDecision {
        match last_round_positive(view.session) {
            Some(true) => PilotDecision::new(IDLE_BURN, Some("fading the rally".to_string())),
            Some(false) => PilotDecision::new(FULL_BURN, Some("buying the dip".to_string())),
            None => PilotDecision::new(CRUISE_BURN, Some("no history yet".to_string())),
        }
    }

    fn tick_input(&mut self, view: &TickView<'_>) -> PilotDecision {
        match view.last_change {
            Some(change) if change >= 0.0 => PilotDecision::new(COAST_BURN, None),
            Some(_) => PilotDecision::new(FULL_BURN, None),
            None => PilotDecision::new(CRUISE_BURN, None),
        }
    }
}

impl PilotPolicy for OraclePolicy {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn round_input(&mut self, view: &RoundView<'_>) -> PilotDecision {
        let rationale = Some(format!(
            "round {}: {} events, thrust x{:.2}",
            view.round, view.preview.event_count, view.preview.thrust_multiplier
        ));
        if view.preview.overall_positive {
            PilotDecision::new(FULL_BURN, rationale)
        } else {
            PilotDecision::new(IDLE_BURN, rationale)
        }
    }

    fn tick_input(&mut self, view: &TickView<'_>) -> PilotDecision {
        match view.upcoming_change {
            Some(change) if change >= 0.0 => PilotDecision::new(FULL_BURN, None),
            // below the damage floor an unstable tick costs distance only
            _ => PilotDecision::new(IDLE_BURN, None),
        }
    }
}

impl PilotPolicy for CoinFlipPolicy {
    fn name(&self) -> &'static str {
        "Coin Flip"
    }

    fn round_input(&mut self, _view: &RoundView<'_>) -> PilotDecision {
        let input = if self.rng.gen_bool(0.5) {
            FULL_BURN
        } else {
            IDLE_BURN
        };
        PilotDecision::new(input, None)
    }

    fn tick_input(&mut self, _view: &TickView<'_>) -> PilotDecision {
        PilotDecision::new(self.rng.gen_range(IDLE_BURN..=FULL_BURN), None)
    }
}

impl PilotPolicy for MomentumPolicy {
    fn name(&self) -> &'static str {
        "Momentum"
    }

    fn round_input(&mut self, view: &RoundView<'_>) -> PilotDecision {
        match last_round_positive(view.session) {
            Some(true) => PilotDecision::new(FULL_BURN, Some("riding the trend".to_string())),
            Some(false) => PilotDecision::new(IDLE_BURN, Some("waiting it out".to_string())),
            None => PilotDecision::new(CRUISE_BURN, Some("no history yet".to_string())),
        }
    }

    fn tick_input(&mut self, view: &TickView<'_>) -> PilotDecision {
        match view.last_change {
            Some(change) if change >= 0.0 => PilotDecision::new(CRUISE_BURN, None),
            Some(_) => PilotDecision::new(IDLE_BURN, None),
            None => PilotDecision::new(COAST_BURN, None),
        }
    }
}
