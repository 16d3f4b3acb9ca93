//! Bundled rocket roster and event deck, plus the seeded feeds drawn from them.
use std::collections::BTreeMap;

use liftoff_game::{
    EventDefinition, MemoryCatalog, RocketId, RocketProfile, ScriptedEvents, ScriptedSignals,
};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::Deserialize;
use thiserror::Error;

const ROCKETS_JSON: &str = include_str!("../../assets/rockets.json");
const EVENTS_JSON: &str = include_str!("../../assets/events.json");

/// Starting reading of every random-walk signal series.
const SIGNAL_BASELINE: f64 = 100.0;
/// Largest single-step move of the random walk, in percent.
const SIGNAL_STEP_PCT: f64 = 4.0;
const SIGNAL_FLOOR: f64 = 1.0;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to parse bundled {asset}: {source}")]
    Parse {
        asset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("bundled {0} is empty")]
    Empty(&'static str),
    #[error("rocket {id} failed validation: {reason}")]
    InvalidRocket { id: RocketId, reason: String },
    #[error("event {id} failed validation: {reason}")]
    InvalidEvent { id: String, reason: String },
}

/// One entry of the bundled roster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub id: RocketId,
    pub name: String,
    #[serde(flatten)]
    pub profile: RocketProfile,
}

/// Static data shared by every simulated flight.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    roster: Vec<RosterEntry>,
    deck: Vec<EventDefinition>,
}

impl TesterAssets {
    /// Parse and validate the roster and deck compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error when either asset is malformed, empty, or holds an
    /// entry the engine would reject.
    pub fn load_default() -> Result<Self, AssetError> {
        Self::from_json(ROCKETS_JSON, EVENTS_JSON)
    }

    /// # Errors
    ///
    /// See [`TesterAssets::load_default`].
    pub fn from_json(rockets: &str, events: &str) -> Result<Self, AssetError> {
        let roster: Vec<RosterEntry> =
            serde_json::from_str(rockets).map_err(|source| AssetError::Parse {
                asset: "rockets.json",
                source,
            })?;
        let deck: Vec<EventDefinition> =
            serde_json::from_str(events).map_err(|source| AssetError::Parse {
                asset: "events.json",
                source,
            })?;
        if roster.is_empty() {
            return Err(AssetError::Empty("rockets.json"));
        }
        if deck.is_empty() {
            return Err(AssetError::Empty("events.json"));
        }
        for entry in &roster {
            entry
                .profile
                .validate()
                .map_err(|err| AssetError::InvalidRocket {
                    id: entry.id.clone(),
                    reason: err.to_string(),
                })?;
        }
        for event in &deck {
            event.validate().map_err(|err| AssetError::InvalidEvent {
                id: event.id.clone(),
                reason: err.to_string(),
            })?;
        }
        log::debug!(
            "loaded {} rockets and {} events from bundled assets",
            roster.len(),
            deck.len()
        );
        Ok(Self { roster, deck })
    }

    #[must_use]
    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    #[must_use]
    pub fn deck(&self) -> &[EventDefinition] {
        &self.deck
    }

    /// Rocket flown for a given seed; rotates through the (never empty) roster.
    #[must_use]
    pub fn rocket_for_seed(&self, seed: u64) -> &RosterEntry {
        let len = u64::try_from(self.roster.len()).unwrap_or(u64::MAX);
        let index = usize::try_from(seed % len).unwrap_or(0);
        &self.roster[index]
    }

    #[must_use]
    pub fn catalog(&self) -> MemoryCatalog {
        self.roster
            .iter()
            .map(|entry| (entry.id.clone(), entry.profile))
            .collect()
    }
}

/// Per-round event sets drawn for one flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventScript {
    rounds: BTreeMap<u8, Vec<EventDefinition>>,
}

impl EventScript {
    /// Draw one to three events per round from the deck.
    #[must_use]
    pub fn draw(deck: &[EventDefinition], total_rounds: u8, rng: &mut ChaCha20Rng) -> Self {
        let mut rounds = BTreeMap::new();
        for round in 1..=total_rounds {
            let count = rng.gen_range(1..=3_usize).min(deck.len());
            let events: Vec<EventDefinition> =
                deck.choose_multiple(rng, count).cloned().collect();
            rounds.insert(round, events);
        }
        Self { rounds }
    }

    #[must_use]
    pub fn round(&self, round: u8) -> &[EventDefinition] {
        self.rounds.get(&round).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn to_feed(&self) -> ScriptedEvents {
        self.rounds
            .iter()
            .fold(ScriptedEvents::default(), |feed, (round, events)| {
                feed.with_round(*round, events.clone())
            })
    }
}

/// Seeded random walk of signal readings.
#[must_use]
pub fn random_walk(len: usize, rng: &mut ChaCha20Rng) -> Vec<f64> {
    let mut series = Vec::with_capacity(len);
    let mut reading = SIGNAL_BASELINE;
    for _ in 0..len {
        series.push(reading);
        let step = rng.gen_range(-SIGNAL_STEP_PCT..=SIGNAL_STEP_PCT);
        reading = (reading * (1.0 + step / 100.0)).max(SIGNAL_FLOOR);
    }
    series
}

#[must_use]
pub fn signal_feed(series: &[f64]) -> ScriptedSignals {
    ScriptedSignals::new(series.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn bundled_assets_load() {
        let assets = TesterAssets::load_default().unwrap();
        assert_eq!(assets.roster().len(), 4);
        assert!(assets.deck().len() >= 10);
        assert_eq!(assets.catalog().len(), 4);
    }

    #[test]
    fn rocket_rotation_wraps() {
        let assets = TesterAssets::load_default().unwrap();
        assert_eq!(assets.rocket_for_seed(0).id, assets.rocket_for_seed(4).id);
        assert_ne!(assets.rocket_for_seed(0).id, assets.rocket_for_seed(1).id);
    }

    #[test]
    fn empty_roster_is_rejected() {
        let err = TesterAssets::from_json("[]", EVENTS_JSON).unwrap_err();
        assert!(matches!(err, AssetError::Empty("rockets.json")));
    }

    #[test]
    fn broken_rocket_is_rejected() {
        let rockets = r#"[{"id":"bad","name":"Bad","accelerationStat":0.0,"durabilityStat":1.0,"efficiencyStat":1.0}]"#;
        let err = TesterAssets::from_json(rockets, EVENTS_JSON).unwrap_err();
        assert!(matches!(err, AssetError::InvalidRocket { .. }));
    }

    #[test]
    fn draws_are_deterministic_per_seed() {
        let assets = TesterAssets::load_default().unwrap();
        let first = EventScript::draw(assets.deck(), 6, &mut ChaCha20Rng::seed_from_u64(9));
        let second = EventScript::draw(assets.deck(), 6, &mut ChaCha20Rng::seed_from_u64(9));
        assert_eq!(first, second);
        for round in 1..=6 {
            assert!((1..=3).contains(&first.round(round).len()));
        }
        assert!(first.round(7).is_empty());
    }

    #[test]
    fn random_walk_stays_positive() {
        let series = random_walk(500, &mut ChaCha20Rng::seed_from_u64(3));
        assert_eq!(series.len(), 500);
        assert!((series[0] - SIGNAL_BASELINE).abs() < f64::EPSILON);
        assert!(series.iter().all(|reading| *reading >= SIGNAL_FLOOR));
    }
}
