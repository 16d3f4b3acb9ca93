//! In-process collaborators for hosts without a real backend (tests, the QA tester).
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

use crate::events::EventDefinition;
use crate::profile::{RocketId, RocketProfile};
use crate::session::{FlightSession, SessionId};
use crate::{EventFeed, RocketCatalog, SaveOutcome, SessionStore, SignalFeed};

/// Fixed roster of rocket profiles.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    rockets: HashMap<RocketId, RocketProfile>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn with_rocket(mut self, id: RocketId, profile: RocketProfile) -> Self {
        self.rockets.insert(id, profile);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rockets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rockets.is_empty()
    }
}

impl FromIterator<(RocketId, RocketProfile)> for MemoryCatalog {
    fn from_iter<I: IntoIterator<Item = (RocketId, RocketProfile)>>(iter: I) -> Self {
        Self {
            rockets: iter.into_iter().collect(),
        }
    }
}

impl RocketCatalog for MemoryCatalog {
    type Error = Infallible;

    fn rocket(&self, id: &RocketId) -> Result<Option<RocketProfile>, Self::Error> {
        Ok(self.rockets.get(id).copied())
    }
}

/// Same per-round event script for every flight.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    rounds: BTreeMap<u8, Vec<EventDefinition>>,
}

impl ScriptedEvents {
    #[must_use]
    pub fn with_round(mut self, round: u8, events: Vec<EventDefinition>) -> Self {
        self.rounds.insert(round, events);
        self
    }
}

impl EventFeed for ScriptedEvents {
    type Error = Infallible;

    fn events_for_round(
        &self,
        _session: &SessionId,
        round: u8,
    ) -> Result<Option<Vec<EventDefinition>>, Self::Error> {
        Ok(self.rounds.get(&round).cloned())
    }
}

/// Signal series where tick `n` reads the pair `(series[n], series[n + 1])`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSignals {
    series: Vec<f64>,
}

impl ScriptedSignals {
    #[must_use]
    pub const fn new(series: Vec<f64>) -> Self {
        Self { series }
    }
}

impl SignalFeed for ScriptedSignals {
    type Error = Infallible;

    fn signal_pair(&self, _session: &SessionId, tick: u32) -> Result<Option<(f64, f64)>, Self::Error> {
        let Ok(index) = usize::try_from(tick) else {
            return Ok(None);
        };
        let pair = self
            .series
            .get(index)
            .zip(self.series.get(index + 1))
            .map(|(previous, current)| (*previous, *current));
        Ok(pair)
    }
}

/// Single-threaded session store with optimistic version checks.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RefCell<HashMap<SessionId, FlightSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    type Error = Infallible;

    fn load(&self, id: &SessionId) -> Result<Option<FlightSession>, Self::Error> {
        Ok(self.sessions.borrow().get(id).cloned())
    }

    fn save(
        &self,
        session: &FlightSession,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome, Self::Error> {
        let mut sessions = self.sessions.borrow_mut();
        let found = sessions.get(&session.id).map(|stored| stored.version);
        if found != expected_version {
            return Ok(SaveOutcome::Stale { found });
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(SaveOutcome::Saved)
    }
}
