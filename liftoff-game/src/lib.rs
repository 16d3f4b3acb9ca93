//! Liftoff Flight Engine
//!
//! Platform-agnostic core logic for the Liftoff rocket game: stability
//! evaluation, tick physics, news-event modifiers, the six-round orchestrator
//! and post-flight grading. Nothing here touches I/O; hosts plug in rocket
//! rosters, event decks, signal feeds and session storage through traits.

pub mod choice;
pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod memory;
pub mod numbers;
pub mod physics;
pub mod profile;
pub mod round;
pub mod seed;
pub mod session;
pub mod stability;

use anyhow::Context;

// Re-export commonly used types
pub use choice::{ChoiceResult, judge_choice, judge_choice_with};
pub use classify::{
    Archetype, Ending, EndingDescriptor, FlightReport, SessionStats, Tier, classify_archetype,
    classify_tier, final_ending, summarize_flight,
};
pub use config::{
    ArchetypeCfg, ConfigError, EndingCfg, EngineConfig, EventCfg, FlightCfg, PhysicsCfg, RoundCfg,
    StabilityCfg, TierCfg, TierThreshold,
};
pub use error::{ConflictReason, EngineError, ErrorKind, MissingResource};
pub use events::{
    AffectedStat, EventDefinition, EventResolution, GlobalType, ResolutionBranch, TwistType,
    resolve_event,
};
pub use memory::{MemoryCatalog, MemorySessionStore, ScriptedEvents, ScriptedSignals};
pub use physics::{TickOutcome, tick_physics};
pub use profile::{RocketId, RocketProfile};
pub use round::{
    ComposedModifiers, ResolutionSet, RoundRecord, RoundResult, TickResult, compose,
    resolve_events, resolve_round, sync_tick, view_briefing,
};
pub use seed::{FlightCode, FlightCodeError, parse_flight_code};
pub use session::{FlightMode, FlightSession, FlightStatus, RoundPhase, SessionId};
pub use stability::{StabilityZone, classify_zone, is_stable, resolve_stability, stability_change};

/// Source of rocket profiles, keyed by rocket id.
pub trait RocketCatalog {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up a rocket's stats.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing roster cannot be read.
    fn rocket(&self, id: &RocketId) -> Result<Option<RocketProfile>, Self::Error>;
}

/// Source of the news events active in a round.
pub trait EventFeed {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Events for `round` of the given flight; `None` when no set was published.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be read.
    fn events_for_round(
        &self,
        session: &SessionId,
        round: u8,
    ) -> Result<Option<Vec<EventDefinition>>, Self::Error>;
}

/// Source of consecutive signal readings for continuous flights.
pub trait SignalFeed {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `(previous, current)` readings for the given tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be read.
    fn signal_pair(&self, session: &SessionId, tick: u32) -> Result<Option<(f64, f64)>, Self::Error>;
}

/// Result of an optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The stored version did not match; `found` is `None` when nothing was stored.
    Stale { found: Option<u64> },
}

/// Session persistence with optimistic concurrency.
///
/// The store serializes writers per session: a save only lands when the stored
/// version equals `expected_version` (`None` for a brand new session).
pub trait SessionStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, id: &SessionId) -> Result<Option<FlightSession>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(
        &self,
        session: &FlightSession,
        expected_version: Option<u64>,
    ) -> Result<SaveOutcome, Self::Error>;
}

/// Engine bound to one validated configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightEngine {
    config: EngineConfig,
}

impl FlightEngine {
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the configuration is inconsistent.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn start_flight(&self, id: SessionId, rocket_id: RocketId, mode: FlightMode) -> FlightSession {
        FlightSession::new(id, rocket_id, mode, &self.config)
    }

    /// # Errors
    ///
    /// See [`round::view_briefing`].
    pub fn view_briefing(&self, session: &FlightSession) -> Result<FlightSession, EngineError> {
        view_briefing(session)
    }

    /// # Errors
    ///
    /// See [`round::resolve_round`].
    pub fn resolve_round(
        &self,
        session: &FlightSession,
        round: u8,
        events: &[EventDefinition],
        profile: &RocketProfile,
        fuel_input: f64,
    ) -> Result<(FlightSession, RoundResult), EngineError> {
        resolve_round(session, round, events, profile, fuel_input, &self.config)
    }

    /// Composed modifiers a round would produce, without touching the session.
    ///
    /// # Errors
    ///
    /// See [`round::resolve_events`].
    pub fn preview_round(
        &self,
        events: &[EventDefinition],
        profile: &RocketProfile,
        rocket_id: &RocketId,
    ) -> Result<ComposedModifiers, EngineError> {
        resolve_events(events, profile, rocket_id, &self.config).map(|set| compose(&set))
    }

    /// # Errors
    ///
    /// See [`round::sync_tick`].
    pub fn sync_tick(
        &self,
        session: &FlightSession,
        signals: (f64, f64),
        profile: &RocketProfile,
        fuel_input: f64,
    ) -> Result<(FlightSession, TickResult), EngineError> {
        sync_tick(session, signals, profile, fuel_input, &self.config)
    }

    /// # Errors
    ///
    /// See [`events::resolve_event`].
    pub fn resolve_event(
        &self,
        event: &EventDefinition,
        profile: &RocketProfile,
        rocket_id: &RocketId,
    ) -> Result<EventResolution, EngineError> {
        resolve_event(event, profile, rocket_id, &self.config.events)
    }

    /// # Errors
    ///
    /// See [`physics::tick_physics`].
    pub fn tick_physics(
        &self,
        fuel_input: f64,
        change_rate: f64,
        profile: &RocketProfile,
    ) -> Result<TickOutcome, EngineError> {
        tick_physics(fuel_input, change_rate, profile, &self.config)
    }

    /// # Errors
    ///
    /// See [`choice::judge_choice_with`].
    pub fn judge_choice(
        &self,
        fuel_input: f64,
        is_positive_outcome: bool,
    ) -> Result<ChoiceResult, EngineError> {
        judge_choice_with(fuel_input, is_positive_outcome, &self.config.flight)
    }

    #[must_use]
    pub fn classify_tier(&self, stats: &SessionStats) -> Tier {
        classify_tier(stats, &self.config.tiers)
    }

    #[must_use]
    pub fn classify_archetype(&self, stats: &SessionStats) -> Archetype {
        classify_archetype(stats, &self.config.archetypes)
    }

    #[must_use]
    pub const fn final_ending(&self, correct_answers: u8) -> EndingDescriptor {
        final_ending(correct_answers, &self.config.endings)
    }

    /// # Errors
    ///
    /// See [`classify::summarize_flight`].
    pub fn summarize(&self, session: &FlightSession) -> Result<FlightReport, EngineError> {
        summarize_flight(session, &self.config)
    }
}

/// Request-level facade: loads collaborators, runs the engine, persists the result.
pub struct FlightService<C, F, S, T>
where
    C: RocketCatalog,
    F: EventFeed,
    S: SignalFeed,
    T: SessionStore,
{
    engine: FlightEngine,
    catalog: C,
    events: F,
    signals: S,
    store: T,
}

impl<C, F, S, T> FlightService<C, F, S, T>
where
    C: RocketCatalog,
    F: EventFeed,
    S: SignalFeed,
    T: SessionStore,
{
    pub const fn new(engine: FlightEngine, catalog: C, events: F, signals: S, store: T) -> Self {
        Self {
            engine,
            catalog,
            events,
            signals,
            store,
        }
    }

    #[must_use]
    pub const fn engine(&self) -> &FlightEngine {
        &self.engine
    }

    /// Create and persist a new flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the rocket is unknown, the id is taken, or a
    /// collaborator fails.
    pub fn start_flight(
        &self,
        id: SessionId,
        rocket_id: RocketId,
        mode: FlightMode,
    ) -> anyhow::Result<FlightSession> {
        self.profile(&rocket_id)?;
        let session = self.engine.start_flight(id, rocket_id, mode);
        self.persist(&session, None)?;
        log::info!(
            target: constants::LOG_TARGET_FLIGHT,
            "flight {} started in {} mode with rocket {}",
            session.id,
            session.mode,
            session.rocket_id
        );
        Ok(session)
    }

    /// Load a flight.
    ///
    /// # Errors
    ///
    /// Returns [`MissingResource::Session`] for an unknown id.
    pub fn session(&self, id: &SessionId) -> anyhow::Result<FlightSession> {
        self.store
            .load(id)
            .with_context(|| format!("loading flight {id}"))?
            .ok_or_else(|| EngineError::from(MissingResource::Session(id.clone())).into())
    }

    /// # Errors
    ///
    /// Returns an error if the flight is missing, not in its briefing phase,
    /// or was changed concurrently.
    pub fn view_briefing(&self, id: &SessionId) -> anyhow::Result<FlightSession> {
        let session = self.session(id)?;
        let next = self.engine.view_briefing(&session)?;
        self.persist(&next, Some(session.version))?;
        Ok(next)
    }

    /// Resolve the player's decision for `round`.
    ///
    /// # Errors
    ///
    /// Returns an error if the flight, rocket or event set is missing, the
    /// engine rejects the request, or the flight was changed concurrently.
    pub fn submit_round(
        &self,
        id: &SessionId,
        round: u8,
        fuel_input: f64,
    ) -> anyhow::Result<RoundResult> {
        let session = self.session(id)?;
        session.ensure_in_progress()?;
        session.ensure_mode(FlightMode::Rounds)?;
        session.ensure_round(round)?;
        session.ensure_phase(RoundPhase::Playing)?;
        let profile = self.profile(&session.rocket_id)?;
        let events = self
            .events
            .events_for_round(id, round)
            .with_context(|| format!("reading events for round {round} of flight {id}"))?
            .ok_or_else(|| {
                EngineError::from(MissingResource::EventSet {
                    session: id.clone(),
                    round,
                })
            })?;
        let (next, result) = self
            .engine
            .resolve_round(&session, round, &events, &profile, fuel_input)?;
        self.persist(&next, Some(session.version))?;
        Ok(result)
    }

    /// Advance a continuous flight by one tick of its signal feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the flight, rocket or signal pair is missing, the
    /// engine rejects the request, or the flight was changed concurrently.
    pub fn sync_tick(&self, id: &SessionId, fuel_input: f64) -> anyhow::Result<TickResult> {
        let session = self.session(id)?;
        session.ensure_in_progress()?;
        session.ensure_mode(FlightMode::Continuous)?;
        let profile = self.profile(&session.rocket_id)?;
        let pair = self
            .signals
            .signal_pair(id, session.ticks)
            .with_context(|| format!("reading signal tick {} of flight {id}", session.ticks))?
            .ok_or_else(|| {
                EngineError::from(MissingResource::SignalPair {
                    session: id.clone(),
                    tick: session.ticks,
                })
            })?;
        let (next, result) = self.engine.sync_tick(&session, pair, &profile, fuel_input)?;
        self.persist(&next, Some(session.version))?;
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns an error if the flight is missing or still in progress.
    pub fn report(&self, id: &SessionId) -> anyhow::Result<FlightReport> {
        let session = self.session(id)?;
        Ok(self.engine.summarize(&session)?)
    }

    fn profile(&self, rocket_id: &RocketId) -> anyhow::Result<RocketProfile> {
        let profile = self
            .catalog
            .rocket(rocket_id)
            .with_context(|| format!("looking up rocket {rocket_id}"))?
            .ok_or_else(|| EngineError::from(MissingResource::Rocket(rocket_id.clone())))?;
        profile.validate()?;
        Ok(profile)
    }

    fn persist(&self, session: &FlightSession, expected: Option<u64>) -> anyhow::Result<()> {
        let outcome = self
            .store
            .save(session, expected)
            .with_context(|| format!("saving flight {}", session.id))?;
        match outcome {
            SaveOutcome::Saved => Ok(()),
            SaveOutcome::Stale { found } => {
                log::warn!(
                    target: constants::LOG_TARGET_FLIGHT,
                    "stale write to flight {} (expected {expected:?}, found {found:?})",
                    session.id
                );
                Err(EngineError::from(ConflictReason::StaleVersion {
                    session: session.id.clone(),
                    expected: expected.unwrap_or_default(),
                    found: found.unwrap_or_default(),
                })
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Service =
        FlightService<MemoryCatalog, ScriptedEvents, ScriptedSignals, MemorySessionStore>;

    fn service() -> Service {
        let catalog = MemoryCatalog::default()
            .with_rocket(RocketId::new("falcon"), RocketProfile::new(1.0, 2.0, 1.0));
        let events = (1..=6).fold(ScriptedEvents::default(), |feed, round| {
            feed.with_round(
                round,
                vec![EventDefinition::global(GlobalType::BearTrap, 1.0, 0.2)],
            )
        });
        let signals = ScriptedSignals::new(vec![100.0, 104.0, 101.0]);
        FlightService::new(
            FlightEngine::default(),
            catalog,
            events,
            signals,
            MemorySessionStore::default(),
        )
    }

    fn engine_error(err: &anyhow::Error) -> &EngineError {
        err.downcast_ref::<EngineError>().expect("engine error")
    }

    #[test]
    fn engine_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.rounds.total_rounds = 0;
        let err = FlightEngine::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn service_plays_a_full_rounds_flight() {
        let service = service();
        let id = SessionId::new("svc-1");
        service
            .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
            .unwrap();
        for round in 1..=6 {
            service.view_briefing(&id).unwrap();
            let result = service.submit_round(&id, round, 100.0).unwrap();
            assert!(result.modifiers.overall_positive);
        }
        let session = service.session(&id).unwrap();
        assert_eq!(session.status, FlightStatus::Completed);
        assert_eq!(session.version, 12);
        let report = service.report(&id).unwrap();
        assert_eq!(report.correct_answers, 6);
        assert_eq!(report.ending.map(|d| d.ending), Some(Ending::DeepSpace));

        let err = service.submit_round(&id, 6, 50.0).unwrap_err();
        assert_eq!(engine_error(&err).kind(), ErrorKind::Conflict);
    }

    #[test]
    fn missing_collaborator_data_is_not_found() {
        let service = service();
        let err = service
            .start_flight(SessionId::new("x"), RocketId::new("ghost"), FlightMode::Rounds)
            .unwrap_err();
        assert_eq!(
            engine_error(&err),
            &EngineError::NotFound(MissingResource::Rocket(RocketId::new("ghost")))
        );

        let err = service.view_briefing(&SessionId::new("nope")).unwrap_err();
        assert_eq!(engine_error(&err).kind(), ErrorKind::NotFound);

        let id = SessionId::new("ticks");
        service
            .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Continuous)
            .unwrap();
        service.sync_tick(&id, 40.0).unwrap();
        service.sync_tick(&id, 40.0).unwrap();
        let err = service.sync_tick(&id, 40.0).unwrap_err();
        assert_eq!(
            engine_error(&err),
            &EngineError::NotFound(MissingResource::SignalPair {
                session: id.clone(),
                tick: 2
            })
        );
        assert_eq!(service.session(&id).unwrap().ticks, 2);
    }

    #[test]
    fn duplicate_flight_ids_conflict() {
        let service = service();
        let id = SessionId::new("dup");
        service
            .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
            .unwrap();
        let err = service
            .start_flight(id, RocketId::new("falcon"), FlightMode::Rounds)
            .unwrap_err();
        assert_eq!(engine_error(&err).kind(), ErrorKind::Conflict);
    }

    #[test]
    fn report_waits_for_the_flight_to_end() {
        let service = service();
        let id = SessionId::new("early");
        service
            .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
            .unwrap();
        let err = service.report(&id).unwrap_err();
        assert_eq!(
            engine_error(&err),
            &EngineError::Conflict(ConflictReason::StillInProgress { session: id })
        );
    }
}
