use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;
use liftoff_game::{
    FlightEngine, FlightMode, FlightReport, FlightService, FlightSession, FlightStatus,
    MemorySessionStore, ScriptedEvents, ScriptedSignals, SessionId, stability_change,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::logic::feeds::{EventScript, RosterEntry, TesterAssets, random_walk, signal_feed};
use crate::logic::policy::{PilotPolicy, PilotStrategy, RoundView, TickView};

const DEFAULT_MAX_TICKS: u32 = 400;

/// One flight to simulate.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: FlightMode,
    pub strategy: PilotStrategy,
    pub seed: u64,
    pub flight_code: String,
    /// Continuous flights still running after this many ticks are halted.
    pub max_ticks: u32,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(mode: FlightMode, strategy: PilotStrategy, seed: u64, flight_code: String) -> Self {
        Self {
            mode,
            strategy,
            seed,
            flight_code,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    #[must_use]
    pub const fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    fn session_id(&self) -> SessionId {
        SessionId::new(format!(
            "{}-{}-{}",
            self.mode,
            self.strategy.key(),
            self.seed
        ))
    }
}

/// Snapshot of one pilot decision.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    /// Round number, or tick index in continuous mode.
    pub step: u32,
    pub fuel_input: f64,
    pub favourable: bool,
    pub rationale: Option<String>,
}

/// Everything the reports need about one simulated flight.
#[derive(Debug, Clone)]
pub struct FlightSummary {
    pub mode: FlightMode,
    pub strategy: PilotStrategy,
    pub rocket: RosterEntry,
    pub seed: u64,
    pub flight_code: String,
    pub session: FlightSession,
    /// `None` when the flight was halted before reaching a terminal state.
    pub report: Option<FlightReport>,
    pub decisions: Vec<DecisionRecord>,
    pub violations: Vec<String>,
    pub duration: Duration,
}

impl FlightSummary {
    #[must_use]
    pub const fn halted(&self) -> bool {
        !self.session.is_terminal()
    }
}

/// Deterministic flight harness: one in-memory service per flight.
#[derive(Debug, Clone)]
pub struct FlightSimulator {
    engine: FlightEngine,
    assets: Arc<TesterAssets>,
    verbose: bool,
}

impl FlightSimulator {
    #[must_use]
    pub const fn new(engine: FlightEngine, assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self {
            engine,
            assets,
            verbose,
        }
    }

    /// Fly one plan to completion, failure or the tick cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects a request the pilot made.
    pub fn run(&self, plan: &SimulationPlan) -> Result<FlightSummary> {
        let start = Instant::now();
        let rocket = self.assets.rocket_for_seed(plan.seed).clone();
        let mut rng = ChaCha20Rng::seed_from_u64(plan.seed);
        let mut policy = plan.strategy.create_policy(plan.seed);
        log::debug!(
            "{} flying {} under the {} pilot",
            plan.flight_code,
            rocket.id,
            policy.name()
        );

        let (session, decisions, violations) = match plan.mode {
            FlightMode::Rounds => self.fly_rounds(plan, &rocket, &mut rng, policy.as_mut()),
            FlightMode::Continuous => {
                self.fly_continuous(plan, &rocket, &mut rng, policy.as_mut())
            }
        }
        .with_context(|| {
            format!(
                "{} flight {} ({}) with rocket {}",
                plan.mode, plan.flight_code, plan.strategy, rocket.id
            )
        })?;

        let report = if session.is_terminal() {
            Some(self.engine.summarize(&session)?)
        } else {
            None
        };

        if self.verbose {
            let outcome = match session.status {
                FlightStatus::Completed => "completed".green(),
                FlightStatus::Failed => "failed".red(),
                FlightStatus::InProgress => "halted".yellow(),
            };
            println!(
                "  🚀 {} {} [{}] {} - distance {:.0}/{:.0}, fuel {:.1}, hull {:.1}",
                plan.flight_code.bright_white(),
                plan.strategy,
                rocket.name,
                outcome,
                session.distance,
                session.target_distance,
                session.current_fuel,
                session.current_hull
            );
            for decision in &decisions {
                if let Some(rationale) = &decision.rationale {
                    let mark = if decision.favourable { "+" } else { "-" };
                    println!(
                        "     {mark} step {}: input {:.0} ({rationale})",
                        decision.step, decision.fuel_input
                    );
                }
            }
        }

        Ok(FlightSummary {
            mode: plan.mode,
            strategy: plan.strategy,
            rocket,
            seed: plan.seed,
            flight_code: plan.flight_code.clone(),
            session,
            report,
            decisions,
            violations,
            duration: start.elapsed(),
        })
    }

    fn fly_rounds(
        &self,
        plan: &SimulationPlan,
        rocket: &RosterEntry,
        rng: &mut ChaCha20Rng,
        policy: &mut dyn PilotPolicy,
    ) -> Result<FlightRun> {
        let script = EventScript::draw(
            self.assets.deck(),
            self.engine.config().rounds.total_rounds,
            rng,
        );
        let service = FlightService::new(
            self.engine.clone(),
            self.assets.catalog(),
            script.to_feed(),
            ScriptedSignals::default(),
            MemorySessionStore::default(),
        );
        let id = plan.session_id();
        let mut session = service.start_flight(id.clone(), rocket.id.clone(), FlightMode::Rounds)?;
        let mut decisions = Vec::new();
        let mut violations = Vec::new();

        while !session.is_terminal() {
            let briefed = service.view_briefing(&id)?;
            let round = briefed.current_round;
            let preview = self
                .engine
                .preview_round(script.round(round), &rocket.profile, &rocket.id)?;
            let decision = policy.round_input(&RoundView {
                session: &briefed,
                round,
                preview,
            });
            let result = service.submit_round(&id, round, decision.fuel_input)?;
            let next = service.session(&id)?;

            violations.extend(check_invariants(&briefed, &next));
            if result.modifiers != preview {
                violations.push(format!(
                    "round {round}: preview {preview:?} disagreed with resolution {:?}",
                    result.modifiers
                ));
            }
            log::debug!(
                "{id} round {round}: input {:.0}, positive {}, correct {}",
                decision.fuel_input,
                result.modifiers.overall_positive,
                result.choice.is_correct_choice
            );
            decisions.push(DecisionRecord {
                step: u32::from(round),
                fuel_input: decision.fuel_input,
                favourable: result.modifiers.overall_positive,
                rationale: decision.rationale,
            });
            session = next;
        }

        Ok((session, decisions, violations))
    }

    fn fly_continuous(
        &self,
        plan: &SimulationPlan,
        rocket: &RosterEntry,
        rng: &mut ChaCha20Rng,
        policy: &mut dyn PilotPolicy,
    ) -> Result<FlightRun> {
        let len = usize::try_from(plan.max_ticks)?.saturating_add(1);
        let series = random_walk(len, rng);
        let changes: Vec<f64> = series
            .windows(2)
            .map(|pair| stability_change(pair[1], pair[0]))
            .collect();
        let service = FlightService::new(
            self.engine.clone(),
            self.assets.catalog(),
            ScriptedEvents::default(),
            signal_feed(&series),
            MemorySessionStore::default(),
        );
        let id = plan.session_id();
        let mut session =
            service.start_flight(id.clone(), rocket.id.clone(), FlightMode::Continuous)?;
        let mut decisions = Vec::new();
        let mut violations = Vec::new();

        while !session.is_terminal() && session.ticks < plan.max_ticks {
            let tick = usize::try_from(session.ticks)?;
            let decision = policy.tick_input(&TickView {
                session: &session,
                last_change: tick.checked_sub(1).and_then(|i| changes.get(i)).copied(),
                upcoming_change: changes.get(tick).copied(),
            });
            let result = service.sync_tick(&id, decision.fuel_input)?;
            let next = service.session(&id)?;

            violations.extend(check_invariants(&session, &next));
            decisions.push(DecisionRecord {
                step: result.tick,
                fuel_input: decision.fuel_input,
                favourable: result.outcome.zone.is_stable(),
                rationale: decision.rationale,
            });
            session = next;
        }

        if !session.is_terminal() {
            log::info!("{id} halted after {} ticks", session.ticks);
        }
        Ok((session, decisions, violations))
    }
}

type FlightRun = (FlightSession, Vec<DecisionRecord>, Vec<String>);

/// Clamp and bookkeeping checks across one engine mutation.
#[must_use]
pub fn check_invariants(previous: &FlightSession, next: &FlightSession) -> Vec<String> {
    let mut violations = Vec::new();
    let step = format!("{} v{}", next.id, next.version);

    if !(0.0..=100.0).contains(&next.current_fuel) {
        violations.push(format!("{step}: fuel {} out of range", next.current_fuel));
    }
    if !(0.0..=100.0).contains(&next.current_hull) {
        violations.push(format!("{step}: hull {} out of range", next.current_hull));
    }
    if !(0.0..=next.target_distance).contains(&next.distance) {
        violations.push(format!(
            "{step}: distance {} outside [0, {}]",
            next.distance, next.target_distance
        ));
    }
    if next.total_fuel_used < previous.total_fuel_used {
        violations.push(format!("{step}: total fuel used went backwards"));
    }
    if next.version != previous.version.wrapping_add(1) {
        violations.push(format!(
            "{step}: expected version {} after one mutation",
            previous.version.wrapping_add(1)
        ));
    }
    if usize::from(next.correct_answers) > next.rounds.len() {
        violations.push(format!(
            "{step}: {} correct answers in {} rounds",
            next.correct_answers,
            next.rounds.len()
        ));
    }
    if next.rounds.len() > usize::from(next.total_rounds) {
        violations.push(format!("{step}: more rounds than the flight allows"));
    }
    match next.status {
        FlightStatus::Failed if !next.is_exhausted() => {
            violations.push(format!("{step}: failed with fuel and hull left"));
        }
        FlightStatus::Completed if next.mode == FlightMode::Continuous && !next.has_arrived() => {
            violations.push(format!("{step}: completed short of the target"));
        }
        FlightStatus::InProgress if next.is_exhausted() => {
            violations.push(format!("{step}: still in progress with an empty gauge"));
        }
        _ => {}
    }
    violations
}
