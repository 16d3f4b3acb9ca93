use colored::Colorize;
use liftoff_game::FlightMode;

use crate::logic::policy::PilotStrategy;
use crate::logic::seeds::SeedInfo;
use crate::logic::simulation::{FlightSimulator, FlightSummary, SimulationPlan};

/// Cross product of modes, strategies and seeds to fly.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub modes: Vec<FlightMode>,
    pub strategies: Vec<PilotStrategy>,
    pub seeds: Vec<SeedInfo>,
    pub iterations: usize,
    pub max_ticks: Option<u32>,
}

/// A flight the engine refused to finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub mode: FlightMode,
    pub strategy: PilotStrategy,
    pub seed: u64,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub flights: Vec<FlightSummary>,
    pub failures: Vec<SweepFailure>,
}

impl SweepOutcome {
    /// Flights that broke a gauge or bookkeeping invariant.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.flights
            .iter()
            .filter(|flight| !flight.violations.is_empty())
            .count()
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.violation_count() == 0
    }
}

pub struct QaTester {
    simulator: FlightSimulator,
    verbose: bool,
}

impl QaTester {
    #[must_use]
    pub const fn new(simulator: FlightSimulator, verbose: bool) -> Self {
        Self { simulator, verbose }
    }

    #[must_use]
    pub fn run_sweep(&self, plan: &SweepPlan) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        for &mode in &plan.modes {
            for &strategy in &plan.strategies {
                if self.verbose {
                    println!(
                        "🧪 Flying {} with {}",
                        mode.to_string().bright_white(),
                        strategy.label().bright_white()
                    );
                }
                for info in plan.seeds.iter().filter(|info| info.matches_mode(mode)) {
                    self.run_seed(plan, mode, strategy, info, &mut outcome);
                }
            }
        }

        outcome
    }

    fn run_seed(
        &self,
        plan: &SweepPlan,
        mode: FlightMode,
        strategy: PilotStrategy,
        info: &SeedInfo,
        outcome: &mut SweepOutcome,
    ) {
        for i in 0..plan.iterations.max(1) {
            let seed = info.seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let code = if i == 0 {
                info.flight_code_for_mode(mode)
            } else {
                SeedInfo::from_numeric(seed).flight_code_for_mode(mode)
            };
            let mut simulation = SimulationPlan::new(mode, strategy, seed, code);
            if let Some(max_ticks) = plan.max_ticks {
                simulation = simulation.with_max_ticks(max_ticks);
            }

            match self.simulator.run(&simulation) {
                Ok(summary) => {
                    for violation in &summary.violations {
                        log::error!("{}: {violation}", summary.flight_code);
                    }
                    outcome.flights.push(summary);
                }
                Err(err) => {
                    log::error!("{err:#}");
                    outcome.failures.push(SweepFailure {
                        mode,
                        strategy,
                        seed,
                        error: format!("{err:#}"),
                    });
                }
            }
        }
    }
}
