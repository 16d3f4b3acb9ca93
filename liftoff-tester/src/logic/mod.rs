pub mod feeds;
pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use feeds::TesterAssets;
pub use policy::PilotStrategy;
pub use reports::aggregate_flights;
pub use seeds::resolve_seed_inputs;
pub use simulation::FlightSimulator;
pub use tester::{QaTester, SweepOutcome, SweepPlan};
