mod logic;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use liftoff_game::{EngineConfig, FlightEngine, FlightMode};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use logic::{
    FlightSimulator, PilotStrategy, QaTester, SweepOutcome, SweepPlan, TesterAssets,
    aggregate_flights, resolve_seed_inputs,
};
use util::split_csv;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestMode {
    /// Six-round news flights
    Rounds,
    /// Signal-driven tick flights
    Continuous,
    /// Sweep both flight modes
    Both,
}

impl TestMode {
    fn flight_modes(self) -> Vec<FlightMode> {
        match self {
            Self::Rounds => vec![FlightMode::Rounds],
            Self::Continuous => vec![FlightMode::Continuous],
            Self::Both => vec![FlightMode::Rounds, FlightMode::Continuous],
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "liftoff-tester", version = "0.1.0")]
#[command(about = "Automated QA sweeps for the Liftoff flight engine")]
struct Args {
    /// Flight mode to sweep
    #[arg(long, value_enum, default_value_t = TestMode::Both)]
    mode: TestMode,

    /// Pilot strategies to fly (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated integers, flight codes, "all", or free text)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of consecutive seeds flown per listed seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Tick cap for continuous flights
    #[arg(long, default_value_t = 400)]
    max_ticks: u32,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON overlay for the engine configuration
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let engine = load_engine(args.config.as_deref())?;
    let strategies = expand_strategies(&args.strategies)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let assets = Arc::new(TesterAssets::load_default()?);
    let tester = QaTester::new(
        FlightSimulator::new(engine, assets, args.verbose),
        args.verbose,
    );

    let outcome = tester.run_sweep(&SweepPlan {
        modes: args.mode.flight_modes(),
        strategies,
        seeds,
        iterations: args.iterations,
        max_ticks: Some(args.max_ticks),
    });

    write_reports(&args, &outcome, start_time)?;

    if !outcome.passed() {
        eprintln!(
            "❌ {} flights broke an invariant, {} hit engine errors",
            outcome.violation_count(),
            outcome.failures.len()
        );
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in PilotStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:15} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚀 Liftoff Flight Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn load_engine(overlay: Option<&Path>) -> Result<FlightEngine> {
    let config = match overlay {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("invalid engine config in {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    Ok(FlightEngine::new(config)?)
}

fn expand_strategies(arg: &str) -> Result<Vec<PilotStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(arg) {
        if token.eq_ignore_ascii_case("all") {
            strategies.extend(PilotStrategy::ALL);
        } else {
            strategies.push(token.parse::<PilotStrategy>()?);
        }
    }
    if strategies.is_empty() {
        strategies.extend(PilotStrategy::ALL);
    }
    strategies.sort_unstable();
    strategies.dedup();
    Ok(strategies)
}

fn write_reports(args: &Args, outcome: &SweepOutcome, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let aggregates = aggregate_flights(&outcome.flights);

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, outcome, &aggregates)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, outcome, &aggregates)?;
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, &outcome.flights)?,
        _ => {
            if outcome.flights.is_empty() && outcome.failures.is_empty() {
                writeln!(&mut output_target, "No flights executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    outcome,
                    &aggregates,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
