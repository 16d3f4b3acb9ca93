use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use liftoff_game::{Archetype, FlightMode, FlightReport, FlightStatus, Tier};
use liftoff_game::numbers::{percent, round_to, usize_to_f64};
use serde::Serialize;

use crate::logic::policy::PilotStrategy;
use crate::logic::simulation::FlightSummary;
use crate::logic::tester::{SweepFailure, SweepOutcome};

/// Per (mode, strategy) roll-up of simulated flights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyAggregate {
    pub mode: FlightMode,
    pub strategy: String,
    pub flights: usize,
    pub completed: usize,
    pub failed: usize,
    pub halted: usize,
    pub completion_rate: f64,
    pub failure_rate: f64,
    pub mean_distance: f64,
    pub mean_fuel: f64,
    pub mean_hull: f64,
    /// Share of rounds called correctly; rounds mode only.
    pub mean_accuracy: Option<f64>,
    pub tiers: BTreeMap<String, usize>,
    pub archetypes: BTreeMap<String, usize>,
    pub endings: BTreeMap<String, usize>,
    pub violations: usize,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0.0
    } else {
        round_to(sum / usize_to_f64(count), 2)
    }
}

fn rate(part: usize, whole: usize) -> f64 {
    round_to(percent(usize_to_f64(part), usize_to_f64(whole)), 1)
}

fn aggregate_group(
    mode: FlightMode,
    strategy: PilotStrategy,
    flights: &[&FlightSummary],
) -> StrategyAggregate {
    let total = flights.len();
    let completed = flights
        .iter()
        .filter(|f| f.session.status == FlightStatus::Completed)
        .count();
    let failed = flights
        .iter()
        .filter(|f| f.session.status == FlightStatus::Failed)
        .count();
    let halted = flights.iter().filter(|f| f.halted()).count();

    let mut tiers = BTreeMap::new();
    let mut archetypes = BTreeMap::new();
    let mut endings = BTreeMap::new();
    for report in flights.iter().filter_map(|f| f.report.as_ref()) {
        *tiers.entry(report.tier.to_string()).or_insert(0) += 1;
        *archetypes.entry(report.archetype.key().to_string()).or_insert(0) += 1;
        if let Some(ending) = report.ending {
            *endings.entry(ending.key.to_string()).or_insert(0) += 1;
        }
    }

    let mean_accuracy = (mode == FlightMode::Rounds).then(|| {
        mean(
            flights
                .iter()
                .filter_map(|f| f.report.as_ref())
                .map(|report| report.accuracy_pct),
        )
    });

    StrategyAggregate {
        mode,
        strategy: strategy.key().to_string(),
        flights: total,
        completed,
        failed,
        halted,
        completion_rate: rate(completed, total),
        failure_rate: rate(failed, total),
        mean_distance: mean(flights.iter().map(|f| f.session.distance)),
        mean_fuel: mean(flights.iter().map(|f| f.session.current_fuel)),
        mean_hull: mean(flights.iter().map(|f| f.session.current_hull)),
        mean_accuracy,
        tiers,
        archetypes,
        endings,
        violations: flights.iter().map(|f| f.violations.len()).sum(),
    }
}

/// Group flights by mode then strategy, in a stable order.
#[must_use]
pub fn aggregate_flights(flights: &[FlightSummary]) -> Vec<StrategyAggregate> {
    let mut groups: BTreeMap<(FlightMode, PilotStrategy), Vec<&FlightSummary>> = BTreeMap::new();
    for flight in flights {
        groups
            .entry((flight.mode, flight.strategy))
            .or_default()
            .push(flight);
    }
    groups
        .into_iter()
        .map(|((mode, strategy), group)| aggregate_group(mode, strategy, &group))
        .collect()
}

#[derive(Serialize)]
struct FlightRow<'a> {
    mode: FlightMode,
    strategy: &'static str,
    rocket: &'a str,
    flight_code: &'a str,
    seed: u64,
    status: FlightStatus,
    distance: f64,
    fuel: f64,
    hull: f64,
    correct_answers: u8,
    ticks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a FlightReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<&'a [String]>,
}

impl<'a> From<&'a FlightSummary> for FlightRow<'a> {
    fn from(flight: &'a FlightSummary) -> Self {
        Self {
            mode: flight.mode,
            strategy: flight.strategy.key(),
            rocket: flight.rocket.id.as_str(),
            flight_code: &flight.flight_code,
            seed: flight.seed,
            status: flight.session.status,
            distance: flight.session.distance,
            fuel: flight.session.current_fuel,
            hull: flight.session.current_hull,
            correct_answers: flight.session.correct_answers,
            ticks: flight.session.ticks,
            report: flight.report.as_ref(),
            violations: (!flight.violations.is_empty()).then_some(flight.violations.as_slice()),
        }
    }
}

#[derive(Serialize)]
struct FailureRow<'a> {
    mode: FlightMode,
    strategy: &'static str,
    seed: u64,
    error: &'a str,
}

impl<'a> From<&'a SweepFailure> for FailureRow<'a> {
    fn from(failure: &'a SweepFailure) -> Self {
        Self {
            mode: failure.mode,
            strategy: failure.strategy.key(),
            seed: failure.seed,
            error: &failure.error,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    passed: bool,
    aggregates: &'a [StrategyAggregate],
    flights: Vec<FlightRow<'a>>,
    failures: Vec<FailureRow<'a>>,
}

/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    outcome: &SweepOutcome,
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        passed: outcome.passed(),
        aggregates,
        flights: outcome.flights.iter().map(FlightRow::from).collect(),
        failures: outcome.failures.iter().map(FailureRow::from).collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

fn histogram(counts: &BTreeMap<String, usize>) -> String {
    if counts.is_empty() {
        return "-".to_string();
    }
    counts
        .iter()
        .map(|(key, count)| format!("{key}:{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tier counts best grade first.
fn tier_histogram(counts: &BTreeMap<String, usize>) -> String {
    let parts: Vec<String> = Tier::ALL
        .iter()
        .filter_map(|tier| {
            counts
                .get(&tier.to_string())
                .map(|count| format!("{tier}:{count}"))
        })
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

fn archetype_histogram(counts: &BTreeMap<String, usize>) -> String {
    let parts: Vec<String> = Archetype::ALL
        .iter()
        .filter_map(|archetype| {
            counts
                .get(archetype.key())
                .map(|count| format!("{} {count}", archetype.title()))
        })
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

/// # Errors
///
/// Returns an error if the write fails.
pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    outcome: &SweepOutcome,
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    writeln!(writer, "# Liftoff Flight Sweep Results\n")?;
    writeln!(writer, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Flights**: {}", outcome.flights.len())?;
    writeln!(writer, "- **Engine errors**: {}", outcome.failures.len())?;
    writeln!(writer, "- **Flights with violations**: {}\n", outcome.violation_count())?;

    writeln!(writer, "## Strategies\n")?;
    writeln!(
        writer,
        "| Mode | Strategy | Flights | Completed % | Failed % | Halted | Mean distance | Mean accuracy | Tiers | Endings |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|---|---|")?;
    for agg in aggregates {
        let accuracy = agg
            .mean_accuracy
            .map_or_else(|| "-".to_string(), |value| format!("{value:.1}%"));
        writeln!(
            writer,
            "| {} | {} | {} | {:.1} | {:.1} | {} | {:.1} | {} | {} | {} |",
            agg.mode,
            agg.strategy,
            agg.flights,
            agg.completion_rate,
            agg.failure_rate,
            agg.halted,
            agg.mean_distance,
            accuracy,
            histogram(&agg.tiers),
            histogram(&agg.endings)
        )?;
    }

    let troubled: Vec<&FlightSummary> = outcome
        .flights
        .iter()
        .filter(|flight| !flight.violations.is_empty())
        .collect();
    if !troubled.is_empty() || !outcome.failures.is_empty() {
        writeln!(writer, "\n## Problems\n")?;
        for flight in troubled {
            for violation in &flight.violations {
                writeln!(writer, "- `{}` {violation}", flight.flight_code)?;
            }
        }
        for failure in &outcome.failures {
            writeln!(
                writer,
                "- {} / {} / seed {}: {}",
                failure.mode,
                failure.strategy.key(),
                failure.seed,
                failure.error
            )?;
        }
    }
    Ok(())
}

/// One row per flight.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn generate_csv_report<W: Write + ?Sized>(
    writer: &mut W,
    flights: &[FlightSummary],
) -> Result<()> {
    writeln!(
        writer,
        "mode,strategy,rocket,flight_code,seed,status,tier,archetype,ending,distance,fuel,hull,total_fuel_used,correct_answers,ticks,violations"
    )?;
    for flight in flights {
        let session = &flight.session;
        let (tier, archetype, ending) = flight.report.as_ref().map_or_else(
            || (String::new(), String::new(), String::new()),
            |report| {
                (
                    report.tier.to_string(),
                    report.archetype.key().to_string(),
                    report
                        .ending
                        .map(|ending| ending.key.to_string())
                        .unwrap_or_default(),
                )
            },
        );
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{:.2},{:.2},{:.2},{:.2},{},{},{}",
            flight.mode,
            flight.strategy.key(),
            flight.rocket.id,
            flight.flight_code,
            flight.seed,
            session.status,
            tier,
            archetype,
            ending,
            session.distance,
            session.current_fuel,
            session.current_hull,
            session.total_fuel_used,
            session.correct_answers,
            session.ticks,
            flight.violations.len()
        )?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the write fails.
pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    outcome: &SweepOutcome,
    aggregates: &[StrategyAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Flight Sweep Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=======================".cyan())?;
    writeln!(writer, "Flights: {}", outcome.flights.len())?;
    writeln!(
        writer,
        "Engine errors: {}",
        if outcome.failures.is_empty() {
            "0".green()
        } else {
            outcome.failures.len().to_string().red()
        }
    )?;
    let violations = outcome.violation_count();
    writeln!(
        writer,
        "Flights with violations: {}",
        if violations == 0 {
            "0".green()
        } else {
            violations.to_string().red()
        }
    )?;
    writeln!(writer, "Sweep time: {total_duration:?}")?;
    writeln!(writer)?;

    for agg in aggregates {
        let status = if agg.violations == 0 {
            "✅".green()
        } else {
            "❌".red()
        };
        writeln!(
            writer,
            "{status} {} / {}",
            agg.mode.to_string().bold(),
            agg.strategy.bold()
        )?;
        writeln!(
            writer,
            "   Flights: {} (completed {:.1}%, failed {:.1}%, halted {})",
            agg.flights, agg.completion_rate, agg.failure_rate, agg.halted
        )?;
        writeln!(
            writer,
            "   Mean distance {:.1}, fuel {:.1}, hull {:.1}",
            agg.mean_distance, agg.mean_fuel, agg.mean_hull
        )?;
        if let Some(accuracy) = agg.mean_accuracy {
            writeln!(writer, "   Mean accuracy: {accuracy:.1}%")?;
        }
        writeln!(writer, "   Tiers: {}", tier_histogram(&agg.tiers))?;
        writeln!(writer, "   Archetypes: {}", archetype_histogram(&agg.archetypes))?;
        if !agg.endings.is_empty() {
            writeln!(writer, "   Endings: {}", histogram(&agg.endings))?;
        }
        writeln!(writer)?;
    }

    if let Some(slowest) = outcome.flights.iter().max_by_key(|flight| flight.duration) {
        writeln!(writer, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(writer, "{}", "=====================".yellow())?;
        writeln!(
            writer,
            "Slowest flight: {} ({:?})",
            slowest.flight_code.yellow(),
            slowest.duration
        )?;
        writeln!(writer)?;
    }

    if !outcome.failures.is_empty() {
        writeln!(writer, "{}", "Engine errors:".red().bold())?;
        for failure in &outcome.failures {
            writeln!(writer, "     • {}", failure.error.red())?;
        }
    }
    Ok(())
}
