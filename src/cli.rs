use serde::Serialize;

use crate::ballistics::{export_trace_csv, ShotOutcome};
use crate::data::{load_scenario, validate_scenario, Scenario, DEFAULT_SCENARIO_PATH};
use crate::parallel::{analyze_dispersion, WorkerPool};
use crate::turn::TurnResolution;

const USAGE: &str = "usage: ordnance <simulate|resolve|validate|spread> [scenario.yaml] [options]";
const DEFAULT_SPREAD_SAMPLES: usize = 200;

/// Options that consume the following argument.
const VALUE_FLAGS: &[&str] = &["--csv", "--workers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Resolve,
    Validate,
    Spread,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("resolve") => Some(Command::Resolve),
        Some("validate") => Some(Command::Validate),
        Some("spread") => Some(Command::Spread),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args),
        Some(Command::Resolve) => handle_resolve(args),
        Some(Command::Validate) => handle_validate(args),
        Some(Command::Spread) => handle_spread(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

#[derive(Serialize)]
struct ShotReport<'a> {
    seed: u64,
    resolution: &'a TurnResolution,
    outcome: &'a ShotOutcome,
}

fn handle_simulate(args: &[String]) -> i32 {
    let Some(scenario) = scenario_arg(args) else {
        return 1;
    };
    let armament = match scenario.armament() {
        Ok(armament) => armament,
        Err(err) => {
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };
    let config = scenario.engine.clone().with_env_overrides();
    let (resolution, outcome) = match armament.fire(&scenario.input, &config) {
        Ok(fired) => fired,
        Err(err) => {
            eprintln!("simulate failed: {err}");
            return 1;
        }
    };

    if let Some(path) = flag_value(args, "--csv") {
        if let Err(err) = export_trace_csv(&outcome, path) {
            eprintln!("failed to write trace csv '{path}': {err}");
            return 1;
        }
    }

    if has_flag(args, "--table") {
        let attrs = &resolution.ballistic_attributes;
        println!("seed\tangle_deg\tinitial_velocity\tflight_time\tticks\timpact_x\timpact_y\timpact_z");
        println!(
            "{}\t{:.4}\t{:.4}\t{:.2}\t{}\t{:.2}\t{:.2}\t{:.2}",
            scenario.seed,
            attrs.angle_deg,
            attrs.initial_velocity,
            outcome.flight_time,
            outcome.ticks,
            outcome.impact_xyz[0],
            outcome.impact_xyz[1],
            outcome.impact_xyz[2],
        );
        return 0;
    }

    print_json(
        &ShotReport {
            seed: scenario.seed,
            resolution: &resolution,
            outcome: &outcome,
        },
        "shot report",
    )
}

fn handle_resolve(args: &[String]) -> i32 {
    let Some(scenario) = scenario_arg(args) else {
        return 1;
    };
    let resolution = scenario
        .armament()
        .map_err(|err| err.to_string())
        .and_then(|armament| {
            armament
                .resolve_turn(&scenario.input)
                .map_err(|err| err.to_string())
        });
    match resolution {
        Ok(resolution) => print_json(&resolution, "turn resolution"),
        Err(err) => {
            eprintln!("resolve failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let path = positional(args, 0).unwrap_or(DEFAULT_SCENARIO_PATH);
    let Some(scenario) = load_or_report(path) else {
        return 1;
    };

    let report = validate_scenario(&scenario);
    for diag in report.sorted() {
        eprintln!("{}: {}: {}", diag.severity, diag.context, diag.message);
    }
    if report.has_errors() {
        eprintln!("validation failed: {path}");
        1
    } else {
        println!("validation passed: {path}");
        0
    }
}

fn handle_spread(args: &[String]) -> i32 {
    let Some(scenario) = scenario_arg(args) else {
        return 1;
    };
    let samples = parse_arg(positional(args, 1), "samples", DEFAULT_SPREAD_SAMPLES);
    let pool = match flag_value(args, "--workers") {
        Some(raw) => WorkerPool::with_workers(parse_arg(Some(raw), "workers", 0)),
        None => WorkerPool::from_env(),
    };

    match analyze_dispersion(&scenario, samples, &pool) {
        Ok(report) => {
            let report = if has_flag(args, "--shots") {
                report
            } else {
                report.without_shots()
            };
            print_json(&report, "dispersion report")
        }
        Err(err) => {
            eprintln!("spread failed: {err}");
            1
        }
    }
}

fn scenario_arg(args: &[String]) -> Option<Scenario> {
    load_or_report(positional(args, 0).unwrap_or(DEFAULT_SCENARIO_PATH))
}

fn load_or_report(path: &str) -> Option<Scenario> {
    match load_scenario(path) {
        Ok(scenario) => Some(scenario),
        Err(err) => {
            eprintln!("{path}: {err}");
            None
        }
    }
}

fn print_json<T: Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().skip(2).any(|arg| arg == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let index = args.iter().skip(2).position(|arg| arg == flag)? + 2;
    args.get(index + 1).map(String::as_str)
}

/// The `n`th argument after the command that is neither a flag nor a flag's value.
fn positional(args: &[String], n: usize) -> Option<&str> {
    let mut rest = args.iter().skip(2);
    let mut found = Vec::new();
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if !arg.starts_with("--") {
            found.push(arg.as_str());
        }
    }
    found.get(n).copied()
}

fn parse_arg<T>(raw: Option<&str>, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    raw.and_then(|value| value.parse::<T>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
