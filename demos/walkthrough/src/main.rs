//! walkthrough: step through a deadlock scenario in the terminal.
//!
//! Picks a built-in scenario, a JSON/CSV scenario file, or a seeded random
//! one, replays it with the step engine and prints what happens after each
//! step.  With `--out DIR` the step log is also written as CSV.
//!
//! ```text
//! walkthrough --list
//! walkthrough classic-2x2 --tables
//! walkthrough --file my_scenario.json --json
//! walkthrough --random --seed 7 --out output/random
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use dl_core::NodeRef;
use dl_engine::{Engine, EngineObserver, RunOutcome, Snapshot};
use dl_graph::EdgeKind;
use dl_output::{CsvWriter, StepLogObserver};
use dl_scenario::{
    Catalog, GeneratorConfig, Scenario, generate, load_scenario_csv, load_scenario_json,
};

/// Replay a resource-allocation scenario and watch for deadlock.
#[derive(Debug, Parser)]
struct Opts {
    /// Built-in scenario to replay.
    #[clap(default_value = "classic-2x2")]
    scenario: String,

    /// Load the scenario from a `.json` or `.csv` file instead.
    #[clap(short = 'f', long, conflicts_with = "random")]
    file: Option<PathBuf>,

    /// List the built-in scenarios and exit.
    #[clap(short = 'l', long, action = clap::ArgAction::SetTrue)]
    list: bool,

    /// Generate a random scenario.
    #[clap(short = 'r', long, action = clap::ArgAction::SetTrue)]
    random: bool,

    /// Seed for --random.
    #[clap(short = 's', long, default_value = "42")]
    seed: u64,

    /// JSON generator settings for --random; --seed overrides its seed.
    #[clap(long, requires = "random")]
    generator: Option<PathBuf>,

    /// Print the full process and resource tables after every step.
    #[clap(short = 't', long, action = clap::ArgAction::SetTrue)]
    tables: bool,

    /// Print only the final outcome.
    #[clap(long, action = clap::ArgAction::SetTrue, conflicts_with = "tables")]
    run: bool,

    /// Print one JSON snapshot per step instead of text.
    #[clap(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Write step_log.csv and resource_usage.csv into this directory.
    #[clap(short = 'o', long)]
    out: Option<PathBuf>,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Printing observer ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mode {
    Status,
    Tables,
    Quiet,
    Json,
}

/// Prints each step and forwards it to an optional step-log observer.
struct Printer {
    mode:  Mode,
    inner: Option<StepLogObserver<CsvWriter>>,
    error: Option<serde_json::Error>,
}

impl EngineObserver for Printer {
    fn on_step(&mut self, snap: &Snapshot) {
        match self.mode {
            Mode::Quiet => {}
            Mode::Json => {
                if let Err(e) = serde_json::to_string(snap).map(|s| println!("{s}")) {
                    self.error.get_or_insert(e);
                }
            }
            Mode::Status | Mode::Tables => {
                println!(
                    "[{}/{}] {}",
                    snap.step_index,
                    snap.total_steps,
                    snap.status.as_deref().unwrap_or("")
                );
                if let Some(why) = &snap.explanation {
                    println!("      {why}");
                }
                if self.mode == Mode::Tables {
                    println!();
                    print_tables(snap);
                }
            }
        }
        if let Some(inner) = &mut self.inner {
            inner.on_step(snap);
        }
    }

    fn on_deadlock(&mut self, snap: &Snapshot) {
        if let Some(inner) = &mut self.inner {
            inner.on_deadlock(snap);
        }
    }

    fn on_finish(&mut self, outcome: &RunOutcome) {
        if let Some(inner) = &mut self.inner {
            inner.on_finish(outcome);
        }
    }
}

fn print_tables(snap: &Snapshot) {
    println!("{:<10} {:<9} {:<9} {:<20} {:<20}", "Process", "Priority", "State", "Holds", "Waits for");
    println!("{}", "-".repeat(70));
    for p in &snap.processes {
        let holds: Vec<String> = snap
            .resources
            .iter()
            .filter_map(|r| {
                let n = r.held_by(p.id);
                (n > 0).then(|| format!("{}({n})", r.name))
            })
            .collect();
        let waits: Vec<String> = snap
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Requested && e.from == NodeRef::Process(p.id))
            .map(|e| format!("{}({})", name_of(snap, e.to), e.count))
            .collect();
        println!(
            "{:<10} {:<9} {:<9} {:<20} {:<20}",
            p.name,
            p.priority.to_string(),
            p.state.to_string(),
            holds.join(" "),
            waits.join(" ")
        );
    }
    println!();
    println!("{:<10} {:>5} {:>5}  {:<30}", "Resource", "Total", "Free", "Held by");
    println!("{}", "-".repeat(54));
    for r in &snap.resources {
        let holders: Vec<String> = r
            .holders
            .iter()
            .map(|h| format!("{}({})", name_of(snap, NodeRef::Process(h.process)), h.count))
            .collect();
        println!("{:<10} {:>5} {:>5}  {:<30}", r.name, r.total, r.available(), holders.join(" "));
    }
    println!();
}

fn name_of(snap: &Snapshot, node: NodeRef) -> String {
    match node {
        NodeRef::Process(p) => snap
            .processes
            .get(p.index())
            .map_or_else(|| p.to_string(), |x| x.name.clone()),
        NodeRef::Resource(r) => snap
            .resources
            .get(r.index())
            .map_or_else(|| r.to_string(), |x| x.name.clone()),
    }
}

// ── Scenario selection ────────────────────────────────────────────────────────

fn load_file(path: &Path) -> Result<Scenario> {
    let scenario = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_scenario_json(path)?,
        Some("csv") => {
            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("csv");
            load_scenario_csv(name, path)?
        }
        _ => bail!("{}: expected a .json or .csv file", path.display()),
    };
    Ok(scenario)
}

fn select(opts: &Opts, catalog: &Catalog) -> Result<Scenario> {
    if let Some(path) = &opts.file {
        return load_file(path).with_context(|| format!("loading {}", path.display()));
    }
    if opts.random {
        let mut cfg = match &opts.generator {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<GeneratorConfig>(&text)?
            }
            None => GeneratorConfig::default(),
        };
        cfg.seed = opts.seed;
        return Ok(generate(&cfg)?);
    }
    Ok(catalog.get(&opts.scenario)?.clone())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Info,
        2 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut lcfg = simplelog::ConfigBuilder::new();
    lcfg.set_time_level(simplelog::LevelFilter::Error)
        .set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);
    simplelog::TermLogger::init(
        llv,
        lcfg.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let catalog = Catalog::builtin()?;
    if opts.list {
        for s in &catalog {
            println!("{:<22} {}", s.name(), s.description());
        }
        return Ok(());
    }

    let scenario = select(&opts, &catalog)?;
    let mode = if opts.json {
        Mode::Json
    } else if opts.run {
        Mode::Quiet
    } else if opts.tables {
        Mode::Tables
    } else {
        Mode::Status
    };

    if mode != Mode::Json {
        println!("=== {} ===", scenario.name());
        if !scenario.description().is_empty() {
            println!("{}", scenario.description());
        }
        println!();
    }

    let inner = match &opts.out {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            info!("writing step log to {}", dir.display());
            Some(StepLogObserver::new(CsvWriter::new(dir)?))
        }
        None => None,
    };
    let mut printer = Printer { mode, inner, error: None };

    let mut engine = Engine::new(scenario)?;
    let outcome = engine.run_observed(&mut printer)?;

    if let Some(e) = printer.error.take() {
        eprintln!("JSON error: {e}");
    }
    if let Some(e) = printer.inner.as_mut().and_then(|o| o.take_error()) {
        eprintln!("output error: {e}");
    }
    if mode == Mode::Json {
        return Ok(());
    }

    println!();
    println!("Outcome: {} after {} step(s)", outcome.state, outcome.steps_applied);
    if mode != Mode::Tables {
        println!();
        print_tables(&engine.snapshot());
    }
    if let Some(report) = engine.snapshot().deadlock_report {
        println!("{report}");
    }
    Ok(())
}
