//! Scenario file loaders.
//!
//! # JSON
//!
//! A serialized [`ScenarioDef`]; see the [`def`](crate::def) module docs.
//!
//! # CSV
//!
//! One row per step, in order.  Processes and resources are created by
//! `spawn-process` / `add-resource` rows, so a CSV scenario starts empty.
//!
//! ```csv
//! action,process,resource,count,priority,explanation
//! add-resource,,R1,1,,
//! add-resource,,R2,1,,
//! spawn-process,P1,,,high,
//! spawn-process,P2,,,,
//! allocate,P1,R1,1,,P1 takes R1.
//! request,P1,R2,,,P1 waits for R2.
//! ```
//!
//! | Column        | Used by                                              |
//! |---------------|------------------------------------------------------|
//! | `process`     | every action except `add-resource`                   |
//! | `resource`    | `add-resource`, `request`, `allocate`, `release`     |
//! | `count`       | instances (`add-resource`), burst (`spawn-process`), |
//! |               | otherwise the number of instances; defaults to 1     |
//! | `priority`    | `spawn-process` only; defaults to `medium`           |
//! | `explanation` | optional, any action                                 |
//!
//! Both loaders validate before returning, so a loaded [`Scenario`] is
//! always runnable.

use std::io::Read;
use std::path::Path;

use log::info;
use serde::Deserialize;

use dl_core::Priority;

use crate::{Action, Scenario, ScenarioDef, ScenarioError, ScenarioResult, StepDef};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct StepRecord {
    action:      String,
    #[serde(default)]
    process:     Option<String>,
    #[serde(default)]
    resource:    Option<String>,
    #[serde(default)]
    count:       Option<u32>,
    #[serde(default)]
    priority:    Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and validate a JSON scenario file.
pub fn load_scenario_json(path: &Path) -> ScenarioResult<Scenario> {
    let file = std::fs::File::open(path)?;
    load_scenario_json_reader(file)
}

/// Like [`load_scenario_json`] but accepts any `Read` source.
pub fn load_scenario_json_reader<R: Read>(reader: R) -> ScenarioResult<Scenario> {
    let def: ScenarioDef = serde_json::from_reader(reader)?;
    let scenario = def.validate()?;
    info!("loaded scenario {:?} ({} steps)", scenario.name(), scenario.len());
    Ok(scenario)
}

/// Load and validate a CSV scenario file.  CSV has no header block, so the
/// scenario name is supplied by the caller.
pub fn load_scenario_csv(name: &str, path: &Path) -> ScenarioResult<Scenario> {
    let file = std::fs::File::open(path)?;
    load_scenario_csv_reader(name, file)
}

/// Like [`load_scenario_csv`] but accepts any `Read` source.
pub fn load_scenario_csv_reader<R: Read>(name: &str, reader: R) -> ScenarioResult<Scenario> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut def = ScenarioDef::new(name);

    for (row, result) in csv_reader.deserialize::<StepRecord>().enumerate() {
        let record = result.map_err(|e| ScenarioError::Parse(e.to_string()))?;
        def.steps.push(step_from_record(row, record)?);
    }

    let scenario = def.validate()?;
    info!("loaded scenario {:?} ({} steps)", scenario.name(), scenario.len());
    Ok(scenario)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn step_from_record(row: usize, r: StepRecord) -> ScenarioResult<StepDef> {
    let count = r.count.unwrap_or(1);
    let action = match r.action.as_str() {
        "spawn-process" => Action::SpawnProcess {
            name:        required(row, "process", r.process)?,
            priority:    parse_priority(row, r.priority.as_deref())?,
            burst_ticks: count,
        },
        "add-resource" => Action::AddResource {
            name:      required(row, "resource", r.resource)?,
            instances: count,
        },
        "request" => Action::Request {
            process:  required(row, "process", r.process)?,
            resource: required(row, "resource", r.resource)?,
            count,
        },
        "allocate" => Action::Allocate {
            process:  required(row, "process", r.process)?,
            resource: required(row, "resource", r.resource)?,
            count,
        },
        "release" => Action::Release {
            process:  required(row, "process", r.process)?,
            resource: required(row, "resource", r.resource)?,
            count,
        },
        "terminate-process" => Action::TerminateProcess {
            process: required(row, "process", r.process)?,
        },
        other => {
            return Err(ScenarioError::Parse(format!("row {row}: unknown action {other:?}")));
        }
    };
    Ok(StepDef {
        action,
        explanation: r.explanation.filter(|e| !e.is_empty()),
    })
}

fn required(row: usize, column: &str, value: Option<String>) -> ScenarioResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScenarioError::Parse(format!("row {row}: missing {column}")))
}

fn parse_priority(row: usize, s: Option<&str>) -> ScenarioResult<Priority> {
    match s.map(str::trim).unwrap_or("") {
        ""         => Ok(Priority::default()),
        "low"      => Ok(Priority::Low),
        "medium"   => Ok(Priority::Medium),
        "high"     => Ok(Priority::High),
        "critical" => Ok(Priority::Critical),
        other      => Err(ScenarioError::Parse(format!("row {row}: unknown priority {other:?}"))),
    }
}
