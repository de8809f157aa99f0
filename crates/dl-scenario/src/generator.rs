//! Seeded random scenario producer.
//!
//! The producer keeps a shadow [`AllocationGraph`] and only emits steps that
//! make sense against it: a process that is already waiting is never picked,
//! nothing is released that is not held, and no single request exceeds what
//! the resource could ever hand out.  Generation stops after the step budget
//! is spent, when every process is waiting, or as soon as the shadow graph
//! deadlocks.
//!
//! The same `GeneratorConfig` (seed included) always yields the same
//! `ScenarioDef`.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use dl_core::{Priority, ProcessId, ResourceId};
use dl_graph::{AllocationGraph, GraphError};

use crate::{ProcessDef, ResourceDef, Scenario, ScenarioDef, ScenarioError, ScenarioResult, StepDef};

/// Knobs for [`generate`].  Missing fields take their defaults when
/// deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub processes:           u32,
    pub resources:           u32,
    /// Upper bound for a resource's instance total (lower bound is 1).
    pub max_instances:       u32,
    /// Upper bound for one allocate/request step.
    pub max_request:         u32,
    /// Step budget.
    pub steps:               usize,
    /// Chance that a process holding something releases instead of asking.
    pub release_probability: f64,
    pub seed:                u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            processes:           3,
            resources:           3,
            max_instances:       2,
            max_request:         3,
            steps:               12,
            release_probability: 0.3,
            seed:                42,
        }
    }
}

impl GeneratorConfig {
    fn check(&self) -> ScenarioResult<()> {
        let bad = |what: &str| Err(ScenarioError::InvalidConfig(what.to_owned()));
        if self.processes == 0 {
            return bad("processes must be at least 1");
        }
        if self.resources == 0 {
            return bad("resources must be at least 1");
        }
        if self.max_instances == 0 {
            return bad("max_instances must be at least 1");
        }
        if self.max_request == 0 {
            return bad("max_request must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.release_probability) {
            return bad("release_probability must be within 0..=1");
        }
        Ok(())
    }
}

/// Produce and validate a random scenario.
pub fn generate(cfg: &GeneratorConfig) -> ScenarioResult<Scenario> {
    generate_def(cfg)?.validate()
}

/// Produce a random scenario definition without validating it.
pub fn generate_def(cfg: &GeneratorConfig) -> ScenarioResult<ScenarioDef> {
    cfg.check()?;
    let mut rng = SmallRng::seed_from_u64(cfg.seed);
    let mut shadow = AllocationGraph::new();
    let mut def = ScenarioDef::new(format!("random-{}", cfg.seed));
    def.description = format!(
        "{} processes and {} resources, randomly assigned (seed {}).",
        cfg.processes, cfg.resources, cfg.seed
    );

    for i in 1..=cfg.processes {
        let priority = random_priority(&mut rng);
        let name = format!("P{i}");
        shadow.spawn_process(name.clone(), priority, 1);
        def.processes.push(ProcessDef { name, priority, burst_ticks: 1 });
    }
    for i in 1..=cfg.resources {
        let instances = rng.gen_range(1..=cfg.max_instances);
        let name = format!("R{i}");
        shadow.add_resource(name.clone(), instances)?;
        def.resources.push(ResourceDef::new(name, instances));
    }

    let max_attempts = cfg.steps.saturating_mul(4);
    let mut attempts = 0;
    while def.steps.len() < cfg.steps && attempts < max_attempts {
        attempts += 1;

        let idle: Vec<ProcessId> = shadow
            .processes()
            .iter()
            .filter(|p| !shadow.is_waiting(p.id))
            .map(|p| p.id)
            .collect();
        if idle.is_empty() {
            debug!("generator: every process is waiting, stopping");
            break;
        }
        let process = idle[rng.gen_range(0..idle.len())];

        let held: Vec<(ResourceId, u32)> = shadow.holdings_of(process).collect();
        if !held.is_empty() && rng.gen_bool(cfg.release_probability) {
            let (resource, n) = held[rng.gen_range(0..held.len())];
            let count = rng.gen_range(1..=n.min(2));
            shadow.release(process, resource, count)?;
            let (p, r) = names(&shadow, process, resource)?;
            def.steps.push(
                StepDef::release(&p, &r, count).because(format!("{p} is done with {count} of {r}.")),
            );
            continue;
        }

        let resource = ResourceId(rng.gen_range(0..cfg.resources));
        let headroom = shadow.resource(resource)?.total - shadow.held(process, resource);
        if headroom == 0 {
            continue;
        }
        let count = rng.gen_range(1..=cfg.max_request.min(headroom));
        let (p, r) = names(&shadow, process, resource)?;
        match shadow.allocate(process, resource, count) {
            Ok(_) => def.steps.push(
                StepDef::allocate(&p, &r, count).because(format!("{p} takes {count} free instance(s) of {r}.")),
            ),
            Err(GraphError::InsufficientResource { available, .. }) => {
                shadow.request(process, resource, count)?;
                def.steps.push(StepDef::request(&p, &r, count).because(format!(
                    "{p} asks for {count} of {r} but only {available} are free, so it waits."
                )));
            }
            Err(e) => return Err(e.into()),
        }

        if dl_detect::detect(&shadow).is_deadlocked {
            debug!("generator: deadlock after {} steps", def.steps.len());
            break;
        }
    }

    Ok(def)
}

fn random_priority(rng: &mut SmallRng) -> Priority {
    match rng.gen_range(0..4) {
        0 => Priority::Low,
        1 => Priority::Medium,
        2 => Priority::High,
        _ => Priority::Critical,
    }
}

fn names(graph: &AllocationGraph, process: ProcessId, resource: ResourceId) -> ScenarioResult<(String, String)> {
    Ok((
        graph.process(process)?.name.clone(),
        graph.resource(resource)?.name.clone(),
    ))
}
