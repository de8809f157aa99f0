//! Validated, id-based scenarios.

use rustc_hash::{FxHashMap, FxHashSet};

use dl_core::{Priority, ProcessId, ResourceId};

use crate::{Action, Location, ProcessDef, ResourceDef, ScenarioDef, ScenarioError, ScenarioResult};

/// A step operation with every operand resolved to an id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// `process` is the id the allocation graph will assign.
    Spawn {
        process:     ProcessId,
        name:        String,
        priority:    Priority,
        burst_ticks: u32,
    },
    /// `resource` is the id the allocation graph will assign.
    AddResource {
        resource:  ResourceId,
        name:      String,
        instances: u32,
    },
    Request {
        process:  ProcessId,
        resource: ResourceId,
        count:    u32,
    },
    Allocate {
        process:  ProcessId,
        resource: ResourceId,
        count:    u32,
    },
    Release {
        process:  ProcessId,
        resource: ResourceId,
        count:    u32,
    },
    Terminate {
        process: ProcessId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub op:          Op,
    pub explanation: Option<String>,
}

/// A scenario that passed load-time validation.
///
/// Guarantees, for every step:
/// - every named process/resource exists at that point and the process has
///   not been terminated by an earlier step;
/// - names are unique per kind;
/// - every count and instance total is ≥ 1 and no single step asks for
///   more instances than the resource has.
///
/// Runtime conditions (releasing more than is held at that moment) are left
/// to the step engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    source: ScenarioDef,
    steps:  Vec<Step>,
}

impl Scenario {
    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn description(&self) -> &str {
        &self.source.description
    }

    /// Processes created before the first step; they get ids `0..n`.
    pub fn initial_processes(&self) -> &[ProcessDef] {
        &self.source.processes
    }

    /// Resources created before the first step; they get ids `0..n`.
    pub fn initial_resources(&self) -> &[ResourceDef] {
        &self.source.resources
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The name-based definition this scenario was built from.
    pub fn def(&self) -> &ScenarioDef {
        &self.source
    }
}

impl TryFrom<ScenarioDef> for Scenario {
    type Error = ScenarioError;

    fn try_from(def: ScenarioDef) -> ScenarioResult<Self> {
        let mut names = Names::default();

        for p in &def.processes {
            names.spawn(Location::Setup, &p.name)?;
        }
        for r in &def.resources {
            names.add_resource(Location::Setup, &r.name, r.instances)?;
        }

        let mut steps = Vec::with_capacity(def.steps.len());
        for (i, step) in def.steps.iter().enumerate() {
            let at = Location::Step(i);
            let op = match &step.action {
                Action::SpawnProcess { name, priority, burst_ticks } => Op::Spawn {
                    process:     names.spawn(at, name)?,
                    name:        name.clone(),
                    priority:    *priority,
                    burst_ticks: *burst_ticks,
                },
                Action::AddResource { name, instances } => Op::AddResource {
                    resource:  names.add_resource(at, name, *instances)?,
                    name:      name.clone(),
                    instances: *instances,
                },
                Action::Request { process, resource, count } => {
                    let (process, resource) = names.claim(at, process, resource, *count)?;
                    Op::Request { process, resource, count: *count }
                }
                Action::Allocate { process, resource, count } => {
                    let (process, resource) = names.claim(at, process, resource, *count)?;
                    Op::Allocate { process, resource, count: *count }
                }
                Action::Release { process, resource, count } => {
                    let (process, resource) = names.claim(at, process, resource, *count)?;
                    Op::Release { process, resource, count: *count }
                }
                Action::TerminateProcess { process } => Op::Terminate {
                    process: names.finish(at, process)?,
                },
            };
            steps.push(Step { op, explanation: step.explanation.clone() });
        }

        Ok(Scenario { source: def, steps })
    }
}

// ── Name resolution ───────────────────────────────────────────────────────────

/// Tracks what exists at the current point of a definition walk.
#[derive(Default)]
struct Names {
    processes:     FxHashMap<String, ProcessId>,
    finished:      FxHashSet<ProcessId>,
    resources:     FxHashMap<String, (ResourceId, u32)>,
}

impl Names {
    fn spawn(&mut self, at: Location, name: &str) -> ScenarioResult<ProcessId> {
        if self.processes.contains_key(name) {
            return Err(ScenarioError::DuplicateEntity { at, name: name.to_owned() });
        }
        let id = ProcessId(self.processes.len() as u32);
        self.processes.insert(name.to_owned(), id);
        Ok(id)
    }

    fn add_resource(&mut self, at: Location, name: &str, instances: u32) -> ScenarioResult<ResourceId> {
        if self.resources.contains_key(name) {
            return Err(ScenarioError::DuplicateEntity { at, name: name.to_owned() });
        }
        if instances == 0 {
            return Err(ScenarioError::InvalidCount { at, name: name.to_owned() });
        }
        let id = ResourceId(self.resources.len() as u32);
        self.resources.insert(name.to_owned(), (id, instances));
        Ok(id)
    }

    fn live_process(&self, at: Location, name: &str) -> ScenarioResult<ProcessId> {
        match self.processes.get(name) {
            Some(&id) if !self.finished.contains(&id) => Ok(id),
            _ => Err(ScenarioError::UnknownEntity { at, name: name.to_owned() }),
        }
    }

    fn finish(&mut self, at: Location, name: &str) -> ScenarioResult<ProcessId> {
        let id = self.live_process(at, name)?;
        self.finished.insert(id);
        Ok(id)
    }

    fn claim(
        &self,
        at:       Location,
        process:  &str,
        resource: &str,
        count:    u32,
    ) -> ScenarioResult<(ProcessId, ResourceId)> {
        let pid = self.live_process(at, process)?;
        let &(rid, total) = self
            .resources
            .get(resource)
            .ok_or_else(|| ScenarioError::UnknownEntity { at, name: resource.to_owned() })?;
        if count == 0 {
            return Err(ScenarioError::InvalidCount { at, name: resource.to_owned() });
        }
        if count > total {
            return Err(ScenarioError::ExceedsCapacity {
                at,
                resource: resource.to_owned(),
                count,
                total,
            });
        }
        Ok((pid, rid))
    }
}
