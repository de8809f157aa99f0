//! The `Engine` struct and its step loop.

use log::{debug, info, warn};

use dl_core::{ProcessId, ProcessState, ResourceId};
use dl_detect::{Detection, describe_cycle, detect, explain};
use dl_graph::{AllocationGraph, GraphError, GraphResult};
use dl_scenario::{Catalog, Op, Scenario};

use crate::{
    EngineBuilder, EngineError, EngineObserver, EngineResult, EngineState, NoopObserver, RunOutcome,
    Snapshot, StepOutcome,
};

// ── Engine ────────────────────────────────────────────────────────────────────

/// Replays one scenario step by step.
///
/// Each [`advance`](Engine::advance):
///
/// 1. **Apply**: run the next step's operation against the allocation graph.
///    `request` and `allocate` both grant at once when enough instances are
///    free and otherwise queue a pending request.  A step that fails
///    (over-release, capacity) leaves everything untouched.
/// 2. **Derive**: recompute every live process's state from its edges.
/// 3. **Detect**: search the wait-for graph; processes on a cycle become
///    `Blocked` and the engine freezes in `Deadlocked`.
///
/// The engine owns all live state.  Callers only ever see owned
/// [`Snapshot`]s.
///
/// Create via [`EngineBuilder`] or [`Engine::new`].
#[derive(Debug)]
pub struct Engine {
    pub(crate) scenario:         Scenario,
    /// Graph before the first step; `reset` restores it.
    pub(crate) initial:          AllocationGraph,
    pub(crate) graph:            AllocationGraph,
    /// Index of the next step to apply.
    pub(crate) cursor:           usize,
    pub(crate) state:            EngineState,
    pub(crate) detection:        Detection,
    pub(crate) explanation:      Option<String>,
    pub(crate) outcome:          Option<StepOutcome>,
    pub(crate) check_invariants: bool,
}

impl Engine {
    /// Equivalent to `EngineBuilder::new(scenario).build()`.
    pub fn new(scenario: Scenario) -> EngineResult<Self> {
        EngineBuilder::new(scenario).build()
    }

    /// Engine for the catalog entry called `name`.
    pub fn from_catalog(catalog: &Catalog, name: &str) -> EngineResult<Self> {
        EngineBuilder::from_catalog(catalog, name)?.build()
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn graph(&self) -> &AllocationGraph {
        &self.graph
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of steps applied so far.
    pub fn step_index(&self) -> usize {
        self.cursor
    }

    /// Result of the last detection pass.
    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            scenario:        self.scenario.name().to_owned(),
            step_index:      self.cursor,
            total_steps:     self.scenario.len(),
            state:           self.state,
            processes:       self.graph.processes().to_vec(),
            resources:       self.graph.resources().to_vec(),
            edges:           self.graph.edges().collect(),
            cycle:           self.detection.cycle.clone(),
            explanation:     self.explanation.clone(),
            outcome:         self.outcome.clone(),
            status:          self.outcome.as_ref().map(|o| o.status(&self.graph)),
            deadlock_report: self
                .detection
                .is_deadlocked
                .then(|| explain(&self.graph, &self.detection)),
        }
    }

    pub fn run_outcome(&self) -> RunOutcome {
        RunOutcome {
            state:         self.state,
            steps_applied: self.cursor,
            cycle:         self.detection.cycle.clone(),
        }
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Apply the next step and return the resulting snapshot.
    ///
    /// Fails with [`EngineError::NoMoreSteps`] in a terminal state and with
    /// [`EngineError::Step`] when the step itself is rejected or breaks a
    /// capacity invariant; in every case nothing is mutated.  An empty
    /// scenario completes on its first advance.
    pub fn advance(&mut self) -> EngineResult<Snapshot> {
        if self.state.is_terminal() {
            return Err(EngineError::NoMoreSteps);
        }
        let Some(step) = self.scenario.steps().get(self.cursor).cloned() else {
            self.state = EngineState::Completed;
            info!("scenario {:?}: nothing to do, completed", self.scenario.name());
            return Ok(self.snapshot());
        };

        // Invariant checks run after `apply`; keep a copy to roll back to.
        let before = self.graph.clone();
        let settled = self.apply(&step.op).and_then(|outcome| {
            if self.check_invariants {
                self.graph.check_invariants()?;
            }
            Ok((outcome, self.refresh_states()?))
        });
        let (outcome, detection) = match settled {
            Ok(settled) => settled,
            Err(source) => {
                self.graph = before;
                warn!("scenario {:?}: step {} rejected: {source}", self.scenario.name(), self.cursor);
                return Err(EngineError::Step { step: self.cursor, source });
            }
        };

        self.cursor += 1;
        self.detection = detection;
        debug!("step {}: {}", self.cursor, outcome.status(&self.graph));
        self.explanation = step.explanation;
        self.outcome = Some(outcome);

        let previous = self.state;
        self.state = if self.detection.is_deadlocked {
            EngineState::Deadlocked
        } else if self.cursor == self.scenario.len() {
            EngineState::Completed
        } else {
            EngineState::Running
        };

        if self.state == EngineState::Deadlocked {
            warn!(
                "scenario {:?}: deadlock after step {}: {}",
                self.scenario.name(),
                self.cursor,
                describe_cycle(&self.graph, &self.detection.cycle)
            );
        } else if self.state != previous {
            info!("scenario {:?}: {previous} → {}", self.scenario.name(), self.state);
        }

        Ok(self.snapshot())
    }

    /// [`advance`](Engine::advance), reporting to `observer`.
    pub fn advance_observed<O: EngineObserver>(&mut self, observer: &mut O) -> EngineResult<Snapshot> {
        let snapshot = self.advance()?;
        observer.on_step(&snapshot);
        if snapshot.is_deadlocked() {
            observer.on_deadlock(&snapshot);
        }
        if snapshot.state.is_terminal() {
            observer.on_finish(&self.run_outcome());
        }
        Ok(snapshot)
    }

    /// Advance until `Completed` or `Deadlocked`.
    ///
    /// Already-terminal engines return their outcome without error.
    pub fn run_to_completion(&mut self) -> EngineResult<RunOutcome> {
        self.run_observed(&mut NoopObserver)
    }

    /// [`run_to_completion`](Engine::run_to_completion), reporting every
    /// step to `observer`.
    pub fn run_observed<O: EngineObserver>(&mut self, observer: &mut O) -> EngineResult<RunOutcome> {
        while !self.state.is_terminal() {
            self.advance_observed(observer)?;
        }
        Ok(self.run_outcome())
    }

    /// Back to the initial graph, step 0 and `NotStarted`.
    pub fn reset(&mut self) {
        self.graph = self.initial.clone();
        self.cursor = 0;
        self.state = EngineState::NotStarted;
        self.detection = Detection::none();
        self.explanation = None;
        self.outcome = None;
        info!("scenario {:?}: reset", self.scenario.name());
    }

    // ── Step application ──────────────────────────────────────────────────

    fn apply(&mut self, op: &Op) -> GraphResult<StepOutcome> {
        Ok(match *op {
            Op::Spawn { process, ref name, priority, burst_ticks } => {
                let id = self.graph.spawn_process(name.clone(), priority, burst_ticks);
                debug_assert_eq!(id, process, "scenario ids follow creation order");
                StepOutcome::Spawned { process: id }
            }
            Op::AddResource { ref name, instances, .. } => StepOutcome::Added {
                resource: self.graph.add_resource(name.clone(), instances)?,
            },
            Op::Request { process, resource, count } | Op::Allocate { process, resource, count } => {
                self.claim(process, resource, count)?
            }
            Op::Release { process, resource, count } => StepOutcome::Released {
                process,
                resource,
                count,
                grants: self.graph.release(process, resource, count)?,
            },
            Op::Terminate { process } => StepOutcome::Terminated {
                process,
                grants: self.graph.terminate(process)?,
            },
        })
    }

    /// Grant now if enough instances are free, otherwise queue the request.
    fn claim(&mut self, process: ProcessId, resource: ResourceId, count: u32) -> GraphResult<StepOutcome> {
        match self.graph.allocate(process, resource, count) {
            Ok(grant) => Ok(StepOutcome::Granted {
                process:  grant.process,
                resource: grant.resource,
                count:    grant.count,
            }),
            Err(GraphError::InsufficientResource { available, .. }) => {
                self.graph.request(process, resource, count)?;
                Ok(StepOutcome::Waiting { process, resource, count, available })
            }
            Err(e) => Err(e),
        }
    }

    // ── State derivation ──────────────────────────────────────────────────

    /// Run detection and rewrite the state of every process that is not
    /// `Finished`.  The caller stores the returned detection.
    fn refresh_states(&mut self) -> GraphResult<Detection> {
        let detection = detect(&self.graph);
        let derived: Vec<(ProcessId, ProcessState)> = self
            .graph
            .processes()
            .iter()
            .filter(|p| !p.is_finished())
            .map(|p| (p.id, self.derive_state(&detection, p.id)))
            .collect();
        for (process, state) in derived {
            self.graph.set_state(process, state)?;
        }
        Ok(detection)
    }

    fn derive_state(&self, detection: &Detection, process: ProcessId) -> ProcessState {
        if detection.processes().any(|p| p == process) {
            ProcessState::Blocked
        } else if self.graph.is_waiting(process) {
            ProcessState::Waiting
        } else if self.graph.holdings_of(process).next().is_some() {
            ProcessState::Running
        } else {
            ProcessState::Ready
        }
    }
}
