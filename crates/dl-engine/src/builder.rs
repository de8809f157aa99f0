//! Fluent builder for constructing an [`Engine`].

use log::info;

use dl_detect::Detection;
use dl_graph::AllocationGraph;
use dl_scenario::{Catalog, Scenario};

use crate::{Engine, EngineResult, EngineState};

/// Fluent builder for [`Engine`].
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                          |
/// |---------------------------|----------------------------------|
/// | `.check_invariants(b)`    | on in debug builds, off otherwise |
///
/// # Example
///
/// ```rust,ignore
/// let catalog = Catalog::builtin()?;
/// let mut engine = EngineBuilder::from_catalog(&catalog, "classic-2x2")?
///     .check_invariants(true)
///     .build()?;
/// let outcome = engine.run_to_completion()?;
/// ```
pub struct EngineBuilder {
    scenario:         Scenario,
    check_invariants: bool,
}

impl EngineBuilder {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            check_invariants: cfg!(debug_assertions),
        }
    }

    /// Start from the catalog entry called `name`.
    pub fn from_catalog(catalog: &Catalog, name: &str) -> EngineResult<Self> {
        Ok(Self::new(catalog.get(name)?.clone()))
    }

    /// Re-check the allocation graph's capacity invariants after every step.
    ///
    /// A violation rejects the step as [`EngineError::Step`][crate::EngineError::Step]
    /// wrapping [`GraphError::InvariantViolated`][dl_graph::GraphError::InvariantViolated].
    pub fn check_invariants(mut self, on: bool) -> Self {
        self.check_invariants = on;
        self
    }

    /// Create the initial processes and resources and return an engine in
    /// the `NotStarted` state.
    pub fn build(self) -> EngineResult<Engine> {
        let mut initial = AllocationGraph::new();
        for p in self.scenario.initial_processes() {
            initial.spawn_process(p.name.clone(), p.priority, p.burst_ticks);
        }
        for r in self.scenario.initial_resources() {
            initial.add_resource(r.name.clone(), r.instances)?;
        }

        info!(
            "scenario {:?} loaded: {} processes, {} resources, {} steps",
            self.scenario.name(),
            initial.processes().len(),
            initial.resources().len(),
            self.scenario.len()
        );

        Ok(Engine {
            graph:            initial.clone(),
            initial,
            scenario:         self.scenario,
            cursor:           0,
            state:            EngineState::NotStarted,
            detection:        Detection::none(),
            explanation:      None,
            outcome:          None,
            check_invariants: self.check_invariants,
        })
    }
}
