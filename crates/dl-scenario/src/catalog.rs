//! Built-in teaching scenarios and name-based lookup.

use crate::{ProcessDef, ResourceDef, Scenario, ScenarioDef, ScenarioError, ScenarioResult, StepDef};

/// An ordered set of validated scenarios, unique by name.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in scenarios, in teaching order.
    pub fn builtin() -> ScenarioResult<Self> {
        Self::from_defs(builtin_defs())
    }

    /// Validate every definition; the first invalid one fails the whole set.
    pub fn from_defs(defs: impl IntoIterator<Item = ScenarioDef>) -> ScenarioResult<Self> {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def.validate()?);
        }
        Ok(catalog)
    }

    /// Add `scenario`, replacing any existing scenario with the same name
    /// in place.
    pub fn insert(&mut self, scenario: Scenario) {
        match self.scenarios.iter_mut().find(|s| s.name() == scenario.name()) {
            Some(slot) => *slot = scenario,
            None => self.scenarios.push(scenario),
        }
    }

    pub fn get(&self, name: &str) -> ScenarioResult<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ScenarioError::NotFound(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.scenarios.iter().map(Scenario::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Built-in definitions ──────────────────────────────────────────────────────

fn processes(names: &[&str]) -> Vec<ProcessDef> {
    names.iter().map(|&n| ProcessDef::new(n)).collect()
}

fn single_instance(names: &[&str]) -> Vec<ResourceDef> {
    names.iter().map(|&n| ResourceDef::new(n, 1)).collect()
}

/// Definitions behind [`Catalog::builtin`].
pub fn builtin_defs() -> Vec<ScenarioDef> {
    vec![
        classic_2x2(),
        ring_3x3(),
        no_deadlock_2x2(),
        release_then_grant(),
        pool_contention(),
        double_pool_deadlock(),
    ]
}

fn classic_2x2() -> ScenarioDef {
    ScenarioDef {
        name:        "classic-2x2".into(),
        description: "Two processes each hold one resource and ask for the other's.".into(),
        processes:   processes(&["P1", "P2"]),
        resources:   single_instance(&["R1", "R2"]),
        steps:       vec![
            StepDef::allocate("P1", "R1", 1).because("R1 is free, so P1 gets it at once."),
            StepDef::allocate("P2", "R2", 1).because("R2 is free, so P2 gets it at once."),
            StepDef::request("P1", "R2", 1)
                .because("P1 wants R2 while still holding R1; P2 has R2, so P1 waits."),
            StepDef::request("P2", "R1", 1).because(
                "P2 wants R1 while still holding R2; P1 has R1. \
                 Each waits for the other: P1 → R2 → P2 → R1 → P1.",
            ),
        ],
    }
}

fn ring_3x3() -> ScenarioDef {
    ScenarioDef {
        name:        "ring-3x3".into(),
        description: "Three processes in a ring, each waiting on the next one's resource.".into(),
        processes:   processes(&["P1", "P2", "P3"]),
        resources:   single_instance(&["R1", "R2", "R3"]),
        steps:       vec![
            StepDef::allocate("P1", "R1", 1).because("P1 takes R1."),
            StepDef::allocate("P2", "R2", 1).because("P2 takes R2."),
            StepDef::allocate("P3", "R3", 1).because("P3 takes R3."),
            StepDef::request("P1", "R2", 1).because("P1 asks for R2, held by P2, and waits."),
            StepDef::request("P2", "R3", 1).because("P2 asks for R3, held by P3, and waits."),
            StepDef::request("P3", "R1", 1)
                .because("P3 asks for R1, held by P1. The ring closes and nobody can move."),
        ],
    }
}

fn no_deadlock_2x2() -> ScenarioDef {
    ScenarioDef {
        name:        "no-deadlock-2x2".into(),
        description: "Both resources are always taken in the same order, so no cycle can form.".into(),
        processes:   processes(&["P1", "P2"]),
        resources:   single_instance(&["R1", "R2"]),
        steps:       vec![
            StepDef::allocate("P1", "R1", 1).because("P1 takes R1 first."),
            StepDef::allocate("P1", "R2", 1).because("P1 then takes R2."),
            StepDef::request("P2", "R1", 1)
                .because("P2 also starts with R1 and waits; it holds nothing, so there is no hold and wait."),
            StepDef::release("P1", "R1", 1).because("P1 is done with R1; the waiting P2 is granted it."),
            StepDef::release("P1", "R2", 1).because("P1 releases R2 and every process can finish."),
        ],
    }
}

fn release_then_grant() -> ScenarioDef {
    ScenarioDef {
        name:        "release-then-grant".into(),
        description: "A waiting process is granted the resource as soon as its holder lets go.".into(),
        processes:   processes(&["P1", "P2"]),
        resources:   single_instance(&["R1"]),
        steps:       vec![
            StepDef::allocate("P1", "R1", 1).because("P1 takes the only instance of R1."),
            StepDef::request("P2", "R1", 1).because("P2 asks for R1 and has to wait for P1."),
            StepDef::release("P1", "R1", 1).because("P1 releases R1; P2 is first in line and gets it."),
            StepDef::terminate("P2").because("P2 finishes and returns R1."),
        ],
    }
}

fn pool_contention() -> ScenarioDef {
    ScenarioDef {
        name:        "pool-contention".into(),
        description: "Three processes share a pool of two instances without deadlocking.".into(),
        processes:   processes(&["P1", "P2", "P3"]),
        resources:   vec![ResourceDef::new("Pool", 2)],
        steps:       vec![
            StepDef::allocate("P1", "Pool", 1).because("P1 takes one of the two instances."),
            StepDef::allocate("P2", "Pool", 1).because("P2 takes the other one."),
            StepDef::request("P3", "Pool", 1)
                .because("The pool is empty; P3 waits, but it holds nothing so no cycle is possible."),
            StepDef::release("P1", "Pool", 1).because("P1 returns its instance and P3 receives it."),
        ],
    }
}

fn double_pool_deadlock() -> ScenarioDef {
    ScenarioDef {
        name:        "double-pool-deadlock".into(),
        description: "Multiple instances do not help when each process has drained one pool.".into(),
        processes:   processes(&["P1", "P2"]),
        resources:   vec![ResourceDef::new("R1", 2), ResourceDef::new("R2", 2)],
        steps:       vec![
            StepDef::allocate("P1", "R1", 2).because("P1 takes both instances of R1."),
            StepDef::allocate("P2", "R2", 2).because("P2 takes both instances of R2."),
            StepDef::request("P1", "R2", 1).because("R2 has nothing free; P1 waits for P2."),
            StepDef::request("P2", "R1", 1)
                .because("R1 has nothing free either; P2 waits for P1 and the cycle closes."),
        ],
    }
}
