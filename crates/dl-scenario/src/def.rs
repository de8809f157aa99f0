//! Name-based scenario definitions, as written by hand or loaded from JSON.
//!
//! ```json
//! {
//!   "name": "classic-2x2",
//!   "processes": [{ "name": "P1" }, { "name": "P2", "priority": "high" }],
//!   "resources": [{ "name": "R1" }, { "name": "R2", "instances": 1 }],
//!   "steps": [
//!     { "action": "allocate", "process": "P1", "resource": "R1",
//!       "explanation": "P1 takes the free R1." },
//!     { "action": "request", "process": "P1", "resource": "R2", "count": 1 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use dl_core::Priority;

use crate::{Scenario, ScenarioResult};

fn one() -> u32 {
    1
}

/// A process that exists before the first step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDef {
    pub name:        String,
    #[serde(default)]
    pub priority:    Priority,
    #[serde(default = "one")]
    pub burst_ticks: u32,
}

impl ProcessDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            priority:    Priority::default(),
            burst_ticks: 1,
        }
    }
}

/// A resource that exists before the first step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub name:      String,
    #[serde(default = "one")]
    pub instances: u32,
}

impl ResourceDef {
    pub fn new(name: impl Into<String>, instances: u32) -> Self {
        Self { name: name.into(), instances }
    }
}

/// One scenario action, operands by name.
///
/// `request` and `allocate` differ only in how they are narrated: both grant
/// immediately when enough instances are free and otherwise leave the
/// process waiting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    SpawnProcess {
        name:        String,
        #[serde(default)]
        priority:    Priority,
        #[serde(default = "one")]
        burst_ticks: u32,
    },
    AddResource {
        name:      String,
        #[serde(default = "one")]
        instances: u32,
    },
    Request {
        process:  String,
        resource: String,
        #[serde(default = "one")]
        count:    u32,
    },
    Allocate {
        process:  String,
        resource: String,
        #[serde(default = "one")]
        count:    u32,
    },
    Release {
        process:  String,
        resource: String,
        #[serde(default = "one")]
        count:    u32,
    },
    TerminateProcess {
        process: String,
    },
}

impl Action {
    /// Kebab-case tag, as used in JSON and CSV files.
    pub fn tag(&self) -> &'static str {
        match self {
            Action::SpawnProcess { .. }     => "spawn-process",
            Action::AddResource { .. }      => "add-resource",
            Action::Request { .. }          => "request",
            Action::Allocate { .. }         => "allocate",
            Action::Release { .. }          => "release",
            Action::TerminateProcess { .. } => "terminate-process",
        }
    }
}

/// An action plus the optional "why this happens" text shown with the
/// resulting state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDef {
    #[serde(flatten)]
    pub action:      Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl StepDef {
    pub fn new(action: Action) -> Self {
        Self { action, explanation: None }
    }

    pub fn allocate(process: &str, resource: &str, count: u32) -> Self {
        Self::new(Action::Allocate {
            process:  process.to_owned(),
            resource: resource.to_owned(),
            count,
        })
    }

    pub fn request(process: &str, resource: &str, count: u32) -> Self {
        Self::new(Action::Request {
            process:  process.to_owned(),
            resource: resource.to_owned(),
            count,
        })
    }

    pub fn release(process: &str, resource: &str, count: u32) -> Self {
        Self::new(Action::Release {
            process:  process.to_owned(),
            resource: resource.to_owned(),
            count,
        })
    }

    pub fn terminate(process: &str) -> Self {
        Self::new(Action::TerminateProcess { process: process.to_owned() })
    }

    /// Attach an explanation (builder style).
    pub fn because(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// A complete, not yet validated scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDef {
    /// Identifier used for catalog lookup.
    pub name:        String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub processes:   Vec<ProcessDef>,
    #[serde(default)]
    pub resources:   Vec<ResourceDef>,
    #[serde(default)]
    pub steps:       Vec<StepDef>,
}

impl ScenarioDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:        name.into(),
            description: String::new(),
            processes:   Vec::new(),
            resources:   Vec::new(),
            steps:       Vec::new(),
        }
    }

    /// Resolve names to ids and check every step; see [`Scenario`].
    pub fn validate(self) -> ScenarioResult<Scenario> {
        Scenario::try_from(self)
    }
}
