//! Values handed out by the engine: lifecycle state, per-step outcomes, and
//! the owned snapshot the presentation layer renders.

use std::fmt;

use dl_core::{NodeRef, Process, ProcessId, Resource, ResourceId};
use dl_graph::{AllocationGraph, Edge, Grant};

// ── EngineState ───────────────────────────────────────────────────────────────

/// ```text
/// NotStarted ──advance──▶ Running ──advance (last step)──▶ Completed
///      │                     │
///      └───────advance───────┴──cycle detected──▶ Deadlocked
///
/// any ──reset──▶ NotStarted
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EngineState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Deadlocked,
}

impl EngineState {
    /// `Completed` and `Deadlocked` accept no further steps.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, EngineState::Completed | EngineState::Deadlocked)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineState::NotStarted => "not started",
            EngineState::Running    => "running",
            EngineState::Completed  => "completed",
            EngineState::Deadlocked => "deadlocked",
        })
    }
}

// ── StepOutcome ───────────────────────────────────────────────────────────────

/// What one applied step did to the allocation graph.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "lowercase"))]
pub enum StepOutcome {
    Spawned {
        process: ProcessId,
    },
    Added {
        resource: ResourceId,
    },
    /// Allocate or request that was satisfied immediately.
    Granted {
        process:  ProcessId,
        resource: ResourceId,
        count:    u32,
    },
    /// Allocate or request that became a pending request.
    Waiting {
        process:   ProcessId,
        resource:  ResourceId,
        count:     u32,
        available: u32,
    },
    /// `grants` are the pending requests served by the freed instances.
    Released {
        process:  ProcessId,
        resource: ResourceId,
        count:    u32,
        grants:   Vec<Grant>,
    },
    Terminated {
        process: ProcessId,
        grants:  Vec<Grant>,
    },
}

impl StepOutcome {
    /// Short lowercase tag, as written to step logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StepOutcome::Spawned { .. }    => "spawned",
            StepOutcome::Added { .. }      => "added",
            StepOutcome::Granted { .. }    => "granted",
            StepOutcome::Waiting { .. }    => "waiting",
            StepOutcome::Released { .. }   => "released",
            StepOutcome::Terminated { .. } => "terminated",
        }
    }

    /// The process the step acted for, if any.
    pub fn process(&self) -> Option<ProcessId> {
        match *self {
            StepOutcome::Spawned { process }
            | StepOutcome::Granted { process, .. }
            | StepOutcome::Waiting { process, .. }
            | StepOutcome::Released { process, .. }
            | StepOutcome::Terminated { process, .. } => Some(process),
            StepOutcome::Added { .. } => None,
        }
    }

    /// The resource the step acted on, if any.
    pub fn resource(&self) -> Option<ResourceId> {
        match *self {
            StepOutcome::Added { resource }
            | StepOutcome::Granted { resource, .. }
            | StepOutcome::Waiting { resource, .. }
            | StepOutcome::Released { resource, .. } => Some(resource),
            StepOutcome::Spawned { .. } | StepOutcome::Terminated { .. } => None,
        }
    }

    /// One status line using display names, e.g. `"P1 → R1 granted"` or
    /// `"P2 waits for R1 held by P1"`.
    pub fn status(&self, graph: &AllocationGraph) -> String {
        let p = |id: ProcessId| graph.process(id).map_or_else(|_| id.to_string(), |p| p.name.clone());
        let r = |id: ResourceId| graph.resource(id).map_or_else(|_| id.to_string(), |r| r.name.clone());
        let times = |count: u32| if count > 1 { format!(" ×{count}") } else { String::new() };
        let served = |grants: &[Grant]| {
            grants
                .iter()
                .map(|g| format!("; {}{} granted to {}", r(g.resource), times(g.count), p(g.process)))
                .collect::<String>()
        };

        match self {
            StepOutcome::Spawned { process } => format!("{} created", p(*process)),
            StepOutcome::Added { resource } => {
                let total = graph.resource(*resource).map_or(0, |res| res.total);
                format!("{} added ({total} instance(s))", r(*resource))
            }
            StepOutcome::Granted { process, resource, count } => {
                format!("{} → {}{} granted", p(*process), r(*resource), times(*count))
            }
            StepOutcome::Waiting { process, resource, count, .. } => {
                let holders = graph
                    .resource(*resource)
                    .map(|res| res.holders.iter().map(|h| p(h.process)).collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                if holders.is_empty() {
                    format!("{} waits for {}{}", p(*process), r(*resource), times(*count))
                } else {
                    format!("{} waits for {}{} held by {holders}", p(*process), r(*resource), times(*count))
                }
            }
            StepOutcome::Released { process, resource, count, grants } => format!(
                "{} released {}{}{}",
                p(*process),
                r(*resource),
                times(*count),
                served(grants)
            ),
            StepOutcome::Terminated { process, grants } => {
                format!("{} terminated{}", p(*process), served(grants))
            }
        }
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// An owned, point-in-time copy of the engine state.  Later engine calls
/// never change a snapshot that was already handed out.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub scenario:        String,
    /// Number of steps applied so far.
    pub step_index:      usize,
    pub total_steps:     usize,
    pub state:           EngineState,
    pub processes:       Vec<Process>,
    pub resources:       Vec<Resource>,
    /// Held edges in resource order, then Requested edges in FIFO order.
    pub edges:           Vec<Edge>,
    /// Alternating `[P, R, P, R, …]`; empty unless deadlocked.
    pub cycle:           Vec<NodeRef>,
    /// Explanation text of the last applied step.
    pub explanation:     Option<String>,
    pub outcome:         Option<StepOutcome>,
    /// [`StepOutcome::status`] of `outcome`.
    pub status:          Option<String>,
    /// Full deadlock report; set only in the `Deadlocked` state.
    pub deadlock_report: Option<String>,
}

impl Snapshot {
    pub fn is_deadlocked(&self) -> bool {
        self.state == EngineState::Deadlocked
    }

    pub fn process_by_name(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn resource_by_name(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// Result of [`Engine::run_to_completion`][crate::Engine::run_to_completion].
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunOutcome {
    pub state:         EngineState,
    pub steps_applied: usize,
    /// Empty unless `state` is `Deadlocked`.
    pub cycle:         Vec<NodeRef>,
}
