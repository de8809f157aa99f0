//! Process and resource records.
//!
//! These are plain data: the allocation graph (`dl-graph`) owns them and is
//! the only code that mutates holdings, and the step engine (`dl-engine`) is
//! the only code that moves a process between states.

use std::fmt;

use crate::{ProcessId, ResourceId};

// ── Priority ──────────────────────────────────────────────────────────────────

/// Scheduling priority.  Informational only: it is shown in explanations and
/// never used to decide who gets a resource.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low      => "low",
            Priority::Medium   => "medium",
            Priority::High     => "high",
            Priority::Critical => "critical",
        })
    }
}

// ── ProcessState ──────────────────────────────────────────────────────────────

/// Logical state of a simulated process.
///
/// ```text
/// Ready ──grant──▶ Running ──unsatisfiable request──▶ Waiting
///   ▲                 │  ▲                               │
///   └──release all────┘  └──────────grant────────────────┘
///
/// Waiting ──on a detected cycle──▶ Blocked      any ──terminate──▶ Finished
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProcessState {
    /// Holds nothing and waits for nothing.
    #[default]
    Ready,
    /// Holds at least one instance and has no pending request.
    Running,
    /// Has at least one pending request.
    Waiting,
    /// Waiting on a circular-wait chain; it can never proceed.
    Blocked,
    /// Terminated; holds nothing and never will again.
    Finished,
}

impl ProcessState {
    /// `true` for the two states in which a process has a pending request.
    #[inline]
    pub fn is_waiting(self) -> bool {
        matches!(self, ProcessState::Waiting | ProcessState::Blocked)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcessState::Ready    => "ready",
            ProcessState::Running  => "running",
            ProcessState::Waiting  => "waiting",
            ProcessState::Blocked  => "blocked",
            ProcessState::Finished => "finished",
        })
    }
}

// ── Process ───────────────────────────────────────────────────────────────────

/// A simulated process.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Process {
    pub id:          ProcessId,
    pub name:        String,
    pub priority:    Priority,
    /// Execution-time budget in simulated ticks.  Decorative.
    pub burst_ticks: u32,
    pub state:       ProcessState,
}

impl Process {
    pub fn new(id: ProcessId, name: impl Into<String>, priority: Priority, burst_ticks: u32) -> Self {
        Self {
            id,
            name: name.into(),
            priority,
            burst_ticks,
            state: ProcessState::Ready,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == ProcessState::Finished
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// Instances of one resource held by one process.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Holding {
    pub process: ProcessId,
    pub count:   u32,
}

/// A resource type with a fixed number of interchangeable instances.
///
/// `holders` is kept in the order processes first acquired the resource;
/// an entry is removed as soon as its count drops to zero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    pub id:      ResourceId,
    pub name:    String,
    /// Total instances.  Always ≥ 1.
    pub total:   u32,
    pub holders: Vec<Holding>,
}

impl Resource {
    pub fn new(id: ResourceId, name: impl Into<String>, total: u32) -> Self {
        Self {
            id,
            name: name.into(),
            total,
            holders: Vec::new(),
        }
    }

    /// Instances currently held across all processes.
    pub fn held_total(&self) -> u32 {
        self.holders.iter().map(|h| h.count).sum()
    }

    /// Free instances.
    pub fn available(&self) -> u32 {
        self.total.saturating_sub(self.held_total())
    }

    /// Instances held by `process` (0 if none).
    pub fn held_by(&self, process: ProcessId) -> u32 {
        self.holders
            .iter()
            .find(|h| h.process == process)
            .map_or(0, |h| h.count)
    }

    /// Add `count` instances to `process`'s holding.
    ///
    /// Does not check availability; the allocation graph does that before
    /// calling.
    pub fn grant(&mut self, process: ProcessId, count: u32) {
        match self.holders.iter_mut().find(|h| h.process == process) {
            Some(h) => h.count += count,
            None => self.holders.push(Holding { process, count }),
        }
    }

    /// Remove `count` instances from `process`'s holding.
    ///
    /// Returns `false` and leaves the resource untouched if `process` holds
    /// fewer than `count` instances.
    pub fn take_back(&mut self, process: ProcessId, count: u32) -> bool {
        let Some(pos) = self.holders.iter().position(|h| h.process == process) else {
            return false;
        };
        let holding = &mut self.holders[pos];
        if holding.count < count {
            return false;
        }
        holding.count -= count;
        if holding.count == 0 {
            self.holders.remove(pos);
        }
        true
    }
}
