//! `StepLogObserver<W>`: bridges `EngineObserver` to an `OutputWriter`.

use dl_core::{NodeRef, ProcessId, ResourceId};
use dl_engine::{EngineObserver, RunOutcome, Snapshot};
use dl_graph::EdgeKind;

use crate::row::{ResourceUsageRow, StepLogRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// An [`EngineObserver`] that writes one step-log row and one usage row per
/// resource for every applied step.
///
/// Errors from the writer are stored internally because `EngineObserver`
/// methods have no return value.  After the run, check for errors with
/// [`take_error`][Self::take_error].
pub struct StepLogObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> StepLogObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EngineObserver for StepLogObserver<W> {
    fn on_step(&mut self, snapshot: &Snapshot) {
        let result = self.writer.write_step(&step_row(snapshot));
        self.store_err(result);

        let rows = usage_rows(snapshot);
        if !rows.is_empty() {
            let result = self.writer.write_resource_usage(&rows);
            self.store_err(result);
        }
    }

    fn on_finish(&mut self, _outcome: &RunOutcome) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}

// ── Row construction ──────────────────────────────────────────────────────────

fn process_name(snap: &Snapshot, id: ProcessId) -> String {
    snap.processes
        .get(id.index())
        .map_or_else(|| id.to_string(), |p| p.name.clone())
}

fn resource_name(snap: &Snapshot, id: ResourceId) -> String {
    snap.resources
        .get(id.index())
        .map_or_else(|| id.to_string(), |r| r.name.clone())
}

pub(crate) fn step_row(snap: &Snapshot) -> StepLogRow {
    let outcome = snap.outcome.as_ref();
    StepLogRow {
        step:        snap.step_index,
        outcome:     outcome.map(|o| o.kind().to_owned()).unwrap_or_default(),
        process:     outcome
            .and_then(|o| o.process())
            .map(|p| process_name(snap, p))
            .unwrap_or_default(),
        resource:    outcome
            .and_then(|o| o.resource())
            .map(|r| resource_name(snap, r))
            .unwrap_or_default(),
        status:      snap.status.clone().unwrap_or_default(),
        state:       snap.state.to_string(),
        deadlocked:  snap.is_deadlocked(),
        cycle:       snap
            .cycle
            .iter()
            .map(|&node| match node {
                NodeRef::Process(p)  => process_name(snap, p),
                NodeRef::Resource(r) => resource_name(snap, r),
            })
            .collect::<Vec<_>>()
            .join(" → "),
        explanation: snap.explanation.clone().unwrap_or_default(),
    }
}

pub(crate) fn usage_rows(snap: &Snapshot) -> Vec<ResourceUsageRow> {
    snap.resources
        .iter()
        .map(|r| ResourceUsageRow {
            step:      snap.step_index,
            resource:  r.name.clone(),
            total:     r.total,
            held:      r.held_total(),
            available: r.available(),
            requested: snap
                .edges
                .iter()
                .filter(|e| e.kind == EdgeKind::Requested && e.resource() == r.id)
                .map(|e| e.count)
                .sum(),
        })
        .collect()
}
