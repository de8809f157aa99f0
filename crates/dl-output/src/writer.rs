//! The `OutputWriter` trait implemented by step-log backends.

use crate::{OutputResult, ResourceUsageRow, StepLogRow};

/// Trait implemented by step-log writers.
///
/// Errors are stored by the observer and retrieved with
/// [`StepLogObserver::take_error`][crate::StepLogObserver::take_error].
pub trait OutputWriter {
    /// Write one row per applied step.
    fn write_step(&mut self, row: &StepLogRow) -> OutputResult<()>;

    /// Write the per-resource usage rows recorded after one step.
    fn write_resource_usage(&mut self, rows: &[ResourceUsageRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
