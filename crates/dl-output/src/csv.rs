//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `step_log.csv`
//! - `resource_usage.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, ResourceUsageRow, StepLogRow};

/// Writes step logs to two CSV files.
pub struct CsvWriter {
    steps:    Writer<File>,
    usage:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut steps = Writer::from_path(dir.join("step_log.csv"))?;
        steps.write_record([
            "step",
            "outcome",
            "process",
            "resource",
            "status",
            "state",
            "deadlocked",
            "cycle",
            "explanation",
        ])?;

        let mut usage = Writer::from_path(dir.join("resource_usage.csv"))?;
        usage.write_record(["step", "resource", "total", "held", "available", "requested"])?;

        Ok(Self {
            steps,
            usage,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_step(&mut self, row: &StepLogRow) -> OutputResult<()> {
        self.steps.write_record([
            row.step.to_string().as_str(),
            row.outcome.as_str(),
            row.process.as_str(),
            row.resource.as_str(),
            row.status.as_str(),
            row.state.as_str(),
            if row.deadlocked { "1" } else { "0" },
            row.cycle.as_str(),
            row.explanation.as_str(),
        ])?;
        Ok(())
    }

    fn write_resource_usage(&mut self, rows: &[ResourceUsageRow]) -> OutputResult<()> {
        for row in rows {
            self.usage.write_record(&[
                row.step.to_string(),
                row.resource.clone(),
                row.total.to_string(),
                row.held.to_string(),
                row.available.to_string(),
                row.requested.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.steps.flush()?;
        self.usage.flush()?;
        Ok(())
    }
}
