//! `dl-output`: step-log writers for the deadlock step engine.
//!
//! | Backend | Files created                             |
//! |---------|-------------------------------------------|
//! | CSV     | `step_log.csv`, `resource_usage.csv`      |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`StepLogObserver`], which implements `dl_engine::EngineObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use dl_output::{CsvWriter, StepLogObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = StepLogObserver::new(writer);
//! engine.run_observed(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::StepLogObserver;
pub use row::{ResourceUsageRow, StepLogRow};
pub use writer::OutputWriter;
