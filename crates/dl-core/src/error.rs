//! Base error type.
//!
//! `dl-graph` wraps `CoreError` as one variant of its own `GraphError`;
//! `dl-scenario` keeps a separate load-time `ScenarioError`.

use thiserror::Error;

use crate::{ProcessId, ResourceId};

/// Lookup and record-level failures shared by the `dl-*` crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("process {0} not found")]
    ProcessNotFound(ProcessId),

    #[error("resource {0} not found")]
    ResourceNotFound(ResourceId),

    #[error("instance count must be at least 1")]
    ZeroCount,

    #[error("process {0} has already finished")]
    ProcessFinished(ProcessId),
}

/// Shorthand result type for `dl-core`.
pub type CoreResult<T> = Result<T, CoreError>;
