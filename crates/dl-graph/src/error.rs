use dl_core::{CoreError, ProcessId, ResourceId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Not fatal to a scenario: the step engine turns this into a pending
    /// request.
    #[error("{process} asked for {requested} of {resource} but only {available} are free")]
    InsufficientResource {
        process:   ProcessId,
        resource:  ResourceId,
        requested: u32,
        available: u32,
    },

    #[error("{process} tried to release {requested} of {resource} but holds {held}")]
    OverRelease {
        process:   ProcessId,
        resource:  ResourceId,
        requested: u32,
        held:      u32,
    },

    #[error("{process} would claim {claimed} of {resource}, which has only {total} instances")]
    ExceedsCapacity {
        process:  ProcessId,
        resource: ResourceId,
        claimed:  u32,
        total:    u32,
    },

    #[error("allocation graph invariant violated: {0}")]
    InvariantViolated(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type GraphResult<T> = Result<T, GraphError>;
