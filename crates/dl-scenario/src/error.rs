use std::fmt;

use dl_graph::GraphError;
use thiserror::Error;

/// Where in a scenario definition a problem was found.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Location {
    /// The initial `processes` / `resources` lists.
    Setup,
    /// Index into `steps`.
    Step(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Setup   => f.write_str("setup"),
            Location::Step(i) => write!(f, "step {i}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{at}: unknown process or resource {name:?}")]
    UnknownEntity { at: Location, name: String },

    #[error("{at}: name {name:?} is already in use")]
    DuplicateEntity { at: Location, name: String },

    #[error("{at}: count for {name:?} must be at least 1")]
    InvalidCount { at: Location, name: String },

    #[error("{at}: {count} exceeds the {total} instances of {resource:?}")]
    ExceedsCapacity {
        at:       Location,
        resource: String,
        count:    u32,
        total:    u32,
    },

    #[error("scenario {0:?} not found")]
    NotFound(String),

    #[error("scenario parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid generator config: {0}")]
    InvalidConfig(String),

    #[error("generator error: {0}")]
    Graph(#[from] GraphError),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
