use dl_graph::GraphError;
use dl_scenario::ScenarioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no more steps: the scenario has finished, reset it first")]
    NoMoreSteps,

    /// A step could not be applied (over-release, capacity, …); the engine
    /// state is unchanged.
    #[error("step {step} failed: {source}")]
    Step {
        step:   usize,
        #[source]
        source: GraphError,
    },

    #[error("allocation graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

impl EngineError {
    /// The graph-level cause, if there is one.
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            EngineError::Step { source, .. } | EngineError::Graph(source) => Some(source),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
