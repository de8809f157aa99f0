//! `dl-graph`: the bipartite resource-allocation graph.
//!
//! # Edge model
//!
//! ```text
//!   Held:       Resource ──count──▶ Process     (stored in Resource::holders)
//!   Requested:  Process  ──count──▶ Resource    (stored in the FIFO pending queue)
//! ```
//!
//! # Invariants (checked by [`AllocationGraph::check_invariants`])
//!
//! - For every resource, Σ held ≤ total.
//! - For every (process, resource) pair, held + requested ≤ total.
//! - Finished processes hold nothing and request nothing.
//!
//! # Crate layout
//!
//! | Module    | Contents                                            |
//! |-----------|-----------------------------------------------------|
//! | [`edge`]  | `Edge`, `EdgeKind`, `EdgesOf` iterator              |
//! | [`graph`] | `AllocationGraph`, `PendingRequest`, `Grant`        |
//! | [`error`] | `GraphError`, `GraphResult<T>`                      |

pub mod edge;
pub mod error;
pub mod graph;

#[cfg(test)]
mod tests;

pub use edge::{Edge, EdgeKind, EdgesOf};
pub use error::{GraphError, GraphResult};
pub use graph::{AllocationGraph, Grant, PendingRequest};
