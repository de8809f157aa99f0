//! `dl-core`: foundational types for the deadlock simulator.
//!
//! This crate is a dependency of every other `dl-*` crate.  It has no `dl-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`ids`]     | `ProcessId`, `ResourceId`, `NodeRef`                      |
//! | [`entity`]  | `Process`, `ProcessState`, `Priority`, `Resource`, `Holding` |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod entity;
pub mod error;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use entity::{Holding, Priority, Process, ProcessState, Resource};
pub use error::{CoreError, CoreResult};
pub use ids::{NodeRef, ProcessId, ResourceId};
