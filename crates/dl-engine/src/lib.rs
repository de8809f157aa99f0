//! `dl-engine`: replays a scenario one step at a time.
//!
//! # Step loop
//!
//! ```text
//! advance():
//!   ① Apply    : next step's operation against the AllocationGraph;
//!                request/allocate grant now or queue a pending request.
//!   ② Derive   : Ready / Running / Waiting from each process's edges.
//!   ③ Detect   : wait-for cycle search; cycle members become Blocked.
//!   ④ Settle   : Deadlocked if a cycle exists, Completed after the last
//!                step, Running otherwise.
//! ```
//!
//! `Completed` and `Deadlocked` are terminal: further `advance` calls fail
//! with [`EngineError::NoMoreSteps`] until [`Engine::reset`].
//!
//! # Cargo features
//!
//! | Feature | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | `Snapshot`, `StepOutcome` and `RunOutcome` serialize.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dl_engine::Engine;
//! use dl_scenario::Catalog;
//!
//! let catalog = Catalog::builtin()?;
//! let mut engine = Engine::from_catalog(&catalog, "classic-2x2")?;
//! while !engine.is_terminal() {
//!     let snap = engine.advance()?;
//!     println!("{}", snap.status.unwrap_or_default());
//! }
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod observer;
pub mod snapshot;


pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use observer::{EngineObserver, NoopObserver};
pub use snapshot::{EngineState, RunOutcome, Snapshot, StepOutcome};
