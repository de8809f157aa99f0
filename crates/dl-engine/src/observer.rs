//! Engine observer trait for progress reporting and step logging.

use crate::{RunOutcome, Snapshot};

/// Callbacks invoked by [`Engine::run_observed`][crate::Engine::run_observed]
/// and [`Engine::advance_observed`][crate::Engine::advance_observed].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: status printer
///
/// ```rust,ignore
/// struct StatusPrinter;
///
/// impl EngineObserver for StatusPrinter {
///     fn on_step(&mut self, snap: &Snapshot) {
///         if let Some(status) = &snap.status {
///             println!("step {}: {status}", snap.step_index);
///         }
///     }
/// }
/// ```
pub trait EngineObserver {
    /// Called after every successfully applied step.
    fn on_step(&mut self, _snapshot: &Snapshot) {}

    /// Called once, right after `on_step`, for the step that closed a cycle.
    fn on_deadlock(&mut self, _snapshot: &Snapshot) {}

    /// Called once when a run reaches a terminal state.
    fn on_finish(&mut self, _outcome: &RunOutcome) {}
}

/// An [`EngineObserver`] that does nothing.
pub struct NoopObserver;

impl EngineObserver for NoopObserver {}
