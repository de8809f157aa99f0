//! `dl-scenario`: what the step engine replays.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`def`]        | `ScenarioDef`, `StepDef`, `Action`: name-based, serde    |
//! | [`scenario`]   | `Scenario`, `Step`, `Op`: validated, id-based            |
//! | [`catalog`]    | `Catalog`, built-in teaching scenarios                    |
//! | [`loader`]     | JSON and CSV scenario loaders                             |
//! | [`generator`]  | `GeneratorConfig`, seeded random scenario producer        |
//! | [`error`]      | `ScenarioError`, `ScenarioResult<T>`                      |
//!
//! # Load-time validation
//!
//! A `ScenarioDef` refers to processes and resources by display name.
//! [`ScenarioDef::validate`] walks the definition once, assigns the dense ids
//! the allocation graph will hand out, and rejects the whole scenario if any
//! step names an entity that does not exist at that point.  The step engine
//! therefore never sees an unknown id.

pub mod catalog;
pub mod def;
pub mod error;
pub mod generator;
pub mod loader;
pub mod scenario;


pub use catalog::Catalog;
pub use def::{Action, ProcessDef, ResourceDef, ScenarioDef, StepDef};
pub use error::{Location, ScenarioError, ScenarioResult};
pub use generator::{GeneratorConfig, generate, generate_def};
pub use loader::{load_scenario_csv, load_scenario_csv_reader, load_scenario_json, load_scenario_json_reader};
pub use scenario::{Op, Scenario, Step};
