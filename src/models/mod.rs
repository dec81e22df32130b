//! Data models for the Haggle mod loader.
//!
//! - [`GameVariant`]: Which of the two supported games owns the working directory
//! - [`InstallState`]: Whether the cache artifact has been extracted yet
//! - [`ModCandidate`], [`LoadOutcome`], [`LoadReport`]: Per-run results of the mod loading pass
//! - [`LoaderSettings`]: Paths and knobs loaded from `Haggle.yaml`
//!
//! None of these hold process-wide state. The load count in particular lives in
//! the [`LoadReport`] returned by the loading pass.

pub mod config;
pub mod game;
pub mod install;
pub mod outcome;

pub use config::LoaderSettings;
pub use game::GameVariant;
pub use install::InstallState;
pub use outcome::{LoadOutcome, LoadReport, LoadSummary, ModCandidate, MOD_EXTENSIONS};
