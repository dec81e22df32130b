// Haggle - Bootstrap and native mod loader for Peggle and Peggle Nights
//
// This is the library crate containing the install step, the mod loading pass
// and the capability traits they run against. The binary crate (main.rs)
// wires them to the real OS implementations.

pub mod app;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod ui;

// Re-export commonly used types for convenience
pub use app::{App, RunReport};
pub use config::ConfigManager;
pub use models::{GameVariant, InstallState, LoadOutcome, LoadReport, LoaderSettings};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
