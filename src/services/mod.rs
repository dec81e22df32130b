//! Services module - the loader's startup logic.
//!
//! Two components run in strict sequence on every start:
//!
//! - [`Bootstrapper`]: One-shot install step. Guarded by the cache artifact in
//!   the mods directory; when it is missing, kills the game and its engine
//!   process and moves the engine executable into place, or walks the user
//!   through a first launch via the store.
//! - [`ModLoader`]: Scans the mods directory and loads every `.dll`/`.asi`
//!   into the current process, producing a [`LoadReport`](crate::models::LoadReport).
//!
//! After both, control passes to a [`RuntimeLoader`].
//!
//! # Capabilities
//!
//! Everything that touches the OS beyond the filesystem sits behind a small trait
//! so the algorithms can be driven by fakes in tests:
//!
//! - [`ProcessControl`]: find and terminate processes by image name
//! - [`ShellLauncher`]: shell-level "open" for executables and store URIs
//! - [`ModuleLoader`]: in-process dynamic loading
//! - [`RuntimeLoader`]: the downstream game runtime
//! - [`UserPrompt`](crate::ui::UserPrompt): modal dialogs

pub mod bootstrap;
pub mod game_detection;
pub mod mod_loader;
pub mod process;
pub mod runtime;
pub mod shell;

pub use bootstrap::{BootstrapOutcome, Bootstrapper, InstallError};
pub use game_detection::detect_game_variant;
pub use mod_loader::{LibraryLoader, LoadStatus, ModLoader, ModLoaderError, ModuleLoader};
pub use process::{ProcessControl, SystemProcessControl};
pub use runtime::{ChildProcessRuntime, RuntimeError, RuntimeLoader};
pub use shell::{ShellLauncher, SystemShell};
