//! Haggle - Bootstrap and native mod loader for Peggle and Peggle Nights
//!
//! Main entry point. Run from the game directory.
//!
//! # Execution Flow
//!
//! 1. Load settings from `Haggle.yaml` and `HAGGLE_*` overrides, falling back
//!    to defaults if they are unusable
//! 2. Initialize logging → mods/logs/haggle.<date>, or console only if the
//!    log directory cannot be created
//! 3. Install step (first run only): extract the engine executable into
//!    `mods/cache.bin`, or guide the user through a first launch
//! 4. Load `.dll`/`.asi` mods from `mods/` into this process
//! 5. Hand over to the runtime loader and exit with its exit code
//!
//! Startup problems never end the process with an error code of their own:
//! they are either worked around or shown in a dialog, then the process
//! exits 0.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use haggle::ui::{NativePrompt, UserPrompt};
use haggle::{APP_NAME, App, ConfigManager, VERSION};

fn main() {
    let game_dir = match current_game_dir() {
        Ok(dir) => dir,
        Err(e) => {
            NativePrompt.fatal(&format!(
                "Haggle was unable to read its working directory:\n{:#}",
                e
            ));
            std::process::exit(0);
        }
    };

    let manager = ConfigManager::new(&game_dir);
    let (settings, settings_err) = manager.load_settings_or_default();

    // Held until exit so buffered log lines are flushed
    let guard =
        haggle::logging::setup_logging_or_console(&settings.log_path(&game_dir), settings.debug_mode);

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    match settings_err {
        Some(e) => tracing::warn!("Ignoring unusable settings, using defaults: {:#}", e),
        None if manager.settings_path().exists() => {
            tracing::debug!("Loaded settings from {}", manager.settings_path())
        }
        None => tracing::debug!("No {} found, using defaults", manager.settings_path()),
    }
    tracing::debug!("Settings: {:?}", settings);

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let mut app = App::new(game_dir, settings);
    let report = app.run(&args);

    tracing::debug!("Exiting with code {}", report.exit_code);
    drop(guard);

    // Loaded mods must stay mapped until the very end, so skip destructors
    std::process::exit(report.exit_code)
}

fn current_game_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().context("Failed to get the current directory")?;
    Utf8PathBuf::try_from(dir).context("Game directory path is not valid UTF-8")
}
