use crate::models::LoaderSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// Name of the optional settings file in the game directory.
pub const SETTINGS_FILE: &str = "Haggle.yaml";

/// Prefix for environment variable overrides, e.g. `HAGGLE_POLL_INTERVAL_MS`.
pub const ENV_PREFIX: &str = "HAGGLE";

/// Configuration manager for loading and saving loader settings.
///
/// Settings are layered: built-in defaults, then `Haggle.yaml` in the game
/// directory (optional), then `HAGGLE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    game_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    env_overrides: Option<config::Map<String, String>>,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at the game directory.
    ///
    /// Unlike the mods directory, the game directory is never created here.
    pub fn new<P: AsRef<Utf8Path>>(game_dir: P) -> Self {
        let game_dir = game_dir.as_ref().to_path_buf();

        Self {
            settings_path: game_dir.join(SETTINGS_FILE),
            game_dir,
            env_overrides: None,
        }
    }

    /// Use a fixed variable map instead of the process environment.
    pub fn with_env_overrides(mut self, vars: config::Map<String, String>) -> Self {
        self.env_overrides = Some(vars);
        self
    }

    pub fn game_dir(&self) -> &Utf8Path {
        &self.game_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    /// Load settings, falling back to defaults for anything not set.
    ///
    /// # Errors
    /// Returns an error if the settings file exists but cannot be parsed, or if
    /// an override has the wrong type.
    pub fn load_settings(&self) -> Result<LoaderSettings> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(self.env_overrides.clone());

        let settings: LoaderSettings = Config::builder()
            .add_source(
                File::new(self.settings_path.as_str(), FileFormat::Yaml).required(false),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        Ok(settings)
    }

    /// Load settings, or defaults if they cannot be loaded.
    ///
    /// A broken settings file must not keep the game from starting. The error
    /// is handed back so it can be reported once logging is up.
    ///
    /// # Returns
    /// The settings to run with, plus the load error if defaults were used
    pub fn load_settings_or_default(&self) -> (LoaderSettings, Option<anyhow::Error>) {
        match self.load_settings() {
            Ok(settings) => (settings, None),
            Err(e) => (LoaderSettings::default(), Some(e)),
        }
    }

    /// Save settings to the settings file.
    pub fn save_settings(&self, settings: &LoaderSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Write a settings file with all defaults, unless one already exists.
    ///
    /// # Returns
    /// `true` if a file was written
    pub fn write_default(&self) -> Result<bool> {
        if self.settings_path.exists() {
            return Ok(false);
        }

        self.save_settings(&LoaderSettings::default())?;
        Ok(true)
    }
}
