use crate::models::{GameVariant, InstallState, LoaderSettings};
use crate::services::game_detection::detect_game_variant;
use crate::services::process::ProcessControl;
use crate::services::shell::ShellLauncher;
use crate::ui::{PromptChoice, UserPrompt};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How the bootstrap step ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The cache artifact was already there; nothing was touched
    AlreadyInstalled,
    /// The engine executable was relocated and the companion launched
    Extracted,
    /// First launch: the game was started through the store and the companion launched
    LaunchedViaStore,
    /// First launch: the user chose not to continue
    Cancelled,
}

impl BootstrapOutcome {
    /// Only an existing install hands control on to the mod loader.
    pub fn continues_to_game(self) -> bool {
        self == Self::AlreadyInstalled
    }
}

/// Fatal errors of the bootstrap step. Each one ends the current run.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Unable to determine which game {0} belongs to")]
    UnknownGame(Utf8PathBuf),

    #[error("Failed to terminate engine process {0}")]
    EngineNotTerminated(String),

    #[error("Failed to move {from} to {to}: {source}")]
    Relocation {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open {uri}: {source}")]
    StoreLaunch {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("Timed out after {waited:?} waiting for {process} to start")]
    LaunchTimedOut { process: String, waited: Duration },

    #[error("Failed to create {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Text for the blocking error dialog.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownGame(_) => "Haggle was unable to determine which game this directory belongs to.\n\
                 Please try again in the proper directory."
                .to_string(),
            Self::EngineNotTerminated(_) | Self::Relocation { .. } => {
                "Haggle was unable to extract the data necessary to run, please try again."
                    .to_string()
            }
            Self::StoreLaunch { uri, .. } => format!(
                "Haggle was unable to launch the game through Steam ({}).\n\
                 Please launch the game manually, then launch Haggle.exe.",
                uri
            ),
            Self::LaunchTimedOut { process, .. } => format!(
                "Haggle gave up waiting for {} to start, please try again.",
                process
            ),
            Self::Io { path, source } => {
                format!("Haggle was unable to create {}:\n{}", path, source)
            }
        }
    }

    /// Exit code used when distinct exit codes are enabled.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownGame(_) => 2,
            Self::EngineNotTerminated(_) | Self::Relocation { .. } => 3,
            Self::StoreLaunch { .. } => 4,
            Self::LaunchTimedOut { .. } => 5,
            Self::Io { .. } => 6,
        }
    }
}

/// One-shot install step: makes sure the cache artifact exists.
///
/// On first run the game's engine process is killed and its executable moved
/// into the mods directory as the cache artifact. If the game has never been
/// started there is nothing to extract yet, so the user is offered a store
/// launch instead.
pub struct Bootstrapper<'a> {
    settings: &'a LoaderSettings,
    game_dir: &'a Utf8Path,
    processes: &'a mut dyn ProcessControl,
    shell: &'a dyn ShellLauncher,
    prompt: &'a dyn UserPrompt,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(
        settings: &'a LoaderSettings,
        game_dir: &'a Utf8Path,
        processes: &'a mut dyn ProcessControl,
        shell: &'a dyn ShellLauncher,
        prompt: &'a dyn UserPrompt,
    ) -> Self {
        Self {
            settings,
            game_dir,
            processes,
            shell,
            prompt,
        }
    }

    /// Run the install step.
    ///
    /// Always creates the mods directory first. When the cache artifact is
    /// already present nothing else happens, not even a process lookup.
    ///
    /// # Returns
    /// How the step ended; only [`BootstrapOutcome::AlreadyInstalled`]
    /// continues on to the game.
    ///
    /// # Errors
    /// - [`InstallError::Io`] if the mods directory cannot be created
    /// - [`InstallError::UnknownGame`] if no known game executable is present
    /// - [`InstallError::EngineNotTerminated`] or [`InstallError::Relocation`]
    ///   if extraction fails
    /// - [`InstallError::StoreLaunch`] if the store URI cannot be opened
    /// - [`InstallError::LaunchTimedOut`] if a launch timeout is configured and
    ///   the game does not appear in time
    pub fn run(&mut self) -> Result<BootstrapOutcome, InstallError> {
        let mods_dir = self.settings.mods_path(self.game_dir);
        if !mods_dir.exists() {
            fs::create_dir_all(&mods_dir).map_err(|source| InstallError::Io {
                path: mods_dir.clone(),
                source,
            })?;
            tracing::info!("Created mods folder at {}", mods_dir);
        }

        let cache_path = self.settings.cache_path(self.game_dir);
        if InstallState::detect(&cache_path).is_installed() {
            tracing::debug!("Cache present at {}, skipping install", cache_path);
            return Ok(BootstrapOutcome::AlreadyInstalled);
        }

        let variant = detect_game_variant(self.game_dir)
            .ok_or_else(|| InstallError::UnknownGame(self.game_dir.to_path_buf()))?;

        tracing::info!("No cache found, installing for {}", variant);

        if self.processes.terminate_process(&variant.executable()) {
            self.extract(variant, &cache_path)
        } else {
            self.first_launch(variant)
        }
    }

    fn extract(
        &mut self,
        variant: GameVariant,
        cache_path: &Utf8Path,
    ) -> Result<BootstrapOutcome, InstallError> {
        let settings = self.settings;
        let engine = &settings.engine_process;
        if !self.processes.terminate_process(engine) {
            return Err(InstallError::EngineNotTerminated(engine.clone()));
        }

        let source = variant.engine_executable_path(&settings.popcap_data_dir, engine);
        relocate(&source, cache_path).map_err(|e| InstallError::Relocation {
            from: source.clone(),
            to: cache_path.to_path_buf(),
            source: e,
        })?;

        tracing::info!("Extracted {} to {}", source, cache_path);

        self.launch_companion();
        Ok(BootstrapOutcome::Extracted)
    }

    fn first_launch(&mut self, variant: GameVariant) -> Result<BootstrapOutcome, InstallError> {
        let message = format!(
            "Since this is your first time launching Haggle, please launch {} through Steam first then launch {}.\n\n\
             Press retry to attempt automagic installation.\n\
             Press cancel to stop the process and try again manually.",
            variant, self.settings.companion_exe
        );

        if self.prompt.retry_or_cancel(&message) == PromptChoice::Cancel {
            tracing::info!("Install cancelled by user");
            return Ok(BootstrapOutcome::Cancelled);
        }

        let uri = variant.store_uri(&self.settings.store_uri_scheme);
        self.shell
            .open(&uri)
            .map_err(|source| InstallError::StoreLaunch { uri, source })?;

        self.wait_for_process(&variant.executable())?;

        self.launch_companion();
        Ok(BootstrapOutcome::LaunchedViaStore)
    }

    /// Block until `image_name` shows up in the process table.
    ///
    /// Without a configured timeout this waits forever.
    fn wait_for_process(&mut self, image_name: &str) -> Result<(), InstallError> {
        let interval = self.settings.poll_interval();
        let timeout = self.settings.launch_timeout();
        let start = Instant::now();

        tracing::info!("Waiting for {} to start", image_name);

        while self.processes.find_process(image_name).is_none() {
            let waited = start.elapsed();
            if timeout.is_some_and(|limit| waited >= limit) {
                return Err(InstallError::LaunchTimedOut {
                    process: image_name.to_string(),
                    waited,
                });
            }
            thread::sleep(interval);
        }

        tracing::info!("{} is running", image_name);
        Ok(())
    }

    fn launch_companion(&self) {
        let companion = self.game_dir.join(&self.settings.companion_exe);
        if let Err(e) = self.shell.open(companion.as_str()) {
            tracing::warn!("Failed to launch {}: {}", companion, e);
        }
    }
}

/// Move a file, falling back to copy + delete across volumes.
///
/// The copy goes through a temporary name so a half-written file never
/// appears at `to`.
fn relocate(from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
    let rename_err = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if !from.is_file() {
        return Err(rename_err);
    }

    tracing::debug!("Rename failed ({}), copying instead", rename_err);

    let partial = to.with_extension("partial");
    if let Err(e) = fs::copy(from, &partial).and_then(|_| fs::rename(&partial, to)) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    if let Err(e) = fs::remove_file(from) {
        tracing::warn!("Copied {} but could not remove it: {}", from, e);
    }

    Ok(())
}
