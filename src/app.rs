//! Startup orchestration.
//!
//! [`App::run`] is the whole life of the loader process:
//!
//! 1. Bootstrap (install step). Anything other than "already installed" ends the run.
//! 2. Hand the cache artifact to the runtime loader.
//! 3. Load mods from the mods directory.
//! 4. Run the game through the runtime loader and return its exit code.
//!
//! Install failures are shown in a blocking dialog. Mod load failures only
//! show up in the log and the [`LoadReport`].

use crate::models::{LoadReport, LoaderSettings};
use crate::services::{
    BootstrapOutcome, Bootstrapper, ChildProcessRuntime, InstallError, LibraryLoader, ModLoader,
    ModuleLoader, ProcessControl, RuntimeLoader, ShellLauncher, SystemProcessControl, SystemShell,
};
use crate::ui::{NativePrompt, UserPrompt};
use camino::{Utf8Path, Utf8PathBuf};

/// Exit code when the runtime loader itself fails.
pub const RUNTIME_FAILURE_EXIT_CODE: i32 = 1;

/// What a run did, for the caller and for tests
#[derive(Debug)]
pub struct RunReport {
    pub exit_code: i32,
    /// `None` when the install step failed
    pub bootstrap: Option<BootstrapOutcome>,
    /// `None` when the mod pass did not run or found no mods folder
    pub mods: Option<LoadReport>,
}

impl RunReport {
    fn stopped(exit_code: i32, bootstrap: Option<BootstrapOutcome>) -> Self {
        Self {
            exit_code,
            bootstrap,
            mods: None,
        }
    }
}

pub struct App {
    game_dir: Utf8PathBuf,
    settings: LoaderSettings,
    processes: Box<dyn ProcessControl>,
    shell: Box<dyn ShellLauncher>,
    prompt: Box<dyn UserPrompt>,
    modules: Box<dyn ModuleLoader>,
    runtime: Box<dyn RuntimeLoader>,
}

impl App {
    /// Create an app wired to the real OS implementations.
    pub fn new(game_dir: impl Into<Utf8PathBuf>, settings: LoaderSettings) -> Self {
        let game_dir = game_dir.into();

        Self {
            runtime: Box::new(ChildProcessRuntime::new(&game_dir)),
            game_dir,
            settings,
            processes: Box::new(SystemProcessControl::new()),
            shell: Box::new(SystemShell),
            prompt: Box::new(NativePrompt),
            modules: Box::new(LibraryLoader::new()),
        }
    }

    pub fn with_process_control(mut self, processes: impl ProcessControl + 'static) -> Self {
        self.processes = Box::new(processes);
        self
    }

    pub fn with_shell(mut self, shell: impl ShellLauncher + 'static) -> Self {
        self.shell = Box::new(shell);
        self
    }

    pub fn with_prompt(mut self, prompt: impl UserPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn with_module_loader(mut self, modules: impl ModuleLoader + 'static) -> Self {
        self.modules = Box::new(modules);
        self
    }

    pub fn with_runtime(mut self, runtime: impl RuntimeLoader + 'static) -> Self {
        self.runtime = Box::new(runtime);
        self
    }

    pub fn game_dir(&self) -> &Utf8Path {
        &self.game_dir
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Run the loader.
    ///
    /// Never fails: install errors end in a dialog, a mods pass that cannot
    /// start is only logged.
    ///
    /// # Arguments
    /// * `args` - Command line arguments forwarded to the game
    ///
    /// # Returns
    /// A [`RunReport`] whose `exit_code` is the process exit code
    pub fn run(&mut self, args: &[String]) -> RunReport {
        tracing::info!("----- Haggle Mod Loader -----");
        tracing::info!("In directory \"{}\"", self.game_dir);

        let bootstrap = Bootstrapper::new(
            &self.settings,
            &self.game_dir,
            self.processes.as_mut(),
            self.shell.as_ref(),
            self.prompt.as_ref(),
        )
        .run();

        let outcome = match bootstrap {
            Ok(outcome) => outcome,
            Err(e) => return RunReport::stopped(self.install_failed(&e), None),
        };

        if !outcome.continues_to_game() {
            tracing::info!("Install step finished: {:?}", outcome);
            return RunReport::stopped(0, Some(outcome));
        }

        let cache_path = self.settings.cache_path(&self.game_dir);
        if let Err(e) = self.runtime.load(&cache_path) {
            tracing::error!("Failed to load {}: {}", cache_path, e);
            self.prompt.fatal(&format!(
                "Haggle was unable to load {}:\n{}\n\nDelete it and launch Haggle again to reinstall.",
                cache_path, e
            ));
            return RunReport::stopped(RUNTIME_FAILURE_EXIT_CODE, Some(outcome));
        }

        let mods = self.load_mods();

        let exit_code = match self.runtime.run(args) {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("Runtime failed: {}", e);
                RUNTIME_FAILURE_EXIT_CODE
            }
        };

        RunReport {
            exit_code,
            bootstrap: Some(outcome),
            mods,
        }
    }

    fn load_mods(&mut self) -> Option<LoadReport> {
        let mods_dir = self.settings.mods_path(&self.game_dir);
        let mut pass = ModLoader::new(self.modules.as_mut(), mods_dir);

        match pass.load_all() {
            Ok(report) => {
                tracing::info!("Ready!");
                Some(report)
            }
            Err(e) => {
                tracing::error!("{}", e);
                if let Some(hint) = e.hint() {
                    tracing::info!("{}", hint);
                }
                None
            }
        }
    }

    fn install_failed(&self, err: &InstallError) -> i32 {
        tracing::error!("Install failed: {}", err);
        self.prompt.fatal(&err.user_message());

        if self.settings.distinct_exit_codes {
            err.exit_code()
        } else {
            0
        }
    }
}
