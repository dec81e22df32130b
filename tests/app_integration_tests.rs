//! End-to-end runs of the loader against fake OS collaborators
//!
//! These tests verify:
//! - An installed game goes bootstrap → runtime load → mods → runtime run
//! - Fatal install errors reach the user as a dialog and stop the run
//! - Mods are never loaded when the install step did not complete
//! - A broken settings file falls back to defaults and still runs the game

use camino::{Utf8Path, Utf8PathBuf};
use haggle::models::LoaderSettings;
use haggle::services::{
    BootstrapOutcome, LoadStatus, ModuleLoader, ProcessControl, RuntimeError, RuntimeLoader,
    ShellLauncher,
};
use haggle::ui::{PromptChoice, UserPrompt};
use haggle::{App, ConfigManager};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::rc::Rc;
use tempfile::TempDir;

type Journal = Rc<RefCell<Vec<String>>>;

/// Every fake appends what it was asked to do to a shared journal.
struct Recorder {
    journal: Journal,
    choice: PromptChoice,
}

impl Recorder {
    fn note(&self, entry: String) {
        self.journal.borrow_mut().push(entry);
    }
}

impl ProcessControl for Recorder {
    fn find_process(&mut self, image_name: &str) -> Option<u32> {
        self.note(format!("find {}", image_name));
        None
    }

    fn terminate_process(&mut self, image_name: &str) -> bool {
        self.note(format!("terminate {}", image_name));
        false
    }
}

impl ShellLauncher for Recorder {
    fn open(&self, target: &str) -> io::Result<()> {
        self.note(format!("open {}", target));
        Ok(())
    }
}

impl UserPrompt for Recorder {
    fn fatal(&self, message: &str) {
        self.note(format!("fatal {}", message));
    }

    fn retry_or_cancel(&self, _message: &str) -> PromptChoice {
        self.note("prompt".to_string());
        self.choice
    }
}

impl ModuleLoader for Recorder {
    fn load_module(&mut self, path: &Utf8Path) -> LoadStatus {
        self.note(format!("load {}", path.file_name().unwrap_or_default()));
        LoadStatus::loaded()
    }
}

impl RuntimeLoader for Recorder {
    fn load(&mut self, cache_path: &Utf8Path) -> Result<(), RuntimeError> {
        self.note(format!("runtime load {}", cache_path.file_name().unwrap_or_default()));
        Ok(())
    }

    fn run(&mut self, args: &[String]) -> Result<i32, RuntimeError> {
        self.note(format!("runtime run {}", args.join(" ")));
        Ok(0)
    }
}

fn app(dir: &Utf8Path, journal: &Journal, choice: PromptChoice) -> App {
    app_with_settings(dir, journal, choice, LoaderSettings::default())
}

fn app_with_settings(
    dir: &Utf8Path,
    journal: &Journal,
    choice: PromptChoice,
    settings: LoaderSettings,
) -> App {
    let recorder = || Recorder {
        journal: Rc::clone(journal),
        choice,
    };

    App::new(dir, settings)
        .with_process_control(recorder())
        .with_shell(recorder())
        .with_prompt(recorder())
        .with_module_loader(recorder())
        .with_runtime(recorder())
}

fn game_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, dir)
}

#[test]
fn test_installed_run_order() {
    let (_temp_dir, dir) = game_dir();
    fs::create_dir(dir.join("mods")).unwrap();
    fs::write(dir.join("mods/cache.bin"), b"MZ").unwrap();
    fs::write(dir.join("mods/a.dll"), b"").unwrap();
    fs::write(dir.join("mods/b.asi"), b"").unwrap();
    fs::write(dir.join("mods/readme.txt"), b"").unwrap();

    let journal = Journal::default();
    let report = app(&dir, &journal, PromptChoice::Cancel).run(&["-nosplash".to_string()]);

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.bootstrap, Some(BootstrapOutcome::AlreadyInstalled));
    assert_eq!(report.mods.as_ref().map(|m| m.loaded_count()), Some(2));
    assert_eq!(
        *journal.borrow(),
        vec![
            "runtime load cache.bin",
            "load a.dll",
            "load b.asi",
            "runtime run -nosplash",
        ]
    );
}

#[test]
fn test_unknown_game_dialog() {
    let (_temp_dir, dir) = game_dir();

    let journal = Journal::default();
    let report = app(&dir, &journal, PromptChoice::Retry).run(&[]);

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.bootstrap, None);

    let journal = journal.borrow();
    assert_eq!(journal.len(), 1);
    assert!(journal[0].starts_with("fatal Haggle was unable to determine which game"));
}

#[test]
fn test_first_launch_cancel_stops_before_mods() {
    let (_temp_dir, dir) = game_dir();
    fs::write(dir.join("Peggle.exe"), b"").unwrap();

    let journal = Journal::default();
    let report = app(&dir, &journal, PromptChoice::Cancel).run(&[]);

    assert_eq!(report.bootstrap, Some(BootstrapOutcome::Cancelled));
    assert!(report.mods.is_none());
    assert_eq!(*journal.borrow(), vec!["terminate Peggle.exe", "prompt"]);
}

#[test]
fn test_malformed_settings_still_run_game_with_defaults() {
    let (_temp_dir, dir) = game_dir();
    fs::write(dir.join("Haggle.yaml"), "poll_interval_ms: [oops\n").unwrap();
    fs::create_dir(dir.join("mods")).unwrap();
    fs::write(dir.join("mods/cache.bin"), b"MZ").unwrap();

    let (settings, err) = ConfigManager::new(&dir)
        .with_env_overrides(config::Map::new())
        .load_settings_or_default();
    assert!(err.is_some());
    assert_eq!(settings, LoaderSettings::default());

    let journal = Journal::default();
    let report = app_with_settings(&dir, &journal, PromptChoice::Cancel, settings).run(&[]);

    assert_eq!(report.exit_code, 0);
    assert_eq!(report.bootstrap, Some(BootstrapOutcome::AlreadyInstalled));
    assert_eq!(
        *journal.borrow(),
        vec!["runtime load cache.bin", "runtime run "]
    );
}
