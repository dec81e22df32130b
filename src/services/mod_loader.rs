use crate::models::{LoadOutcome, LoadReport, ModCandidate};
use camino::{Utf8Path, Utf8PathBuf};
use libloading::Library;
use std::fs;
use std::io;
use thiserror::Error;

/// What the platform loader reported for one module.
///
/// A returned handle is not enough on its own: the load only counts when no
/// error code was reported alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStatus {
    pub handle_returned: bool,
    pub error_code: Option<i32>,
}

impl LoadStatus {
    pub fn loaded() -> Self {
        Self {
            handle_returned: true,
            error_code: None,
        }
    }

    pub fn failed(error_code: Option<i32>) -> Self {
        Self {
            handle_returned: false,
            error_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.handle_returned && self.error_code.is_none_or(|code| code == 0)
    }
}

/// Loads a native module into the current process.
#[cfg_attr(test, mockall::automock)]
pub trait ModuleLoader {
    fn load_module(&mut self, path: &Utf8Path) -> LoadStatus;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &mut L {
    fn load_module(&mut self, path: &Utf8Path) -> LoadStatus {
        (**self).load_module(path)
    }
}

/// [`ModuleLoader`] using the OS dynamic loader.
///
/// Loaded libraries are kept here so they stay mapped for as long as the
/// loader lives; dropping it unloads every mod.
#[derive(Debug, Default)]
pub struct LibraryLoader {
    libraries: Vec<Library>,
}

impl LibraryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_len(&self) -> usize {
        self.libraries.len()
    }
}

impl ModuleLoader for LibraryLoader {
    fn load_module(&mut self, path: &Utf8Path) -> LoadStatus {
        clear_last_error();

        // SAFETY: running the module's initialisers in-process is the whole
        // point of a mod; nothing about them is verified.
        match unsafe { Library::new(path.as_std_path()) } {
            Ok(library) => {
                // Kept even when an error is reported; the image is mapped either way
                self.libraries.push(library);
                status_after_load(last_error())
            }
            Err(e) => {
                tracing::debug!("Loading {} failed: {}", path, e);
                LoadStatus::failed(os_error_code(&e))
            }
        }
    }
}

/// Status for a load that returned a handle, given the thread's error state
/// read right after it. A non-zero code marks the load as failed.
fn status_after_load(last_error: Option<i32>) -> LoadStatus {
    match last_error {
        Some(code) if code != 0 => LoadStatus {
            handle_returned: true,
            error_code: Some(code),
        },
        _ => LoadStatus::loaded(),
    }
}

#[cfg(windows)]
fn clear_last_error() {
    use windows::Win32::Foundation::{SetLastError, WIN32_ERROR};

    // SAFETY: only touches the calling thread's last-error slot
    unsafe { SetLastError(WIN32_ERROR(0)) };
}

#[cfg(not(windows))]
fn clear_last_error() {}

#[cfg(windows)]
fn last_error() -> Option<i32> {
    io::Error::last_os_error().raw_os_error()
}

/// dlopen has no thread error state beyond what libloading already consumed.
#[cfg(not(windows))]
fn last_error() -> Option<i32> {
    None
}

/// First raw OS error code found in the error's source chain.
fn os_error_code(err: &libloading::Error) -> Option<i32> {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return io_err.raw_os_error();
        }
        source = e.source();
    }
    None
}

/// Errors that stop the mod loading pass before any module is loaded
#[derive(Error, Debug)]
pub enum ModLoaderError {
    #[error("No mods folder found at {0}")]
    DirectoryMissing(Utf8PathBuf),

    #[error("Failed to read mods folder {path}: {source}")]
    ReadDir {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ModLoaderError {
    /// Guidance for the user, if there is any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DirectoryMissing(_) => Some("Make a mods folder in your Peggle directory"),
            Self::ReadDir { .. } => None,
        }
    }
}

/// The per-run mod loading pass.
///
/// Scans the mods directory (non-recursively), filters entries by
/// [`MOD_EXTENSIONS`](crate::models::MOD_EXTENSIONS) and loads each match.
/// One bad module never stops the rest.
pub struct ModLoader<L: ModuleLoader> {
    loader: L,
    mods_dir: Utf8PathBuf,
}

impl<L: ModuleLoader> ModLoader<L> {
    pub fn new(loader: L, mods_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            loader,
            mods_dir: mods_dir.into(),
        }
    }

    pub fn mods_dir(&self) -> &Utf8Path {
        &self.mods_dir
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Direct, non-directory entries of the mods directory, sorted by name.
    ///
    /// Entries that cannot be read or whose names are not UTF-8 are skipped
    /// with a warning.
    ///
    /// # Errors
    /// - [`ModLoaderError::DirectoryMissing`] if the mods directory does not exist
    /// - [`ModLoaderError::ReadDir`] if it cannot be listed
    pub fn discover(&self) -> Result<Vec<ModCandidate>, ModLoaderError> {
        if !self.mods_dir.is_dir() {
            return Err(ModLoaderError::DirectoryMissing(self.mods_dir.clone()));
        }

        let read_dir_err = |source| ModLoaderError::ReadDir {
            path: self.mods_dir.clone(),
            source,
        };

        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.mods_dir).map_err(read_dir_err)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", self.mods_dir, e);
                    continue;
                }
            };

            let path = match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => path,
                Err(path) => {
                    tracing::warn!("Skipping non UTF-8 path {}", path.display());
                    continue;
                }
            };

            if path.is_dir() {
                continue;
            }

            candidates.push(ModCandidate::new(path));
        }

        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(candidates)
    }

    /// Load every whitelisted module and report what happened to each entry.
    ///
    /// Failed loads are logged and recorded but never stop the pass.
    ///
    /// # Returns
    /// A [`LoadReport`] with one outcome per candidate, in processing order
    ///
    /// # Errors
    /// Same as [`discover`](Self::discover); nothing is loaded in that case.
    pub fn load_all(&mut self) -> Result<LoadReport, ModLoaderError> {
        let candidates = self.discover()?;

        tracing::info!("Loading Mods...");

        let mut report = LoadReport::new();
        for candidate in candidates {
            let outcome = self.load_candidate(&candidate);
            report.record(candidate.path, outcome);
        }

        let summary = report.summary();
        if summary.is_warning() {
            tracing::warn!("{}", summary.message());
        } else {
            tracing::info!("{}", summary.message());
        }

        Ok(report)
    }

    fn load_candidate(&mut self, candidate: &ModCandidate) -> LoadOutcome {
        if !candidate.is_loadable() {
            tracing::debug!("Ignoring {}", candidate.path);
            return LoadOutcome::Skipped;
        }

        let status = self.loader.load_module(&candidate.path);
        if status.is_success() {
            tracing::info!("{} loaded!", candidate.path);
            LoadOutcome::Loaded
        } else {
            match status.error_code {
                Some(code) => tracing::error!("{} errored! ({})", candidate.path, code),
                None => tracing::error!("{} errored!", candidate.path),
            }
            LoadOutcome::Failed {
                code: status.error_code,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadSummary;
    use mockall::predicate::function;
    use tempfile::TempDir;

    fn mods_dir() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("mods")).unwrap();
        fs::create_dir(&path).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_load_status_success_rules() {
        assert!(LoadStatus::loaded().is_success());
        assert!(!LoadStatus::failed(Some(126)).is_success());
        assert!(!LoadStatus::failed(None).is_success());

        let handle_with_error = LoadStatus {
            handle_returned: true,
            error_code: Some(87),
        };
        assert!(!handle_with_error.is_success());

        let handle_with_zero = LoadStatus {
            handle_returned: true,
            error_code: Some(0),
        };
        assert!(handle_with_zero.is_success());
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = Utf8PathBuf::try_from(temp_dir.path().join("mods")).unwrap();

        let mut loader = MockModuleLoader::new();
        loader.expect_load_module().never();

        let mut pass = ModLoader::new(loader, &missing);
        let err = pass.load_all().unwrap_err();

        assert!(matches!(err, ModLoaderError::DirectoryMissing(_)));
        assert!(err.hint().is_some());
        assert!(!missing.exists());
    }

    #[test]
    fn test_mixed_directory() {
        let (_temp_dir, dir) = mods_dir();
        fs::write(dir.join("a.dll"), b"").unwrap();
        fs::write(dir.join("b.asi"), b"").unwrap();
        fs::write(dir.join("c.txt"), b"").unwrap();
        fs::create_dir(dir.join("d")).unwrap();
        fs::create_dir(dir.join("e.dll")).unwrap();

        let mut loader = MockModuleLoader::new();
        loader
            .expect_load_module()
            .with(function(|p: &Utf8Path| {
                p.as_str().ends_with(".dll") || p.as_str().ends_with(".asi")
            }))
            .times(2)
            .returning(|_| LoadStatus::loaded());

        let mut pass = ModLoader::new(loader, &dir);
        let report = pass.load_all().unwrap();

        assert_eq!(report.loaded_count(), 2);
        assert_eq!(report.attempted_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.summary(), LoadSummary::Many(2));
        assert_eq!(report.outcome(&dir.join("e.dll")), None);
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let (_temp_dir, dir) = mods_dir();
        fs::write(dir.join("a.dll"), b"").unwrap();
        fs::write(dir.join("b.dll"), b"").unwrap();
        fs::write(dir.join("c.dll"), b"").unwrap();

        let mut loader = MockModuleLoader::new();
        loader
            .expect_load_module()
            .times(3)
            .returning(|p| {
                if p.as_str().ends_with("b.dll") {
                    LoadStatus::failed(Some(193))
                } else {
                    LoadStatus::loaded()
                }
            });

        let mut pass = ModLoader::new(loader, &dir);
        let report = pass.load_all().unwrap();

        assert_eq!(report.loaded_count(), 2);
        assert_eq!(
            report.outcome(&dir.join("b.dll")),
            Some(&LoadOutcome::Failed { code: Some(193) })
        );
    }

    #[test]
    fn test_handle_with_error_is_not_counted() {
        let (_temp_dir, dir) = mods_dir();
        fs::write(dir.join("only.asi"), b"").unwrap();

        let mut loader = MockModuleLoader::new();
        loader.expect_load_module().times(1).returning(|_| LoadStatus {
            handle_returned: true,
            error_code: Some(126),
        });

        let mut pass = ModLoader::new(loader, &dir);
        let report = pass.load_all().unwrap();

        assert_eq!(report.loaded_count(), 0);
        assert_eq!(report.summary(), LoadSummary::None);
    }

    #[test]
    fn test_discover_is_sorted() {
        let (_temp_dir, dir) = mods_dir();
        fs::write(dir.join("zeta.dll"), b"").unwrap();
        fs::write(dir.join("alpha.dll"), b"").unwrap();

        let pass = ModLoader::new(MockModuleLoader::new(), &dir);
        let names: Vec<_> = pass
            .discover()
            .unwrap()
            .into_iter()
            .map(|c| c.path.file_name().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["alpha.dll", "zeta.dll"]);
    }

    #[test]
    fn test_error_state_after_load() {
        assert_eq!(status_after_load(None), LoadStatus::loaded());
        assert_eq!(status_after_load(Some(0)), LoadStatus::loaded());

        let status = status_after_load(Some(126));
        assert!(status.handle_returned);
        assert_eq!(status.error_code, Some(126));
        assert!(!status.is_success());
    }

    #[test]
    fn test_library_loader_reports_failure_for_garbage() {
        let (_temp_dir, dir) = mods_dir();
        let path = dir.join("broken.dll");
        fs::write(&path, b"not a module").unwrap();

        let mut loader = LibraryLoader::new();
        let status = loader.load_module(&path);

        assert!(!status.is_success());
        assert_eq!(loader.loaded_len(), 0);
    }
}
