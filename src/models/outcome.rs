use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

/// File suffixes eligible for loading. Matching is case-sensitive.
pub const MOD_EXTENSIONS: [&str; 2] = [".dll", ".asi"];

/// A regular file found directly under the mods directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModCandidate {
    pub path: Utf8PathBuf,
}

impl ModCandidate {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The whitelisted extension this candidate ends with, if any.
    pub fn extension(&self) -> Option<&'static str> {
        let name = self.path.file_name()?;
        MOD_EXTENSIONS.into_iter().find(|ext| name.ends_with(ext))
    }

    pub fn is_loadable(&self) -> bool {
        self.extension().is_some()
    }
}

/// Result of processing a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Extension not in [`MOD_EXTENSIONS`]
    Skipped,
    /// The loader reported an error; `code` is the OS error code when known
    Failed { code: Option<i32> },
}

/// Per-run record of every candidate the mod loader looked at.
///
/// Outcomes are kept in processing order. Nothing here outlives the run.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    outcomes: IndexMap<Utf8PathBuf, LoadOutcome>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<Utf8PathBuf>, outcome: LoadOutcome) {
        self.outcomes.insert(path.into(), outcome);
    }

    pub fn outcome(&self, path: &Utf8Path) -> Option<&LoadOutcome> {
        self.outcomes.get(path)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&Utf8PathBuf, &LoadOutcome)> {
        self.outcomes.iter()
    }

    /// Number of modules that loaded without error
    pub fn loaded_count(&self) -> usize {
        self.count(|o| matches!(o, LoadOutcome::Loaded))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, LoadOutcome::Failed { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, LoadOutcome::Skipped))
    }

    /// Number of load calls that were attempted
    pub fn attempted_count(&self) -> usize {
        self.loaded_count() + self.failed_count()
    }

    pub fn summary(&self) -> LoadSummary {
        LoadSummary::from_count(self.loaded_count())
    }

    fn count(&self, pred: impl Fn(&LoadOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|o| pred(*o)).count()
    }
}

/// End-of-pass summary, chosen purely from the loaded count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSummary {
    None,
    One,
    Many(usize),
}

impl LoadSummary {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::One,
            n => Self::Many(n),
        }
    }

    /// True when the summary should be logged as a warning
    pub fn is_warning(self) -> bool {
        self == Self::None
    }

    pub fn message(self) -> String {
        match self {
            Self::None => "No mods loaded".to_string(),
            Self::One => "1 mod loaded".to_string(),
            Self::Many(n) => format!("{} mods loaded", n),
        }
    }
}
