use camino::Utf8Path;

/// Whether the one-time extraction has already happened.
///
/// The cache artifact on disk is the only source of truth; this value is just
/// a snapshot of it taken at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
}

impl InstallState {
    /// Read the install state from the presence of the cache artifact.
    pub fn detect(cache_path: &Utf8Path) -> Self {
        if cache_path.exists() {
            Self::Installed
        } else {
            Self::NotInstalled
        }
    }

    pub fn is_installed(self) -> bool {
        self == Self::Installed
    }
}
