use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// One of the two supported PopCap games.
///
/// The variant is resolved once per run by probing the working directory for
/// the game's executable and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameVariant {
    Peggle,
    PeggleNights,
}

impl GameVariant {
    /// Probe order used when detecting which game owns a directory.
    pub const PROBE_ORDER: [GameVariant; 2] = [GameVariant::Peggle, GameVariant::PeggleNights];

    /// Canonical name, also used as the directory name under the PopCap data folder.
    pub fn name(self) -> &'static str {
        match self {
            Self::Peggle => "Peggle",
            Self::PeggleNights => "PeggleNights",
        }
    }

    /// Store application id.
    pub fn app_id(self) -> u32 {
        match self {
            Self::Peggle => 3480,
            Self::PeggleNights => 3540,
        }
    }

    /// Executable filename, e.g. `Peggle.exe`.
    pub fn executable(self) -> String {
        format!("{}.exe", self.name())
    }

    /// URI that asks the store client to launch the game, e.g. `steam://run/3480/`.
    pub fn store_uri(self, scheme: &str) -> String {
        format!("{}://run/{}/", scheme, self.app_id())
    }

    /// Path of the engine executable that gets relocated into the cache.
    ///
    /// # Arguments
    /// * `popcap_data_dir` - Root of the PopCap installed-games data directory
    /// * `engine_process` - Engine executable filename (`popcapgame1.exe`)
    pub fn engine_executable_path(
        self,
        popcap_data_dir: &Utf8Path,
        engine_process: &str,
    ) -> Utf8PathBuf {
        popcap_data_dir.join(self.name()).join(engine_process)
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
