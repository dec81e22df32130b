use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Loader settings from `Haggle.yaml` and `HAGGLE_*` environment variables.
///
/// Every field has a default matching the stock install, so an absent file
/// behaves exactly like the shipped loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Mods directory, relative to the game directory
    pub mods_dir: Utf8PathBuf,

    /// Cache artifact filename inside the mods directory
    pub cache_file: String,

    /// Root of the PopCap installed-games data directory
    pub popcap_data_dir: Utf8PathBuf,

    /// Engine host process, also the relocated executable's filename
    pub engine_process: String,

    /// Companion executable launched after install steps
    pub companion_exe: String,

    /// Scheme of the store client URI (`<scheme>://run/<appid>/`)
    pub store_uri_scheme: String,

    /// Interval between process checks while waiting for the game to start
    pub poll_interval_ms: u64,

    /// Give up waiting for the game after this many seconds; unset waits forever
    pub launch_timeout_secs: Option<u64>,

    /// Exit with a distinct non-zero code for each fatal install error
    pub distinct_exit_codes: bool,

    /// Log directory, relative to the game directory
    pub log_dir: Utf8PathBuf,

    pub debug_mode: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            mods_dir: Utf8PathBuf::from("mods"),
            cache_file: "cache.bin".to_string(),
            popcap_data_dir: Utf8PathBuf::from("C:/ProgramData/PopCap Games"),
            engine_process: "popcapgame1.exe".to_string(),
            companion_exe: "Haggle.exe".to_string(),
            store_uri_scheme: "steam".to_string(),
            poll_interval_ms: 1000,
            launch_timeout_secs: None,
            distinct_exit_codes: false,
            log_dir: Utf8PathBuf::from("mods/logs"),
            debug_mode: false,
        }
    }
}

impl LoaderSettings {
    pub fn mods_path(&self, game_dir: &Utf8Path) -> Utf8PathBuf {
        game_dir.join(&self.mods_dir)
    }

    pub fn cache_path(&self, game_dir: &Utf8Path) -> Utf8PathBuf {
        self.mods_path(game_dir).join(&self.cache_file)
    }

    pub fn log_path(&self, game_dir: &Utf8Path) -> Utf8PathBuf {
        game_dir.join(&self.log_dir)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn launch_timeout(&self) -> Option<Duration> {
        self.launch_timeout_secs.map(Duration::from_secs)
    }
}
