//! Game detection: figures out which PopCap game a directory belongs to.
//!
//! The check is a plain existence probe for each variant's executable, in
//! [`GameVariant::PROBE_ORDER`]. The first hit wins, so a directory holding
//! both executables is treated as Peggle.

use crate::models::GameVariant;
use camino::Utf8Path;

/// Detects the game variant installed in `game_dir`.
///
/// # Returns
///
/// The first variant whose executable exists, or `None` if neither does
pub fn detect_game_variant(game_dir: &Utf8Path) -> Option<GameVariant> {
    for variant in GameVariant::PROBE_ORDER {
        let exe = game_dir.join(variant.executable());
        if exe.is_file() {
            tracing::info!("Detected game {} from {}", variant, exe);
            return Some(variant);
        }
        tracing::debug!("{} not found", exe);
    }

    tracing::debug!("No supported game executable in {}", game_dir);
    None
}
