use std::io;

/// Shell-level "open": hands a path or URI to the OS to launch.
///
/// Used for the companion executable and for the store client's
/// `steam://run/<appid>/` URI.
#[cfg_attr(test, mockall::automock)]
pub trait ShellLauncher {
    fn open(&self, target: &str) -> io::Result<()>;
}

/// [`ShellLauncher`] using the platform's default handler.
///
/// The launched program is detached and outlives the loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl ShellLauncher for SystemShell {
    fn open(&self, target: &str) -> io::Result<()> {
        tracing::info!("Opening {}", target);
        open::that_detached(target)
    }
}
