use camino::{Utf8Path, Utf8PathBuf};
use std::fs::File;
use std::io::{self, Read};
use std::process::Command;
use thiserror::Error;

/// Signature at the start of every PE image.
const PE_SIGNATURE: &[u8; 2] = b"MZ";

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Cache artifact not found at {0}")]
    Missing(Utf8PathBuf),

    #[error("Cache artifact {0} is not an executable image")]
    NotExecutable(Utf8PathBuf),

    #[error("Runtime was started before a cache artifact was loaded")]
    NotLoaded,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Hand-off point to the runtime that actually drives the game.
#[cfg_attr(test, mockall::automock)]
pub trait RuntimeLoader {
    /// Prepare and validate the cache artifact.
    fn load(&mut self, cache_path: &Utf8Path) -> Result<(), RuntimeError>;

    /// Enter the game's main loop and return the final exit code.
    fn run(&mut self, args: &[String]) -> Result<i32, RuntimeError>;
}

/// [`RuntimeLoader`] that runs the cached engine executable as a child process.
///
/// Arguments are forwarded as-is and the child's exit code is returned.
///
/// This is a stand-in, not the in-process handoff: mods are loaded into the
/// loader's own process, so the child game never sees them. A runtime that
/// maps the artifact into this process is needed for mods to take effect.
#[derive(Debug)]
pub struct ChildProcessRuntime {
    working_dir: Utf8PathBuf,
    image: Option<Utf8PathBuf>,
}

impl ChildProcessRuntime {
    pub fn new(working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            image: None,
        }
    }
}

impl RuntimeLoader for ChildProcessRuntime {
    fn load(&mut self, cache_path: &Utf8Path) -> Result<(), RuntimeError> {
        if !cache_path.is_file() {
            return Err(RuntimeError::Missing(cache_path.to_path_buf()));
        }

        let io_err = |source| RuntimeError::Io {
            path: cache_path.to_path_buf(),
            source,
        };

        let mut signature = [0u8; 2];
        File::open(cache_path)
            .and_then(|mut f| f.read_exact(&mut signature))
            .or_else(|e| match e.kind() {
                // Too short to hold a header
                io::ErrorKind::UnexpectedEof => Ok(()),
                _ => Err(e),
            })
            .map_err(io_err)?;

        if &signature != PE_SIGNATURE {
            return Err(RuntimeError::NotExecutable(cache_path.to_path_buf()));
        }

        tracing::info!("Loaded cache {}", cache_path);
        self.image = Some(cache_path.to_path_buf());
        Ok(())
    }

    fn run(&mut self, args: &[String]) -> Result<i32, RuntimeError> {
        let image = self.image.as_ref().ok_or(RuntimeError::NotLoaded)?;

        tracing::debug!("Starting {} with {:?}", image, args);

        let status = Command::new(image)
            .args(args)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|source| RuntimeError::Io {
                path: image.clone(),
                source,
            })?;

        let code = status.code().unwrap_or(-1);
        tracing::info!("Game exited with code {}", code);
        Ok(code)
    }
}
