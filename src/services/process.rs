use sysinfo::System;

/// Lookup and termination of other processes by image name.
///
/// Image names are exact, e.g. `Peggle.exe`. Only the first matching process
/// is considered, which is enough for a single-instance game.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessControl {
    /// Process id of the first running process with this image name
    fn find_process(&mut self, image_name: &str) -> Option<u32>;

    /// Terminate the first running process with this image name.
    ///
    /// Returns false if no such process exists or it could not be killed.
    fn terminate_process(&mut self, image_name: &str) -> bool;
}

/// [`ProcessControl`] backed by the OS process table via sysinfo.
///
/// Every call takes a fresh snapshot. Process handles are owned by sysinfo
/// and released when the snapshot is dropped or refreshed.
pub struct SystemProcessControl {
    system: System,
}

impl SystemProcessControl {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControl for SystemProcessControl {
    fn find_process(&mut self, image_name: &str) -> Option<u32> {
        self.system.refresh_processes();

        let pid = self
            .system
            .processes_by_exact_name(image_name)
            .next()
            .map(|process| process.pid().as_u32());

        tracing::trace!("find_process({}) -> {:?}", image_name, pid);
        pid
    }

    fn terminate_process(&mut self, image_name: &str) -> bool {
        self.system.refresh_processes();

        let Some(process) = self.system.processes_by_exact_name(image_name).next() else {
            tracing::debug!("No running process named {}", image_name);
            return false;
        };

        let pid = process.pid();
        let killed = process.kill();

        if killed {
            tracing::info!("Terminated {} (pid {})", image_name, pid);
        } else {
            tracing::warn!("Failed to terminate {} (pid {})", image_name, pid);
        }

        killed
    }
}
