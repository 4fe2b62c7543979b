//! Path configuration for the collectors.
//!
//! Every file location is carried by `ProcfsConfig` so tests and containers can
//! point the collectors at fixture directories or a host-mounted `/proc`.

/// Default root of the proc filesystem.
pub const DEFAULT_PROC_PATH: &str = "/proc";
/// Default location of the OS release descriptor.
pub const DEFAULT_OS_RELEASE_PATH: &str = "/etc/os-release";
/// Default location of the password database.
pub const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";
/// Clock ticks per second (USER_HZ). Standard value for Linux.
pub const DEFAULT_CLOCK_TICKS: u64 = 100;

/// File locations and kernel constants used by the collectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcfsConfig {
    /// Base path to proc filesystem (usually "/proc").
    pub proc_path: String,
    /// Path to `os-release`.
    pub os_release_path: String,
    /// Path to `passwd`.
    pub passwd_path: String,
    /// Jiffies per second used to convert process start times.
    pub clock_ticks: u64,
}

impl Default for ProcfsConfig {
    fn default() -> Self {
        Self {
            proc_path: DEFAULT_PROC_PATH.to_string(),
            os_release_path: DEFAULT_OS_RELEASE_PATH.to_string(),
            passwd_path: DEFAULT_PASSWD_PATH.to_string(),
            clock_ticks: DEFAULT_CLOCK_TICKS,
        }
    }
}

impl ProcfsConfig {
    /// Creates a configuration rooted at the given proc path, other paths default.
    pub fn new(proc_path: impl Into<String>) -> Self {
        Self {
            proc_path: proc_path.into(),
            ..Self::default()
        }
    }

    pub fn with_os_release(mut self, path: impl Into<String>) -> Self {
        self.os_release_path = path.into();
        self
    }

    pub fn with_passwd(mut self, path: impl Into<String>) -> Self {
        self.passwd_path = path.into();
        self
    }

    /// Overrides the clock tick rate. Zero is ignored.
    pub fn with_clock_ticks(mut self, clock_ticks: u64) -> Self {
        if clock_ticks > 0 {
            self.clock_ticks = clock_ticks;
        }
        self
    }

    /// Path of a file directly under the proc root, e.g. `proc_file("meminfo")`.
    pub fn proc_file(&self, name: &str) -> String {
        format!("{}/{}", self.proc_path, name)
    }

    /// Path of a file under `/proc/[pid]/`.
    pub fn pid_file(&self, pid: u32, name: &str) -> String {
        format!("{}/{}/{}", self.proc_path, pid, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = ProcfsConfig::default();
        assert_eq!(config.proc_file("stat"), "/proc/stat");
        assert_eq!(config.pid_file(42, "status"), "/proc/42/status");
        assert_eq!(config.os_release_path, "/etc/os-release");
        assert_eq!(config.passwd_path, "/etc/passwd");
        assert_eq!(config.clock_ticks, 100);
    }

    #[test]
    fn test_builders() {
        let config = ProcfsConfig::new("/host/proc")
            .with_os_release("/host/etc/os-release")
            .with_passwd("/host/etc/passwd")
            .with_clock_ticks(250);

        assert_eq!(config.proc_file("uptime"), "/host/proc/uptime");
        assert_eq!(config.os_release_path, "/host/etc/os-release");
        assert_eq!(config.passwd_path, "/host/etc/passwd");
        assert_eq!(config.clock_ticks, 250);
    }

    #[test]
    fn test_zero_clock_ticks_ignored() {
        let config = ProcfsConfig::default().with_clock_ticks(0);
        assert_eq!(config.clock_ticks, DEFAULT_CLOCK_TICKS);
    }
}
