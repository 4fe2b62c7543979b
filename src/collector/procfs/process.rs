//! Process collector for per-process facts from `/proc/[pid]/`.

use crate::collector::config::ProcfsConfig;
use crate::collector::procfs::error::{CollectError, read_file, required};
use crate::collector::procfs::parser::{
    ParseError, ProcStat, ProcStatus, normalize_cmdline, parse_passwd, parse_proc_stat,
    parse_proc_status, parse_uptime,
};
use crate::collector::traits::FileSystem;

/// Collects process information from `/proc/[pid]/` files.
///
/// Every call reads the files afresh; nothing is cached between calls.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    config: ProcfsConfig,
}

impl<F: FileSystem> ProcessCollector<F> {
    /// Creates a new process collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths to the proc root, passwd and the clock tick rate
    pub fn new(fs: F, config: ProcfsConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ProcfsConfig {
        &self.config
    }

    /// Reads and parses `/proc/[pid]/stat`.
    pub fn stat(&self, pid: u32) -> Result<ProcStat, CollectError> {
        let path = self.config.pid_file(pid, "stat");
        let content = read_file(&self.fs, &path)?;
        parse_proc_stat(&content).map_err(|e| CollectError::malformed(&path, e))
    }

    /// Reads and parses `/proc/[pid]/status`.
    ///
    /// Each field carries its own parse result, so one bad line does not
    /// hide the others.
    pub fn status(&self, pid: u32) -> Result<ProcStatus, CollectError> {
        let path = self.config.pid_file(pid, "status");
        let content = read_file(&self.fs, &path)?;
        Ok(parse_proc_status(&content))
    }

    /// Command line with NUL separators replaced by spaces.
    ///
    /// Kernel threads have an empty cmdline, which is returned as-is.
    pub fn command(&self, pid: u32) -> Result<String, CollectError> {
        let path = self.config.pid_file(pid, "cmdline");
        let content = read_file(&self.fs, &path)?;
        Ok(normalize_cmdline(&content))
    }

    /// Virtual memory size (`VmSize`) in kB, as printed by the kernel.
    pub fn ram(&self, pid: u32) -> Result<String, CollectError> {
        let status = self.status(pid)?;
        required(status.vm_size_kb, &self.config.pid_file(pid, "status"), "VmSize")
    }

    /// Real UID of the process as a decimal string.
    pub fn uid(&self, pid: u32) -> Result<String, CollectError> {
        let status = self.status(pid)?;
        required(status.uid, &self.config.pid_file(pid, "status"), "Uid")
    }

    /// Name of the user owning the process, resolved through the passwd file.
    pub fn user(&self, pid: u32) -> Result<String, CollectError> {
        let uid = self.uid(pid)?;
        let passwd_path = &self.config.passwd_path;
        let numeric: u32 = uid.parse().map_err(|_| {
            CollectError::malformed(
                &self.config.pid_file(pid, "status"),
                ParseError::new(format!("uid {} out of range", uid)),
            )
        })?;

        let content = read_file(&self.fs, passwd_path)?;
        parse_passwd(&content)
            .remove(&numeric)
            .ok_or_else(|| CollectError::not_found(passwd_path, format!("uid {}", uid)))
    }

    /// Jiffies consumed by the process and its reaped children (stat fields 14-17).
    pub fn active_jiffies(&self, pid: u32) -> Result<u64, CollectError> {
        Ok(self.stat(pid)?.active_jiffies())
    }

    /// Seconds the process has been running.
    ///
    /// Formula: system_uptime - starttime / CLK_TCK, clamped at zero.
    pub fn uptime(&self, pid: u32) -> Result<u64, CollectError> {
        let uptime_path = self.config.proc_file("uptime");
        let content = read_file(&self.fs, &uptime_path)?;
        let system_uptime =
            parse_uptime(&content).map_err(|e| CollectError::malformed(&uptime_path, e))? as u64;

        let stat = self.stat(pid)?;
        Ok(system_uptime.saturating_sub(stat.start_secs(self.config.clock_ticks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn collector(fs: MockFs) -> ProcessCollector<MockFs> {
        ProcessCollector::new(fs, ProcfsConfig::default())
    }

    #[test]
    fn test_command() {
        let c = collector(MockFs::typical_system());

        assert_eq!(c.command(1).unwrap(), "/sbin/init splash");
        assert_eq!(c.command(1001).unwrap(), "/usr/bin/python3 -m http.server 8080");
        // kernel thread
        assert_eq!(c.command(2).unwrap(), "");
    }

    #[test]
    fn test_ram_and_uid() {
        let c = collector(MockFs::typical_system());

        assert_eq!(c.ram(1000).unwrap(), "25000");
        assert_eq!(c.uid(1000).unwrap(), "1000");
        assert_eq!(c.uid(1).unwrap(), "0");
    }

    #[test]
    fn test_ram_missing_for_kernel_thread() {
        let c = collector(MockFs::typical_system());

        let err = c.ram(2).unwrap_err();
        assert!(matches!(err, CollectError::NotFound { ref key, .. } if key == "VmSize"));
    }

    #[test]
    fn test_bad_status_line_only_fails_its_own_field() {
        let mut fs = MockFs::typical_system();
        fs.add_file(
            "/proc/1001/status",
            "Name:\tpython3\nUid:\t1001\t1001\t1001\t1001\nVmSize:\t garbage kB\n",
        );
        let c = collector(fs);

        assert_eq!(c.uid(1001).unwrap(), "1001");
        assert_eq!(c.user(1001).unwrap(), "alice");
        assert!(matches!(c.ram(1001), Err(CollectError::Malformed { .. })));
    }

    #[test]
    fn test_bad_uid_line_is_malformed() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/1000/status", "Uid:\tnobody\nVmSize:\t 25000 kB\n");
        let c = collector(fs);

        assert!(matches!(c.uid(1000), Err(CollectError::Malformed { .. })));
        assert!(matches!(c.user(1000), Err(CollectError::Malformed { .. })));
        assert_eq!(c.ram(1000).unwrap(), "25000");
    }

    #[test]
    fn test_overflowing_stat_is_malformed() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/9/stat",
            format!("9 (spin) R 1 9 9 0 -1 0 0 0 0 0 {} 1 0 0 20 0 1 0 10 0 0", u64::MAX),
        );
        let c = collector(fs);

        assert!(matches!(
            c.active_jiffies(9),
            Err(CollectError::Malformed { .. })
        ));
    }

    #[test]
    fn test_user_resolution() {
        let c = collector(MockFs::typical_system());

        assert_eq!(c.user(1).unwrap(), "root");
        assert_eq!(c.user(1000).unwrap(), "user");
        assert_eq!(c.user(1001).unwrap(), "alice");
    }

    #[test]
    fn test_user_unknown_uid() {
        let c = collector(MockFs::with_orphan_uid());

        let err = c.user(3000).unwrap_err();
        assert!(matches!(err, CollectError::NotFound { .. }));
    }

    #[test]
    fn test_user_without_passwd() {
        let mut fs = MockFs::typical_system();
        fs.remove_file("/etc/passwd");
        let c = collector(fs);

        assert!(c.user(1).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_active_jiffies() {
        let c = collector(MockFs::typical_system());

        // bash: utime 100, stime 50, cutime 200, cstime 100
        assert_eq!(c.active_jiffies(1000).unwrap(), 450);
    }

    #[test]
    fn test_uptime_converts_ticks_to_seconds() {
        let c = collector(MockFs::typical_system());

        // system uptime 12345.67s, bash started at 100000 ticks = 1000s
        assert_eq!(c.uptime(1000).unwrap(), 11345);
        // init started at tick 1
        assert_eq!(c.uptime(1).unwrap(), 12345);
    }

    #[test]
    fn test_uptime_respects_clock_ticks() {
        let config = ProcfsConfig::default().with_clock_ticks(1000);
        let c = ProcessCollector::new(MockFs::typical_system(), config);

        // 100000 ticks at 1000 Hz = 100s
        assert_eq!(c.uptime(1000).unwrap(), 12245);
    }

    #[test]
    fn test_uptime_clamps_at_zero() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/uptime", "5.00 1.00\n");
        let c = collector(fs);

        assert_eq!(c.uptime(1000).unwrap(), 0);
    }

    #[test]
    fn test_short_stat_is_malformed() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/77/stat", "77 (tiny) S 1 77 77");
        let c = collector(fs);

        let err = c.active_jiffies(77).unwrap_err();
        assert!(matches!(err, CollectError::Malformed { .. }));
        assert!(err.to_string().contains("/proc/77/stat"));
    }

    #[test]
    fn test_process_gone() {
        let mut fs = MockFs::new();
        fs.add_dir("/proc/9999"); // Directory exists but no files
        let c = collector(fs);

        assert!(c.stat(9999).unwrap_err().is_unavailable());
        assert!(c.command(9999).unwrap_err().is_unavailable());
        assert!(c.uid(9999).unwrap_err().is_unavailable());
    }

    #[test]
    fn test_custom_proc_root() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/host/proc/5/status",
            "Name:\tsleep\nUid:\t42\t42\t42\t42\nVmSize:\t  1200 kB\n",
        );
        let c = ProcessCollector::new(fs, ProcfsConfig::new("/host/proc"));

        assert_eq!(c.uid(5).unwrap(), "42");
        assert_eq!(c.ram(5).unwrap(), "1200");
    }
}
