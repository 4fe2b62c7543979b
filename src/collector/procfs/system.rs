//! System collector for gathering global system metrics from `/proc/`.

use crate::collector::config::ProcfsConfig;
use crate::collector::procfs::error::{CollectError, read_file, required};
use crate::collector::procfs::parser::{
    CpuTimes, MemInfo, ParseError, find_stat_line, mem_utilization, parse_cpu_times,
    parse_kernel_version, parse_meminfo, parse_os_release, parse_stat_counter, parse_uptime,
};
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Collects system-wide metrics from `/proc/` and `/etc/os-release`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    config: ProcfsConfig,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths to the proc root and os-release
    pub fn new(fs: F, config: ProcfsConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ProcfsConfig {
        &self.config
    }

    /// Human-readable OS name (`PRETTY_NAME` from os-release).
    pub fn operating_system(&self) -> Result<String, CollectError> {
        let path = &self.config.os_release_path;
        let content = read_file(&self.fs, path)?;
        parse_os_release(&content)
            .remove("PRETTY_NAME")
            .ok_or_else(|| CollectError::not_found(path, "PRETTY_NAME"))
    }

    /// Kernel release string from `/proc/version`.
    pub fn kernel(&self) -> Result<String, CollectError> {
        let path = self.config.proc_file("version");
        let content = read_file(&self.fs, &path)?;
        parse_kernel_version(&content).map_err(|e| CollectError::malformed(&path, e))
    }

    /// PIDs of all processes: the numeric directory names under the proc root, ascending.
    pub fn pids(&self) -> Result<Vec<u32>, CollectError> {
        let path = &self.config.proc_path;
        let entries = self
            .fs
            .read_dir(Path::new(path))
            .map_err(|source| CollectError::Unavailable {
                path: path.clone(),
                source,
            })?;

        let mut pids: Vec<u32> = entries
            .iter()
            .filter(|entry| self.fs.is_dir(entry))
            .filter_map(|entry| entry.file_name().and_then(|n| n.to_str()))
            .filter_map(|name| name.parse::<u32>().ok())
            .collect();
        pids.sort_unstable();
        pids.dedup();
        Ok(pids)
    }

    /// Reads and parses `/proc/meminfo`.
    pub fn meminfo(&self) -> Result<MemInfo, CollectError> {
        let path = self.config.proc_file("meminfo");
        let content = read_file(&self.fs, &path)?;
        Ok(parse_meminfo(&content))
    }

    /// Fraction of memory in use, `(MemTotal - MemFree) / MemTotal`, in [0, 1].
    pub fn memory_utilization(&self) -> Result<f32, CollectError> {
        let path = self.config.proc_file("meminfo");
        let info = self.meminfo()?;
        let total = required(info.mem_total, &path, "MemTotal")?;
        let free = required(info.mem_free, &path, "MemFree")?;
        mem_utilization(total, free)
            .ok_or_else(|| CollectError::malformed(&path, ParseError::new("MemTotal is zero")))
    }

    /// Whole seconds since boot.
    pub fn uptime(&self) -> Result<u64, CollectError> {
        let path = self.config.proc_file("uptime");
        let content = read_file(&self.fs, &path)?;
        let secs = parse_uptime(&content).map_err(|e| CollectError::malformed(&path, e))?;
        Ok(secs as u64)
    }

    fn read_stat(&self) -> Result<(String, String), CollectError> {
        let path = self.config.proc_file("stat");
        let content = read_file(&self.fs, &path)?;
        Ok((path, content))
    }

    /// Aggregate CPU jiffies from the `cpu` line of `/proc/stat`.
    pub fn cpu_times(&self) -> Result<CpuTimes, CollectError> {
        let (path, content) = self.read_stat()?;
        let tokens =
            find_stat_line(&content, "cpu").ok_or_else(|| CollectError::not_found(&path, "cpu"))?;
        parse_cpu_times(&tokens).map_err(|e| CollectError::malformed(&path, e))
    }

    /// All accounted jiffies; equals `active_jiffies() + idle_jiffies()` for one reading.
    pub fn jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.total())
    }

    /// Jiffies spent working: user + nice + system + irq + softirq + steal.
    pub fn active_jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.active())
    }

    /// Jiffies spent idle: idle + iowait.
    pub fn idle_jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.idle_total())
    }

    /// Raw tokens of the aggregate `cpu` line, label first.
    ///
    /// Callers difference two readings to get a utilization percentage.
    pub fn cpu_utilization(&self) -> Result<Vec<String>, CollectError> {
        let (path, content) = self.read_stat()?;
        find_stat_line(&content, "cpu")
            .map(|tokens| tokens.into_iter().map(str::to_string).collect())
            .ok_or_else(|| CollectError::not_found(&path, "cpu"))
    }

    fn stat_counter(&self, key: &str) -> Result<u64, CollectError> {
        let (path, content) = self.read_stat()?;
        parse_stat_counter(&content, key)
            .map_err(|e| CollectError::malformed(&path, e))?
            .ok_or_else(|| CollectError::not_found(&path, key))
    }

    /// Processes created since boot (`processes` line).
    pub fn total_processes(&self) -> Result<u64, CollectError> {
        self.stat_counter("processes")
    }

    /// Processes currently runnable (`procs_running` line).
    pub fn running_processes(&self) -> Result<u64, CollectError> {
        self.stat_counter("procs_running")
    }

    /// Processes blocked on I/O (`procs_blocked` line).
    pub fn blocked_processes(&self) -> Result<u64, CollectError> {
        self.stat_counter("procs_blocked")
    }

    /// Boot time in seconds since the epoch (`btime` line).
    pub fn boot_time(&self) -> Result<u64, CollectError> {
        self.stat_counter("btime")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn collector(fs: MockFs) -> SystemCollector<MockFs> {
        SystemCollector::new(fs, ProcfsConfig::default())
    }

    #[test]
    fn test_operating_system() {
        let c = collector(MockFs::typical_system());
        assert_eq!(c.operating_system().unwrap(), "Ubuntu 20.04 LTS");
    }

    #[test]
    fn test_operating_system_without_pretty_name() {
        let mut fs = MockFs::new();
        fs.add_file("/etc/os-release", "NAME=Alpine\nID=alpine\n");
        let c = collector(fs);

        assert!(matches!(
            c.operating_system(),
            Err(CollectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_kernel() {
        let c = collector(MockFs::typical_system());
        assert_eq!(c.kernel().unwrap(), "5.4.0");
    }

    #[test]
    fn test_pids() {
        let c = collector(MockFs::typical_system());
        assert_eq!(c.pids().unwrap(), vec![1, 2, 1000, 1001]);
    }

    #[test]
    fn test_pids_skip_numeric_files() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/4242", "not a process");
        fs.add_dir("/proc/self");
        let c = collector(fs);

        assert_eq!(c.pids().unwrap(), vec![1, 2, 1000, 1001]);
    }

    #[test]
    fn test_memory_utilization() {
        let c = collector(MockFs::typical_system());
        let util = c.memory_utilization().unwrap();
        assert!((util - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_memory_utilization_pressure() {
        let c = collector(MockFs::memory_pressure());
        let util = c.memory_utilization().unwrap();
        assert!(util > 0.9 && util <= 1.0);
    }

    #[test]
    fn test_memory_utilization_missing_key() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 1000 kB\n");
        let c = collector(fs);

        let err = c.memory_utilization().unwrap_err();
        assert!(matches!(err, CollectError::NotFound { ref key, .. } if key == "MemFree"));
    }

    #[test]
    fn test_memory_utilization_ignores_bad_untracked_line() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 400 kB\nMemAvailable: \nBuffers: lots kB\n",
        );
        let c = collector(fs);

        assert!((c.memory_utilization().unwrap() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_memory_utilization_bad_key_is_malformed() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 1000 kB\nMemFree: plenty kB\n");
        let c = collector(fs);

        assert!(matches!(
            c.memory_utilization(),
            Err(CollectError::Malformed { .. })
        ));

        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 0 kB\nMemFree: 0 kB\n");
        assert!(matches!(
            collector(fs).memory_utilization(),
            Err(CollectError::Malformed { .. })
        ));
    }

    #[test]
    fn test_uptime() {
        let c = collector(MockFs::typical_system());
        assert_eq!(c.uptime().unwrap(), 12345);
    }

    #[test]
    fn test_cpu_jiffies_decomposition() {
        let c = collector(MockFs::typical_system());

        let active = c.active_jiffies().unwrap();
        let idle = c.idle_jiffies().unwrap();
        assert_eq!(active, 10000 + 500 + 3000 + 200 + 100 + 0);
        assert_eq!(idle, 80000 + 1000);
        assert_eq!(c.jiffies().unwrap(), active + idle);
    }

    #[test]
    fn test_cpu_jiffies_high_load() {
        let c = collector(MockFs::high_cpu_load());

        let cpu = c.cpu_times().unwrap();
        assert_eq!(cpu.steal, 300);
        assert_eq!(c.jiffies().unwrap(), cpu.active() + cpu.idle_total());
        assert!(cpu.active() > cpu.idle_total());
    }

    #[test]
    fn test_cpu_utilization_tokens() {
        let c = collector(MockFs::typical_system());

        let tokens = c.cpu_utilization().unwrap();
        assert_eq!(tokens.len(), 11);
        assert_eq!(tokens[0], "cpu");
        assert_eq!(tokens[1], "10000");
    }

    #[test]
    fn test_cpu_utilization_truncated_line() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  10 20 30\nprocesses 5\n");
        let c = collector(fs);

        assert_eq!(c.cpu_utilization().unwrap(), vec!["cpu", "10", "20", "30"]);
        assert!(matches!(c.jiffies(), Err(CollectError::Malformed { .. })));
    }

    #[test]
    fn test_cpu_counter_overflow_is_malformed() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/stat",
            format!("cpu  {} 1 0 0 0 0 0 0 0 0\nprocesses 5\n", u64::MAX),
        );
        let c = collector(fs);

        assert!(matches!(c.jiffies(), Err(CollectError::Malformed { .. })));
        assert!(matches!(c.active_jiffies(), Err(CollectError::Malformed { .. })));
        assert_eq!(c.cpu_utilization().unwrap().len(), 11);
        assert_eq!(c.total_processes().unwrap(), 5);
    }

    #[test]
    fn test_process_counters() {
        let c = collector(MockFs::typical_system());

        assert_eq!(c.total_processes().unwrap(), 10000);
        assert_eq!(c.running_processes().unwrap(), 2);
        assert_eq!(c.blocked_processes().unwrap(), 0);
        assert_eq!(c.boot_time().unwrap(), 1700000000);
    }

    #[test]
    fn test_process_counters_missing_lines() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  1 2 3 4 5 6 7 8 0 0\n");
        let c = collector(fs);

        assert!(matches!(
            c.total_processes(),
            Err(CollectError::NotFound { .. })
        ));
        assert!(matches!(
            c.running_processes(),
            Err(CollectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_missing_files_are_unavailable() {
        let c = collector(MockFs::new());

        assert!(c.operating_system().unwrap_err().is_unavailable());
        assert!(c.kernel().unwrap_err().is_unavailable());
        assert!(c.memory_utilization().unwrap_err().is_unavailable());
        assert!(c.cpu_times().unwrap_err().is_unavailable());
        assert!(c.total_processes().unwrap_err().is_unavailable());
        assert!(c.uptime().unwrap_err().is_unavailable());
        assert!(c.pids().unwrap_err().is_unavailable());
    }
}
