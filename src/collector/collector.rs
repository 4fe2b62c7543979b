//! Main collector that combines process and system collectors.
//!
//! `Collector` is the polling-friendly surface: every accessor returns a plain
//! value and degrades to an empty string, zero or empty vector when the
//! underlying file is missing, lacks the expected record, or is malformed.
//! Use `system()` / `process()` for the `Result`-returning layer.

use tracing::{debug, warn};

use crate::collector::config::ProcfsConfig;
use crate::collector::procfs::{CollectError, ProcessCollector, SystemCollector};
use crate::collector::traits::FileSystem;
use crate::model::{ProcessSnapshot, SystemSnapshot};

/// Converts a failed reading into its sentinel, logging why.
fn or_sentinel<T: Default>(what: &str, result: Result<T, CollectError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(accessor = what, error = %e, "reading unavailable");
            T::default()
        }
    }
}

/// Best-effort accessor for system and per-process metrics.
pub struct Collector<F: FileSystem + Clone> {
    process_collector: ProcessCollector<F>,
    system_collector: SystemCollector<F>,
}

impl<F: FileSystem + Clone> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - File locations and clock tick rate
    pub fn new(fs: F, config: ProcfsConfig) -> Self {
        Self {
            process_collector: ProcessCollector::new(fs.clone(), config.clone()),
            system_collector: SystemCollector::new(fs, config),
        }
    }

    /// The `Result`-returning system collector.
    pub fn system(&self) -> &SystemCollector<F> {
        &self.system_collector
    }

    /// The `Result`-returning process collector.
    pub fn process(&self) -> &ProcessCollector<F> {
        &self.process_collector
    }

    pub fn config(&self) -> &ProcfsConfig {
        self.system_collector.config()
    }

    // ---- system identity ----

    pub fn operating_system(&self) -> String {
        or_sentinel("operating_system", self.system_collector.operating_system())
    }

    pub fn kernel(&self) -> String {
        or_sentinel("kernel", self.system_collector.kernel())
    }

    /// PIDs currently present under the proc root.
    pub fn pids(&self) -> Vec<u32> {
        or_sentinel("pids", self.system_collector.pids())
    }

    // ---- memory, uptime, counters ----

    /// `(MemTotal - MemFree) / MemTotal`, or 0 when unavailable.
    pub fn memory_utilization(&self) -> f32 {
        or_sentinel("memory_utilization", self.system_collector.memory_utilization())
    }

    /// Seconds since boot.
    pub fn uptime(&self) -> u64 {
        or_sentinel("uptime", self.system_collector.uptime())
    }

    pub fn total_processes(&self) -> u64 {
        or_sentinel("total_processes", self.system_collector.total_processes())
    }

    pub fn running_processes(&self) -> u64 {
        or_sentinel("running_processes", self.system_collector.running_processes())
    }

    // ---- CPU accounting ----

    pub fn jiffies(&self) -> u64 {
        or_sentinel("jiffies", self.system_collector.jiffies())
    }

    pub fn active_jiffies(&self) -> u64 {
        or_sentinel("active_jiffies", self.system_collector.active_jiffies())
    }

    pub fn idle_jiffies(&self) -> u64 {
        or_sentinel("idle_jiffies", self.system_collector.idle_jiffies())
    }

    /// Raw tokens of the aggregate `cpu` line; empty when unavailable.
    pub fn cpu_utilization(&self) -> Vec<String> {
        or_sentinel("cpu_utilization", self.system_collector.cpu_utilization())
    }

    /// Jiffies used by `pid` and its reaped children.
    pub fn process_active_jiffies(&self, pid: u32) -> u64 {
        or_sentinel("process_active_jiffies", self.process_collector.active_jiffies(pid))
    }

    // ---- per-process ----

    pub fn command(&self, pid: u32) -> String {
        or_sentinel("command", self.process_collector.command(pid))
    }

    /// `VmSize` in kB as a decimal string.
    pub fn ram(&self, pid: u32) -> String {
        or_sentinel("ram", self.process_collector.ram(pid))
    }

    pub fn uid(&self, pid: u32) -> String {
        or_sentinel("uid", self.process_collector.uid(pid))
    }

    pub fn user(&self, pid: u32) -> String {
        or_sentinel("user", self.process_collector.user(pid))
    }

    /// Seconds since `pid` started.
    pub fn process_uptime(&self, pid: u32) -> u64 {
        or_sentinel("process_uptime", self.process_collector.uptime(pid))
    }

    // ---- snapshots ----

    /// Collects all system-wide readings.
    pub fn system_snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            operating_system: self.operating_system(),
            kernel: self.kernel(),
            memory_utilization: self.memory_utilization(),
            uptime_secs: self.uptime(),
            total_processes: self.total_processes(),
            running_processes: self.running_processes(),
            cpu: or_sentinel("cpu_times", self.system_collector.cpu_times()),
        }
    }

    /// Collects all readings for one process.
    ///
    /// Returns `None` if the process has no readable `stat` file, i.e. it is gone.
    pub fn process_snapshot(&self, pid: u32) -> Option<ProcessSnapshot> {
        let stat = match self.process_collector.stat(pid) {
            Ok(stat) => stat,
            Err(e) if e.is_unavailable() => return None,
            Err(e) => {
                warn!(pid, error = %e, "failed to parse process stat");
                return None;
            }
        };

        Some(ProcessSnapshot {
            pid,
            user: self.user(pid),
            uid: self.uid(pid),
            command: self.command(pid),
            ram_kb: self.ram(pid),
            uptime_secs: self.process_uptime(pid),
            active_jiffies: stat.active_jiffies(),
        })
    }

    /// Collects snapshots for every process.
    ///
    /// Processes that disappear during collection are silently skipped.
    pub fn process_snapshots(&self) -> Vec<ProcessSnapshot> {
        self.pids()
            .into_iter()
            .filter_map(|pid| self.process_snapshot(pid))
            .collect()
    }
}
