//! Aggregated readings handed to callers such as the CLI.
//!
//! Every field is a best-effort value: an unavailable reading is its empty or
//! zero sentinel, never an error.

use serde::Serialize;

use crate::collector::procfs::CpuTimes;

/// System-wide readings taken in one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemSnapshot {
    /// `PRETTY_NAME` from os-release.
    pub operating_system: String,
    /// Kernel release, e.g. "5.4.0-42-generic".
    pub kernel: String,
    /// Fraction of memory in use, in [0, 1].
    pub memory_utilization: f32,
    /// Seconds since boot.
    pub uptime_secs: u64,
    /// Processes created since boot.
    pub total_processes: u64,
    /// Processes currently runnable.
    pub running_processes: u64,
    /// Raw aggregate CPU counters; difference two snapshots for utilization.
    pub cpu: CpuTimes,
}

/// Per-process readings taken in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    /// Owning user name; empty when the UID has no passwd entry.
    pub user: String,
    /// Real UID as printed in `status`.
    pub uid: String,
    /// Command line with arguments separated by spaces.
    pub command: String,
    /// `VmSize` in kB as printed in `status`.
    pub ram_kb: String,
    /// Seconds since the process started.
    pub uptime_secs: u64,
    /// Jiffies consumed by the process and its reaped children.
    pub active_jiffies: u64,
}

impl ProcessSnapshot {
    /// `VmSize` converted to megabytes, 0 when unknown.
    pub fn ram_mb(&self) -> f64 {
        self.ram_kb.parse::<u64>().map_or(0.0, |kb| kb as f64 / 1024.0)
    }

    /// Average share of one CPU used over the process lifetime, in [0, 1].
    pub fn lifetime_cpu_share(&self, clock_ticks: u64) -> f64 {
        if self.uptime_secs == 0 || clock_ticks == 0 {
            return 0.0;
        }
        let cpu_secs = self.active_jiffies as f64 / clock_ticks as f64;
        (cpu_secs / self.uptime_secs as f64).min(1.0)
    }
}
