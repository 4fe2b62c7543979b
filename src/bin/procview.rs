//! procview - print system and process metrics from /proc.
//!
//! Usage:
//!   procview                  # one sample: system summary and top 10 processes
//!   procview -i 2 -c 0        # sample every 2 seconds until Ctrl-C
//!   procview -p 1 -p 1234     # inspect specific processes
//!   procview --json -c 5      # five samples as JSON lines

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use procview::collector::config::{
    DEFAULT_CLOCK_TICKS, DEFAULT_OS_RELEASE_PATH, DEFAULT_PASSWD_PATH, DEFAULT_PROC_PATH,
};
use procview::collector::procfs::CpuTimes;
use procview::collector::{Collector, FileSystem, ProcfsConfig, RealFs};
use procview::model::{ProcessSnapshot, SystemSnapshot};

/// System and process metrics sampler.
#[derive(Parser)]
#[command(name = "procview", about = "System and process metrics from /proc", version)]
struct Args {
    /// Seconds between samples.
    #[arg(short, long, default_value = "1")]
    interval: u64,

    /// Number of samples to take (0 = until interrupted).
    #[arg(short, long, default_value = "1")]
    count: u64,

    /// Inspect only these PIDs (repeatable).
    #[arg(short, long = "pid", value_name = "PID")]
    pids: Vec<u32>,

    /// Number of processes to list, ordered by CPU jiffies.
    #[arg(short, long, default_value = "10")]
    top: usize,

    /// Print each sample as a JSON line.
    #[arg(long)]
    json: bool,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = DEFAULT_PROC_PATH)]
    proc_path: String,

    /// Path to the os-release file.
    #[arg(long, default_value = DEFAULT_OS_RELEASE_PATH)]
    os_release_path: String,

    /// Path to the passwd file used for user names.
    #[arg(long, default_value = DEFAULT_PASSWD_PATH)]
    passwd_path: String,

    /// Clock ticks per second (USER_HZ).
    #[arg(long, default_value_t = DEFAULT_CLOCK_TICKS)]
    clock_ticks: u64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn procfs_config(&self) -> ProcfsConfig {
        ProcfsConfig::new(&self.proc_path)
            .with_os_release(&self.os_release_path)
            .with_passwd(&self.passwd_path)
            .with_clock_ticks(self.clock_ticks)
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is WARN so sample output stays readable. Use -q for errors only.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("procview={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Share of CPU time spent active between two readings, in [0, 1].
///
/// Returns `None` when no jiffies elapsed or the counters went backwards.
fn cpu_utilization(prev: &CpuTimes, cur: &CpuTimes) -> Option<f64> {
    let active = cur.active().checked_sub(prev.active())?;
    let idle = cur.idle_total().checked_sub(prev.idle_total())?;
    let total = active.checked_add(idle)?;
    if total == 0 {
        return None;
    }
    Some(active as f64 / total as f64)
}

/// Formats seconds as "1d 02:03:04" or "02:03:04".
fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Truncates a string to at most `max` characters.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Picks the processes to show: the requested PIDs, or the busiest `top` ones.
fn select_processes<F: FileSystem + Clone>(
    collector: &Collector<F>,
    pids: &[u32],
    top: usize,
) -> Vec<ProcessSnapshot> {
    if !pids.is_empty() {
        return pids
            .iter()
            .filter_map(|&pid| {
                let snapshot = collector.process_snapshot(pid);
                if snapshot.is_none() {
                    warn!(pid, "process not found");
                }
                snapshot
            })
            .collect();
    }

    let mut processes = collector.process_snapshots();
    processes.sort_by(|a, b| b.active_jiffies.cmp(&a.active_jiffies).then(a.pid.cmp(&b.pid)));
    processes.truncate(top);
    processes
}

/// One JSON line of output.
#[derive(Serialize)]
struct Report<'a> {
    timestamp: String,
    /// Active share of CPU time since the previous sample.
    cpu_utilization: Option<f64>,
    system: &'a SystemSnapshot,
    processes: &'a [ProcessSnapshot],
}

fn print_text(
    timestamp: &str,
    system: &SystemSnapshot,
    cpu: Option<f64>,
    processes: &[ProcessSnapshot],
    clock_ticks: u64,
) {
    let cpu = cpu.map_or_else(|| "  n/a".to_string(), |u| format!("{:5.1}%", u * 100.0));

    println!(
        "{}  {}  kernel {}  up {}",
        timestamp,
        system.operating_system,
        system.kernel,
        format_uptime(system.uptime_secs)
    );
    println!(
        "cpu {}  mem {:5.1}%  processes {} total, {} running",
        cpu,
        system.memory_utilization * 100.0,
        system.total_processes,
        system.running_processes
    );
    println!(
        "{:>7} {:<12} {:>9} {:>12} {:>6}  COMMAND",
        "PID", "USER", "RAM(MB)", "UPTIME", "CPU%"
    );
    for p in processes {
        println!(
            "{:>7} {:<12} {:>9.1} {:>12} {:>6.1}  {}",
            p.pid,
            truncate(&p.user, 12),
            p.ram_mb(),
            format_uptime(p.uptime_secs),
            p.lifetime_cpu_share(clock_ticks) * 100.0,
            truncate(&p.command, 60)
        );
    }
    println!();
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.procfs_config();
    info!(
        "Config: proc={}, os_release={}, passwd={}, clock_ticks={}",
        config.proc_path, config.os_release_path, config.passwd_path, config.clock_ticks
    );
    let clock_ticks = config.clock_ticks;
    let collector = Collector::new(RealFs::new(), config);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let interval = Duration::from_secs(args.interval.max(1));
    let mut previous: Option<CpuTimes> = None;
    let mut taken: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let system = collector.system_snapshot();
        let processes = select_processes(&collector, &args.pids, args.top);
        let cpu = previous.and_then(|prev| cpu_utilization(&prev, &system.cpu));
        previous = Some(system.cpu);
        taken += 1;

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(sample = taken, processes = processes.len(), "sample collected");

        if args.json {
            let report = Report {
                timestamp,
                cpu_utilization: cpu,
                system: &system,
                processes: &processes,
            };
            match serde_json::to_string(&report) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize sample: {}", e),
            }
        } else {
            print_text(&timestamp, &system, cpu, &processes, clock_ticks);
        }

        if args.count != 0 && taken >= args.count {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }
}
