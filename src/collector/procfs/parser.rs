//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! (plus `os-release` and `passwd`) into structured data. They are designed to
//! be easily testable with string inputs.

use std::collections::HashMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

fn parse_u64(token: &str, name: &str) -> Result<u64, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::new(format!("invalid {}: {:?}", name, token)))
}

// ============ os-release ============

/// Parses `os-release` content into a key -> value map.
///
/// Format: `KEY=value` per line, value optionally wrapped in single or double
/// quotes. Comments and lines without `=` are skipped.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), unquote(value.trim()));
        }
    }
    map
}

/// Strips matching surrounding quotes and shell escapes from an os-release value.
fn unquote(value: &str) -> String {
    let inner = match value.as_bytes() {
        [b'"', .., b'"'] | [b'\'', .., b'\''] => &value[1..value.len() - 1],
        _ => value,
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\' | '$' | '`' | '\'')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// A keyed value from a `Key: value` file.
///
/// `None` when the key is absent, `Some(Err(_))` when its line is malformed.
/// A bad line only affects its own key.
pub type Field<T> = Option<Result<T, ParseError>>;

fn checked_sum(values: &[u64]) -> Option<u64> {
    values.iter().try_fold(0u64, |acc, &v| acc.checked_add(v))
}

fn saturating_sum(values: &[u64]) -> u64 {
    values.iter().fold(0u64, |acc, &v| acc.saturating_add(v))
}

// ============ /proc/version ============

/// Parses `/proc/version` content and returns the kernel release.
///
/// Format: `Linux version 5.4.0-42-generic (buildd@host) (gcc ...) #46 SMP ...`
pub fn parse_kernel_version(content: &str) -> Result<String, ParseError> {
    let line = content.lines().next().unwrap_or("");
    line.split_whitespace()
        .nth(2)
        .map(str::to_string)
        .ok_or_else(|| ParseError::new("not enough tokens in version: expected 3+"))
}

// ============ /proc/meminfo ============

/// Parsed data from `/proc/meminfo`, values in kB.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemInfo {
    pub mem_total: Field<u64>,
    pub mem_free: Field<u64>,
}

/// Fraction of memory in use: `(MemTotal - MemFree) / MemTotal`.
///
/// Returns `None` when MemTotal is zero.
pub fn mem_utilization(total_kb: u64, free_kb: u64) -> Option<f32> {
    if total_kb == 0 {
        return None;
    }
    Some(total_kb.saturating_sub(free_kb) as f32 / total_kb as f32)
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> MemInfo {
    let mut info = MemInfo::default();

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let slot = match key {
            "MemTotal" => &mut info.mem_total,
            "MemFree" => &mut info.mem_free,
            _ => continue,
        };
        *slot = Some(
            rest.split_whitespace()
                .next()
                .ok_or_else(|| ParseError::new(format!("missing value for {}", key)))
                .and_then(|value| parse_u64(value, key)),
        );
    }

    info
}

// ============ /proc/uptime ============

/// Parses `/proc/uptime` content and returns seconds since boot.
///
/// The second number (aggregate idle seconds) is ignored.
pub fn parse_uptime(content: &str) -> Result<f64, ParseError> {
    let uptime_secs: f64 = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?
        .parse()
        .map_err(|_| ParseError::new("invalid uptime"))?;
    if !uptime_secs.is_finite() || uptime_secs < 0.0 {
        return Err(ParseError::new("invalid uptime"));
    }
    Ok(uptime_secs)
}

// ============ /proc/stat ============

/// Aggregate CPU jiffies from the `cpu` line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuTimes {
    fn active_counters(&self) -> [u64; 6] {
        [
            self.user,
            self.nice,
            self.system,
            self.irq,
            self.softirq,
            self.steal,
        ]
    }

    fn idle_counters(&self) -> [u64; 2] {
        [self.idle, self.iowait]
    }

    /// Jiffies spent doing work.
    ///
    /// guest and guest_nice are already folded into user and nice by the kernel.
    pub fn active(&self) -> u64 {
        saturating_sum(&self.active_counters())
    }

    /// Jiffies spent idle or waiting on I/O.
    pub fn idle_total(&self) -> u64 {
        saturating_sum(&self.idle_counters())
    }

    /// All accounted jiffies; `active() + idle_total()` for any parsed line.
    pub fn total(&self) -> u64 {
        self.active().saturating_add(self.idle_total())
    }
}

/// Minimum number of counters on a `cpu` line (user through steal).
const CPU_MIN_COUNTERS: usize = 8;

/// Returns the whitespace tokens of the first `/proc/stat` line whose label is `key`.
pub fn find_stat_line<'a>(content: &'a str, key: &str) -> Option<Vec<&'a str>> {
    content
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<&str>>())
        .find(|parts| parts.first() == Some(&key))
}

/// Parses the tokens of a `cpu` line (label included) into `CpuTimes`.
///
/// guest and guest_nice are optional; anything shorter than steal is an error,
/// as are counters whose total does not fit in a u64.
pub fn parse_cpu_times(tokens: &[&str]) -> Result<CpuTimes, ParseError> {
    match tokens.first() {
        Some(label) if label.starts_with("cpu") => {}
        _ => return Err(ParseError::new("not a cpu line")),
    }

    let counters = &tokens[1..];
    if counters.len() < CPU_MIN_COUNTERS {
        return Err(ParseError::new(format!(
            "not enough fields in cpu line: expected {}+, got {}",
            CPU_MIN_COUNTERS,
            counters.len()
        )));
    }

    let field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        counters.get(idx).map_or(Ok(0), |s| parse_u64(s, name))
    };

    let cpu = CpuTimes {
        user: field(0, "user")?,
        nice: field(1, "nice")?,
        system: field(2, "system")?,
        idle: field(3, "idle")?,
        iowait: field(4, "iowait")?,
        irq: field(5, "irq")?,
        softirq: field(6, "softirq")?,
        steal: field(7, "steal")?,
        guest: field(8, "guest")?,
        guest_nice: field(9, "guest_nice")?,
    };

    checked_sum(&cpu.active_counters())
        .zip(checked_sum(&cpu.idle_counters()))
        .and_then(|(active, idle)| active.checked_add(idle))
        .ok_or_else(|| ParseError::new("cpu counters overflow"))?;

    Ok(cpu)
}

/// Reads a single-value counter line such as `processes 1234`.
///
/// Returns `Ok(None)` when the key is absent.
pub fn parse_stat_counter(content: &str, key: &str) -> Result<Option<u64>, ParseError> {
    let Some(parts) = find_stat_line(content, key) else {
        return Ok(None);
    };
    let value = parts
        .get(1)
        .ok_or_else(|| ParseError::new(format!("missing value for {}", key)))?;
    parse_u64(value, key).map(Some)
}

// ============ /proc/[pid]/stat ============

/// Fields of `/proc/[pid]/stat` used for CPU accounting and uptime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStat {
    /// Field 14: user-mode jiffies.
    pub utime: u64,
    /// Field 15: kernel-mode jiffies.
    pub stime: u64,
    /// Field 16: user-mode jiffies of waited-for children.
    pub cutime: i64,
    /// Field 17: kernel-mode jiffies of waited-for children.
    pub cstime: i64,
    /// Field 22: start time in clock ticks since boot.
    pub starttime: u64,
}

impl ProcStat {
    // Negative child times are clamped to zero.
    fn jiffy_counters(&self) -> [u64; 4] {
        [
            self.utime,
            self.stime,
            self.cutime.max(0) as u64,
            self.cstime.max(0) as u64,
        ]
    }

    /// Sum of fields 14-17: jiffies spent by the process and its reaped children.
    pub fn active_jiffies(&self) -> u64 {
        saturating_sum(&self.jiffy_counters())
    }

    /// Start time in whole seconds since boot.
    pub fn start_secs(&self, clock_ticks: u64) -> u64 {
        self.starttime / clock_ticks.max(1)
    }
}

/// Parses `/proc/[pid]/stat` content.
///
/// The format is tricky because the comm field can contain spaces and parentheses.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
/// Field positions after comm are counted from the last `)`.
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    // Find the comm field boundaries (enclosed in parentheses)
    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    content[..open_paren]
        .trim()
        .parse::<u32>()
        .map_err(|_| ParseError::new("invalid pid"))?;

    // fields[0] is field 3 (state), so field N is fields[N - 3]
    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    if fields.len() < 20 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 22+, got {}",
            fields.len() + 2
        )));
    }

    let parse_signed = |idx: usize, name: &str| -> Result<i64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    let stat = ProcStat {
        utime: parse_u64(fields[11], "utime")?,
        stime: parse_u64(fields[12], "stime")?,
        cutime: parse_signed(13, "cutime")?,
        cstime: parse_signed(14, "cstime")?,
        starttime: parse_u64(fields[19], "starttime")?,
    };

    checked_sum(&stat.jiffy_counters())
        .ok_or_else(|| ParseError::new("process jiffies overflow"))?;

    Ok(stat)
}

// ============ /proc/[pid]/status ============

/// Fields of `/proc/[pid]/status` used for identity and memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStatus {
    /// Real UID, the first of the four ids on the `Uid` line.
    pub uid: Field<String>,
    /// `VmSize` in kB as printed by the kernel. Absent for kernel threads.
    pub vm_size_kb: Field<String>,
}

/// First numeric token of a status value, validated but kept as text.
fn first_number(key: &str, value: &str) -> Result<String, ParseError> {
    let token = value
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new(format!("missing value for {}", key)))?;
    parse_u64(token, key)?;
    Ok(token.to_string())
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is key:\tvalue pairs, one per line.
pub fn parse_proc_status(content: &str) -> ProcStatus {
    let mut status = ProcStatus::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "Uid" => status.uid = Some(first_number("Uid", value)),
            "VmSize" => status.vm_size_kb = Some(first_number("VmSize", value)),
            _ => {}
        }
    }

    status
}

// ============ /proc/[pid]/cmdline ============

/// Turns raw `cmdline` content into a display string.
///
/// Arguments are NUL-separated; NULs become spaces and the trailing
/// terminator is dropped.
pub fn normalize_cmdline(content: &str) -> String {
    content
        .split('\0')
        .filter(|arg| !arg.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

// ============ /etc/passwd ============

/// Parses `/etc/passwd` content and returns a map of UID -> username.
///
/// Format: username:password:uid:gid:gecos:home:shell
/// When several entries share a UID the first one wins, as with `getpwuid`.
pub fn parse_passwd(content: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() >= 3
            && let Ok(uid) = parts[2].parse::<u32>()
        {
            map.entry(uid).or_insert_with(|| parts[0].to_string());
        }
    }
    map
}
