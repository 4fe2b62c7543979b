//! System metrics collector for Linux.
//!
//! This module provides typed accessors over the Linux `/proc` filesystem,
//! with support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Collector (sentinel values)                 │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  ProcessCollector   │   │     SystemCollector         │  │
//! │  │  - /proc/[pid]/*    │   │  - /proc/meminfo, stat      │  │
//! │  │  - /etc/passwd      │   │  - /proc/version, uptime    │  │
//! │  └──────────┬──────────┘   │  - /etc/os-release          │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procview::collector::{Collector, ProcfsConfig, RealFs};
//!
//! let collector = Collector::new(RealFs::new(), ProcfsConfig::default());
//! println!("{} running", collector.running_processes());
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procview::collector::{Collector, MockFs, ProcfsConfig};
//!
//! let collector = Collector::new(MockFs::typical_system(), ProcfsConfig::default());
//! assert_eq!(collector.kernel(), "5.4.0");
//! assert_eq!(
//!     collector.jiffies(),
//!     collector.active_jiffies() + collector.idle_jiffies()
//! );
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod config;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::Collector;
pub use config::ProcfsConfig;
pub use mock::MockFs;
pub use procfs::{CollectError, ProcessCollector, SystemCollector};
pub use traits::{FileSystem, RealFs};
