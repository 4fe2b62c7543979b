//! Collectors for Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading system and process
//! information from the `/proc` virtual filesystem.

pub mod error;
pub mod parser;
pub mod process;
pub mod system;

pub use error::CollectError;
pub use parser::{CpuTimes, ParseError};
pub use process::ProcessCollector;
pub use system::SystemCollector;
