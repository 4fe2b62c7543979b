//! procview - typed accessors over the Linux `/proc` filesystem.
//!
//! This library provides the parsing and derivation layer used by:
//! - `procview` - command-line sampler printing system and process metrics
//! - any polling dashboard that needs OS identity, memory, CPU and per-process facts

pub mod collector;
pub mod model;
