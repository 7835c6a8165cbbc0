//! Check library for Cisco ACI fabric monitoring
//!
//! This crate provides the core functionality for:
//! - Parsing recorded agent output into typed sections
//! - Service discovery with identifier normalization and filtering
//! - Check evaluation producing severities, summaries and metrics
//! - Counter-to-rate conversion backed by a persisted value store

pub mod checks;
pub mod discovery;
pub mod error;
pub mod naming;
pub mod rate;
pub mod report;
pub mod section;
pub mod store;

pub use error::{ParseError, ParseResult};
pub use report::{CheckOutput, Finding, Levels, Metric, Service, ServiceLabel, Severity};
pub use store::{CounterState, FileValueStore, MemoryValueStore, StoreError, ValueStore};
