//! # Cosmogenesis IO
//!
//! Persistence layer for the Cosmogenesis simulation service.
//!
//! This crate provides:
//! - Structured error handling for storage operations
//! - A versioned universe store on SQLite, accessed through a background
//!   command thread so database latency never blocks a simulation tick
//! - Optimistic concurrency: every write carries the version it read,
//!   and a moved row surfaces as a conflict instead of a lost update

/// Error types for storage operations
pub mod error;
/// The versioned universe store
pub mod store;

pub use error::{Result, StoreError};
pub use store::{UniverseStore, UniverseSummary};
