//! # Cosmogenesis Core
//!
//! The deterministic simulation kernel for Cosmogenesis.
//!
//! This crate contains:
//! - Seeded, reproducible random streams (physics and anomaly streams
//!   derive independently from the universe seed)
//! - The physics engine (expansion, structure formation, life, stability)
//! - The anomaly generator (creation, one-shot effects, decay, resolution)
//! - The civilization manager (spawning, evolution, extinction, culling)
//! - End-condition evaluation and warnings
//! - The heuristic predictor
//! - The per-universe step orchestrator
//!
//! The kernel is single-threaded per universe: a simulation run owns the
//! `Universe` value from load to persist, and every stochastic decision
//! draws from the seeded streams so that replaying a seed reproduces the
//! trajectory exactly.

/// Anomaly generation, effects, decay and resolution
pub mod anomaly;
/// Civilization spawning, evolution, extinction and culling
pub mod civilization;
/// Termination predicates and threshold warnings
pub mod end_conditions;
/// Error types raised by the simulation kernel
pub mod error;
/// The step orchestrator: difficulty derivation and the tick pipeline
pub mod orchestrator;
/// The physics engine and statistics snapshots
pub mod physics;
/// Heuristic forecasts of stability, anomalies, endings and life
pub mod predictor;
/// Seeded deterministic random streams
pub mod rng;
/// Per-tick state update systems used by the physics engine
pub mod systems;

pub use error::{Result, SimError};
