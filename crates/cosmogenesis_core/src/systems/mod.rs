//! Per-tick state update systems.
//!
//! Each system is a set of free functions over the universe state,
//! invoked by the physics engine in a fixed order: expansion, then
//! structure formation, then life, with stability recomputed by the
//! orchestrator after anomaly processing.

/// Metric expansion, thermodynamics and cosmic phase
pub mod expansion;
/// Habitability and the emergence of life
pub mod life;
/// Stability decomposition and derived indices
pub mod stability;
/// Galaxy, star and black-hole population dynamics
pub mod structure;
