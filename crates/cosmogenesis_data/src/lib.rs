//! Pure data structures for the Cosmogenesis simulation.
//!
//! This crate contains serializable data types with no simulation logic,
//! shared between the kernel, the persistence layer and the HTTP service.
//! Field names are part of the wire contract with stored universe
//! documents (camelCase, including the literal `_scaleFactor` key).

pub mod anomaly;
pub mod civilization;
pub mod constants;
pub mod event;
pub mod universe;

pub use anomaly::{Anomaly, AnomalyCategory, AnomalyKind, Location};
pub use civilization::{Civilization, CivilizationTier};
pub use constants::{Difficulty, InitialConditions, PhysicalConstants};
pub use event::{EventLog, SignificantEvent};
pub use universe::{
    CosmicPhase, CurrentState, Milestone, Milestones, Universe, UniverseMetrics, UniverseStatus,
};
