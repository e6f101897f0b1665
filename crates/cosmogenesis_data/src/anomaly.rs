use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Broad classification used for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyCategory {
    Gravitational,
    Cosmological,
    Stellar,
    Quantum,
    Structural,
    Electromagnetic,
}

/// The closed set of anomaly kinds.
///
/// Each kind's probability, trigger condition and effect map live in the
/// simulation kernel; this enum is the serialized tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnomalyKind {
    BlackHoleMerger,
    DarkEnergySurge,
    SupernovaChain,
    QuantumFluctuation,
    GalacticCollision,
    CosmicVoid,
    MagneticReversal,
    DarkMatterClump,
}

impl AnomalyKind {
    /// All kinds, in the order the generator evaluates them.
    pub const ALL: [AnomalyKind; 8] = [
        AnomalyKind::BlackHoleMerger,
        AnomalyKind::DarkEnergySurge,
        AnomalyKind::SupernovaChain,
        AnomalyKind::QuantumFluctuation,
        AnomalyKind::GalacticCollision,
        AnomalyKind::CosmicVoid,
        AnomalyKind::MagneticReversal,
        AnomalyKind::DarkMatterClump,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlackHoleMerger => "blackHoleMerger",
            Self::DarkEnergySurge => "darkEnergySurge",
            Self::SupernovaChain => "supernovaChain",
            Self::QuantumFluctuation => "quantumFluctuation",
            Self::GalacticCollision => "galacticCollision",
            Self::CosmicVoid => "cosmicVoid",
            Self::MagneticReversal => "magneticReversal",
            Self::DarkMatterClump => "darkMatterClump",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A discrete stochastic perturbation awaiting operator resolution.
///
/// Effects in `effects_raw` are applied once, at generation time.
/// Severity starts integer-valued in [1, 5] and may decay fractionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub category: AnomalyCategory,
    pub severity: f64,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub effects_raw: BTreeMap<String, f64>,
    pub location: Location,
    pub radius: f64,
    pub description: String,
    pub decay_rate: f64,
}
