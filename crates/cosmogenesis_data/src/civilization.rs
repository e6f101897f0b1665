use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kardashev-style development tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CivilizationTier {
    Type0,
    Type1,
    Type2,
    Type3,
}

impl CivilizationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type0 => "Type0",
            Self::Type1 => "Type1",
            Self::Type2 => "Type2",
            Self::Type3 => "Type3",
        }
    }

    /// The next tier up, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Type0 => Some(Self::Type1),
            Self::Type1 => Some(Self::Type2),
            Self::Type2 => Some(Self::Type3),
            Self::Type3 => None,
        }
    }
}

/// A civilization within a universe.
///
/// Ages are expressed in universe time: `created_at` is the universe age
/// (years) at spawn, `age` the years lived since then. Extinct records
/// are retained for history and culled periodically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Civilization {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub tier: CivilizationTier,
    pub created_at: f64,
    pub age: f64,
    pub development_level: f64,
    pub technology: f64,
    pub stability: f64,
    pub population: f64,
    pub resource_depletion: f64,
    pub warlikeness: f64,
    pub extinct: bool,
    pub extinction_date: Option<f64>,
    pub extinction_age: Option<f64>,
    pub extinction_cause: Option<String>,
}
