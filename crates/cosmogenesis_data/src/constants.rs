use serde::{Deserialize, Serialize};

/// Physical parameters of a universe, fixed at creation.
///
/// Density parameters are dimensionless fractions of the critical
/// density; `h0_km_s_mpc` is the Hubble constant in km/s/Mpc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicalConstants {
    pub h0_km_s_mpc: f64,
    pub matter_density: f64,
    pub dark_matter_density: f64,
    pub dark_energy_density: f64,
    pub radiation_density: f64,
    pub observable_galaxies: f64,
    pub average_stars_per_galaxy: f64,
    pub initial_temperature: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            h0_km_s_mpc: 70.0,
            matter_density: 0.05,
            dark_matter_density: 0.27,
            dark_energy_density: 0.68,
            radiation_density: 1e-4,
            observable_galaxies: 2e11,
            average_stars_per_galaxy: 1e11,
            initial_temperature: 2.725,
        }
    }
}

impl PhysicalConstants {
    /// Total matter density parameter (baryonic + dark).
    pub fn omega_matter(&self) -> f64 {
        self.matter_density + self.dark_matter_density
    }
}

/// Starting values for the mutable universe state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialConditions {
    pub initial_scale_factor: f64,
    pub initial_entropy: f64,
    pub initial_energy_budget: f64,
    pub initial_metallicity: f64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            initial_scale_factor: 1.0,
            initial_entropy: 0.0,
            initial_energy_budget: 1.0,
            initial_metallicity: 0.0,
        }
    }
}

/// Gameplay difficulty, fixed at universe creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Parses a difficulty label case-insensitively.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}
