use crate::anomaly::Anomaly;
use crate::civilization::Civilization;
use crate::constants::{Difficulty, InitialConditions, PhysicalConstants};
use crate::event::EventLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discrete era label derived from universe age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmicPhase {
    DarkAges,
    Reionization,
    GalaxyFormation,
    StellarPeak,
    GradualDecline,
    TwilightEra,
    DegenerateEra,
}

impl CosmicPhase {
    /// Phase thresholds in gigayears.
    pub fn from_age_gyr(age_gyr: f64) -> Self {
        if age_gyr < 0.1 {
            Self::DarkAges
        } else if age_gyr < 1.0 {
            Self::Reionization
        } else if age_gyr < 5.0 {
            Self::GalaxyFormation
        } else if age_gyr < 10.0 {
            Self::StellarPeak
        } else if age_gyr < 50.0 {
            Self::GradualDecline
        } else if age_gyr < 100.0 {
            Self::TwilightEra
        } else {
            Self::DegenerateEra
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DarkAges => "dark_ages",
            Self::Reionization => "reionization",
            Self::GalaxyFormation => "galaxy_formation",
            Self::StellarPeak => "stellar_peak",
            Self::GradualDecline => "gradual_decline",
            Self::TwilightEra => "twilight_era",
            Self::DegenerateEra => "degenerate_era",
        }
    }
}

/// The mutable macroscopic state of a universe.
///
/// Astronomical counts are kept as `f64` because growth laws accumulate
/// fractional amounts per tick; only the civilization count is discrete.
/// `_scaleFactor` keeps its underscore prefix on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentState {
    pub age: f64,
    #[serde(rename = "_scaleFactor")]
    pub scale_factor: f64,
    pub expansion_rate: f64,
    pub temperature: f64,
    pub entropy: f64,
    pub stability_index: f64,
    pub galaxy_count: f64,
    pub star_count: f64,
    pub black_hole_count: f64,
    pub habitable_systems_count: f64,
    pub life_bearing_planets_count: f64,
    pub civilization_count: u32,
    pub metallicity: f64,
    pub cosmic_phase: CosmicPhase,
    pub stellar_generations: f64,
    pub energy_budget: f64,
}

impl CurrentState {
    pub fn from_initial(constants: &PhysicalConstants, initial: &InitialConditions) -> Self {
        Self {
            age: 0.0,
            scale_factor: initial.initial_scale_factor,
            expansion_rate: constants.h0_km_s_mpc,
            temperature: constants.initial_temperature,
            entropy: initial.initial_entropy,
            stability_index: 1.0,
            galaxy_count: 0.0,
            star_count: 0.0,
            black_hole_count: 0.0,
            habitable_systems_count: 0.0,
            life_bearing_planets_count: 0.0,
            civilization_count: 0,
            metallicity: initial.initial_metallicity,
            cosmic_phase: CosmicPhase::DarkAges,
            stellar_generations: 0.0,
            energy_budget: initial.initial_energy_budget,
        }
    }

    /// Universe age in gigayears.
    pub fn age_gyr(&self) -> f64 {
        self.age / 1e9
    }
}

/// One-shot achievements; each flag transitions false -> true at most
/// once per universe lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    FirstGalaxy,
    FirstStar,
    StellarPopulationI,
    FirstLife,
    ComplexLifeEra,
    FirstCivilization,
    GreatFilter,
}

impl Milestone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstGalaxy => "firstGalaxy",
            Self::FirstStar => "firstStar",
            Self::StellarPopulationI => "stellarPopulationI",
            Self::FirstLife => "firstLife",
            Self::ComplexLifeEra => "complexLifeEra",
            Self::FirstCivilization => "firstCivilization",
            Self::GreatFilter => "greatFilter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstGalaxy => "The first galaxy has coalesced",
            Self::FirstStar => "The first star has ignited",
            Self::StellarPopulationI => "Metal-rich stellar populations have emerged",
            Self::FirstLife => "Life has arisen on a planet",
            Self::ComplexLifeEra => "Complex life is now widespread",
            Self::FirstCivilization => "An intelligent civilization has emerged",
            Self::GreatFilter => "A catastrophe has decimated civilizations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Milestones {
    pub first_galaxy: bool,
    pub first_star: bool,
    pub stellar_population_i: bool,
    pub first_life: bool,
    pub complex_life_era: bool,
    pub first_civilization: bool,
    pub great_filter: bool,
}

impl Milestones {
    pub fn is_reached(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::FirstGalaxy => self.first_galaxy,
            Milestone::FirstStar => self.first_star,
            Milestone::StellarPopulationI => self.stellar_population_i,
            Milestone::FirstLife => self.first_life,
            Milestone::ComplexLifeEra => self.complex_life_era,
            Milestone::FirstCivilization => self.first_civilization,
            Milestone::GreatFilter => self.great_filter,
        }
    }

    /// Marks a milestone, returning true only on the false -> true
    /// transition so callers can record the crossing exactly once.
    pub fn reach(&mut self, milestone: Milestone) -> bool {
        let flag = match milestone {
            Milestone::FirstGalaxy => &mut self.first_galaxy,
            Milestone::FirstStar => &mut self.first_star,
            Milestone::StellarPopulationI => &mut self.stellar_population_i,
            Milestone::FirstLife => &mut self.first_life,
            Milestone::ComplexLifeEra => &mut self.complex_life_era,
            Milestone::FirstCivilization => &mut self.first_civilization,
            Milestone::GreatFilter => &mut self.great_filter,
        };
        let newly = !*flag;
        *flag = true;
        newly
    }
}

/// Derived indices and player-interaction counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniverseMetrics {
    pub player_interventions: u64,
    pub anomalies_resolved: u64,
    pub anomaly_resolution_rate: f64,
    pub total_steps_run: u64,
    pub stability_trend: f64,
    pub complexity_index: f64,
    pub life_potential_index: f64,
    pub cosmic_health: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniverseStatus {
    Running,
    Paused,
    Ended,
}

/// The root persisted entity. Mutated only by the step orchestrator and
/// by explicit anomaly resolution; the seed is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Universe {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub seed: String,
    pub difficulty: Difficulty,
    pub constants: PhysicalConstants,
    pub initial_conditions: InitialConditions,
    pub current_state: CurrentState,
    pub anomalies: Vec<Anomaly>,
    pub civilizations: Vec<Civilization>,
    pub significant_events: EventLog,
    pub milestones: Milestones,
    pub metrics: UniverseMetrics,
    pub status: UniverseStatus,
    pub end_condition: Option<String>,
    pub end_reason: Option<String>,
    pub final_age: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Universe {
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        seed: impl Into<String>,
        difficulty: Difficulty,
        constants: PhysicalConstants,
        initial_conditions: InitialConditions,
    ) -> Self {
        let now = Utc::now();
        let current_state = CurrentState::from_initial(&constants, &initial_conditions);
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name: name.into(),
            seed: seed.into(),
            difficulty,
            constants,
            initial_conditions,
            current_state,
            anomalies: Vec::new(),
            civilizations: Vec::new(),
            significant_events: EventLog::new(),
            milestones: Milestones::default(),
            metrics: UniverseMetrics::default(),
            status: UniverseStatus::Running,
            end_condition: None,
            end_reason: None,
            final_age: None,
            created_at: now,
            last_modified: now,
        }
    }

    /// Refreshes the modification stamp. Call on every mutation path.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    pub fn is_ended(&self) -> bool {
        self.status == UniverseStatus::Ended
    }

    /// Anomalies not yet resolved by the operator.
    pub fn unresolved_anomalies(&self) -> usize {
        self.anomalies.iter().filter(|a| !a.resolved).count()
    }

    /// Civilizations still alive.
    pub fn active_civilizations(&self) -> usize {
        self.civilizations.iter().filter(|c| !c.extinct).count()
    }
}
