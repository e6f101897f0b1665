//! The physics engine.
//!
//! Owns the physics random stream, the stability history ring and the
//! embedded civilization manager. One engine is constructed per
//! simulation run; it advances a single universe through expansion,
//! structure formation and life, in that order. Stability is recomputed
//! separately (after anomaly processing) via [`PhysicsEngine::update_stability_only`].

use crate::civilization::CivilizationManager;
use crate::error::{Result, SimError};
use crate::rng::SeedStream;
use crate::systems::{expansion, life, stability, structure};
use cosmogenesis_data::{
    CivilizationTier, CosmicPhase, Milestone, Milestones, SignificantEvent, Universe,
    UniverseStatus,
};
use serde::Serialize;
use std::collections::VecDeque;

/// Ring-buffer capacity for the stability history.
const STABILITY_HISTORY_LEN: usize = 100;
/// Samples per window when deriving the trend.
const TREND_WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct PhysicsOptions {
    pub seed: String,
    pub time_step_years: f64,
    pub difficulty_modifier: f64,
    pub observable_galaxies_multiplier: f64,
}

impl PhysicsOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            time_step_years: 1e7,
            difficulty_modifier: 1.0,
            observable_galaxies_multiplier: 1.0,
        }
    }
}

pub struct PhysicsEngine {
    options: PhysicsOptions,
    stream: SeedStream,
    civilizations: CivilizationManager,
    stability_history: VecDeque<f64>,
}

impl PhysicsEngine {
    pub fn new(options: PhysicsOptions) -> Self {
        let stream = SeedStream::new(&options.seed);
        Self {
            options,
            stream,
            civilizations: CivilizationManager::new(),
            stability_history: VecDeque::with_capacity(STABILITY_HISTORY_LEN),
        }
    }

    pub fn time_step_years(&self) -> f64 {
        self.options.time_step_years
    }

    fn carrying_capacity(&self, universe: &Universe) -> f64 {
        universe.constants.observable_galaxies * self.options.observable_galaxies_multiplier
    }

    /// Advances the universe by one tick: expansion, then structure,
    /// then life and civilizations. Returns the events recorded this
    /// step. Stability is not recomputed here; the orchestrator calls
    /// [`Self::update_stability_only`] after anomaly processing.
    pub fn simulate_step(&mut self, universe: &mut Universe) -> Result<Vec<SignificantEvent>> {
        if universe.is_ended() {
            return Err(SimError::business_rule(
                "cannot simulate a universe that has ended",
            ));
        }

        let dt = self.options.time_step_years;
        let capacity = self.carrying_capacity(universe);
        let mut events = Vec::new();

        expansion::advance(&mut universe.current_state, &universe.constants, dt);

        let reached = structure::update(
            &mut universe.current_state,
            &universe.constants,
            &mut universe.milestones,
            capacity,
            dt,
        );
        record_milestones(&mut events, universe.current_state.age, &reached);

        let life_outcome = life::update(&mut universe.current_state, &mut universe.milestones, dt);
        record_milestones(&mut events, universe.current_state.age, &life_outcome.reached);

        events.extend(self.civilizations.step(
            universe,
            life_outcome.spawn_window_open,
            dt,
            &mut self.stream,
        ));

        universe.touch();
        Ok(events)
    }

    /// Convenience batch stepping for headless physics (no anomalies).
    pub fn simulate_steps(&mut self, universe: &mut Universe, steps: u64) -> Result<Vec<SignificantEvent>> {
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(self.simulate_step(universe)?);
            self.update_stability_only(universe);
        }
        Ok(events)
    }

    /// Recomputes the composite stability index, pushes it onto the
    /// history ring and refreshes the derived metric indices.
    pub fn update_stability_only(&mut self, universe: &mut Universe) -> f64 {
        let unresolved = universe.unresolved_anomalies();
        let total = universe.anomalies.len();
        let capacity = self.carrying_capacity(universe);
        let value = stability::recompute(
            &mut universe.current_state,
            &universe.constants,
            capacity,
            self.options.difficulty_modifier,
            unresolved,
            total,
        );

        if self.stability_history.len() == STABILITY_HISTORY_LEN {
            self.stability_history.pop_front();
        }
        self.stability_history.push_back(value);

        universe.metrics.stability_trend = self.stability_trend();
        stability::update_indices(&universe.current_state, &mut universe.metrics);
        value
    }

    pub fn stability_history(&self) -> &VecDeque<f64> {
        &self.stability_history
    }

    /// Mean of the last ten samples minus the mean of the ten before
    /// them; zero until both windows are full.
    pub fn stability_trend(&self) -> f64 {
        if self.stability_history.len() < 2 * TREND_WINDOW {
            return 0.0;
        }
        let recent: f64 = self
            .stability_history
            .iter()
            .rev()
            .take(TREND_WINDOW)
            .sum::<f64>()
            / TREND_WINDOW as f64;
        let prior: f64 = self
            .stability_history
            .iter()
            .rev()
            .skip(TREND_WINDOW)
            .take(TREND_WINDOW)
            .sum::<f64>()
            / TREND_WINDOW as f64;
        recent - prior
    }
}

fn record_milestones(events: &mut Vec<SignificantEvent>, age: f64, reached: &[Milestone]) {
    for milestone in reached {
        events.push(SignificantEvent::new(age, "milestone", milestone.description()));
    }
}

/// Point-in-time statistics projection of a universe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseStatistics {
    pub age: f64,
    pub age_gyr: f64,
    pub cosmic_phase: CosmicPhase,
    pub scale_factor: f64,
    pub expansion_rate: f64,
    pub temperature: f64,
    pub entropy: f64,
    pub stability_index: f64,
    pub stability_trend: f64,
    pub energy_budget: f64,
    pub metallicity: f64,
    pub stellar_generations: f64,
    pub galaxy_count: f64,
    pub star_count: f64,
    pub black_hole_count: f64,
    pub habitable_systems_count: f64,
    pub life_bearing_planets_count: f64,
    pub anomalies: AnomalyTally,
    pub civilizations: CivilizationTally,
    pub milestones: Milestones,
    pub status: UniverseStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyTally {
    pub total: usize,
    pub active: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CivilizationTally {
    pub active: usize,
    pub extinct: usize,
    pub average_technology: f64,
    pub highest_tier: Option<CivilizationTier>,
}

pub fn statistics(universe: &Universe) -> UniverseStatistics {
    let state = &universe.current_state;
    let active = universe.active_civilizations();
    let extinct = universe.civilizations.len() - active;
    let average_technology = if active > 0 {
        universe
            .civilizations
            .iter()
            .filter(|c| !c.extinct)
            .map(|c| c.technology)
            .sum::<f64>()
            / active as f64
    } else {
        0.0
    };
    let highest_tier = universe
        .civilizations
        .iter()
        .filter(|c| !c.extinct)
        .map(|c| c.tier)
        .max();
    let resolved = universe.anomalies.iter().filter(|a| a.resolved).count();

    UniverseStatistics {
        age: state.age,
        age_gyr: state.age_gyr(),
        cosmic_phase: state.cosmic_phase,
        scale_factor: state.scale_factor,
        expansion_rate: state.expansion_rate,
        temperature: state.temperature,
        entropy: state.entropy,
        stability_index: state.stability_index,
        stability_trend: universe.metrics.stability_trend,
        energy_budget: state.energy_budget,
        metallicity: state.metallicity,
        stellar_generations: state.stellar_generations,
        galaxy_count: state.galaxy_count,
        star_count: state.star_count,
        black_hole_count: state.black_hole_count,
        habitable_systems_count: state.habitable_systems_count,
        life_bearing_planets_count: state.life_bearing_planets_count,
        anomalies: AnomalyTally {
            total: universe.anomalies.len(),
            active: universe.anomalies.len() - resolved,
            resolved,
        },
        civilizations: CivilizationTally {
            active,
            extinct,
            average_technology,
            highest_tier,
        },
        milestones: universe.milestones,
        status: universe.status,
    }
}
