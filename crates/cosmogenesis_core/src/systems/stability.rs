use crate::systems::life;
use cosmogenesis_data::{CurrentState, PhysicalConstants, UniverseMetrics};

/// Entropy scale at which the entropy factor bottoms out.
const ENTROPY_REFERENCE: f64 = 3e14;

pub fn entropy_factor(entropy: f64) -> f64 {
    (1.0 - (entropy / ENTROPY_REFERENCE).powf(0.7)).max(0.0)
}

/// Mean of galaxy- and star-formation progress against expectations.
pub fn structure_factor(
    state: &CurrentState,
    constants: &PhysicalConstants,
    carrying_capacity: f64,
) -> f64 {
    let age_gyr = state.age_gyr();
    let expected_galaxies = (carrying_capacity * (age_gyr / 13.8).min(1.0) * 0.3).max(1.0);
    let galaxy_factor = (state.galaxy_count / expected_galaxies).min(1.0);

    let expected_stars =
        (state.galaxy_count * constants.average_stars_per_galaxy * 0.5).max(1.0);
    let star_factor = (state.star_count / expected_stars).min(1.0);

    (galaxy_factor + star_factor) / 2.0
}

/// Penalizes dark-energy domination past 95% of the density budget.
pub fn dark_energy_factor(state: &CurrentState, constants: &PhysicalConstants) -> f64 {
    let a = state.scale_factor;
    let matter = constants.omega_matter() / a.powi(3);
    let lambda = constants.dark_energy_density;
    let fraction = lambda / (matter + lambda);
    if fraction < 0.95 {
        1.0
    } else {
        (1.0 - ((fraction - 0.95) / 0.05).powi(2)).max(0.0)
    }
}

pub fn temperature_factor(temperature: f64) -> f64 {
    (-((temperature - 2.725) / 5.0).powi(2)).exp()
}

/// Unresolved anomalies weigh more than the accumulated record.
pub fn anomaly_factor(unresolved: usize, total: usize) -> f64 {
    let unresolved_penalty = (unresolved as f64 * 0.008).min(0.35);
    let total_penalty = (total as f64 * 0.0015).min(0.25);
    (1.0 - unresolved_penalty - total_penalty).max(0.0)
}

/// Recomputes the composite stability index in place and returns it.
pub fn recompute(
    state: &mut CurrentState,
    constants: &PhysicalConstants,
    carrying_capacity: f64,
    difficulty_modifier: f64,
    unresolved_anomalies: usize,
    total_anomalies: usize,
) -> f64 {
    let raw = 0.15 * entropy_factor(state.entropy)
        + 0.25 * structure_factor(state, constants, carrying_capacity)
        + 0.15 * dark_energy_factor(state, constants)
        + 0.15 * temperature_factor(state.temperature)
        + 0.20 * anomaly_factor(unresolved_anomalies, total_anomalies)
        + 0.10 * state.energy_budget;

    state.stability_index = (raw * (0.6 + 0.4 / difficulty_modifier)).clamp(0.0, 1.0);
    state.stability_index
}

/// Refreshes the derived indices in the metrics subrecord.
pub fn update_indices(state: &CurrentState, metrics: &mut UniverseMetrics) {
    let galaxy_term = (1.0 + state.galaxy_count).log10() / 11.3;
    let star_term = (1.0 + state.star_count).log10() / 23.0;
    let civ_term = (f64::from(state.civilization_count) / 100.0).min(1.0);
    metrics.complexity_index =
        (0.4 * galaxy_term + 0.3 * star_term + 0.2 * state.metallicity + 0.1 * civ_term)
            .clamp(0.0, 1.0);

    metrics.life_potential_index = (life::metallicity_factor(state.metallicity)
        * life::temperature_suitability(state.temperature)
        * (state.habitable_systems_count / 1e6).min(1.0))
    .clamp(0.0, 1.0);

    metrics.cosmic_health = (0.5 * state.stability_index
        + 0.3 * state.energy_budget
        + 0.2 * (1.0 - state.entropy / ENTROPY_REFERENCE).max(0.0))
    .clamp(0.0, 1.0);
}
