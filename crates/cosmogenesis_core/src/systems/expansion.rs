use cosmogenesis_data::{CosmicPhase, CurrentState, PhysicalConstants};

/// Kilometers per megaparsec.
pub const KM_PER_MPC: f64 = 3.08567758128e19;
/// Seconds per Julian year.
pub const SECONDS_PER_YEAR: f64 = 3.15576e7;

pub const SCALE_FACTOR_MIN: f64 = 1e-10;
pub const SCALE_FACTOR_MAX: f64 = 1e10;
pub const ENTROPY_MAX: f64 = 1e16;

/// Per-year energy budget decay constant.
const ENERGY_DECAY_PER_YEAR: f64 = 5e-13;

/// Hubble constant converted from km/s/Mpc to inverse years.
pub fn h0_per_year(constants: &PhysicalConstants) -> f64 {
    constants.h0_km_s_mpc / KM_PER_MPC * SECONDS_PER_YEAR
}

/// Effective expansion rate (inverse years) from the Friedmann term.
pub fn effective_hubble(state: &CurrentState, constants: &PhysicalConstants) -> f64 {
    let a = state.scale_factor;
    let density = constants.omega_matter() / a.powi(3)
        + constants.radiation_density / a.powi(4)
        + constants.dark_energy_density;
    h0_per_year(constants) * density.max(0.0).sqrt()
}

/// Advances age, scale factor, temperature, entropy and energy budget by
/// one step of `dt` years.
pub fn advance(state: &mut CurrentState, constants: &PhysicalConstants, dt: f64) {
    state.age += dt;

    let h_eff = effective_hubble(state, constants);
    // Log-growth per step is clamped so a single tick can never run away.
    let growth = (h_eff * dt).clamp(-0.1, 0.1);
    state.scale_factor =
        (state.scale_factor * growth.exp()).clamp(SCALE_FACTOR_MIN, SCALE_FACTOR_MAX);
    state.expansion_rate = h_eff * KM_PER_MPC / SECONDS_PER_YEAR;

    let t0 = constants.initial_temperature;
    state.temperature = (t0 / state.scale_factor).clamp(0.01, 100.0 * t0);

    let volume_term = state.scale_factor.powi(3).max(1.0).ln();
    state.entropy = (state.entropy + volume_term * 1e5 * (dt / 1e8)).clamp(0.0, ENTROPY_MAX);

    state.energy_budget = (state.energy_budget - ENERGY_DECAY_PER_YEAR * dt).clamp(0.0, 1.0);

    state.cosmic_phase = CosmicPhase::from_age_gyr(state.age_gyr());
}
