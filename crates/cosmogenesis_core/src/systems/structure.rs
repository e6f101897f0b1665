use cosmogenesis_data::{CurrentState, Milestone, Milestones, PhysicalConstants};

/// Updates galaxy, star and black-hole populations for one step.
///
/// `carrying_capacity` is the observable-galaxy count already scaled by
/// the difficulty multiplier for this run. Returns the milestones newly
/// crossed this step so the caller can record them.
pub fn update(
    state: &mut CurrentState,
    constants: &PhysicalConstants,
    milestones: &mut Milestones,
    carrying_capacity: f64,
    dt: f64,
) -> Vec<Milestone> {
    let mut reached = Vec::new();
    update_galaxies(state, milestones, carrying_capacity, dt, &mut reached);
    update_stars(state, constants, milestones, dt, &mut reached);
    stellar_evolution(state, constants, milestones, dt, &mut reached);

    // Stellar-mass black holes accumulate from the stellar population.
    state.black_hole_count += state.star_count * 1e-4 * 0.1 * (dt / 1e9);

    reached
}

/// Logistic galaxy growth with an early-universe bootstrap window.
fn update_galaxies(
    state: &mut CurrentState,
    milestones: &mut Milestones,
    carrying_capacity: f64,
    dt: f64,
    reached: &mut Vec<Milestone>,
) {
    let age_gyr = state.age_gyr();
    let rate = (0.15 / 1e9) * (1.0 + 2.0 * (-((age_gyr - 5.0) / 3.0).powi(2)).exp());

    if age_gyr > 0.1 && age_gyr < 2.5 && state.galaxy_count < 1000.0 {
        // Seed galaxies condense out of primordial overdensities.
        state.galaxy_count += 2000.0 * (-((age_gyr - 0.5) / 0.7).powi(2)).exp() * (dt / 1e7);
    } else if state.galaxy_count > 0.0 {
        state.galaxy_count +=
            rate * state.galaxy_count * (1.0 - state.galaxy_count / carrying_capacity) * dt;
    }

    if age_gyr > 1.0 && state.galaxy_count < 100.0 {
        state.galaxy_count += 100.0;
    }

    state.galaxy_count = state.galaxy_count.clamp(0.0, 1.5 * carrying_capacity);

    if state.galaxy_count >= 1.0 && milestones.reach(Milestone::FirstGalaxy) {
        reached.push(Milestone::FirstGalaxy);
    }
}

/// Star formation relaxes toward the per-galaxy target, boosted by
/// metallicity and damped as the gas supply ages out.
fn update_stars(
    state: &mut CurrentState,
    constants: &PhysicalConstants,
    milestones: &mut Milestones,
    dt: f64,
    reached: &mut Vec<Milestone>,
) {
    let age_gyr = state.age_gyr();
    let target = state.galaxy_count * constants.average_stars_per_galaxy;
    state.star_count += (target - state.star_count)
        * 0.003
        * (1.0 + 0.5 * state.metallicity)
        * (-age_gyr / 10.0).exp()
        * (dt / 1e7);

    if age_gyr > 0.5 && state.galaxy_count > 10.0 && state.star_count < 1e6 {
        state.star_count += 1e6;
    }
    state.star_count = state.star_count.max(0.0);

    if state.star_count >= 1.0 && milestones.reach(Milestone::FirstStar) {
        reached.push(Milestone::FirstStar);
    }
}

/// Stellar deaths enrich the medium and advance the generation counter.
fn stellar_evolution(
    state: &mut CurrentState,
    constants: &PhysicalConstants,
    milestones: &mut Milestones,
    dt: f64,
    reached: &mut Vec<Milestone>,
) {
    let death_rate = state.star_count * 1e-11 * dt;
    state.stellar_generations = (state.stellar_generations
        + death_rate / (constants.average_stars_per_galaxy * 10.0))
        .min(10.0);
    state.metallicity = (state.metallicity + death_rate * 1e-14).clamp(0.0, 1.0);

    if state.metallicity > 0.1 && milestones.reach(Milestone::StellarPopulationI) {
        reached.push(Milestone::StellarPopulationI);
    }
}
