use cosmogenesis_data::{CurrentState, Milestone, Milestones};

/// Metallicity must reach this floor before chemistry supports biology.
const METALLICITY_FLOOR: f64 = 0.01;

/// Result of the life-evolution pass.
#[derive(Debug, Default)]
pub struct LifeOutcome {
    /// Milestones newly crossed this step.
    pub reached: Vec<Milestone>,
    /// Whether the civilization spawn window is open this step.
    pub spawn_window_open: bool,
}

/// How hospitable the current metal abundance is to biochemistry.
pub fn metallicity_factor(metallicity: f64) -> f64 {
    (metallicity / 0.1).clamp(0.0, 1.0)
}

/// How close the background temperature sits to the habitable reference.
pub fn temperature_suitability(temperature: f64) -> f64 {
    (-((temperature - 2.725) / 10.0).powi(2)).exp()
}

/// Updates habitability and life-bearing planet counts for one step.
pub fn update(state: &mut CurrentState, milestones: &mut Milestones, dt: f64) -> LifeOutcome {
    let mut outcome = LifeOutcome::default();
    let age_gyr = state.age_gyr();
    if age_gyr < 1.0 || state.metallicity < METALLICITY_FLOOR {
        return outcome;
    }

    let enrichment = (state.metallicity / 0.3).clamp(0.0, 1.0)
        * ((age_gyr - 1.0) / 3.0).min(1.0)
        * 0.015;
    state.habitable_systems_count = (state.star_count * (0.001 + enrichment)).max(0.0);

    if age_gyr > 3.0 && state.habitable_systems_count > 100.0 {
        state.life_bearing_planets_count += state.habitable_systems_count
            * 1e-8
            * ((age_gyr - 3.0) / 5.0).clamp(0.0, 1.0)
            * metallicity_factor(state.metallicity)
            * temperature_suitability(state.temperature)
            * (dt / 1e8);

        if state.life_bearing_planets_count >= 1.0 && milestones.reach(Milestone::FirstLife) {
            outcome.reached.push(Milestone::FirstLife);
        }
        if state.life_bearing_planets_count > 1000.0
            && milestones.reach(Milestone::ComplexLifeEra)
        {
            outcome.reached.push(Milestone::ComplexLifeEra);
        }
    }

    outcome.spawn_window_open = age_gyr > 5.0 && state.life_bearing_planets_count > 1000.0;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmogenesis_data::{InitialConditions, PhysicalConstants};

    fn fresh() -> (CurrentState, Milestones) {
        let constants = PhysicalConstants::default();
        let state = CurrentState::from_initial(&constants, &InitialConditions::default());
        (state, Milestones::default())
    }

    #[test]
    fn life_waits_for_metallicity() {
        let (mut state, mut milestones) = fresh();
        state.age = 4e9;
        state.star_count = 1e12;
        state.metallicity = 0.0;
        let outcome = update(&mut state, &mut milestones, 1e7);
        assert_eq!(state.habitable_systems_count, 0.0);
        assert!(outcome.reached.is_empty());
    }

    #[test]
    fn habitable_systems_scale_with_stars_and_metals() {
        let (mut state, mut milestones) = fresh();
        state.age = 4e9;
        state.star_count = 1e12;
        state.metallicity = 0.15;
        update(&mut state, &mut milestones, 1e7);
        assert!(state.habitable_systems_count > 1e9);
    }

    #[test]
    fn first_life_milestone_fires_once() {
        let (mut state, mut milestones) = fresh();
        state.age = 6e9;
        state.star_count = 1e13;
        state.metallicity = 0.2;
        let first = update(&mut state, &mut milestones, 1e9);
        assert!(first.reached.contains(&Milestone::FirstLife));
        let second = update(&mut state, &mut milestones, 1e9);
        assert!(!second.reached.contains(&Milestone::FirstLife));
    }

    #[test]
    fn spawn_window_needs_age_and_life() {
        let (mut state, mut milestones) = fresh();
        state.age = 6e9;
        state.star_count = 1e13;
        state.metallicity = 0.2;
        state.life_bearing_planets_count = 2000.0;
        let outcome = update(&mut state, &mut milestones, 1e7);
        assert!(outcome.spawn_window_open);

        state.age = 4e9;
        let outcome = update(&mut state, &mut milestones, 1e7);
        assert!(!outcome.spawn_window_open);
    }
}
