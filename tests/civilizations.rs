mod common;

use common::UniverseBuilder;
use cosmogenesis_core::civilization::{
    CivilizationManager, CULL_INTERVAL, EXTINCT_RETAINED, MAX_ACTIVE_CIVILIZATIONS,
};
use cosmogenesis_core::rng::SeedStream;
use cosmogenesis_data::{CivilizationTier, Universe};

fn fertile_universe(seed: &str) -> Universe {
    let mut universe = UniverseBuilder::new().with_seed(seed).build();
    universe.current_state.age = 6e9;
    universe.current_state.metallicity = 0.2;
    universe.current_state.stability_index = 0.9;
    universe.current_state.life_bearing_planets_count = 1e9;
    universe
}

#[test]
fn spawning_is_rate_limited_and_capped() {
    let mut universe = fertile_universe("spawn");
    let mut manager = CivilizationManager::new();
    let mut stream = SeedStream::new("spawn");

    manager.step(&mut universe, true, 1e7, &mut stream);
    // At most ten arrivals per step, whatever the expected count says.
    assert_eq!(universe.civilizations.len(), 10);
    assert_eq!(universe.current_state.civilization_count, 10);
    assert!(universe.milestones.first_civilization);

    for _ in 0..200 {
        manager.step(&mut universe, true, 1e7, &mut stream);
    }
    assert!(universe.active_civilizations() <= MAX_ACTIVE_CIVILIZATIONS);
}

#[test]
fn young_universes_spawn_only_type0() {
    let mut universe = fertile_universe("young");
    let mut manager = CivilizationManager::new();
    let mut stream = SeedStream::new("young");

    manager.step(&mut universe, true, 1e7, &mut stream);
    assert!(universe
        .civilizations
        .iter()
        .all(|c| c.tier == CivilizationTier::Type0));
}

#[test]
fn evolution_advances_age_and_technology() {
    let mut universe = fertile_universe("evolve");
    let mut manager = CivilizationManager::new();
    let mut stream = SeedStream::new("evolve");

    manager.step(&mut universe, true, 1e7, &mut stream);
    let before: Vec<f64> = universe.civilizations.iter().map(|c| c.technology).collect();

    manager.step(&mut universe, false, 1e8, &mut stream);
    for (civ, old_tech) in universe.civilizations.iter().zip(before) {
        assert!(civ.age >= 1e8);
        if !civ.extinct {
            assert!(civ.technology >= old_tech);
            assert!((0.0..=1.0).contains(&civ.stability));
            assert!((0.0..=1.0).contains(&civ.resource_depletion));
        }
    }
}

#[test]
fn hostile_cosmos_drives_extinctions() {
    let mut universe = fertile_universe("hostile");
    let mut manager = CivilizationManager::new();
    let mut stream = SeedStream::new("hostile");

    manager.step(&mut universe, true, 1e7, &mut stream);
    // Make every civilization maximally fragile.
    universe.current_state.stability_index = 0.05;
    for civ in &mut universe.civilizations {
        civ.stability = 0.01;
        civ.resource_depletion = 0.95;
        civ.warlikeness = 0.95;
    }

    for _ in 0..50 {
        manager.step(&mut universe, false, 1e7, &mut stream);
        // Extinction rolls cap at one in two per step.
        for civ in &mut universe.civilizations {
            civ.stability = 0.01;
        }
    }

    let extinct = universe.civilizations.iter().filter(|c| c.extinct).count();
    assert!(extinct > 0, "no extinctions under maximal risk");
    let fallen = universe
        .civilizations
        .iter()
        .find(|c| c.extinct)
        .unwrap();
    assert!(fallen.extinction_date.is_some());
    assert!(fallen.extinction_age.is_some());
    assert_eq!(fallen.extinction_cause.as_deref(), Some("societal collapse"));
    assert!(universe
        .significant_events
        .iter()
        .any(|e| e.kind == "civilization_extinct"));
}

#[test]
fn culling_retains_only_recent_extinctions() {
    let mut universe = fertile_universe("cull");
    let mut manager = CivilizationManager::new();
    let mut stream = SeedStream::new("cull");

    // Breed a large population, then kill it off over many steps.
    for _ in 0..60 {
        manager.step(&mut universe, true, 1e7, &mut stream);
    }
    for civ in &mut universe.civilizations {
        civ.stability = 0.01;
    }
    for _ in 0..(CULL_INTERVAL * 40) {
        manager.step(&mut universe, false, 1e7, &mut stream);
        for civ in &mut universe.civilizations {
            civ.stability = 0.01;
        }
    }

    let extinct = universe.civilizations.iter().filter(|c| c.extinct).count();
    assert!(extinct <= EXTINCT_RETAINED);
}

#[test]
fn spawn_window_closed_means_no_arrivals() {
    let mut universe = fertile_universe("closed");
    let mut manager = CivilizationManager::new();
    let mut stream = SeedStream::new("closed");

    manager.step(&mut universe, false, 1e7, &mut stream);
    assert!(universe.civilizations.is_empty());
    assert!(!universe.milestones.first_civilization);
}
