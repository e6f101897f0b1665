mod common;

use common::UniverseBuilder;
use cosmogenesis_core::orchestrator;
use cosmogenesis_io::{StoreError, UniverseStore};

#[test]
fn a_simulated_universe_survives_the_round_trip() {
    let store = UniverseStore::open(":memory:").unwrap();
    let mut universe = UniverseBuilder::new().with_seed("round-trip").build();
    store.insert(&universe).unwrap();

    orchestrator::run(&mut universe, 50, None).unwrap();
    store.update(&universe, 1).unwrap();

    // Reloading and running zero further ticks must reproduce the
    // document field for field.
    let (reloaded, version) = store.load(universe.id).unwrap();
    assert_eq!(version, 2);
    assert_eq!(reloaded, universe);
}

#[test]
fn resuming_from_storage_keeps_simulating() {
    let store = UniverseStore::open(":memory:").unwrap();
    let mut universe = UniverseBuilder::new().with_seed("resume").build();
    store.insert(&universe).unwrap();

    orchestrator::run(&mut universe, 25, None).unwrap();
    store.update(&universe, 1).unwrap();

    let (mut reloaded, version) = store.load(universe.id).unwrap();
    orchestrator::run(&mut reloaded, 25, None).unwrap();
    store.update(&reloaded, version).unwrap();

    let (final_state, _) = store.load(universe.id).unwrap();
    assert!(final_state.current_state.age > universe.current_state.age);
    assert_eq!(final_state.metrics.total_steps_run, 50);
}

#[test]
fn stale_writers_conflict_instead_of_clobbering() {
    let store = UniverseStore::open(":memory:").unwrap();
    let universe = UniverseBuilder::new().with_seed("race").build();
    store.insert(&universe).unwrap();

    // Two logical clients load the same version.
    let (mut first, first_version) = store.load(universe.id).unwrap();
    let (mut second, second_version) = store.load(universe.id).unwrap();
    assert_eq!(first_version, second_version);

    orchestrator::run(&mut first, 5, None).unwrap();
    store.update(&first, first_version).unwrap();

    orchestrator::run(&mut second, 10, None).unwrap();
    let err = store.update(&second, second_version).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // The surviving document is the first writer's, untouched.
    let (stored, _) = store.load(universe.id).unwrap();
    assert_eq!(stored.metrics.total_steps_run, 5);

    // The losing client reloads and replays; now the write lands.
    let (mut retry, retry_version) = store.load(universe.id).unwrap();
    orchestrator::run(&mut retry, 10, None).unwrap();
    store.update(&retry, retry_version).unwrap();
    let (stored, _) = store.load(universe.id).unwrap();
    assert_eq!(stored.metrics.total_steps_run, 15);
}

#[test]
fn summaries_track_simulation_progress() {
    let store = UniverseStore::open(":memory:").unwrap();
    let mut universe = UniverseBuilder::new().with_seed("summary").build();
    store.insert(&universe).unwrap();

    orchestrator::run(&mut universe, 10, None).unwrap();
    store.update(&universe, 1).unwrap();

    let listed = store.list_by_owner(common::TEST_OWNER).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].age, universe.current_state.age);
    assert_eq!(listed[0].stability_index, universe.current_state.stability_index);
}
