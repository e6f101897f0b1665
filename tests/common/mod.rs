use axum::Router;
use cosmogenesis::api::{self, AppState};
use cosmogenesis_data::{Difficulty, InitialConditions, PhysicalConstants, Universe};
use cosmogenesis_io::UniverseStore;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_OWNER: &str = "tester";

/// Builder for universes in known states, mirroring how the create
/// handler constructs them.
#[allow(dead_code)]
pub struct UniverseBuilder {
    owner: String,
    name: String,
    seed: String,
    difficulty: Difficulty,
    constants: PhysicalConstants,
    initial_conditions: InitialConditions,
}

#[allow(dead_code)]
impl UniverseBuilder {
    pub fn new() -> Self {
        Self {
            owner: TEST_OWNER.to_string(),
            name: "Test Universe".to_string(),
            seed: "test-seed".to_string(),
            difficulty: Difficulty::Intermediate,
            constants: PhysicalConstants::default(),
            initial_conditions: InitialConditions::default(),
        }
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = owner.to_string();
        self
    }

    pub fn with_seed(mut self, seed: &str) -> Self {
        self.seed = seed.to_string();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn build(self) -> Universe {
        Universe::new(
            self.owner,
            self.name,
            self.seed,
            self.difficulty,
            self.constants,
            self.initial_conditions,
        )
    }
}

/// An app over an in-memory store, plus the state handle so tests can
/// seed data behind the HTTP surface.
#[allow(dead_code)]
pub fn test_app() -> (Router, Arc<AppState>) {
    let store = UniverseStore::open(":memory:").expect("in-memory store");
    let state = Arc::new(AppState::new(store, TEST_SECRET, false));
    (api::router(state.clone()), state)
}

#[allow(dead_code)]
pub fn bearer(user: &str) -> String {
    format!("Bearer {}", cosmogenesis::auth::issue(TEST_SECRET, user))
}
