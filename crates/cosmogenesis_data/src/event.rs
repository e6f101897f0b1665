use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard cap on retained events per universe.
const MAX_EVENTS: usize = 2000;
/// How many of the oldest events are dropped when the cap is hit.
const EVICTION_BATCH: usize = 500;

/// A notable moment in a universe's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificantEvent {
    pub timestamp: DateTime<Utc>,
    pub age: f64,
    pub age_gyr: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub effects: BTreeMap<String, f64>,
}

impl SignificantEvent {
    pub fn new(age: f64, kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            age,
            age_gyr: format!("{:.3}", age / 1e9),
            kind: kind.into(),
            description: description.into(),
            effects: BTreeMap::new(),
        }
    }

    pub fn with_effects(mut self, effects: BTreeMap<String, f64>) -> Self {
        self.effects = effects;
        self
    }
}

/// Append-only event history, bounded by FIFO eviction.
///
/// On append past the cap the oldest batch is dropped in one operation,
/// so eviction cost is amortized across many pushes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<SignificantEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SignificantEvent) {
        if self.events.len() >= MAX_EVENTS {
            self.events.drain(..EVICTION_BATCH);
        }
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignificantEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&SignificantEvent> {
        self.events.last()
    }
}
