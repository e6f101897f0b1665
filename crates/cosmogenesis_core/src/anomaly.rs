//! Anomaly generation, effects, decay and resolution.
//!
//! Anomaly kinds are a closed set: each entry in [`KIND_TABLE`] carries
//! its base probability, trigger condition, severity-scaled effect map
//! and description. Effects are declarative key/value pairs applied once
//! at generation time by a single switch over known keys; unknown keys
//! are logged and ignored so a stale document can never fail a tick.

use crate::error::{Result, SimError};
use crate::rng::SeedStream;
use crate::systems::expansion::{ENTROPY_MAX, SCALE_FACTOR_MAX, SCALE_FACTOR_MIN};
use chrono::{Duration, Utc};
use cosmogenesis_data::{
    Anomaly, AnomalyCategory, AnomalyKind, CurrentState, Location, Universe,
};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Hard cap on anomalies (active + resolved) per universe.
pub const MAX_ANOMALIES: usize = 200;
/// Resolved anomalies older than this are eligible for auto-cleanup.
const CLEANUP_AGE_MINUTES: i64 = 5;
/// Spatial chunk edge used when placing anomalies near the player.
const CHUNK_SIZE: f64 = 1000.0;

struct KindSpec {
    kind: AnomalyKind,
    category: AnomalyCategory,
    base_probability: f64,
    condition: fn(&CurrentState, f64) -> bool,
    effects: fn(f64) -> BTreeMap<String, f64>,
    description: &'static str,
}

fn effects(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

/// The closed anomaly table, evaluated in declaration order.
const KIND_TABLE: [KindSpec; 8] = [
    KindSpec {
        kind: AnomalyKind::BlackHoleMerger,
        category: AnomalyCategory::Gravitational,
        base_probability: 0.001,
        condition: |state, _| state.black_hole_count > 1e5,
        effects: |s| effects(&[("stabilityDelta", -0.008 * s), ("entropyDelta", 5e6 * s)]),
        description: "Two supermassive black holes have merged, rippling spacetime",
    },
    KindSpec {
        kind: AnomalyKind::DarkEnergySurge,
        category: AnomalyCategory::Cosmological,
        base_probability: 0.0004,
        condition: |_, age_gyr| age_gyr > 5.0,
        effects: |s| {
            effects(&[
                ("expansionBoost", 0.0008 * s),
                ("scaleFactorBump", 0.001 * s),
                ("stabilityDelta", -0.012 * s),
            ])
        },
        description: "A surge of dark energy is accelerating cosmic expansion",
    },
    KindSpec {
        kind: AnomalyKind::SupernovaChain,
        category: AnomalyCategory::Stellar,
        base_probability: 0.0015,
        condition: |state, _| state.star_count > 1e9,
        effects: |s| {
            effects(&[
                ("metallicityDelta", 0.0005 * s),
                ("starCountDelta", -100.0 * s),
                ("stabilityDelta", -0.005 * s),
            ])
        },
        description: "A cascade of supernovae is sweeping through a galactic arm",
    },
    KindSpec {
        kind: AnomalyKind::QuantumFluctuation,
        category: AnomalyCategory::Quantum,
        base_probability: 0.0003,
        condition: |_, _| true,
        effects: |s| effects(&[("entropyDelta", -1e6 * s), ("stabilityDelta", -0.015 * s)]),
        description: "A macroscopic quantum fluctuation has destabilized local vacuum",
    },
    KindSpec {
        kind: AnomalyKind::GalacticCollision,
        category: AnomalyCategory::Structural,
        base_probability: 0.0008,
        condition: |state, age_gyr| state.galaxy_count > 1e6 && age_gyr > 2.0,
        effects: |s| {
            effects(&[
                ("starCountDelta", 5000.0 * s),
                ("blackHoleCountDelta", 10.0 * s),
                ("stabilityDelta", -0.007 * s),
            ])
        },
        description: "Two galaxies are colliding, igniting a burst of star formation",
    },
    KindSpec {
        kind: AnomalyKind::CosmicVoid,
        category: AnomalyCategory::Structural,
        base_probability: 0.0003,
        condition: |_, age_gyr| age_gyr > 3.0,
        effects: |s| effects(&[("galaxyCountDelta", -1000.0 * s), ("stabilityDelta", -0.01 * s)]),
        description: "An expanding void is emptying a region of the cosmic web",
    },
    KindSpec {
        kind: AnomalyKind::MagneticReversal,
        category: AnomalyCategory::Electromagnetic,
        base_probability: 0.0005,
        condition: |state, _| state.galaxy_count > 1e5,
        effects: |s| effects(&[("habitableDelta", -100.0 * s), ("stabilityDelta", -0.004 * s)]),
        description: "Galactic magnetic fields are reversing, stripping planetary shielding",
    },
    KindSpec {
        kind: AnomalyKind::DarkMatterClump,
        category: AnomalyCategory::Gravitational,
        base_probability: 0.0006,
        condition: |_, age_gyr| age_gyr > 1.0,
        effects: |s| effects(&[("stabilityDelta", -0.006 * s)]),
        description: "A dense dark-matter clump is distorting nearby orbits",
    },
];

#[derive(Debug, Clone)]
pub struct AnomalyOptions {
    pub seed: String,
    pub anomaly_probability_scale: f64,
    pub max_per_step: usize,
    pub difficulty_modifier: f64,
    pub player_position: Location,
}

impl AnomalyOptions {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            anomaly_probability_scale: 0.01,
            max_per_step: 2,
            difficulty_modifier: 1.0,
            player_position: Location::default(),
        }
    }
}

pub struct AnomalyGenerator {
    options: AnomalyOptions,
    stream: SeedStream,
}

impl AnomalyGenerator {
    /// The generator draws from its own sub-stream so anomaly rolls can
    /// never perturb the physics trajectory.
    pub fn new(options: AnomalyOptions) -> Self {
        let stream = SeedStream::derive(&options.seed, "_anomaly");
        Self { options, stream }
    }

    /// Rolls the kind table once and appends any spawned anomalies.
    /// Effects are applied immediately, one anomaly at a time.
    pub fn generate(&mut self, universe: &mut Universe) -> Vec<Anomaly> {
        if universe.anomalies.len() >= MAX_ANOMALIES {
            cleanup_resolved(universe, Duration::minutes(CLEANUP_AGE_MINUTES));
        }
        if universe.anomalies.len() >= MAX_ANOMALIES {
            tracing::debug!(universe = %universe.id, "anomaly cap reached, skipping generation");
            return Vec::new();
        }

        let state = &universe.current_state;
        let age_gyr = state.age_gyr();
        let activity = (state.galaxy_count / universe.constants.observable_galaxies).min(1.0);
        let base_probability = self.options.anomaly_probability_scale * activity;

        let mut spawned = Vec::new();
        for spec in &KIND_TABLE {
            if spawned.len() >= self.options.max_per_step
                || universe.anomalies.len() + spawned.len() >= MAX_ANOMALIES
            {
                break;
            }
            if !(spec.condition)(state, age_gyr) {
                continue;
            }
            let roll = self.stream.next_f64();
            if roll < spec.base_probability * base_probability * 10000.0 {
                spawned.push(self.spawn(spec));
            }
        }

        for anomaly in &spawned {
            apply_effects(universe, anomaly);
            universe.anomalies.push(anomaly.clone());
        }
        if !spawned.is_empty() {
            universe.touch();
        }
        spawned
    }

    /// Draw order is fixed: severity, angle, distance, z-jitter, decay.
    fn spawn(&mut self, spec: &KindSpec) -> Anomaly {
        let severity = 1.0 + (self.stream.next_f64() * 3.0).floor();
        let theta = self.stream.next_f64() * std::f64::consts::TAU;
        let distance = self.stream.next_range(1.0, 4.0);
        let z_jitter = self.stream.next_range(-5e3, 5e3);
        let decay_rate = 0.001 * self.stream.next_f64();

        let player = self.options.player_position;
        let chunk_x = (player.x / CHUNK_SIZE).floor() * CHUNK_SIZE;
        let chunk_y = (player.y / CHUNK_SIZE).floor() * CHUNK_SIZE;

        Anomaly {
            id: Uuid::new_v4(),
            kind: spec.kind,
            category: spec.category,
            severity,
            timestamp: Utc::now(),
            resolved: false,
            resolved_at: None,
            effects_raw: (spec.effects)(severity),
            location: Location {
                x: chunk_x + theta.cos() * distance * CHUNK_SIZE,
                y: chunk_y + theta.sin() * distance * CHUNK_SIZE,
                z: player.z + z_jitter,
            },
            radius: 1000.0 * severity,
            description: spec.description.to_string(),
            decay_rate,
        }
    }

    /// Unresolved anomalies wind down stochastically, each decay tick
    /// shaving severity and restoring a sliver of stability.
    pub fn decay(&mut self, universe: &mut Universe) {
        let mut restored = 0.0;
        for anomaly in universe
            .anomalies
            .iter_mut()
            .filter(|a| !a.resolved && a.decay_rate > 0.0)
        {
            let roll = self.stream.next_f64();
            if roll < anomaly.decay_rate && anomaly.severity > 1.0 {
                anomaly.severity -= 0.1;
                restored += 0.001;
            }
        }
        if restored > 0.0 {
            let state = &mut universe.current_state;
            state.stability_index = (state.stability_index + restored).clamp(0.0, 1.0);
            universe.touch();
        }
    }
}

/// Applies an anomaly's declarative effect map to the universe state.
/// Unknown keys are logged at warn and skipped.
pub fn apply_effects(universe: &mut Universe, anomaly: &Anomaly) {
    let state = &mut universe.current_state;
    for (key, value) in &anomaly.effects_raw {
        match key.as_str() {
            "stabilityDelta" => {
                state.stability_index = (state.stability_index + value).clamp(0.0, 1.0);
            }
            "entropyDelta" => {
                state.entropy = (state.entropy + value).clamp(0.0, ENTROPY_MAX);
            }
            "expansionBoost" => {
                state.expansion_rate = (state.expansion_rate + value).max(0.0);
            }
            "scaleFactorBump" => {
                state.scale_factor =
                    (state.scale_factor * (1.0 + value)).clamp(SCALE_FACTOR_MIN, SCALE_FACTOR_MAX);
            }
            "metallicityDelta" => {
                state.metallicity = (state.metallicity + value).clamp(0.0, 1.0);
            }
            "starCountDelta" => {
                state.star_count = (state.star_count + value).max(0.0);
            }
            "blackHoleCountDelta" => {
                state.black_hole_count = (state.black_hole_count + value).max(0.0);
            }
            "galaxyCountDelta" => {
                state.galaxy_count = (state.galaxy_count + value).max(0.0);
            }
            "habitableDelta" => {
                state.habitable_systems_count = (state.habitable_systems_count + value).max(0.0);
            }
            unknown => {
                tracing::warn!(effect = unknown, kind = ?anomaly.kind, "ignoring unknown anomaly effect");
            }
        }
    }
}

/// Removes resolved anomalies whose resolution is older than `keep`.
/// Returns how many were removed.
pub fn cleanup_resolved(universe: &mut Universe, keep: Duration) -> usize {
    let cutoff = Utc::now() - keep;
    let before = universe.anomalies.len();
    universe
        .anomalies
        .retain(|a| !a.resolved || a.resolved_at.map_or(true, |at| at > cutoff));
    let removed = before - universe.anomalies.len();
    if removed > 0 {
        universe.touch();
    }
    removed
}

/// Outcome of an operator resolving an anomaly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub anomaly_id: Uuid,
    pub severity: f64,
    pub stability_boost: f64,
    pub entropy_reduction: f64,
    pub energy_restored: f64,
}

/// Marks an anomaly resolved and applies the restorative boosts.
///
/// Unknown ids fail with `NotFound`; resolving twice is a business-rule
/// violation and changes no metrics.
pub fn resolve(universe: &mut Universe, anomaly_id: Uuid) -> Result<ResolutionOutcome> {
    let anomaly = universe
        .anomalies
        .iter_mut()
        .find(|a| a.id == anomaly_id)
        .ok_or_else(|| SimError::not_found(format!("anomaly {anomaly_id}")))?;
    if anomaly.resolved {
        return Err(SimError::business_rule(format!(
            "anomaly {anomaly_id} is already resolved"
        )));
    }

    anomaly.resolved = true;
    anomaly.resolved_at = Some(Utc::now());
    let severity = anomaly.severity;

    let stability_boost = 0.015 * severity;
    let entropy_reduction = 3e6 * severity;
    let energy_restored = 0.002 * severity;

    let state = &mut universe.current_state;
    state.stability_index = (state.stability_index + stability_boost).clamp(0.0, 1.0);
    state.entropy = (state.entropy - entropy_reduction).max(0.0);
    state.energy_budget = (state.energy_budget + energy_restored).min(1.0);

    universe.metrics.player_interventions += 1;
    universe.metrics.anomalies_resolved += 1;
    let resolved = universe.anomalies.iter().filter(|a| a.resolved).count();
    universe.metrics.anomaly_resolution_rate = resolved as f64 / universe.anomalies.len() as f64;

    universe.touch();
    Ok(ResolutionOutcome {
        anomaly_id,
        severity,
        stability_boost,
        entropy_reduction,
        energy_restored,
    })
}

/// Kinds whose trigger condition currently holds, in table order.
pub fn eligible_kinds(state: &CurrentState) -> Vec<AnomalyKind> {
    let age_gyr = state.age_gyr();
    KIND_TABLE
        .iter()
        .filter(|spec| (spec.condition)(state, age_gyr))
        .map(|spec| spec.kind)
        .collect()
}
