//! The step orchestrator.
//!
//! Sequences the sub-modules for each tick in a fixed order: physics
//! step, anomaly generation (effects applied on spawn), anomaly decay,
//! stability recomputation, end-condition check. Runs the predictor once
//! at the end and assembles the report. Persistence stays outside: the
//! caller owns the universe from load to save, and a cancelled run
//! leaves nothing to persist.

use crate::anomaly::{AnomalyGenerator, AnomalyOptions};
use crate::end_conditions::{self, EndCheckOptions, EndCondition, Warning};
use crate::error::{Result, SimError};
use crate::physics::{self, PhysicsEngine, PhysicsOptions, UniverseStatistics};
use crate::predictor::{self, PredictionReport, PredictorOptions};
use cosmogenesis_data::{
    Anomaly, Difficulty, Location, SignificantEvent, Universe, UniverseStatus,
};
use serde::Serialize;
use std::time::Instant;

/// Upper bound on ticks per request.
pub const MAX_STEPS_PER_RUN: u64 = 100;

/// Per-difficulty tuning applied to every run of a universe.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyOptions {
    pub time_step_years: f64,
    pub anomaly_probability_scale: f64,
    pub max_anomalies_per_step: usize,
    pub observable_galaxies_multiplier: f64,
    pub difficulty_modifier: f64,
}

impl DifficultyOptions {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Beginner => Self {
                time_step_years: 5e7,
                anomaly_probability_scale: 0.005,
                max_anomalies_per_step: 1,
                observable_galaxies_multiplier: 1.2,
                difficulty_modifier: 0.75,
            },
            Difficulty::Intermediate => Self {
                time_step_years: 2e7,
                anomaly_probability_scale: 0.01,
                max_anomalies_per_step: 2,
                observable_galaxies_multiplier: 1.0,
                difficulty_modifier: 1.0,
            },
            Difficulty::Advanced => Self {
                time_step_years: 1e7,
                anomaly_probability_scale: 0.02,
                max_anomalies_per_step: 3,
                observable_galaxies_multiplier: 0.8,
                difficulty_modifier: 1.5,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndStatus {
    pub ended: bool,
    pub condition: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyStats {
    pub created: usize,
    pub active: usize,
    pub resolved: usize,
    pub total: usize,
}

/// Everything a simulate request reports back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub steps_executed: u64,
    pub stats: UniverseStatistics,
    pub anomaly_stats: AnomalyStats,
    pub end_status: EndStatus,
    pub warnings: Vec<Warning>,
    pub predictions: PredictionReport,
    pub created_anomalies: Vec<Anomaly>,
    pub universe: Universe,
}

/// Runs up to `requested_steps` ticks (clamped to `[1, 100]`) against an
/// in-memory universe. The deadline, when given, is checked between
/// ticks only; a tick is an atomic computational block.
pub fn run(
    universe: &mut Universe,
    requested_steps: u64,
    deadline: Option<Instant>,
) -> Result<StepReport> {
    if universe.is_ended() {
        return Err(SimError::business_rule(
            "cannot simulate a universe that has ended",
        ));
    }

    let options = DifficultyOptions::for_difficulty(universe.difficulty);
    let steps = requested_steps.clamp(1, MAX_STEPS_PER_RUN);
    let started = Instant::now();

    let mut engine = PhysicsEngine::new(PhysicsOptions {
        seed: universe.seed.clone(),
        time_step_years: options.time_step_years,
        difficulty_modifier: options.difficulty_modifier,
        observable_galaxies_multiplier: options.observable_galaxies_multiplier,
    });
    let mut generator = AnomalyGenerator::new(AnomalyOptions {
        seed: universe.seed.clone(),
        anomaly_probability_scale: options.anomaly_probability_scale,
        max_per_step: options.max_anomalies_per_step,
        difficulty_modifier: options.difficulty_modifier,
        player_position: Location::default(),
    });
    let end_options = EndCheckOptions {
        difficulty_modifier: options.difficulty_modifier,
    };

    let mut executed = 0;
    let mut created_anomalies = Vec::new();
    let mut ended = None;

    for _ in 0..steps {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(SimError::Cancelled(format!(
                    "deadline exceeded after {executed} of {steps} steps"
                )));
            }
        }

        for event in engine.simulate_step(universe)? {
            universe.significant_events.push(event);
        }

        let spawned = generator.generate(universe);
        for anomaly in &spawned {
            universe.significant_events.push(
                SignificantEvent::new(
                    universe.current_state.age,
                    "anomaly_detected",
                    format!("{}: {}", anomaly.kind.as_str(), anomaly.description),
                )
                .with_effects(anomaly.effects_raw.clone()),
            );
        }
        created_anomalies.extend(spawned);

        generator.decay(universe);
        engine.update_stability_only(universe);
        executed += 1;

        if let Some(condition) =
            end_conditions::check(&universe.current_state, engine.stability_history(), &end_options)
        {
            apply_end(universe, condition);
            ended = Some(condition);
            break;
        }
    }

    universe.metrics.total_steps_run += executed;

    let predictions = predictor::predict(
        universe,
        &PredictorOptions {
            difficulty_modifier: options.difficulty_modifier,
            time_step_years: options.time_step_years,
        },
    );
    let warnings = end_conditions::warnings(&universe.current_state, &end_options);
    universe.touch();

    let resolved = universe.anomalies.iter().filter(|a| a.resolved).count();
    let report = StepReport {
        steps_executed: executed,
        stats: physics::statistics(universe),
        anomaly_stats: AnomalyStats {
            created: created_anomalies.len(),
            active: universe.anomalies.len() - resolved,
            resolved,
            total: universe.anomalies.len(),
        },
        end_status: EndStatus {
            ended: ended.is_some(),
            condition: ended.map(|c| c.as_str().to_string()),
            reason: ended.map(|c| c.reason().to_string()),
        },
        warnings,
        predictions,
        created_anomalies,
        universe: universe.clone(),
    };

    tracing::info!(
        universe = %universe.id,
        steps = executed,
        age_gyr = universe.current_state.age_gyr(),
        stability = universe.current_state.stability_index,
        anomalies = report.anomaly_stats.total,
        ended = report.end_status.ended,
        duration_ms = started.elapsed().as_millis() as u64,
        "simulation run complete"
    );

    Ok(report)
}

fn apply_end(universe: &mut Universe, condition: EndCondition) {
    universe.status = UniverseStatus::Ended;
    universe.end_condition = Some(condition.as_str().to_string());
    universe.end_reason = Some(condition.reason().to_string());
    universe.final_age = Some(universe.current_state.age);
    universe.significant_events.push(SignificantEvent::new(
        universe.current_state.age,
        "universe_end",
        condition.reason(),
    ));
    universe.touch();
}
