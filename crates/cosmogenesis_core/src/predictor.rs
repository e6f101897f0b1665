//! Heuristic forecasts.
//!
//! The predictor is side-effect-free: it reads the universe, draws no
//! random numbers and mutates nothing. Forecasts are coarse linear
//! extrapolations meant to steer the operator, not to be exact.

use crate::anomaly;
use crate::systems::expansion;
use cosmogenesis_data::{AnomalyKind, Universe};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct PredictorOptions {
    pub difficulty_modifier: f64,
    pub time_step_years: f64,
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self {
            difficulty_modifier: 1.0,
            time_step_years: 1e7,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub stability: StabilityForecast,
    pub anomalies: AnomalyForecast,
    pub end_conditions: Vec<EndRisk>,
    pub life: LifeForecast,
    pub overall_risk: f64,
    pub action_priority: Vec<ActionItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityForecast {
    pub current: f64,
    pub trend: f64,
    pub predicted_change_per_step: f64,
    pub projected_ten_steps: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyForecast {
    pub emergence_probability: f64,
    pub likely_types: Vec<AnomalyKind>,
    pub unresolved: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRisk {
    pub condition: String,
    pub risk: f64,
    pub steps_to_risk: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeForecast {
    pub habitable_systems: f64,
    pub life_bearing_planets: f64,
    pub active_civilizations: usize,
    pub trend: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub priority: String,
    pub action: String,
    pub reason: String,
}

/// Builds the full forecast report for a universe.
pub fn predict(universe: &Universe, options: &PredictorOptions) -> PredictionReport {
    let state = &universe.current_state;
    let unresolved = universe.unresolved_anomalies();
    let total = universe.anomalies.len();
    let age_gyr = state.age_gyr();

    let stability = stability_forecast(universe, unresolved);
    let anomalies = anomaly_forecast(universe, unresolved, total);
    let end_conditions = end_risks(universe, options);
    let life = life_forecast(universe);

    let anomaly_risk = (0.5 * anomalies.emergence_probability
        + 0.5 * (unresolved as f64 * 0.05).min(1.0))
    .clamp(0.0, 1.0);
    let end_risk = end_conditions
        .iter()
        .map(|e| e.risk)
        .fold(0.0_f64, f64::max);
    let overall_risk =
        (0.4 * stability.risk + 0.3 * anomaly_risk + 0.3 * end_risk).clamp(0.0, 1.0);

    let mut action_priority = Vec::new();
    if unresolved > 10 {
        action_priority.push(ActionItem {
            priority: "high".into(),
            action: "Resolve outstanding anomalies".into(),
            reason: format!("{unresolved} unresolved anomalies are dragging stability down"),
        });
    }
    if state.stability_index < 0.3 {
        action_priority.push(ActionItem {
            priority: "high".into(),
            action: "Restore cosmic stability".into(),
            reason: format!("Stability index has fallen to {:.3}", state.stability_index),
        });
    }
    if state.energy_budget < 0.15 {
        action_priority.push(ActionItem {
            priority: "medium".into(),
            action: "Conserve the energy budget".into(),
            reason: format!("Energy budget is down to {:.3}", state.energy_budget),
        });
    }
    if state.entropy > 1.5e15 {
        action_priority.push(ActionItem {
            priority: "medium".into(),
            action: "Mitigate entropy growth".into(),
            reason: format!("Entropy {:.2e} is nearing its bound", state.entropy),
        });
    }
    if action_priority.is_empty() {
        action_priority.push(ActionItem {
            priority: "low".into(),
            action: "Maintain course".into(),
            reason: format!("No thresholds breached at {age_gyr:.2} Gyr"),
        });
    }

    PredictionReport {
        stability,
        anomalies,
        end_conditions,
        life,
        overall_risk,
        action_priority,
    }
}

fn stability_forecast(universe: &Universe, unresolved: usize) -> StabilityForecast {
    let state = &universe.current_state;
    let predicted_change_per_step = -(0.002 * unresolved as f64)
        - 0.001 * (state.age_gyr() / 100.0).min(1.0)
        - 0.003 * (state.entropy / 3e14).powf(0.7);
    let projected_ten_steps =
        (state.stability_index + 10.0 * predicted_change_per_step).clamp(0.0, 1.0);
    StabilityForecast {
        current: state.stability_index,
        trend: universe.metrics.stability_trend,
        predicted_change_per_step,
        projected_ten_steps,
        risk: 1.0 - projected_ten_steps,
    }
}

fn anomaly_forecast(universe: &Universe, unresolved: usize, total: usize) -> AnomalyForecast {
    let state = &universe.current_state;
    let activity = (state.galaxy_count / universe.constants.observable_galaxies).min(1.0);
    AnomalyForecast {
        emergence_probability: (0.1 + 0.5 * activity + (state.age_gyr() / 100.0).min(0.2))
            .clamp(0.0, 1.0),
        likely_types: anomaly::eligible_kinds(state),
        unresolved,
        total,
    }
}

fn end_risks(universe: &Universe, options: &PredictorOptions) -> Vec<EndRisk> {
    let state = &universe.current_state;
    let constants = &universe.constants;
    let modifier = options.difficulty_modifier;
    let dt = options.time_step_years;
    let age_gyr = state.age_gyr();

    // Per-step drifts reused by several extrapolations.
    let log_growth = (expansion::effective_hubble(state, constants) * dt).clamp(-0.1, 0.1);
    let energy_drain = 5e-13 * dt;
    let entropy_gain = state.scale_factor.powi(3).max(1.0).ln() * 1e5 * (dt / 1e8);
    let trend_per_step = universe.metrics.stability_trend / 10.0;

    let mut out = Vec::with_capacity(6);

    let collapse_threshold = 0.05 / modifier;
    let instability_risk =
        (1.0 - (state.stability_index - collapse_threshold) / (1.0 - collapse_threshold))
            .clamp(0.0, 1.0);
    let instability_steps = if trend_per_step < 0.0 {
        steps_until(state.stability_index - collapse_threshold, -trend_per_step)
    } else {
        None
    };
    out.push(EndRisk {
        condition: "instability-collapse".into(),
        risk: instability_risk,
        steps_to_risk: instability_steps,
    });

    let heat_death_age = 200.0 / modifier;
    let age_steps = steps_until((heat_death_age - age_gyr) * 1e9, dt);
    let energy_steps = steps_until(state.energy_budget - 0.05, energy_drain);
    out.push(EndRisk {
        condition: "heat-death".into(),
        risk: (0.5 * (age_gyr / heat_death_age).clamp(0.0, 1.0)
            + 0.5 * (1.0 - state.energy_budget))
            .clamp(0.0, 1.0),
        steps_to_risk: max_steps(age_steps, energy_steps),
    });

    let star_term = if state.star_count < 1e4 {
        1.0
    } else if state.star_count < 1e6 {
        0.5
    } else {
        0.0
    };
    out.push(EndRisk {
        condition: "stellar-death".into(),
        risk: star_term
            * (0.5 * (age_gyr / 80.0).clamp(0.0, 1.0) + 0.5 * (1.0 - state.energy_budget)),
        steps_to_risk: None,
    });

    let rip_risk = if state.scale_factor > 1.0 {
        (state.scale_factor.log10() / 9.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let rip_steps = if log_growth > 0.0 && state.scale_factor < 1e9 {
        steps_until((1e9 / state.scale_factor).ln(), log_growth)
    } else {
        None
    };
    out.push(EndRisk {
        condition: "big-rip".into(),
        risk: rip_risk,
        steps_to_risk: rip_steps,
    });

    let crunch_risk = if state.scale_factor < 1.0 {
        (-state.scale_factor.log10() / 8.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let crunch_steps = if log_growth < 0.0 && state.scale_factor > 1e-8 {
        steps_until((state.scale_factor / 1e-8).ln(), -log_growth)
    } else {
        None
    };
    out.push(EndRisk {
        condition: "big-crunch".into(),
        risk: crunch_risk,
        steps_to_risk: crunch_steps,
    });

    let entropy_steps = steps_until(2e15 - state.entropy, entropy_gain);
    let drained_steps = steps_until(state.energy_budget - 0.02, energy_drain);
    out.push(EndRisk {
        condition: "maximum-entropy".into(),
        risk: (0.6 * (state.entropy / 2e15).clamp(0.0, 1.0)
            + 0.4 * (1.0 - state.energy_budget))
            .clamp(0.0, 1.0),
        steps_to_risk: max_steps(entropy_steps, drained_steps),
    });

    out
}

/// Whole steps until `remaining` is consumed at `per_step`; `None` when
/// already past the mark or when nothing is moving.
fn steps_until(remaining: f64, per_step: f64) -> Option<u64> {
    if per_step <= 0.0 || !remaining.is_finite() {
        return None;
    }
    if remaining <= 0.0 {
        return Some(0);
    }
    Some((remaining / per_step).ceil() as u64)
}

fn max_steps(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    }
}

fn life_forecast(universe: &Universe) -> LifeForecast {
    let state = &universe.current_state;
    let age_gyr = state.age_gyr();
    let trend = if age_gyr < 1.0 || state.metallicity < 0.01 {
        "dormant"
    } else if state.stability_index < 0.3 {
        "declining"
    } else if age_gyr > 5.0 && state.life_bearing_planets_count > 1000.0 {
        "expanding"
    } else if state.life_bearing_planets_count >= 1.0 {
        "emerging"
    } else {
        "pre-biotic"
    };

    LifeForecast {
        habitable_systems: state.habitable_systems_count,
        life_bearing_planets: state.life_bearing_planets_count,
        active_civilizations: universe.active_civilizations(),
        trend: trend.to_string(),
    }
}
