//! Universe termination predicates and threshold warnings.
//!
//! Predicates are evaluated in a fixed order; the first match ends the
//! universe. Warnings fire at configurable fractions of each threshold
//! and never mutate state.

use cosmogenesis_data::CurrentState;
use serde::Serialize;
use std::collections::VecDeque;

/// The closed set of ways a universe can end, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndCondition {
    InstabilityCollapse,
    HeatDeath,
    StellarDeath,
    BigRip,
    BigCrunch,
    MaximumEntropy,
}

impl EndCondition {
    pub const ALL: [EndCondition; 6] = [
        EndCondition::InstabilityCollapse,
        EndCondition::HeatDeath,
        EndCondition::StellarDeath,
        EndCondition::BigRip,
        EndCondition::BigCrunch,
        EndCondition::MaximumEntropy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstabilityCollapse => "instability-collapse",
            Self::HeatDeath => "heat-death",
            Self::StellarDeath => "stellar-death",
            Self::BigRip => "big-rip",
            Self::BigCrunch => "big-crunch",
            Self::MaximumEntropy => "maximum-entropy",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::InstabilityCollapse => {
                "Cosmic stability collapsed below the survivable threshold"
            }
            Self::HeatDeath => "The universe has exhausted its usable energy",
            Self::StellarDeath => "The last stellar populations have burned out",
            Self::BigRip => "Runaway expansion has torn spacetime apart",
            Self::BigCrunch => "The universe has collapsed back on itself",
            Self::MaximumEntropy => "Entropy has reached its maximum; no work is possible",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EndCheckOptions {
    pub difficulty_modifier: f64,
}

impl Default for EndCheckOptions {
    fn default() -> Self {
        Self {
            difficulty_modifier: 1.0,
        }
    }
}

/// Mean of the most recent `n` history samples; falls back to the
/// current stability when no history exists yet.
fn recent_mean(history: &VecDeque<f64>, n: usize, fallback: f64) -> f64 {
    if history.is_empty() {
        return fallback;
    }
    let taken: Vec<f64> = history.iter().rev().take(n).copied().collect();
    taken.iter().sum::<f64>() / taken.len() as f64
}

/// Evaluates the termination predicates in order; the first match wins.
pub fn check(
    state: &CurrentState,
    history: &VecDeque<f64>,
    options: &EndCheckOptions,
) -> Option<EndCondition> {
    let modifier = options.difficulty_modifier;
    let age_gyr = state.age_gyr();

    if state.stability_index < 0.05 / modifier
        && recent_mean(history, 10, state.stability_index) < 0.10 / modifier
    {
        return Some(EndCondition::InstabilityCollapse);
    }
    if age_gyr > 200.0 / modifier && state.energy_budget < 0.05 {
        return Some(EndCondition::HeatDeath);
    }
    if age_gyr > 80.0 && state.star_count < 1e4 && state.energy_budget < 0.08 {
        return Some(EndCondition::StellarDeath);
    }
    if state.scale_factor > 1e9 {
        return Some(EndCondition::BigRip);
    }
    if state.scale_factor < 1e-8 {
        return Some(EndCondition::BigCrunch);
    }
    if state.entropy > 2e15 && state.energy_budget < 0.02 {
        return Some(EndCondition::MaximumEntropy);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A non-fatal threshold advisory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub severity: WarningSeverity,
    pub kind: String,
    pub message: String,
    pub recommendation: String,
}

impl Warning {
    fn new(
        severity: WarningSeverity,
        kind: &str,
        message: String,
        recommendation: &str,
    ) -> Self {
        Self {
            severity,
            kind: kind.to_string(),
            message,
            recommendation: recommendation.to_string(),
        }
    }
}

/// Emits advisories for states approaching a termination threshold.
pub fn warnings(state: &CurrentState, options: &EndCheckOptions) -> Vec<Warning> {
    let modifier = options.difficulty_modifier;
    let mut out = Vec::new();

    let collapse_threshold = 0.05 / modifier;
    if state.stability_index >= collapse_threshold
        && state.stability_index < 3.0 * collapse_threshold
    {
        let severity = if state.stability_index < 2.0 * collapse_threshold {
            WarningSeverity::High
        } else {
            WarningSeverity::Medium
        };
        out.push(Warning::new(
            severity,
            "stability",
            format!(
                "Stability index {:.3} is approaching the collapse threshold {:.3}",
                state.stability_index, collapse_threshold
            ),
            "Resolve active anomalies to restore stability",
        ));
    }

    let heat_death_age = 200.0 / modifier;
    if state.age_gyr() > 0.8 * heat_death_age {
        out.push(Warning::new(
            WarningSeverity::Medium,
            "heat_death_approach",
            format!(
                "Universe age {:.1} Gyr is past 80% of the heat-death horizon ({:.0} Gyr)",
                state.age_gyr(),
                heat_death_age
            ),
            "Preserve the remaining energy budget",
        ));
    }

    if state.entropy > 1.5e15 {
        out.push(Warning::new(
            WarningSeverity::High,
            "entropy",
            format!("Entropy {:.2e} is nearing the maximum-entropy bound", state.entropy),
            "Resolve entropy-reducing anomalies where possible",
        ));
    }

    if state.energy_budget < 0.15 {
        let severity = if state.energy_budget < 0.05 {
            WarningSeverity::Critical
        } else {
            WarningSeverity::High
        };
        out.push(Warning::new(
            severity,
            "energy_budget",
            format!("Energy budget has fallen to {:.3}", state.energy_budget),
            "Resolve anomalies to recover usable energy",
        ));
    }

    if state.scale_factor > 1e8 {
        out.push(Warning::new(
            WarningSeverity::Critical,
            "expansion",
            format!(
                "Scale factor {:.2e} is within one decade of the big-rip bound",
                state.scale_factor
            ),
            "Expansion is nearly unrecoverable; expect a big rip",
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmogenesis_data::{InitialConditions, PhysicalConstants};

    fn fresh_state() -> CurrentState {
        CurrentState::from_initial(&PhysicalConstants::default(), &InitialConditions::default())
    }

    #[test]
    fn healthy_universe_has_no_ending() {
        let state = fresh_state();
        assert_eq!(check(&state, &VecDeque::new(), &EndCheckOptions::default()), None);
    }

    #[test]
    fn big_rip_triggers_on_scale_factor() {
        let mut state = fresh_state();
        state.scale_factor = 2e9;
        assert_eq!(
            check(&state, &VecDeque::new(), &EndCheckOptions::default()),
            Some(EndCondition::BigRip)
        );
    }

    #[test]
    fn instability_needs_a_depressed_history_too() {
        let mut state = fresh_state();
        state.stability_index = 0.01;
        let mut history: VecDeque<f64> = (0..10).map(|_| 0.5).collect();
        assert_eq!(
            check(&state, &history, &EndCheckOptions::default()),
            None,
            "healthy history should hold off collapse"
        );

        history = (0..10).map(|_| 0.02).collect();
        assert_eq!(
            check(&state, &history, &EndCheckOptions::default()),
            Some(EndCondition::InstabilityCollapse)
        );
    }

    #[test]
    fn instability_precedes_heat_death_in_order() {
        let mut state = fresh_state();
        state.stability_index = 0.01;
        state.age = 300e9;
        state.energy_budget = 0.01;
        let history: VecDeque<f64> = (0..10).map(|_| 0.01).collect();
        assert_eq!(
            check(&state, &history, &EndCheckOptions::default()),
            Some(EndCondition::InstabilityCollapse)
        );
    }

    #[test]
    fn heat_death_scales_with_difficulty() {
        let mut state = fresh_state();
        state.age = 150e9;
        state.energy_budget = 0.01;
        state.stability_index = 0.5;
        state.star_count = 1e10; // keep stellar death out of the picture
        let easy = EndCheckOptions {
            difficulty_modifier: 0.75,
        };
        let hard = EndCheckOptions {
            difficulty_modifier: 1.5,
        };
        assert_eq!(check(&state, &VecDeque::new(), &easy), None);
        assert_eq!(
            check(&state, &VecDeque::new(), &hard),
            Some(EndCondition::HeatDeath)
        );
    }

    #[test]
    fn maximum_entropy_requires_spent_energy() {
        let mut state = fresh_state();
        state.entropy = 3e15;
        state.energy_budget = 0.5;
        assert_eq!(check(&state, &VecDeque::new(), &EndCheckOptions::default()), None);
        state.energy_budget = 0.01;
        assert_eq!(
            check(&state, &VecDeque::new(), &EndCheckOptions::default()),
            Some(EndCondition::MaximumEntropy)
        );
    }

    #[test]
    fn warnings_fire_at_their_thresholds() {
        let mut state = fresh_state();
        state.stability_index = 0.08;
        state.entropy = 1.6e15;
        state.energy_budget = 0.04;
        state.scale_factor = 5e8;
        let out = warnings(&state, &EndCheckOptions::default());
        let kinds: Vec<&str> = out.iter().map(|w| w.kind.as_str()).collect();
        assert!(kinds.contains(&"stability"));
        assert!(kinds.contains(&"entropy"));
        assert!(kinds.contains(&"energy_budget"));
        assert!(kinds.contains(&"expansion"));
        assert!(out
            .iter()
            .any(|w| w.kind == "energy_budget" && w.severity == WarningSeverity::Critical));
    }

    #[test]
    fn quiet_state_emits_no_warnings() {
        let state = fresh_state();
        assert!(warnings(&state, &EndCheckOptions::default()).is_empty());
    }

    #[test]
    fn condition_tags_are_kebab_case() {
        assert_eq!(EndCondition::InstabilityCollapse.as_str(), "instability-collapse");
        for condition in EndCondition::ALL {
            let json = serde_json::to_string(&condition).unwrap();
            assert_eq!(json, format!("\"{}\"", condition.as_str()));
        }
    }
}
