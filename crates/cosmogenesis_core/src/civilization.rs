//! Civilization lifecycle management.
//!
//! Runs inside the physics engine's life-evolution pass: spawning when
//! the life window is open, per-step evolution and extinction rolls, a
//! rare great-filter catastrophe, and periodic culling of old extinct
//! records so the persisted document stays bounded.

use crate::rng::SeedStream;
use cosmogenesis_data::{Civilization, CivilizationTier, Milestone, SignificantEvent, Universe};
use uuid::Uuid;

/// Hard cap on living civilizations per universe.
pub const MAX_ACTIVE_CIVILIZATIONS: usize = 500;
/// Extinct records retained after a cull.
pub const EXTINCT_RETAINED: usize = 100;
/// Steps between culls.
pub const CULL_INTERVAL: u64 = 10;
/// New civilizations admitted per step at most.
const MAX_SPAWN_PER_STEP: usize = 10;
/// Per-step probability of a great-filter catastrophe.
const CATASTROPHE_PROBABILITY: f64 = 1e-6;

pub struct CivilizationManager {
    steps_since_cull: u64,
}

impl Default for CivilizationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CivilizationManager {
    pub fn new() -> Self {
        Self {
            steps_since_cull: 0,
        }
    }

    /// Advances all civilizations by one step of `dt` years.
    pub fn step(
        &mut self,
        universe: &mut Universe,
        spawn_window_open: bool,
        dt: f64,
        stream: &mut SeedStream,
    ) -> Vec<SignificantEvent> {
        let mut events = Vec::new();
        let age = universe.current_state.age;
        let cosmic_stability = universe.current_state.stability_index;

        if spawn_window_open {
            self.spawn(universe, stream, &mut events);
        }

        for civ in universe.civilizations.iter_mut().filter(|c| !c.extinct) {
            evolve(civ, dt, stream);
        }

        for civ in universe.civilizations.iter_mut().filter(|c| !c.extinct) {
            let risk = extinction_risk(civ, cosmic_stability);
            if stream.next_f64() < risk {
                let cause = extinction_cause(civ, cosmic_stability);
                mark_extinct(civ, age, cause);
                events.push(extinction_event(age, civ));
            }
        }

        if !universe.milestones.great_filter && stream.next_f64() < CATASTROPHE_PROBABILITY {
            let active = universe.active_civilizations();
            let victims = (active as f64 * (0.5 + stream.next_f64() * 0.4)).floor() as usize;
            let mut remaining = victims;
            for civ in universe.civilizations.iter_mut() {
                if remaining == 0 {
                    break;
                }
                if !civ.extinct {
                    mark_extinct(civ, age, "great filter event");
                    remaining -= 1;
                }
            }
            universe.milestones.reach(Milestone::GreatFilter);
            events.push(
                SignificantEvent::new(age, "catastrophe", Milestone::GreatFilter.description())
                    .with_effects(
                        [("civilizationsLost".to_string(), victims as f64)]
                            .into_iter()
                            .collect(),
                    ),
            );
        }

        self.steps_since_cull += 1;
        if self.steps_since_cull >= CULL_INTERVAL {
            self.steps_since_cull = 0;
            cull_extinct(&mut universe.civilizations);
        }

        universe.current_state.civilization_count = universe.active_civilizations() as u32;
        events
    }

    fn spawn(
        &mut self,
        universe: &mut Universe,
        stream: &mut SeedStream,
        events: &mut Vec<SignificantEvent>,
    ) {
        let state = &universe.current_state;
        let expected = (state.life_bearing_planets_count
            * 1e-7
            * (1.0 + 0.5 * state.metallicity))
            .floor() as i64;
        let active = universe.active_civilizations();
        let headroom = MAX_ACTIVE_CIVILIZATIONS.saturating_sub(active) as i64;
        let to_add = (expected - i64::from(state.civilization_count))
            .min(headroom)
            .min(MAX_SPAWN_PER_STEP as i64);
        if to_add <= 0 {
            return;
        }

        let age = state.age;
        let age_gyr = state.age_gyr();
        for _ in 0..to_add {
            universe
                .civilizations
                .push(new_civilization(age, age_gyr, stream));
        }

        if universe.milestones.reach(Milestone::FirstCivilization) {
            events.push(SignificantEvent::new(
                age,
                "milestone",
                Milestone::FirstCivilization.description(),
            ));
        }
        events.push(
            SignificantEvent::new(
                age,
                "civilization_emerged",
                format!("{to_add} new civilization(s) emerged on life-bearing worlds"),
            )
            .with_effects([("count".to_string(), to_add as f64)].into_iter().collect()),
        );
    }
}

/// Initial tier table: young universes only seed Type0; later spawns
/// roll against a heavy-tailed distribution.
fn initial_tier(age_gyr: f64, stream: &mut SeedStream) -> CivilizationTier {
    if age_gyr < 8.0 {
        return CivilizationTier::Type0;
    }
    let roll = stream.next_f64();
    if roll < 0.98 {
        CivilizationTier::Type0
    } else if roll < 0.998 {
        CivilizationTier::Type1
    } else if roll < 0.9998 {
        CivilizationTier::Type2
    } else {
        CivilizationTier::Type3
    }
}

fn new_civilization(age: f64, age_gyr: f64, stream: &mut SeedStream) -> Civilization {
    let tier = initial_tier(age_gyr, stream);
    Civilization {
        id: Uuid::new_v4(),
        tier,
        created_at: age,
        age: 0.0,
        development_level: stream.next_f64(),
        technology: stream.next_f64() * 10.0,
        stability: 0.5 + stream.next_f64() * 0.5,
        population: 1e6 + stream.next_f64() * 1e9,
        resource_depletion: 0.0,
        warlikeness: stream.next_f64(),
        extinct: false,
        extinction_date: None,
        extinction_age: None,
        extinction_cause: None,
    }
}

/// Technology threshold and per-step probability for promotion out of a
/// tier.
fn promotion_gate(tier: CivilizationTier) -> Option<(f64, f64)> {
    match tier {
        CivilizationTier::Type0 => Some((20.0, 1e-3)),
        CivilizationTier::Type1 => Some((50.0, 1e-4)),
        CivilizationTier::Type2 => Some((80.0, 1e-5)),
        CivilizationTier::Type3 => None,
    }
}

fn evolve(civ: &mut Civilization, dt: f64, stream: &mut SeedStream) {
    civ.age += dt;

    let tech_growth = 0.01 * (dt / 1e8) * (1.0 + civ.development_level);
    civ.technology = (civ.technology + tech_growth).min(100.0);
    civ.resource_depletion = (civ.resource_depletion + tech_growth * 0.005).min(1.0);

    if let (Some((threshold, probability)), Some(next)) =
        (promotion_gate(civ.tier), civ.tier.next())
    {
        if civ.technology > threshold && stream.next_f64() < probability {
            civ.tier = next;
        }
    }

    civ.stability = (civ.stability + stream.next_gaussian(0.0, 0.01)
        - 0.02 * civ.resource_depletion
        - 0.01 * civ.warlikeness)
        .clamp(0.0, 1.0);
}

/// Per-step extinction probability, capped at 0.5.
pub fn extinction_risk(civ: &Civilization, cosmic_stability: f64) -> f64 {
    let mut risk: f64 = 1e-5;

    if civ.stability < 0.1 {
        risk *= (1.0 - civ.stability) * 100.0;
    } else if civ.stability < 0.3 {
        risk *= (1.0 - civ.stability) * 50.0;
    }
    if civ.resource_depletion > 0.8 {
        risk *= 20.0;
    }
    if civ.warlikeness > 0.8 {
        risk *= 10.0;
    }
    match civ.tier {
        CivilizationTier::Type0 => risk *= 5.0,
        CivilizationTier::Type3 => risk *= 0.1,
        _ => {}
    }
    if cosmic_stability < 0.5 {
        risk *= (1.0 - cosmic_stability) * 3.0;
    }
    if civ.age < 1e7 {
        risk *= 2.0;
    } else if civ.age > 1e9 {
        risk *= 1.5;
    }

    risk.min(0.5)
}

fn extinction_cause(civ: &Civilization, cosmic_stability: f64) -> &'static str {
    if civ.stability < 0.1 {
        "societal collapse"
    } else if civ.resource_depletion > 0.8 {
        "resource exhaustion"
    } else if civ.warlikeness > 0.8 {
        "self-destruction"
    } else if cosmic_stability < 0.5 {
        "cosmic hostility"
    } else {
        "unknown causes"
    }
}

fn mark_extinct(civ: &mut Civilization, universe_age: f64, cause: &str) {
    civ.extinct = true;
    civ.extinction_date = Some(universe_age);
    civ.extinction_age = Some(civ.age);
    civ.extinction_cause = Some(cause.to_string());
}

fn extinction_event(age: f64, civ: &Civilization) -> SignificantEvent {
    SignificantEvent::new(
        age,
        "civilization_extinct",
        format!(
            "A {} civilization fell to {}",
            civ.tier.as_str(),
            civ.extinction_cause.as_deref().unwrap_or("unknown causes")
        ),
    )
}

/// Keeps every living civilization plus the most recent extinctions.
pub fn cull_extinct(civilizations: &mut Vec<Civilization>) {
    let extinct = civilizations.iter().filter(|c| c.extinct).count();
    if extinct <= EXTINCT_RETAINED {
        return;
    }

    let mut extinct_order: Vec<(f64, usize)> = civilizations
        .iter()
        .enumerate()
        .filter(|(_, c)| c.extinct)
        .map(|(i, c)| (c.extinction_date.unwrap_or(0.0), i))
        .collect();
    // Most recent extinctions first; index breaks ties deterministically.
    extinct_order.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(b.1.cmp(&a.1)));
    let keep: std::collections::HashSet<usize> = extinct_order
        .iter()
        .take(EXTINCT_RETAINED)
        .map(|&(_, i)| i)
        .collect();

    let mut index = 0;
    civilizations.retain(|c| {
        let retained = !c.extinct || keep.contains(&index);
        index += 1;
        retained
    });
}
