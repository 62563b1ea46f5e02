//! Effect aggregation: folds the effects of everything the player owns into
//! one `EffectSummary`.
//!
//! Factors for the same target are folded in sorted order so that the result
//! is bit-for-bit identical no matter which order the owned entities are
//! visited in.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, Effect, Target};

use super::state::PlayerState;

/// Combined modifiers of all owned entities. Derived, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSummary {
    pub click_multiplier: f64,
    pub global_multiplier: f64,
    /// Generators absent from the map have a multiplier of 1.
    pub generator_multipliers: BTreeMap<String, f64>,
    /// Added to prestige points in the prestige multiplier.
    pub prestige_bonus: f64,
}

impl Default for EffectSummary {
    fn default() -> Self {
        Self {
            click_multiplier: 1.0,
            global_multiplier: 1.0,
            generator_multipliers: BTreeMap::new(),
            prestige_bonus: 0.0,
        }
    }
}

impl EffectSummary {
    pub fn generator_multiplier(&self, id: &str) -> f64 {
        self.generator_multipliers.get(id).copied().unwrap_or(1.0)
    }

    /// Fold an arbitrary collection of effects. Auto-buyer effects carry no
    /// multiplier and are skipped.
    pub fn fold<'a>(effects: impl IntoIterator<Item = &'a Effect>) -> Self {
        let mut click = Vec::new();
        let mut global = Vec::new();
        let mut per_generator: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut bonus = Vec::new();

        for effect in effects {
            match effect {
                Effect::Multiplier { target, value } => match target {
                    Target::Click => click.push(*value),
                    Target::All => global.push(*value),
                    Target::Generator(id) => {
                        per_generator.entry(id.clone()).or_default().push(*value)
                    }
                },
                Effect::PrestigeBoost { value } => bonus.push(*value),
                Effect::AutoBuyer { .. } => {}
            }
        }

        Self {
            click_multiplier: product(click),
            global_multiplier: product(global),
            generator_multipliers: per_generator
                .into_iter()
                .map(|(id, factors)| (id, product(factors)))
                .collect(),
            prestige_bonus: sum(bonus),
        }
    }
}

fn product(mut factors: Vec<f64>) -> f64 {
    factors.sort_by(f64::total_cmp);
    factors.into_iter().fold(1.0, |acc, f| acc * f)
}

fn sum(mut terms: Vec<f64>) -> f64 {
    terms.sort_by(f64::total_cmp);
    terms.into_iter().fold(0.0, |acc, t| acc + t)
}

/// Effects currently granted by owned entities, including research at its
/// current level.
pub fn owned_effects(catalog: &Catalog, state: &PlayerState) -> Vec<Effect> {
    let mut effects = Vec::new();
    for upgrade in catalog.upgrades() {
        if state.owns_upgrade(&upgrade.id) {
            effects.extend(upgrade.effects.iter().cloned());
        }
    }
    for milestone in catalog.milestones() {
        if state.has_milestone(&milestone.id) {
            effects.extend(milestone.effects.iter().cloned());
        }
    }
    for upgrade in catalog.prestige_upgrades() {
        if state.owns_prestige_upgrade(&upgrade.id) {
            effects.extend(upgrade.effects.iter().cloned());
        }
    }
    for research in catalog.research() {
        let level = state.research_level(&research.id);
        if level > 0 {
            effects.extend((research.effects_at)(level));
        }
    }
    effects
}

/// Aggregate the modifiers of everything owned in `state`.
pub fn aggregate(catalog: &Catalog, state: &PlayerState) -> EffectSummary {
    EffectSummary::fold(&owned_effects(catalog, state))
}

/// Summary cache keyed by the ownership generation. Ownership changes are rare
/// compared to ticks, so the summary is rebuilt only when the generation moves.
#[derive(Debug)]
pub struct EffectCache {
    generation: u64,
    summary: EffectSummary,
    rebuilds: u64,
}

impl EffectCache {
    pub fn new(catalog: &Catalog, state: &PlayerState, generation: u64) -> Self {
        Self {
            generation,
            summary: aggregate(catalog, state),
            rebuilds: 1,
        }
    }

    pub fn summary(&self) -> &EffectSummary {
        &self.summary
    }

    /// Rebuild if `generation` differs from the cached one.
    pub fn refresh(&mut self, catalog: &Catalog, state: &PlayerState, generation: u64) {
        if generation == self.generation {
            return;
        }
        self.summary = aggregate(catalog, state);
        self.generation = generation;
        self.rebuilds += 1;
    }

    /// How many times the summary has been computed.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
