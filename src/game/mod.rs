//! Progression core: player state, effects, economy, auto-buyers and the
//! reducer, behind the `Game` facade.

pub mod actions;
pub mod autobuy;
pub mod economy;
pub mod effects;
pub mod logic;
mod simulator;
pub mod state;

use std::rc::Rc;

use crate::catalog::Catalog;
use crate::error::ContractViolation;
use crate::persist::reconcile::Restored;

use actions::Action;
use effects::{EffectCache, EffectSummary};
use logic::Transition;
use state::PlayerState;

/// Owns the live state together with its cached effect summary.
///
/// All mutation goes through [`Game::dispatch`]; everything else is a read.
pub struct Game {
    catalog: Rc<Catalog>,
    state: PlayerState,
    /// Bumped on every ownership change; keys the effect cache.
    generation: u64,
    effects: EffectCache,
    offline_gain: f64,
}

impl Game {
    pub fn new(catalog: Rc<Catalog>, now_ms: f64) -> Self {
        let state = PlayerState::new(&catalog, now_ms);
        let effects = EffectCache::new(&catalog, &state, 0);
        Self {
            catalog,
            state,
            generation: 0,
            effects,
            offline_gain: 0.0,
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Transition, ContractViolation> {
        let transition = logic::apply(
            &self.catalog,
            &mut self.state,
            self.effects.summary(),
            action,
        )?;
        if transition == Transition::OwnershipChanged {
            self.bump_generation();
        }
        Ok(transition)
    }

    /// Adopt a reconciled save. Its offline gain is already in the balance and
    /// is held here until acknowledged.
    pub fn restore(&mut self, restored: Restored) {
        self.state = restored.state;
        self.offline_gain = restored.offline_gain;
        self.bump_generation();
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        self.effects
            .refresh(&self.catalog, &self.state, self.generation);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn effects(&self) -> &EffectSummary {
        self.effects.summary()
    }

    /// How many times effects have been aggregated since construction.
    pub fn effect_rebuilds(&self) -> u64 {
        self.effects.rebuilds()
    }

    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    pub fn lifetime_total(&self) -> f64 {
        self.state.lifetime_total
    }

    pub fn prestige(&self) -> u64 {
        self.state.prestige
    }

    /// Production per second.
    pub fn rate(&self) -> f64 {
        economy::rate(&self.catalog, &self.state, self.effects())
    }

    pub fn generator_rate(&self, id: &str) -> Result<f64, ContractViolation> {
        economy::generator_rate(&self.catalog, &self.state, self.effects(), id)
    }

    /// Price of the next unit of `id`.
    pub fn cost_of(&self, id: &str) -> Result<f64, ContractViolation> {
        economy::cost(&self.catalog, id, self.state.count(id))
    }

    /// Next price of every generator, in catalog order.
    pub fn next_costs(&self) -> Vec<(&str, f64)> {
        self.catalog
            .generators()
            .iter()
            .map(|g| (g.id.as_str(), g.cost_at(self.state.count(&g.id))))
            .collect()
    }

    pub fn prestige_multiplier(&self) -> f64 {
        economy::prestige_multiplier(self.state.prestige, self.effects())
    }

    pub fn click_gain(&self) -> f64 {
        economy::click_gain(self.effects(), self.prestige_multiplier())
    }

    pub fn can_prestige(&self) -> bool {
        economy::can_prestige(&self.state)
    }

    /// Points a prestige right now would grant.
    pub fn pending_prestige(&self) -> u64 {
        economy::prestige_conversion(self.state.lifetime_total)
    }

    /// Prestige points for the next level of `id`, or `None` at max level.
    pub fn research_cost(&self, id: &str) -> Result<Option<u64>, ContractViolation> {
        let def = self.catalog.require_research(id)?;
        let level = self.state.research_level(id);
        if def.is_maxed(level) {
            return Ok(None);
        }
        Ok(Some(def.cost_at(level)))
    }

    /// Resource credited for time away, until acknowledged.
    pub fn offline_gain(&self) -> f64 {
        self.offline_gain
    }

    pub fn ack_offline_gain(&mut self) {
        self.offline_gain = 0.0;
    }
}
