//! Economy formulas: prices, production, click gain and prestige.

use crate::catalog::Catalog;
use crate::error::ContractViolation;

use super::effects::EffectSummary;
use super::state::PlayerState;

/// Resource per manual click before multipliers.
pub const BASE_CLICK_GAIN: f64 = 1.0;

/// Lifetime total required before prestige is allowed.
pub const PRESTIGE_REQUIREMENT: f64 = 100_000.0;

/// Production bonus per prestige point.
pub const PRESTIGE_STEP: f64 = 0.1;

/// Price of the next unit of `generator_id` when `owned` are held.
pub fn cost(catalog: &Catalog, generator_id: &str, owned: u64) -> Result<f64, ContractViolation> {
    Ok(catalog.require_generator(generator_id)?.cost_at(owned))
}

/// Single global factor from prestige points plus prestige-boost effects.
pub fn prestige_multiplier(prestige: u64, effects: &EffectSummary) -> f64 {
    1.0 + (prestige as f64 + effects.prestige_bonus) * PRESTIGE_STEP
}

/// Production per second.
pub fn rate(catalog: &Catalog, state: &PlayerState, effects: &EffectSummary) -> f64 {
    let prestige = prestige_multiplier(state.prestige, effects);
    catalog
        .generators()
        .iter()
        .map(|g| {
            let count = state.count(&g.id);
            if count == 0 {
                return 0.0;
            }
            count as f64
                * g.base_rate
                * effects.global_multiplier
                * effects.generator_multiplier(&g.id)
                * prestige
        })
        .sum()
}

/// Production per second of one generator.
pub fn generator_rate(
    catalog: &Catalog,
    state: &PlayerState,
    effects: &EffectSummary,
    generator_id: &str,
) -> Result<f64, ContractViolation> {
    let g = catalog.require_generator(generator_id)?;
    Ok(state.count(&g.id) as f64
        * g.base_rate
        * effects.global_multiplier
        * effects.generator_multiplier(&g.id)
        * prestige_multiplier(state.prestige, effects))
}

pub fn click_gain(effects: &EffectSummary, prestige_mult: f64) -> f64 {
    BASE_CLICK_GAIN * effects.click_multiplier * prestige_mult
}

/// Prestige points granted for a lifetime total. Sub-linear on purpose.
pub fn prestige_conversion(lifetime_total: f64) -> u64 {
    if !(lifetime_total.is_finite() && lifetime_total > 0.0) {
        return 0;
    }
    (lifetime_total / 1000.0).sqrt().floor() as u64
}

pub fn can_prestige(state: &PlayerState) -> bool {
    state.lifetime_total >= PRESTIGE_REQUIREMENT
}
