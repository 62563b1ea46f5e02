//! Auto-buyers: interval-gated generator purchases drawing from the shared
//! balance.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, Effect};

use super::effects::owned_effects;
use super::state::{AutoBuyer, PlayerState};

/// Safety bound on purchases per target per step.
pub const AUTO_BUY_CAP: u32 = 1_000_000;

/// Advance every automation timer by `dt` seconds and buy what is due.
///
/// Targets are visited in catalog order, so earlier generators get first
/// claim on the balance. Returns the number of units bought.
pub fn run(catalog: &Catalog, state: &mut PlayerState, dt: f64) -> u64 {
    let PlayerState {
        balance,
        generators,
        automation,
        ..
    } = state;

    let mut total = 0u64;
    for g in catalog.generators() {
        let Some(buyer) = automation.get_mut(&g.id) else {
            continue;
        };
        if !buyer.enabled {
            buyer.timer = 0.0;
            continue;
        }
        buyer.timer += dt;

        let mut bought = 0u32;
        while buyer.timer >= buyer.interval && bought < AUTO_BUY_CAP {
            let owned = generators.get(&g.id).copied().unwrap_or(0);
            let price = g.cost_at(owned);
            if *balance < price {
                // Keep the timer: the purchase is retried on the next step.
                break;
            }
            *balance -= price;
            generators.insert(g.id.clone(), owned + 1);
            buyer.timer -= buyer.interval;
            bought += 1;
        }
        total += bought as u64;
    }
    total
}

/// Shortest unlocked interval per target across everything owned.
pub fn unlocked_intervals(catalog: &Catalog, state: &PlayerState) -> BTreeMap<String, f64> {
    let mut intervals: BTreeMap<String, f64> = BTreeMap::new();
    for effect in owned_effects(catalog, state) {
        if let Effect::AutoBuyer { target, interval } = effect {
            intervals
                .entry(target)
                .and_modify(|current| *current = current.min(interval))
                .or_insert(interval);
        }
    }
    intervals
}

/// Instantiate or update the automation entries named by `effects`, which
/// were just granted. New entries start disabled with an empty timer; an
/// existing entry keeps its flag and progress and only has its interval
/// refreshed.
pub fn apply_unlock_effects(catalog: &Catalog, state: &mut PlayerState, effects: &[Effect]) {
    if !effects
        .iter()
        .any(|e| matches!(e, Effect::AutoBuyer { .. }))
    {
        return;
    }
    let intervals = unlocked_intervals(catalog, state);
    for effect in effects {
        let Effect::AutoBuyer { target, .. } = effect else {
            continue;
        };
        let Some(&interval) = intervals.get(target) else {
            continue;
        };
        state
            .automation
            .entry(target.clone())
            .and_modify(|buyer| buyer.interval = interval)
            .or_insert_with(|| AutoBuyer::new(interval));
    }
}

/// Derive the whole automation map from ownership. Entries without an owned
/// unlock are dropped; surviving entries keep their enabled flag, and an
/// enabled entry keeps its timer.
pub fn rebuild_automation(catalog: &Catalog, state: &mut PlayerState) {
    let previous = std::mem::take(&mut state.automation);
    state.automation = unlocked_intervals(catalog, state)
        .into_iter()
        .map(|(target, interval)| {
            let mut buyer = AutoBuyer::new(interval);
            if let Some(old) = previous.get(&target) {
                if old.enabled {
                    buyer.enabled = true;
                    buyer.timer = old.timer;
                }
            }
            (target, buyer)
        })
        .collect();
}

/// Zero every timer without touching enabled flags.
pub fn reset_timers(state: &mut PlayerState) {
    for buyer in state.automation.values_mut() {
        buyer.timer = 0.0;
    }
}
