//! Turning a stored snapshot back into a live state.
//!
//! The snapshot is merged over catalog defaults, cleaned up, and advanced by
//! one offline step covering the time since it was written.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::catalog::Catalog;
use crate::game::autobuy;
use crate::game::economy;
use crate::game::effects::aggregate;
use crate::game::state::{AutoBuyer, PlayerState};

use super::snapshot::SaveSnapshot;

/// Checkpoints below this many milliseconds were written against a
/// different clock and yield no offline time.
pub const LEGACY_EPOCH_MS: f64 = 10_000_000_000.0;

/// A reconciled state and the production credited for time away.
#[derive(Clone, Debug, PartialEq)]
pub struct Restored {
    pub state: PlayerState,
    pub offline_gain: f64,
}

pub fn restore(catalog: &Catalog, snapshot: Option<SaveSnapshot>, now_ms: f64) -> Restored {
    let mut state = PlayerState::new(catalog, now_ms);
    let Some(snapshot) = snapshot else {
        return Restored {
            state,
            offline_gain: 0.0,
        };
    };

    merge(catalog, &mut state, &snapshot);
    rebuild_automation(catalog, &mut state, &snapshot);

    let elapsed_ms = elapsed_ms(snapshot.last_checkpoint, now_ms);
    let effects = aggregate(catalog, &state);
    let gain = economy::rate(catalog, &state, &effects) * elapsed_ms / 1000.0;
    let offline_gain = if gain.is_finite() && gain > 0.0 {
        gain
    } else {
        0.0
    };
    state.balance += offline_gain;
    state.lifetime_total += offline_gain;
    if offline_gain > 0.0 {
        info!(
            "offline for {:.1}s, credited {:.2}",
            elapsed_ms / 1000.0,
            offline_gain
        );
    }

    Restored {
        state,
        offline_gain,
    }
}

/// Milliseconds of offline time to credit.
fn elapsed_ms(checkpoint: Option<f64>, now_ms: f64) -> f64 {
    let Some(checkpoint) = checkpoint else {
        return 0.0;
    };
    if !(checkpoint.is_finite() && now_ms.is_finite()) {
        return 0.0;
    }
    if checkpoint < LEGACY_EPOCH_MS {
        info!("save checkpoint {checkpoint} predates the epoch clock, no offline time");
        return 0.0;
    }
    (now_ms - checkpoint).max(0.0)
}

fn amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn whole(value: f64) -> u64 {
    amount(value).floor() as u64
}

fn merge(catalog: &Catalog, state: &mut PlayerState, snapshot: &SaveSnapshot) {
    state.balance = amount(snapshot.balance);
    state.lifetime_total = amount(snapshot.lifetime_total);
    state.prestige = whole(snapshot.prestige);

    for (id, &n) in &snapshot.generators {
        match state.generators.get_mut(id) {
            Some(count) => *count = whole(n),
            None => warn!("dropping saved generator {id}: not in catalog"),
        }
    }
    merge_flags(&mut state.upgrades, &snapshot.upgrades, "upgrade");
    merge_flags(&mut state.milestones, &snapshot.milestones, "milestone");
    merge_flags(
        &mut state.prestige_upgrades,
        &snapshot.prestige_upgrades,
        "prestige upgrade",
    );

    for (id, &level) in &snapshot.research {
        let Some(def) = catalog.research_def(id) else {
            warn!("dropping saved research {id}: not in catalog");
            continue;
        };
        let mut level = whole(level).min(u32::MAX as u64) as u32;
        if let Some(max) = def.max_level {
            level = level.min(max);
        }
        state.research.insert(def.id.clone(), level);
    }
}

fn merge_flags(
    target: &mut BTreeMap<String, bool>,
    saved: &BTreeMap<String, bool>,
    kind: &str,
) {
    for (id, &owned) in saved {
        match target.get_mut(id) {
            Some(flag) => *flag = owned,
            None => warn!("dropping saved {kind} {id}: not in catalog"),
        }
    }
}

/// Entries and intervals come only from owned unlocks, so the result matches
/// what `Load` rebuilds. From the save we trust the enabled flag alone; the
/// saved interval is informational.
fn rebuild_automation(catalog: &Catalog, state: &mut PlayerState, snapshot: &SaveSnapshot) {
    let intervals = autobuy::unlocked_intervals(catalog, state);
    state.automation = intervals
        .into_iter()
        .map(|(target, interval)| {
            let mut buyer = AutoBuyer::new(interval);
            if let Some(saved) = snapshot.automation.get(&target) {
                buyer.enabled = saved.enabled;
                if saved.interval.is_some_and(|hint| hint != interval) {
                    debug!("saved interval for {target} superseded by {interval}s");
                }
            }
            (target, buyer)
        })
        .collect();
    for id in snapshot.automation.keys() {
        if !state.automation.contains_key(id) {
            warn!("dropping saved automation for {id}: not unlocked");
        }
    }
}
