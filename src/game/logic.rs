//! The reducer: every rule for how an action changes `PlayerState`.
//!
//! Guard failures leave the state untouched and report `Transition::Ignored`.
//! A player action naming an id the catalog does not define is one of those
//! guard failures. Only a loaded state with foreign ids is an error.

use log::{debug, info};

use crate::catalog::Catalog;
use crate::error::ContractViolation;

use super::actions::{Action, BuyAmount};
use super::autobuy;
use super::economy;
use super::effects::EffectSummary;
use super::state::PlayerState;

/// Safety bound on units bought by one `BuyAmount::Max`.
pub const BUY_MAX_CAP: u32 = 1_000_000;

/// What an applied action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// A guard rejected the action; nothing changed.
    Ignored,
    /// Balances, totals or timers moved. Holdings are as before.
    Simulated,
    /// Something was bought, claimed, reset or loaded. Derived effect data
    /// must be recomputed.
    OwnershipChanged,
}

impl Transition {
    pub fn changed(self) -> bool {
        self != Transition::Ignored
    }
}

/// Apply `action` to `state` in place.
///
/// `effects` must be the summary for the ownership `state` had before the
/// call.
pub fn apply(
    catalog: &Catalog,
    state: &mut PlayerState,
    effects: &EffectSummary,
    action: Action,
) -> Result<Transition, ContractViolation> {
    match action {
        Action::Tick { dt } => Ok(tick(catalog, state, effects, dt)),
        Action::Click => {
            let gain = economy::click_gain(
                effects,
                economy::prestige_multiplier(state.prestige, effects),
            );
            state.balance += gain;
            state.lifetime_total += gain;
            Ok(Transition::Simulated)
        }
        Action::Buy { id, amount } => buy_generator(catalog, state, &id, amount),
        Action::Prestige => Ok(prestige(state)),
        Action::BuyUpgrade { id } => buy_upgrade(catalog, state, &id),
        Action::ClaimMilestone { id } => claim_milestone(catalog, state, &id),
        Action::BuyPrestigeUpgrade { id } => buy_prestige_upgrade(catalog, state, &id),
        Action::BuyPrestigeResearch { id } => buy_research(catalog, state, &id),
        Action::ToggleAutoBuyer { id, enabled } => toggle_auto_buyer(catalog, state, &id, enabled),
        Action::Load(snapshot) => {
            snapshot.check_ids(catalog)?;
            *state = *snapshot;
            autobuy::rebuild_automation(catalog, state);
            Ok(Transition::OwnershipChanged)
        }
    }
}

/// Pure form of [`apply`]: returns the next state and leaves `state` alone.
pub fn reduce(
    catalog: &Catalog,
    state: &PlayerState,
    action: Action,
) -> Result<PlayerState, ContractViolation> {
    let effects = super::effects::aggregate(catalog, state);
    let mut next = state.clone();
    apply(catalog, &mut next, &effects, action)?;
    Ok(next)
}

fn tick(
    catalog: &Catalog,
    state: &mut PlayerState,
    effects: &EffectSummary,
    dt: f64,
) -> Transition {
    if !(dt.is_finite() && dt > 0.0) {
        return Transition::Ignored;
    }
    let gain = economy::rate(catalog, state, effects) * dt;
    state.balance += gain;
    state.lifetime_total += gain;
    // Auto-buyers spend from the post-gain balance; lifetime total is gross.
    autobuy::run(catalog, state, dt);
    Transition::Simulated
}

fn unknown(kind: &str, id: &str) -> Transition {
    debug!("ignoring action on unknown {kind} {id}");
    Transition::Ignored
}

fn buy_generator(
    catalog: &Catalog,
    state: &mut PlayerState,
    id: &str,
    amount: BuyAmount,
) -> Result<Transition, ContractViolation> {
    let Some(def) = catalog.generator(id) else {
        return Ok(unknown("generator", id));
    };
    let limit = match amount {
        BuyAmount::One => 1,
        BuyAmount::Count(n) => n.max(1),
        BuyAmount::Max => BUY_MAX_CAP,
    };

    let mut owned = state.count(id);
    let mut bought = 0u32;
    while bought < limit {
        let price = def.cost_at(owned);
        if state.balance < price {
            break;
        }
        state.balance -= price;
        owned += 1;
        bought += 1;
    }
    if bought == 0 {
        return Ok(Transition::Ignored);
    }
    state.generators.insert(def.id.clone(), owned);
    Ok(Transition::OwnershipChanged)
}

fn prestige(state: &mut PlayerState) -> Transition {
    if !economy::can_prestige(state) {
        return Transition::Ignored;
    }
    let gained = economy::prestige_conversion(state.lifetime_total);
    info!(
        "prestige: {} lifetime converted to {} points",
        state.lifetime_total, gained
    );
    state.prestige = state.prestige.saturating_add(gained);
    state.balance = 0.0;
    state.lifetime_total = 0.0;
    for count in state.generators.values_mut() {
        *count = 0;
    }
    autobuy::reset_timers(state);
    Transition::OwnershipChanged
}

fn buy_upgrade(
    catalog: &Catalog,
    state: &mut PlayerState,
    id: &str,
) -> Result<Transition, ContractViolation> {
    let Some(def) = catalog.upgrade(id) else {
        return Ok(unknown("upgrade", id));
    };
    if state.owns_upgrade(id) || state.lifetime_total < def.unlock_at || state.balance < def.cost
    {
        return Ok(Transition::Ignored);
    }
    state.balance -= def.cost;
    state.upgrades.insert(def.id.clone(), true);
    autobuy::apply_unlock_effects(catalog, state, &def.effects);
    Ok(Transition::OwnershipChanged)
}

fn claim_milestone(
    catalog: &Catalog,
    state: &mut PlayerState,
    id: &str,
) -> Result<Transition, ContractViolation> {
    let Some(def) = catalog.milestone(id) else {
        return Ok(unknown("milestone", id));
    };
    if state.has_milestone(id) || state.lifetime_total < def.threshold {
        return Ok(Transition::Ignored);
    }
    state.milestones.insert(def.id.clone(), true);
    autobuy::apply_unlock_effects(catalog, state, &def.effects);
    Ok(Transition::OwnershipChanged)
}

fn buy_prestige_upgrade(
    catalog: &Catalog,
    state: &mut PlayerState,
    id: &str,
) -> Result<Transition, ContractViolation> {
    let Some(def) = catalog.prestige_upgrade(id) else {
        return Ok(unknown("prestige upgrade", id));
    };
    if state.owns_prestige_upgrade(id)
        || state.prestige < def.unlock_at_prestige
        || state.lifetime_total < def.unlock_at_total
        || state.prestige < def.cost
    {
        return Ok(Transition::Ignored);
    }
    state.prestige -= def.cost;
    state.prestige_upgrades.insert(def.id.clone(), true);
    autobuy::apply_unlock_effects(catalog, state, &def.effects);
    Ok(Transition::OwnershipChanged)
}

fn buy_research(
    catalog: &Catalog,
    state: &mut PlayerState,
    id: &str,
) -> Result<Transition, ContractViolation> {
    let Some(def) = catalog.research_def(id) else {
        return Ok(unknown("research", id));
    };
    let level = state.research_level(id);
    let cost = def.cost_at(level);
    if def.is_maxed(level)
        || state.prestige < def.unlock_at_prestige
        || state.lifetime_total < def.unlock_at_total
        || state.prestige < cost
    {
        return Ok(Transition::Ignored);
    }
    state.prestige -= cost;
    state.research.insert(def.id.clone(), level + 1);
    autobuy::apply_unlock_effects(catalog, state, &(def.effects_at)(level + 1));
    Ok(Transition::OwnershipChanged)
}

fn toggle_auto_buyer(
    catalog: &Catalog,
    state: &mut PlayerState,
    id: &str,
    enabled: bool,
) -> Result<Transition, ContractViolation> {
    if catalog.generator(id).is_none() {
        return Ok(unknown("generator", id));
    }
    let Some(buyer) = state.automation.get_mut(id) else {
        return Ok(Transition::Ignored);
    };
    if buyer.enabled == enabled {
        return Ok(Transition::Ignored);
    }
    buyer.enabled = enabled;
    if !enabled {
        buyer.timer = 0.0;
    }
    Ok(Transition::Simulated)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::catalog::fixtures;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_buy_below_cost_is_noop(owned in 0u64..60, shortfall in 0.001f64..1.0) {
            let catalog = fixtures::small();
            let mut state = PlayerState::new(&catalog, 0.0);
            state.generators.insert("spark".into(), owned);
            let price = catalog.generator("spark").unwrap().cost_at(owned);
            state.balance = price * (1.0 - shortfall);
            let next = reduce(&catalog, &state, Action::buy("spark", BuyAmount::Max)).unwrap();
            prop_assert_eq!(next, state);
        }

        #[test]
        fn prop_prestige_reset_law(
            total in 100_000.0f64..1e15,
            balance in 0.0f64..1e9,
            prestige in 0u64..1_000,
            sparks in 0u64..500,
        ) {
            let catalog = fixtures::small();
            let mut state = PlayerState::new(&catalog, 0.0);
            state.lifetime_total = total;
            state.balance = balance;
            state.prestige = prestige;
            state.generators.insert("spark".into(), sparks);
            state.upgrades.insert("spark_x2".into(), true);

            let next = reduce(&catalog, &state, Action::Prestige).unwrap();
            prop_assert_eq!(next.prestige, prestige + (total / 1000.0).sqrt().floor() as u64);
            prop_assert_eq!(next.balance, 0.0);
            prop_assert_eq!(next.lifetime_total, 0.0);
            prop_assert!(next.generators.values().all(|&n| n == 0));
            prop_assert_eq!(&next.upgrades, &state.upgrades);
            prop_assert_eq!(&next.milestones, &state.milestones);
            prop_assert_eq!(&next.prestige_upgrades, &state.prestige_upgrades);
        }

        #[test]
        fn prop_balance_never_negative(
            clicks in 0usize..200,
            amounts in prop::collection::vec(0u32..5, 1..10),
        ) {
            let catalog = fixtures::small();
            let mut state = PlayerState::new(&catalog, 0.0);
            for _ in 0..clicks {
                state = reduce(&catalog, &state, Action::Click).unwrap();
            }
            for n in amounts {
                let buy = Action::buy("spark", BuyAmount::Count(n));
                state = reduce(&catalog, &state, buy).unwrap();
                state = reduce(&catalog, &state, Action::buy("coil", BuyAmount::Max)).unwrap();
                prop_assert!(state.balance >= 0.0);
            }
        }
    }
}
