//! Player state: the aggregate root that the reducer mutates.

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::error::{ContractViolation, EntityKind};

/// Timer-driven purchasing for one generator.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoBuyer {
    pub enabled: bool,
    /// Seconds between purchases.
    pub interval: f64,
    /// Seconds accumulated towards the next purchase.
    pub timer: f64,
}

impl AutoBuyer {
    pub fn new(interval: f64) -> Self {
        Self {
            enabled: false,
            interval,
            timer: 0.0,
        }
    }
}

/// Full state of a run, including everything that survives prestige.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Spendable resource.
    pub balance: f64,
    /// Gross production since the last prestige.
    pub lifetime_total: f64,
    /// Owned units per generator id.
    pub generators: BTreeMap<String, u64>,
    /// Prestige points: both a score and a currency.
    pub prestige: u64,
    /// Epoch milliseconds of the last persisted checkpoint.
    pub last_checkpoint_ms: f64,
    pub upgrades: BTreeMap<String, bool>,
    pub milestones: BTreeMap<String, bool>,
    pub prestige_upgrades: BTreeMap<String, bool>,
    /// Research level per research id.
    pub research: BTreeMap<String, u32>,
    /// Automation keyed by generator id. Only unlocked targets have an entry.
    pub automation: BTreeMap<String, AutoBuyer>,
}

impl PlayerState {
    /// A fresh run with every catalog entry at its default.
    pub fn new(catalog: &Catalog, now_ms: f64) -> Self {
        Self {
            balance: 0.0,
            lifetime_total: 0.0,
            generators: default_counts(catalog),
            prestige: 0,
            last_checkpoint_ms: now_ms,
            upgrades: default_flags(catalog.upgrades().iter().map(|d| &d.id)),
            milestones: default_flags(catalog.milestones().iter().map(|d| &d.id)),
            prestige_upgrades: default_flags(catalog.prestige_upgrades().iter().map(|d| &d.id)),
            research: catalog.research().iter().map(|d| (d.id.clone(), 0)).collect(),
            automation: BTreeMap::new(),
        }
    }

    pub fn count(&self, generator_id: &str) -> u64 {
        self.generators.get(generator_id).copied().unwrap_or(0)
    }

    pub fn owns_upgrade(&self, id: &str) -> bool {
        self.upgrades.get(id).copied().unwrap_or(false)
    }

    pub fn has_milestone(&self, id: &str) -> bool {
        self.milestones.get(id).copied().unwrap_or(false)
    }

    pub fn owns_prestige_upgrade(&self, id: &str) -> bool {
        self.prestige_upgrades.get(id).copied().unwrap_or(false)
    }

    pub fn research_level(&self, id: &str) -> u32 {
        self.research.get(id).copied().unwrap_or(0)
    }

    /// Fails on the first key the catalog does not define.
    pub fn check_ids(&self, catalog: &Catalog) -> Result<(), ContractViolation> {
        let tables = [
            (EntityKind::Generator, keys(&self.generators)),
            (EntityKind::Upgrade, keys(&self.upgrades)),
            (EntityKind::Milestone, keys(&self.milestones)),
            (EntityKind::PrestigeUpgrade, keys(&self.prestige_upgrades)),
            (EntityKind::Research, keys(&self.research)),
            (EntityKind::Generator, keys(&self.automation)),
        ];
        for (kind, ids) in tables {
            if let Some(id) = ids.into_iter().find(|id| !catalog.knows(kind, id)) {
                return Err(ContractViolation::unknown(kind, id));
            }
        }
        Ok(())
    }
}

pub(crate) fn default_counts(catalog: &Catalog) -> BTreeMap<String, u64> {
    catalog
        .generators()
        .iter()
        .map(|g| (g.id.clone(), 0))
        .collect()
}

fn default_flags<'a>(ids: impl Iterator<Item = &'a String>) -> BTreeMap<String, bool> {
    ids.map(|id| (id.clone(), false)).collect()
}

fn keys<V>(map: &BTreeMap<String, V>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    #[test]
    fn new_state_has_defaults_for_every_entry() {
        let catalog = fixtures::small();
        let state = PlayerState::new(&catalog, 1_700_000_000_000.0);
        assert_eq!(state.generators.len(), 2);
        assert_eq!(state.count("spark"), 0);
        assert_eq!(state.upgrades.len(), 4);
        assert!(!state.owns_upgrade("spark_x2"));
        assert_eq!(state.research_level("focus"), 0);
        assert!(state.automation.is_empty());
        assert!((state.last_checkpoint_ms - 1_700_000_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn check_ids_accepts_fresh_state() {
        let catalog = fixtures::small();
        let state = PlayerState::new(&catalog, 0.0);
        assert!(state.check_ids(&catalog).is_ok());
    }

    #[test]
    fn check_ids_rejects_foreign_upgrade() {
        let catalog = fixtures::small();
        let mut state = PlayerState::new(&catalog, 0.0);
        state.upgrades.insert("retired".into(), true);
        assert_eq!(
            state.check_ids(&catalog).unwrap_err(),
            ContractViolation::unknown(EntityKind::Upgrade, "retired")
        );
    }

    #[test]
    fn check_ids_rejects_automation_for_unknown_generator() {
        let catalog = fixtures::small();
        let mut state = PlayerState::new(&catalog, 0.0);
        state.automation.insert("ghost".into(), AutoBuyer::new(5.0));
        assert!(state.check_ids(&catalog).is_err());
    }
}
