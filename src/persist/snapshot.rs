//! Serialized save format.
//!
//! The format is versionless. Every field is defaulted, so a save written
//! before a field existed still loads, and unknown fields are ignored.
//! Numbers are stored loosely (counts as `f64`) and cleaned up on restore.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::state::PlayerState;

use super::store::StorageError;

/// Persisted automation settings. The timer is never saved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutomationEntry {
    pub enabled: bool,
    /// Informational; restore always takes the interval from the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub balance: f64,
    pub lifetime_total: f64,
    pub generators: BTreeMap<String, f64>,
    pub prestige: f64,
    /// Epoch milliseconds at which the snapshot was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checkpoint: Option<f64>,
    pub upgrades: BTreeMap<String, bool>,
    pub milestones: BTreeMap<String, bool>,
    pub prestige_upgrades: BTreeMap<String, bool>,
    pub research: BTreeMap<String, f64>,
    pub automation: BTreeMap<String, AutomationEntry>,
}

impl SaveSnapshot {
    /// Everything persistent in `state`, without a checkpoint. The checkpoint
    /// is stamped when the snapshot is actually written.
    pub fn capture(state: &PlayerState) -> Self {
        Self {
            balance: state.balance,
            lifetime_total: state.lifetime_total,
            generators: state
                .generators
                .iter()
                .map(|(id, &n)| (id.clone(), n as f64))
                .collect(),
            prestige: state.prestige as f64,
            last_checkpoint: None,
            upgrades: state.upgrades.clone(),
            milestones: state.milestones.clone(),
            prestige_upgrades: state.prestige_upgrades.clone(),
            research: state
                .research
                .iter()
                .map(|(id, &level)| (id.clone(), level as f64))
                .collect(),
            automation: state
                .automation
                .iter()
                .map(|(id, buyer)| {
                    (
                        id.clone(),
                        AutomationEntry {
                            enabled: buyer.enabled,
                            interval: Some(buyer.interval),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn stamped(mut self, now_ms: f64) -> Self {
        self.last_checkpoint = Some(now_ms);
        self
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ordering key for picking the newest of several saves.
    pub fn checkpoint_or_min(&self) -> f64 {
        match self.last_checkpoint {
            Some(t) if t.is_finite() => t,
            _ => f64::NEG_INFINITY,
        }
    }
}
