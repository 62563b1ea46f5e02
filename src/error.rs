//! Error types shared across the simulation.
//!
//! Guard rejections (insufficient funds, already owned, locked) are not
//! errors: the reducer reports them as `Transition::Ignored`. The types here
//! cover the two situations that must never be swallowed: a catalog that
//! fails validation, and an action that references an id the catalog does
//! not know about.

use std::fmt;

use thiserror::Error;

/// Which catalog table an id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Generator,
    Upgrade,
    Milestone,
    PrestigeUpgrade,
    Research,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Generator => "generator",
            EntityKind::Upgrade => "upgrade",
            EntityKind::Milestone => "milestone",
            EntityKind::PrestigeUpgrade => "prestige upgrade",
            EntityKind::Research => "research",
        };
        f.write_str(name)
    }
}

/// State and catalog have drifted apart: a caller referenced an id that the
/// running catalog does not define. This is a defect, not a player mistake.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("unknown {kind} id: {id}")]
    UnknownId { kind: EntityKind, id: String },
}

impl ContractViolation {
    pub fn unknown(kind: EntityKind, id: &str) -> Self {
        ContractViolation::UnknownId {
            kind,
            id: id.to_string(),
        }
    }
}

/// Problems found while building a [`crate::catalog::Catalog`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: EntityKind, id: String },

    /// `click` and `all` are effect targets, not generators.
    #[error("generator id is reserved: {0}")]
    ReservedId(String),

    /// Cost curves must climb by at least one whole unit per purchase.
    #[error("generator {id} has a cost curve that does not strictly increase")]
    FlatCostCurve { id: String },

    #[error("research {id} has an invalid cost curve")]
    InvalidResearchCost { id: String },

    #[error("{owner} targets unknown generator {target}")]
    UnknownEffectTarget { owner: String, target: String },

    #[error("{owner} has a non-positive auto-buyer interval")]
    InvalidInterval { owner: String },

    #[error("{owner} has a non-finite or out-of-range effect value")]
    InvalidEffectValue { owner: String },
}
