//! Content catalog: generators, upgrades, milestones and the prestige tier.
//!
//! A `Catalog` is built once at startup, validated, and then only ever read.
//! Everything downstream receives it by reference.

pub mod data;

use std::collections::HashMap;

use crate::error::{CatalogError, ContractViolation, EntityKind};

/// What a multiplier effect applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// Manual click gain.
    Click,
    /// Every generator.
    All,
    /// A single generator by id.
    Generator(String),
}

impl Target {
    pub fn generator(id: &str) -> Self {
        Target::Generator(id.to_string())
    }
}

/// A declarative modifier attached to an unlockable catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Multiplier { target: Target, value: f64 },
    /// Added to the prestige point count when computing the prestige multiplier.
    PrestigeBoost { value: f64 },
    /// Unlocks timed automatic purchases of one generator.
    AutoBuyer { target: String, interval: f64 },
}

impl Effect {
    pub fn multiplier(target: Target, value: f64) -> Self {
        Effect::Multiplier { target, value }
    }

    pub fn prestige_boost(value: f64) -> Self {
        Effect::PrestigeBoost { value }
    }

    pub fn auto_buyer(target: &str, interval: f64) -> Self {
        Effect::AutoBuyer {
            target: target.to_string(),
            interval,
        }
    }
}

/// A purchasable production unit.
#[derive(Clone, Debug)]
pub struct GeneratorDef {
    pub id: String,
    pub name: String,
    pub base_cost: f64,
    /// Cost growth per owned unit.
    pub cost_mult: f64,
    /// Production per second per unit, before multipliers.
    pub base_rate: f64,
    /// Lifetime total at which the generator is shown.
    pub unlock_at: f64,
}

impl GeneratorDef {
    /// Price of the next unit when `owned` are already owned.
    pub fn cost_at(&self, owned: u64) -> f64 {
        (self.base_cost * self.cost_mult.powf(owned as f64)).ceil()
    }

    pub fn is_visible(&self, lifetime_total: f64) -> bool {
        lifetime_total >= self.unlock_at
    }
}

#[derive(Clone, Debug)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    pub cost: f64,
    /// Lifetime total required before the upgrade can be bought.
    pub unlock_at: f64,
    pub effects: Vec<Effect>,
}

#[derive(Clone, Debug)]
pub struct MilestoneDef {
    pub id: String,
    pub name: String,
    /// Lifetime total required to claim.
    pub threshold: f64,
    pub effects: Vec<Effect>,
}

#[derive(Clone, Debug)]
pub struct PrestigeUpgradeDef {
    pub id: String,
    pub name: String,
    /// Price in prestige points.
    pub cost: u64,
    pub unlock_at_prestige: u64,
    pub unlock_at_total: f64,
    pub effects: Vec<Effect>,
}

/// Levelled prestige research. Effects are computed from the current level.
#[derive(Clone, Debug)]
pub struct PrestigeResearchDef {
    pub id: String,
    pub name: String,
    pub base_cost: f64,
    pub cost_mult: f64,
    pub unlock_at_prestige: u64,
    pub unlock_at_total: f64,
    pub max_level: Option<u32>,
    /// Effects granted at a level. Must return nothing for level 0.
    pub effects_at: fn(u32) -> Vec<Effect>,
}

impl PrestigeResearchDef {
    /// Prestige points needed to go from `level` to `level + 1`.
    pub fn cost_at(&self, level: u32) -> u64 {
        (self.base_cost * self.cost_mult.powi(level as i32)).ceil() as u64
    }

    pub fn is_maxed(&self, level: u32) -> bool {
        self.max_level.is_some_and(|max| level >= max)
    }
}

/// Immutable registry of every definition, in display order.
#[derive(Debug)]
pub struct Catalog {
    generators: Vec<GeneratorDef>,
    upgrades: Vec<UpgradeDef>,
    milestones: Vec<MilestoneDef>,
    prestige_upgrades: Vec<PrestigeUpgradeDef>,
    research: Vec<PrestigeResearchDef>,
    generator_index: HashMap<String, usize>,
    upgrade_index: HashMap<String, usize>,
    milestone_index: HashMap<String, usize>,
    prestige_upgrade_index: HashMap<String, usize>,
    research_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build and validate a catalog.
    pub fn new(
        generators: Vec<GeneratorDef>,
        upgrades: Vec<UpgradeDef>,
        milestones: Vec<MilestoneDef>,
        prestige_upgrades: Vec<PrestigeUpgradeDef>,
        research: Vec<PrestigeResearchDef>,
    ) -> Result<Self, CatalogError> {
        for g in &generators {
            if g.id == "click" || g.id == "all" {
                return Err(CatalogError::ReservedId(g.id.clone()));
            }
            // ceil(b*m^n) strictly increases when consecutive raw costs differ by >= 1,
            // and the first difference is the smallest.
            if !(g.base_cost > 0.0 && g.cost_mult > 1.0 && g.base_cost * (g.cost_mult - 1.0) >= 1.0)
            {
                return Err(CatalogError::FlatCostCurve { id: g.id.clone() });
            }
        }
        for r in &research {
            if !(r.base_cost > 0.0 && r.cost_mult >= 1.0) {
                return Err(CatalogError::InvalidResearchCost { id: r.id.clone() });
            }
        }

        let generator_index = index_by_id(EntityKind::Generator, generators.iter().map(|d| &d.id))?;
        let upgrade_index = index_by_id(EntityKind::Upgrade, upgrades.iter().map(|d| &d.id))?;
        let milestone_index =
            index_by_id(EntityKind::Milestone, milestones.iter().map(|d| &d.id))?;
        let prestige_upgrade_index = index_by_id(
            EntityKind::PrestigeUpgrade,
            prestige_upgrades.iter().map(|d| &d.id),
        )?;
        let research_index = index_by_id(EntityKind::Research, research.iter().map(|d| &d.id))?;

        let catalog = Self {
            generators,
            upgrades,
            milestones,
            prestige_upgrades,
            research,
            generator_index,
            upgrade_index,
            milestone_index,
            prestige_upgrade_index,
            research_index,
        };
        catalog.validate_effects()?;
        Ok(catalog)
    }

    /// The shipped game content.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(
            data::generators(),
            data::upgrades(),
            data::milestones(),
            data::prestige_upgrades(),
            data::research(),
        )
    }

    fn validate_effects(&self) -> Result<(), CatalogError> {
        let fixed = self
            .upgrades
            .iter()
            .map(|d| (&d.id, &d.effects))
            .chain(self.milestones.iter().map(|d| (&d.id, &d.effects)))
            .chain(self.prestige_upgrades.iter().map(|d| (&d.id, &d.effects)));
        for (owner, effects) in fixed {
            self.validate_effect_list(owner, effects)?;
        }
        for r in &self.research {
            let top = r.max_level.unwrap_or(1);
            for level in 1..=top.max(1) {
                self.validate_effect_list(&r.id, &(r.effects_at)(level))?;
            }
        }
        Ok(())
    }

    fn validate_effect_list(&self, owner: &str, effects: &[Effect]) -> Result<(), CatalogError> {
        for effect in effects {
            match effect {
                Effect::Multiplier {
                    target: Target::Generator(target),
                    ..
                }
                | Effect::AutoBuyer { target, .. }
                    if !self.generator_index.contains_key(target) =>
                {
                    return Err(CatalogError::UnknownEffectTarget {
                        owner: owner.to_string(),
                        target: target.clone(),
                    });
                }
                Effect::AutoBuyer { interval, .. }
                    if !(interval.is_finite() && *interval > 0.0) =>
                {
                    return Err(CatalogError::InvalidInterval {
                        owner: owner.to_string(),
                    });
                }
                // A zero, negative or NaN factor would drive rates below zero.
                Effect::Multiplier { value, .. } if !(value.is_finite() && *value > 0.0) => {
                    return Err(CatalogError::InvalidEffectValue {
                        owner: owner.to_string(),
                    });
                }
                Effect::PrestigeBoost { value } if !(value.is_finite() && *value >= 0.0) => {
                    return Err(CatalogError::InvalidEffectValue {
                        owner: owner.to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn generators(&self) -> &[GeneratorDef] {
        &self.generators
    }

    pub fn upgrades(&self) -> &[UpgradeDef] {
        &self.upgrades
    }

    pub fn milestones(&self) -> &[MilestoneDef] {
        &self.milestones
    }

    pub fn prestige_upgrades(&self) -> &[PrestigeUpgradeDef] {
        &self.prestige_upgrades
    }

    pub fn research(&self) -> &[PrestigeResearchDef] {
        &self.research
    }

    pub fn generator(&self, id: &str) -> Option<&GeneratorDef> {
        self.generator_index.get(id).map(|&i| &self.generators[i])
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrade_index.get(id).map(|&i| &self.upgrades[i])
    }

    pub fn milestone(&self, id: &str) -> Option<&MilestoneDef> {
        self.milestone_index.get(id).map(|&i| &self.milestones[i])
    }

    pub fn prestige_upgrade(&self, id: &str) -> Option<&PrestigeUpgradeDef> {
        self.prestige_upgrade_index
            .get(id)
            .map(|&i| &self.prestige_upgrades[i])
    }

    pub fn research_def(&self, id: &str) -> Option<&PrestigeResearchDef> {
        self.research_index.get(id).map(|&i| &self.research[i])
    }

    /// Like [`Catalog::generator`], but an unknown id is a contract violation.
    pub fn require_generator(&self, id: &str) -> Result<&GeneratorDef, ContractViolation> {
        self.generator(id)
            .ok_or_else(|| ContractViolation::unknown(EntityKind::Generator, id))
    }

    pub fn require_research(&self, id: &str) -> Result<&PrestigeResearchDef, ContractViolation> {
        self.research_def(id)
            .ok_or_else(|| ContractViolation::unknown(EntityKind::Research, id))
    }

    pub fn knows(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Generator => self.generator_index.contains_key(id),
            EntityKind::Upgrade => self.upgrade_index.contains_key(id),
            EntityKind::Milestone => self.milestone_index.contains_key(id),
            EntityKind::PrestigeUpgrade => self.prestige_upgrade_index.contains_key(id),
            EntityKind::Research => self.research_index.contains_key(id),
        }
    }
}

fn index_by_id<'a>(
    kind: EntityKind,
    ids: impl Iterator<Item = &'a String>,
) -> Result<HashMap<String, usize>, CatalogError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(index)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small catalogs for unit tests.

    use super::*;

    pub fn generator(id: &str, base_cost: f64, cost_mult: f64, base_rate: f64) -> GeneratorDef {
        GeneratorDef {
            id: id.to_string(),
            name: id.to_string(),
            base_cost,
            cost_mult,
            base_rate,
            unlock_at: 0.0,
        }
    }

    pub fn upgrade(id: &str, cost: f64, unlock_at: f64, effects: Vec<Effect>) -> UpgradeDef {
        UpgradeDef {
            id: id.to_string(),
            name: id.to_string(),
            cost,
            unlock_at,
            effects,
        }
    }

    pub fn milestone(id: &str, threshold: f64, effects: Vec<Effect>) -> MilestoneDef {
        MilestoneDef {
            id: id.to_string(),
            name: id.to_string(),
            threshold,
            effects,
        }
    }

    pub fn prestige_upgrade(id: &str, cost: u64, effects: Vec<Effect>) -> PrestigeUpgradeDef {
        PrestigeUpgradeDef {
            id: id.to_string(),
            name: id.to_string(),
            cost,
            unlock_at_prestige: 0,
            unlock_at_total: 0.0,
            effects,
        }
    }

    fn focus_effects(level: u32) -> Vec<Effect> {
        if level == 0 {
            Vec::new()
        } else {
            vec![Effect::multiplier(Target::All, 1.0 + 0.5 * level as f64)]
        }
    }

    /// Two generators ("spark", "coil"), one upgrade per effect kind, a
    /// milestone auto-buyer, a prestige upgrade and one research line.
    pub fn small() -> Catalog {
        Catalog::new(
            vec![
                generator("spark", 10.0, 1.15, 1.0),
                generator("coil", 100.0, 1.2, 10.0),
            ],
            vec![
                upgrade(
                    "spark_x2",
                    50.0,
                    0.0,
                    vec![Effect::multiplier(Target::generator("spark"), 2.0)],
                ),
                upgrade(
                    "click_x3",
                    20.0,
                    0.0,
                    vec![Effect::multiplier(Target::Click, 3.0)],
                ),
                upgrade(
                    "spark_auto",
                    30.0,
                    100.0,
                    vec![Effect::auto_buyer("spark", 4.0)],
                ),
                upgrade(
                    "coil_auto",
                    30.0,
                    0.0,
                    vec![Effect::auto_buyer("coil", 2.0)],
                ),
            ],
            vec![milestone(
                "first_thousand",
                1_000.0,
                vec![Effect::multiplier(Target::All, 1.5)],
            )],
            vec![prestige_upgrade(
                "echo",
                2,
                vec![Effect::prestige_boost(5.0)],
            )],
            vec![PrestigeResearchDef {
                id: "focus".to_string(),
                name: "Focus".to_string(),
                base_cost: 1.0,
                cost_mult: 2.0,
                unlock_at_prestige: 0,
                unlock_at_total: 0.0,
                max_level: Some(3),
                effects_at: focus_effects,
            }],
        )
        .expect("fixture catalog is valid")
    }
}
