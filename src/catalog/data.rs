//! Shipped content tables.
//!
//! Adding entries here is always save-compatible: old saves pick them up with
//! default values on load. Renaming or removing an id drops that entry from
//! old saves (with a warning in the log).

use super::{
    Effect, GeneratorDef, MilestoneDef, PrestigeResearchDef, PrestigeUpgradeDef, Target,
    UpgradeDef,
};

fn generator(
    id: &str,
    name: &str,
    base_cost: f64,
    cost_mult: f64,
    base_rate: f64,
    unlock_at: f64,
) -> GeneratorDef {
    GeneratorDef {
        id: id.into(),
        name: name.into(),
        base_cost,
        cost_mult,
        base_rate,
        unlock_at,
    }
}

fn upgrade(id: &str, name: &str, cost: f64, unlock_at: f64, effects: Vec<Effect>) -> UpgradeDef {
    UpgradeDef {
        id: id.into(),
        name: name.into(),
        cost,
        unlock_at,
        effects,
    }
}

fn milestone(id: &str, name: &str, threshold: f64, effects: Vec<Effect>) -> MilestoneDef {
    MilestoneDef {
        id: id.into(),
        name: name.into(),
        threshold,
        effects,
    }
}

pub fn generators() -> Vec<GeneratorDef> {
    vec![
        generator("spark", "Spark", 10.0, 1.15, 0.1, 0.0),
        generator("coil", "Coil", 120.0, 1.16, 1.25, 50.0),
        generator("reactor", "Reactor", 1_800.0, 1.18, 12.0, 450.0),
        generator("forge", "Forge", 12_000.0, 1.2, 65.0, 3_000.0),
        generator("singularity", "Singularity", 150_000.0, 1.22, 380.0, 20_000.0),
        generator("quantum", "Quantum Core", 2_000_000.0, 1.24, 2_400.0, 150_000.0),
        generator("nebula", "Nebula Loom", 25_000_000.0, 1.26, 15_000.0, 1_000_000.0),
        generator("ascension", "Ascension Gate", 350_000_000.0, 1.28, 110_000.0, 8_000_000.0),
    ]
}

#[rustfmt::skip]
pub fn upgrades() -> Vec<UpgradeDef> {
    use Target::*;
    vec![
        upgrade("tap_gloves", "Conductive Gloves", 50.0, 0.0, vec![Effect::multiplier(Click, 2.0)]),
        upgrade("spark_lens", "Spark Lens", 100.0, 50.0, vec![Effect::multiplier(Target::generator("spark"), 2.0)]),
        upgrade("spark_winder", "Spark Autowinder", 250.0, 150.0, vec![Effect::auto_buyer("spark", 10.0)]),
        upgrade("coil_wrap", "Copper Wrap", 1_000.0, 600.0, vec![Effect::multiplier(Target::generator("coil"), 2.0)]),
        upgrade("coil_winder", "Coil Autowinder", 2_500.0, 1_500.0, vec![Effect::auto_buyer("coil", 12.0)]),
        upgrade("tap_resonance", "Resonant Tap", 5_000.0, 3_000.0, vec![Effect::multiplier(Click, 3.0)]),
        upgrade("reactor_shield", "Reactor Shielding", 15_000.0, 9_000.0, vec![Effect::multiplier(Target::generator("reactor"), 2.0)]),
        upgrade("reactor_feed", "Reactor Feeder", 30_000.0, 18_000.0, vec![Effect::auto_buyer("reactor", 15.0)]),
        upgrade("grid_sync", "Grid Synchroniser", 60_000.0, 40_000.0, vec![Effect::multiplier(All, 1.5)]),
        upgrade("forge_bellows", "Forge Bellows", 120_000.0, 80_000.0, vec![Effect::multiplier(Target::generator("forge"), 2.0)]),
        upgrade("forge_feed", "Forge Feeder", 250_000.0, 150_000.0, vec![Effect::auto_buyer("forge", 20.0)]),
        upgrade("horizon_tap", "Event Horizon Tap", 1_500_000.0, 1_000_000.0, vec![Effect::multiplier(Target::generator("singularity"), 2.0), Effect::multiplier(Click, 2.0)]),
        upgrade("singularity_feed", "Singularity Feeder", 3_000_000.0, 2_000_000.0, vec![Effect::auto_buyer("singularity", 25.0)]),
        upgrade("quantum_lattice", "Quantum Lattice", 20_000_000.0, 12_000_000.0, vec![Effect::multiplier(Target::generator("quantum"), 2.0)]),
        upgrade("loom_thread", "Stellar Thread", 250_000_000.0, 150_000_000.0, vec![Effect::multiplier(Target::generator("nebula"), 2.0)]),
        upgrade("gate_keys", "Gate Keys", 3_500_000_000.0, 2_000_000_000.0, vec![Effect::multiplier(Target::generator("ascension"), 2.0), Effect::multiplier(All, 1.25)]),
    ]
}

#[rustfmt::skip]
pub fn milestones() -> Vec<MilestoneDef> {
    use Target::*;
    vec![
        milestone("first_light", "First Light", 1_000.0, vec![Effect::multiplier(Click, 1.5)]),
        milestone("steady_hum", "Steady Hum", 25_000.0, vec![Effect::multiplier(All, 1.1)]),
        milestone("critical_mass", "Critical Mass", 500_000.0, vec![Effect::multiplier(All, 1.2), Effect::prestige_boost(1.0)]),
        milestone("quantum_leap", "Quantum Leap", 10_000_000.0, vec![Effect::auto_buyer("quantum", 30.0)]),
        milestone("nebula_bloom", "Nebula Bloom", 200_000_000.0, vec![Effect::auto_buyer("nebula", 40.0)]),
        milestone("open_gate", "Open Gate", 5_000_000_000.0, vec![Effect::auto_buyer("ascension", 60.0), Effect::prestige_boost(2.0)]),
    ]
}

pub fn prestige_upgrades() -> Vec<PrestigeUpgradeDef> {
    vec![
        PrestigeUpgradeDef {
            id: "echo_chamber".into(),
            name: "Echo Chamber".into(),
            cost: 1,
            unlock_at_prestige: 0,
            unlock_at_total: 0.0,
            effects: vec![Effect::multiplier(Target::Click, 2.0)],
        },
        PrestigeUpgradeDef {
            id: "kindling".into(),
            name: "Kindling".into(),
            cost: 3,
            unlock_at_prestige: 1,
            unlock_at_total: 0.0,
            effects: vec![
                Effect::multiplier(Target::generator("spark"), 3.0),
                Effect::auto_buyer("spark", 5.0),
            ],
        },
        PrestigeUpgradeDef {
            id: "afterglow".into(),
            name: "Afterglow".into(),
            cost: 10,
            unlock_at_prestige: 5,
            unlock_at_total: 0.0,
            effects: vec![Effect::prestige_boost(3.0)],
        },
        PrestigeUpgradeDef {
            id: "ring_harmonics".into(),
            name: "Ring Harmonics".into(),
            cost: 25,
            unlock_at_prestige: 10,
            unlock_at_total: 50_000.0,
            effects: vec![Effect::multiplier(Target::All, 2.0)],
        },
    ]
}

fn flux_theory(level: u32) -> Vec<Effect> {
    if level == 0 {
        return Vec::new();
    }
    vec![Effect::multiplier(Target::All, 1.0 + 0.1 * level as f64)]
}

fn deep_memory(level: u32) -> Vec<Effect> {
    if level == 0 {
        return Vec::new();
    }
    vec![Effect::prestige_boost(level as f64 * 0.5)]
}

fn swift_hands(level: u32) -> Vec<Effect> {
    match level {
        0 => Vec::new(),
        // Automation for coils appears at rank 1 and speeds up with rank.
        _ => vec![
            Effect::multiplier(Target::Click, 1.0 + 0.25 * level as f64),
            Effect::auto_buyer("coil", (12.0 - level as f64).max(4.0)),
        ],
    }
}

pub fn research() -> Vec<PrestigeResearchDef> {
    vec![
        PrestigeResearchDef {
            id: "flux_theory".into(),
            name: "Flux Theory".into(),
            base_cost: 2.0,
            cost_mult: 1.6,
            unlock_at_prestige: 1,
            unlock_at_total: 0.0,
            max_level: None,
            effects_at: flux_theory,
        },
        PrestigeResearchDef {
            id: "deep_memory".into(),
            name: "Deep Memory".into(),
            base_cost: 5.0,
            cost_mult: 2.0,
            unlock_at_prestige: 3,
            unlock_at_total: 0.0,
            max_level: Some(10),
            effects_at: deep_memory,
        },
        PrestigeResearchDef {
            id: "swift_hands".into(),
            name: "Swift Hands".into(),
            base_cost: 3.0,
            cost_mult: 1.8,
            unlock_at_prestige: 2,
            unlock_at_total: 1_000.0,
            max_level: Some(8),
            effects_at: swift_hands,
        },
    ]
}
