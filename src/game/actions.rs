//! Actions accepted by the reducer.

use super::state::PlayerState;

/// How many units a `Buy` attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuyAmount {
    One,
    /// Up to this many; `Count(0)` is treated as one.
    Count(u32),
    /// As many as are affordable.
    Max,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Advance the simulation by `dt` seconds.
    Tick { dt: f64 },
    Click,
    Buy { id: String, amount: BuyAmount },
    Prestige,
    BuyUpgrade { id: String },
    ClaimMilestone { id: String },
    BuyPrestigeUpgrade { id: String },
    BuyPrestigeResearch { id: String },
    ToggleAutoBuyer { id: String, enabled: bool },
    Load(Box<PlayerState>),
}

impl Action {
    pub fn buy(id: &str, amount: BuyAmount) -> Self {
        Action::Buy {
            id: id.to_string(),
            amount,
        }
    }

    /// Continuous input (ticks and clicks) is saved on a throttle; everything
    /// else is saved as soon as it takes effect.
    pub fn wants_immediate_save(&self) -> bool {
        !matches!(self, Action::Tick { .. } | Action::Click)
    }
}
