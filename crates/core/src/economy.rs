use crate::{EconomyRule, RngState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RewardTier {
    Common,
    Uncommon,
    Rare,
    UltraRare,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub tier: RewardTier,
    pub amount: i64,
}

/// Draws a tier by weight, then a uniform amount inside the tier's
/// inclusive range. `None` only when every tier weight is zero.
pub fn roll_reward(rule: &EconomyRule, rng: &mut RngState) -> Option<Reward> {
    let weights: Vec<u32> = rule.tiers.iter().map(|tier| tier.weight).collect();
    let picked = &rule.tiers[rng.pick_weighted(&weights)?];
    let amount = rng.range_inclusive(picked.min, picked.max);
    Some(Reward {
        tier: picked.tier,
        amount,
    })
}
