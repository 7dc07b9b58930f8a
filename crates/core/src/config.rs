use crate::{default_jokers, EncounterKind, HandCategory, JokerDef, JokerRarity, Rank, RewardTier};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no score target levels configured")]
    NoLevels,
    #[error("score targets must start at depth 0")]
    MissingDepthZero,
    #[error("level depths must be strictly increasing (depth {0})")]
    UnorderedLevels(u8),
    #[error("score target at depth {depth} is {target}, below the previous {previous}")]
    DecreasingTarget { depth: u8, target: i64, previous: i64 },
    #[error("invalid encounter rule for {0:?}")]
    InvalidEncounter(EncounterKind),
    #[error("weights for {0} are empty or all zero")]
    EmptyWeights(&'static str),
    #[error("reward tier {0:?} has min above max or a negative amount")]
    InvalidTierRange(RewardTier),
    #[error("map depth must be at least 2, got {0}")]
    MapTooShallow(u8),
    #[error("map widths invalid: min {min}, max {max}")]
    InvalidWidth { min: usize, max: usize },
    #[error("chance must be within 0..=1, got {0}")]
    InvalidChance(f64),
    #[error("invalid run rule: {0}")]
    InvalidRun(&'static str),
    #[error("invalid shop rule: {0}")]
    InvalidShop(&'static str),
    #[error("duplicate joker id {0}")]
    DuplicateJoker(String),
    #[error("joker {0} has a negative price")]
    NegativePrice(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunRule {
    pub starting_money: i64,
    pub hand_size: usize,
    pub max_selection: usize,
    pub joker_slots: usize,
}

impl Default for RunRule {
    fn default() -> Self {
        Self {
            starting_money: 5,
            hand_size: 8,
            max_selection: 5,
            joker_slots: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRule {
    pub category: HandCategory,
    pub multiplier: f64,
    #[serde(default = "default_level_mult")]
    pub level_mult: f64,
}

fn default_level_mult() -> f64 {
    crate::DEFAULT_LEVEL_MULT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankRule {
    pub rank: Rank,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncounterRule {
    pub kind: EncounterKind,
    pub target_mult: f64,
    pub hands: u8,
    pub discards: u8,
    pub reward: i64,
}

impl EncounterRule {
    pub fn default_for(kind: EncounterKind) -> Self {
        let (target_mult, reward) = match kind {
            EncounterKind::Dealer => (1.0, 5),
            EncounterKind::SmallBoss => (1.5, 10),
            EncounterKind::BigBoss => (2.25, 15),
            EncounterKind::Boss => (2.25, 15),
        };
        Self {
            kind,
            target_mult,
            hands: 5,
            discards: 3,
            reward,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelRule {
    pub depth: u8,
    pub base_target: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierRule {
    pub tier: RewardTier,
    pub weight: u32,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyRule {
    pub tiers: Vec<TierRule>,
    pub per_hand_reward: i64,
}

impl Default for EconomyRule {
    fn default() -> Self {
        let tier = |tier, weight, min, max| TierRule {
            tier,
            weight,
            min,
            max,
        };
        Self {
            tiers: vec![
                tier(RewardTier::Common, 50, 5, 9),
                tier(RewardTier::Uncommon, 30, 10, 14),
                tier(RewardTier::Rare, 15, 15, 19),
                tier(RewardTier::UltraRare, 5, 20, 25),
            ],
            per_hand_reward: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapRule {
    /// Depth of the Boss node; the start node sits at depth 0.
    pub depth: u8,
    pub min_width: usize,
    pub max_width: usize,
    pub dealer_weight: u32,
    pub reward_weight: u32,
    pub random_weight: u32,
    pub random_weight_per_depth: u32,
    pub extra_edge_chance: f64,
}

impl Default for MapRule {
    fn default() -> Self {
        Self {
            depth: 10,
            min_width: 2,
            max_width: 4,
            dealer_weight: 50,
            reward_weight: 25,
            random_weight: 20,
            random_weight_per_depth: 3,
            extra_edge_chance: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RandomRoomRule {
    pub reward_weight: u32,
    pub small_boss_weight: u32,
    pub big_boss_weight: u32,
    pub boss_weight_per_depth: u32,
    /// Reward weight shift per remembered outcome, scaled by recency.
    pub streak_step: u32,
}

impl Default for RandomRoomRule {
    fn default() -> Self {
        Self {
            reward_weight: 30,
            small_boss_weight: 35,
            big_boss_weight: 35,
            boss_weight_per_depth: 2,
            streak_step: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JokerRarityWeight {
    pub rarity: JokerRarity,
    pub weight: u32,
    /// Fractional weight change per map depth, e.g. -0.01 for -1%.
    #[serde(default)]
    pub shift_per_depth: f64,
}

impl JokerRarityWeight {
    /// Scaled by 100 so small shifts survive integer weights.
    pub fn weight_at(&self, depth: u8) -> u32 {
        let scaled = self.weight as f64 * 100.0 * (1.0 + self.shift_per_depth * depth as f64);
        scaled.round().max(0.0) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShopRule {
    pub offer_slots: usize,
    pub upgrade_price: i64,
    pub rarity_weights: Vec<JokerRarityWeight>,
}

impl Default for ShopRule {
    fn default() -> Self {
        let weight = |rarity, weight, shift_per_depth| JokerRarityWeight {
            rarity,
            weight,
            shift_per_depth,
        };
        Self {
            offer_slots: 2,
            upgrade_price: 4,
            rarity_weights: vec![
                weight(JokerRarity::Common, 50, -0.01),
                weight(JokerRarity::Uncommon, 30, -0.005),
                weight(JokerRarity::Rare, 15, 0.01),
                weight(JokerRarity::UltraRare, 5, 0.005),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub run: RunRule,
    pub hands: Vec<HandRule>,
    pub ranks: Vec<RankRule>,
    pub encounters: Vec<EncounterRule>,
    pub levels: Vec<LevelRule>,
    pub economy: EconomyRule,
    pub map: MapRule,
    pub random_room: RandomRoomRule,
    pub shop: ShopRule,
    pub jokers: Vec<JokerDef>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            run: RunRule::default(),
            hands: HandCategory::ALL
                .iter()
                .map(|category| HandRule {
                    category: *category,
                    multiplier: category.default_multiplier(),
                    level_mult: default_level_mult(),
                })
                .collect(),
            ranks: Rank::ALL
                .iter()
                .map(|rank| RankRule {
                    rank: *rank,
                    points: rank.points(),
                })
                .collect(),
            encounters: [
                EncounterKind::Dealer,
                EncounterKind::SmallBoss,
                EncounterKind::BigBoss,
                EncounterKind::Boss,
            ]
            .into_iter()
            .map(EncounterRule::default_for)
            .collect(),
            levels: DEFAULT_TARGETS
                .iter()
                .enumerate()
                .map(|(depth, base_target)| LevelRule {
                    depth: depth as u8,
                    base_target: *base_target,
                })
                .collect(),
            economy: EconomyRule::default(),
            map: MapRule::default(),
            random_room: RandomRoomRule::default(),
            shop: ShopRule::default(),
            jokers: default_jokers(),
        }
    }
}

/// Base score target per depth.
const DEFAULT_TARGETS: [i64; 23] = [
    300, 500, 700, 900, 1100, 1300, 1800, 2300, 2800, 3600, 4500, 5500, 7200, 9000, 11000, 14400,
    17000, 20000, 25200, 32000, 35000, 37800, 50000,
];

impl GameConfig {
    pub fn encounter_rule(&self, kind: EncounterKind) -> EncounterRule {
        self.encounters
            .iter()
            .find(|rule| rule.kind == kind)
            .cloned()
            .unwrap_or_else(|| EncounterRule::default_for(kind))
    }

    /// Base target of the deepest level rule at or above `depth`; depths past
    /// the table reuse its last entry.
    pub fn base_target(&self, depth: u8) -> i64 {
        self.levels
            .iter()
            .filter(|rule| rule.depth <= depth)
            .max_by_key(|rule| rule.depth)
            .or_else(|| self.levels.first())
            .map(|rule| rule.base_target)
            .unwrap_or(DEFAULT_TARGETS[0])
    }

    pub fn target_for(&self, depth: u8, kind: EncounterKind) -> i64 {
        let mult = self.encounter_rule(kind).target_mult;
        (self.base_target(depth) as f64 * mult).round() as i64
    }

    pub fn joker(&self, id: &str) -> Option<&JokerDef> {
        self.jokers.iter().find(|joker| joker.id == id)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_levels()?;
        for rule in &self.encounters {
            if rule.target_mult <= 0.0 || rule.hands == 0 || rule.reward < 0 {
                return Err(ConfigError::InvalidEncounter(rule.kind));
            }
        }

        let run = &self.run;
        if run.max_selection == 0 || run.max_selection > 5 {
            return Err(ConfigError::InvalidRun("max_selection must be within 1..=5"));
        }
        if run.hand_size < run.max_selection {
            return Err(ConfigError::InvalidRun("hand_size is smaller than max_selection"));
        }
        if run.hand_size > 52 {
            return Err(ConfigError::InvalidRun("hand_size exceeds the deck"));
        }
        if run.starting_money < 0 {
            return Err(ConfigError::InvalidRun("starting_money is negative"));
        }

        if self.economy.tiers.iter().map(|tier| tier.weight).sum::<u32>() == 0 {
            return Err(ConfigError::EmptyWeights("economy.tiers"));
        }
        for tier in &self.economy.tiers {
            if tier.min > tier.max || tier.min < 0 {
                return Err(ConfigError::InvalidTierRange(tier.tier));
            }
        }

        let map = &self.map;
        if map.depth < 2 {
            return Err(ConfigError::MapTooShallow(map.depth));
        }
        if map.min_width == 0 || map.min_width > map.max_width {
            return Err(ConfigError::InvalidWidth {
                min: map.min_width,
                max: map.max_width,
            });
        }
        if !(0.0..=1.0).contains(&map.extra_edge_chance) {
            return Err(ConfigError::InvalidChance(map.extra_edge_chance));
        }
        if map.dealer_weight == 0 {
            return Err(ConfigError::EmptyWeights("map.dealer_weight"));
        }

        let random = &self.random_room;
        if random.reward_weight + random.small_boss_weight + random.big_boss_weight == 0 {
            return Err(ConfigError::EmptyWeights("random_room"));
        }

        let shop = &self.shop;
        if shop.upgrade_price < 0 {
            return Err(ConfigError::InvalidShop("upgrade_price is negative"));
        }
        if shop
            .rarity_weights
            .iter()
            .map(|entry| entry.weight)
            .sum::<u32>()
            == 0
        {
            return Err(ConfigError::EmptyWeights("shop.rarity_weights"));
        }

        let mut seen = HashSet::new();
        for joker in &self.jokers {
            if !seen.insert(joker.id.as_str()) {
                return Err(ConfigError::DuplicateJoker(joker.id.clone()));
            }
            if joker.price < 0 {
                return Err(ConfigError::NegativePrice(joker.id.clone()));
            }
        }
        Ok(())
    }

    fn validate_levels(&self) -> Result<(), ConfigError> {
        let first = self.levels.first().ok_or(ConfigError::NoLevels)?;
        if first.depth != 0 {
            return Err(ConfigError::MissingDepthZero);
        }
        for pair in self.levels.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.depth <= prev.depth {
                return Err(ConfigError::UnorderedLevels(next.depth));
            }
            if next.base_target < prev.base_target {
                return Err(ConfigError::DecreasingTarget {
                    depth: next.depth,
                    target: next.base_target,
                    previous: prev.base_target,
                });
            }
        }
        Ok(())
    }
}
