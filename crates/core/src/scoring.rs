use crate::{evaluate_hand, Card, GameConfig, HandCategory, Rank, Score};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lookup tables built once from the config; missing entries fall back to
/// the built-in values.
#[derive(Debug, Clone)]
pub struct ScoreTables {
    hand_rules: HashMap<HandCategory, (f64, f64)>,
    rank_points: HashMap<Rank, i64>,
}

impl ScoreTables {
    pub fn from_config(config: &GameConfig) -> Self {
        let mut hand_rules = HashMap::new();
        for hand in &config.hands {
            hand_rules.insert(hand.category, (hand.multiplier, hand.level_mult));
        }
        let mut rank_points = HashMap::new();
        for rank in &config.ranks {
            rank_points.insert(rank.rank, rank.points);
        }
        Self {
            hand_rules,
            rank_points,
        }
    }

    pub fn multiplier(&self, category: HandCategory) -> f64 {
        self.hand_rules
            .get(&category)
            .map(|(mult, _)| *mult)
            .unwrap_or_else(|| category.default_multiplier())
    }

    /// Multiplier after `level - 1` upgrades.
    pub fn multiplier_for_level(&self, category: HandCategory, level: u32) -> f64 {
        let base = self.multiplier(category);
        if level <= 1 {
            return base;
        }
        let per_level = self
            .hand_rules
            .get(&category)
            .map(|(_, level_mult)| *level_mult)
            .unwrap_or(DEFAULT_LEVEL_MULT);
        base + per_level * (level - 1) as f64
    }

    pub fn rank_points(&self, rank: Rank) -> i64 {
        self.rank_points
            .get(&rank)
            .copied()
            .unwrap_or_else(|| rank.points())
    }
}

pub const DEFAULT_LEVEL_MULT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub category: HandCategory,
    pub level: u32,
    /// Indices into the selection.
    pub scoring_indices: Vec<usize>,
    pub high_rank: Option<Rank>,
    /// Sum of the scoring cards' points.
    pub rank_points: i64,
    /// Points and category multiplier before any joker.
    pub base: Score,
}

impl ScoreBreakdown {
    pub fn base_total(&self) -> i64 {
        self.base.total()
    }
}

/// Evaluates the selection and prices it at the category's current level.
pub fn score_selection(
    cards: &[Card],
    tables: &ScoreTables,
    hand_levels: &HashMap<HandCategory, u32>,
) -> ScoreBreakdown {
    let eval = evaluate_hand(cards);
    let level = hand_levels.get(&eval.category).copied().unwrap_or(1);
    let rank_points: i64 = eval
        .scoring_indices
        .iter()
        .map(|idx| tables.rank_points(cards[*idx].rank))
        .sum();
    let base = Score::new(
        rank_points,
        tables.multiplier_for_level(eval.category, level),
    );
    ScoreBreakdown {
        category: eval.category,
        level,
        scoring_indices: eval.scoring_indices,
        high_rank: eval.high_rank,
        rank_points,
        base,
    }
}
