//! Joker definitions and the scoring pipeline they plug into.
//!
//! Owned jokers run in three passes: additive (flat and per-card bonuses),
//! multiplicative, then economy. Inside a pass the acquisition number decides
//! the order.

use crate::{apply_traced, Card, HandCategory, Rank, RuleEffect, Score, ScoreTraceStep, Suit};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JokerRarity {
    Common,
    Uncommon,
    Rare,
    UltraRare,
}

impl JokerRarity {
    pub const ALL: [JokerRarity; 4] = [
        JokerRarity::Common,
        JokerRarity::Uncommon,
        JokerRarity::Rare,
        JokerRarity::UltraRare,
    ];
}

/// What a joker looks at before it fires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trigger {
    Always,
    Category(HandCategory),
    Suit(Suit),
    Face,
    /// Cards of this rank left in hand, not played.
    HeldRank(Rank),
}

impl Trigger {
    fn card_matches(self, card: &Card) -> bool {
        match self {
            Trigger::Always => true,
            Trigger::Category(_) => false,
            Trigger::HeldRank(rank) => card.rank == rank,
            Trigger::Suit(suit) => card.suit == suit,
            Trigger::Face => card.rank.is_face(),
        }
    }

    /// How many times the trigger fires for this hand: 0 or 1 for
    /// category and unconditional triggers, one per matching selected card
    /// for card triggers, one per matching held card for `HeldRank`.
    pub fn matches(self, context: &ScoringContext<'_>) -> usize {
        match self {
            Trigger::Always => 1,
            Trigger::Category(category) => usize::from(context.category == category),
            Trigger::Suit(_) | Trigger::Face => context
                .selection
                .iter()
                .filter(|card| self.card_matches(card))
                .count(),
            Trigger::HeldRank(_) => context
                .held
                .iter()
                .filter(|card| self.card_matches(card))
                .count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Bonus {
    #[serde(default)]
    pub chips: i64,
    #[serde(default)]
    pub mult: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum JokerEffect {
    /// Flat bonus once when the trigger matches at all.
    Additive(Bonus),
    /// Multiplies the running mult once when the trigger matches.
    Multiplicative(f64),
    /// Bonus once per match, e.g. per Heart in the selection.
    Conditional(Bonus),
    /// Currency granted when the trigger matches; never touches the score.
    Money(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JokerPhase {
    Additive,
    Multiplicative,
    Economy,
}

impl JokerEffect {
    pub fn phase(&self) -> JokerPhase {
        match self {
            JokerEffect::Additive(_) | JokerEffect::Conditional(_) => JokerPhase::Additive,
            JokerEffect::Multiplicative(_) => JokerPhase::Multiplicative,
            JokerEffect::Money(_) => JokerPhase::Economy,
        }
    }
}

/// Catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JokerDef {
    pub id: String,
    pub name: String,
    pub rarity: JokerRarity,
    pub price: i64,
    pub effect: JokerEffect,
    pub trigger: Trigger,
    /// How many copies the shop can ever offer.
    #[serde(default = "default_stock")]
    pub stock: u32,
}

fn default_stock() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnedJoker {
    pub id: String,
    pub name: String,
    pub rarity: JokerRarity,
    pub effect: JokerEffect,
    pub trigger: Trigger,
    pub price_paid: i64,
    /// Acquisition sequence number; lower fires first within a phase.
    pub acquired: u32,
}

impl OwnedJoker {
    pub fn from_def(def: &JokerDef, price_paid: i64, acquired: u32) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            rarity: def.rarity,
            effect: def.effect,
            trigger: def.trigger,
            price_paid,
            acquired,
        }
    }
}

/// What the jokers see: the evaluated category, the played selection and
/// the cards still held.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub category: HandCategory,
    pub selection: &'a [Card],
    pub held: &'a [Card],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JokerOutcome {
    pub money: i64,
    pub trace: Vec<ScoreTraceStep>,
    /// Ids of jokers that fired, in firing order.
    pub fired: Vec<String>,
}

/// Runs every owned joker against `score`. Money is reported, not applied.
pub fn apply_jokers(
    jokers: &[OwnedJoker],
    context: &ScoringContext<'_>,
    score: &mut Score,
) -> JokerOutcome {
    let mut ordered: Vec<&OwnedJoker> = jokers.iter().collect();
    ordered.sort_by_key(|joker| joker.acquired);

    let mut outcome = JokerOutcome::default();
    for phase in [
        JokerPhase::Additive,
        JokerPhase::Multiplicative,
        JokerPhase::Economy,
    ] {
        for joker in ordered.iter().filter(|joker| joker.effect.phase() == phase) {
            let hits = joker.trigger.matches(context);
            if hits == 0 {
                continue;
            }
            apply_one(joker, hits, score, &mut outcome);
            outcome.fired.push(joker.id.clone());
        }
    }
    outcome
}

fn apply_one(joker: &OwnedJoker, hits: usize, score: &mut Score, outcome: &mut JokerOutcome) {
    match joker.effect {
        JokerEffect::Additive(bonus) => apply_bonus(joker, bonus, score, outcome),
        JokerEffect::Conditional(bonus) => {
            for _ in 0..hits {
                apply_bonus(joker, bonus, score, outcome);
            }
        }
        JokerEffect::Multiplicative(factor) => {
            apply_traced(
                score,
                RuleEffect::MultiplyMult(factor),
                &joker.id,
                &mut outcome.trace,
            );
        }
        JokerEffect::Money(amount) => {
            outcome.money += amount;
        }
    }
    trace!(joker = %joker.id, hits, chips = score.chips, mult = score.mult, "joker fired");
}

fn apply_bonus(joker: &OwnedJoker, bonus: Bonus, score: &mut Score, outcome: &mut JokerOutcome) {
    if bonus.chips != 0 {
        apply_traced(
            score,
            RuleEffect::AddChips(bonus.chips),
            &joker.id,
            &mut outcome.trace,
        );
    }
    if bonus.mult != 0.0 {
        apply_traced(
            score,
            RuleEffect::AddMult(bonus.mult),
            &joker.id,
            &mut outcome.trace,
        );
    }
}

/// Built-in catalog, mirroring the shop of the original game plus a few
/// category- and money-triggered jokers.
pub fn default_jokers() -> Vec<JokerDef> {
    vec![
        JokerDef {
            id: "multiplier".to_string(),
            name: "Multiplier Joker".to_string(),
            rarity: JokerRarity::Common,
            price: 5,
            effect: JokerEffect::Additive(Bonus { chips: 0, mult: 5.0 }),
            trigger: Trigger::Always,
            stock: 4,
        },
        JokerDef {
            id: "spade_collector".to_string(),
            name: "Spade Collector".to_string(),
            rarity: JokerRarity::Common,
            price: 5,
            effect: JokerEffect::Conditional(Bonus { chips: 15, mult: 0.0 }),
            trigger: Trigger::Suit(Suit::Spades),
            stock: 4,
        },
        JokerDef {
            id: "lucky_pair".to_string(),
            name: "Lucky Pair".to_string(),
            rarity: JokerRarity::Common,
            price: 4,
            effect: JokerEffect::Money(2),
            trigger: Trigger::Category(HandCategory::Pair),
            stock: 4,
        },
        JokerDef {
            id: "heart_snake".to_string(),
            name: "Heart Snake".to_string(),
            rarity: JokerRarity::Uncommon,
            price: 20,
            effect: JokerEffect::Conditional(Bonus { chips: 0, mult: 2.0 }),
            trigger: Trigger::Suit(Suit::Hearts),
            stock: 3,
        },
        JokerDef {
            id: "flush_fan".to_string(),
            name: "Flush Fan".to_string(),
            rarity: JokerRarity::Uncommon,
            price: 7,
            effect: JokerEffect::Additive(Bonus { chips: 0, mult: 8.0 }),
            trigger: Trigger::Category(HandCategory::Flush),
            stock: 3,
        },
        JokerDef {
            id: "moon".to_string(),
            name: "Moon Joker".to_string(),
            rarity: JokerRarity::Rare,
            price: 8,
            effect: JokerEffect::Multiplicative(4.0),
            trigger: Trigger::Always,
            stock: 2,
        },
        JokerDef {
            id: "twin_peaks".to_string(),
            name: "Twin Peaks".to_string(),
            rarity: JokerRarity::Rare,
            price: 10,
            effect: JokerEffect::Multiplicative(2.0),
            trigger: Trigger::Category(HandCategory::TwoPair),
            stock: 2,
        },
        JokerDef {
            id: "castle".to_string(),
            name: "Castle Joker".to_string(),
            rarity: JokerRarity::UltraRare,
            price: 40,
            effect: JokerEffect::Conditional(Bonus { chips: 50, mult: 0.0 }),
            trigger: Trigger::Face,
            stock: 1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rank;

    fn owned(id: &str, effect: JokerEffect, trigger: Trigger, acquired: u32) -> OwnedJoker {
        OwnedJoker {
            id: id.to_string(),
            name: id.to_string(),
            rarity: JokerRarity::Common,
            effect,
            trigger,
            price_paid: 0,
            acquired,
        }
    }

    #[test]
    fn conditional_fires_once_per_matching_card() {
        let selection = [
            Card::new(Rank::Two, Suit::Hearts),
            Card::new(Rank::Two, Suit::Spades),
            Card::new(Rank::Nine, Suit::Hearts),
        ];
        let context = ScoringContext {
            category: HandCategory::Pair,
            selection: &selection,
            held: &[],
        };
        let jokers = [owned(
            "snake",
            JokerEffect::Conditional(Bonus { chips: 0, mult: 2.0 }),
            Trigger::Suit(Suit::Hearts),
            0,
        )];
        let mut score = Score::new(4, 2.0);
        let outcome = apply_jokers(&jokers, &context, &mut score);
        assert_eq!(score, Score::new(4, 6.0));
        assert_eq!(outcome.trace.len(), 2);
    }

    #[test]
    fn category_mismatch_contributes_nothing() {
        let selection = [Card::new(Rank::Ace, Suit::Clubs)];
        let context = ScoringContext {
            category: HandCategory::HighCard,
            selection: &selection,
            held: &[],
        };
        let jokers = [
            owned(
                "fan",
                JokerEffect::Additive(Bonus { chips: 0, mult: 8.0 }),
                Trigger::Category(HandCategory::Flush),
                0,
            ),
            owned(
                "pair_money",
                JokerEffect::Money(3),
                Trigger::Category(HandCategory::Pair),
                1,
            ),
        ];
        let mut score = Score::new(11, 1.0);
        let outcome = apply_jokers(&jokers, &context, &mut score);
        assert_eq!(score, Score::new(11, 1.0));
        assert_eq!(outcome.money, 0);
        assert!(outcome.fired.is_empty());
    }

    #[test]
    fn money_jokers_do_not_touch_the_score() {
        let selection = [
            Card::new(Rank::Five, Suit::Clubs),
            Card::new(Rank::Five, Suit::Hearts),
        ];
        let context = ScoringContext {
            category: HandCategory::Pair,
            selection: &selection,
            held: &[],
        };
        let jokers = [owned(
            "purse",
            JokerEffect::Money(2),
            Trigger::Category(HandCategory::Pair),
            0,
        )];
        let mut score = Score::new(10, 2.0);
        let outcome = apply_jokers(&jokers, &context, &mut score);
        assert_eq!(score, Score::new(10, 2.0));
        assert_eq!(outcome.money, 2);
        assert_eq!(outcome.fired, vec!["purse".to_string()]);
    }

    #[test]
    fn held_rank_counts_only_cards_left_in_hand() {
        let selection = [
            Card::new(Rank::King, Suit::Clubs),
            Card::new(Rank::King, Suit::Hearts),
        ];
        let held = [
            Card::new(Rank::King, Suit::Spades),
            Card::new(Rank::Queen, Suit::Spades),
            Card::new(Rank::Queen, Suit::Diamonds),
        ];
        let context = ScoringContext {
            category: HandCategory::Pair,
            selection: &selection,
            held: &held,
        };
        let jokers = [owned(
            "court",
            JokerEffect::Conditional(Bonus { chips: 0, mult: 3.0 }),
            Trigger::HeldRank(Rank::Queen),
            0,
        )];
        let mut score = Score::new(30, 2.0);
        let outcome = apply_jokers(&jokers, &context, &mut score);
        assert_eq!(score, Score::new(30, 8.0));
        assert_eq!(outcome.trace.len(), 2);

        let none_held = ScoringContext { held: &[], ..context };
        let mut score = Score::new(30, 2.0);
        apply_jokers(&jokers, &none_held, &mut score);
        assert_eq!(score, Score::new(30, 2.0));
    }

    #[test]
    fn default_catalog_ids_are_unique() {
        let jokers = default_jokers();
        let mut ids: Vec<&str> = jokers.iter().map(|joker| joker.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), jokers.len());
    }
}
