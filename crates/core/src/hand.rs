use crate::{Card, Rank};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandCategory {
    /// Lowest to highest precedence.
    pub const ALL: [HandCategory; 9] = [
        HandCategory::HighCard,
        HandCategory::Pair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
    ];

    pub fn id(self) -> &'static str {
        match self {
            HandCategory::HighCard => "high_card",
            HandCategory::Pair => "pair",
            HandCategory::TwoPair => "two_pair",
            HandCategory::ThreeOfAKind => "three_of_a_kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full_house",
            HandCategory::FourOfAKind => "four_of_a_kind",
            HandCategory::StraightFlush => "straight_flush",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }

    /// Selection size below which the category can never be produced.
    pub fn min_cards(self) -> usize {
        match self {
            HandCategory::HighCard => 1,
            HandCategory::Pair => 2,
            HandCategory::ThreeOfAKind => 3,
            HandCategory::TwoPair | HandCategory::FourOfAKind => 4,
            HandCategory::Straight
            | HandCategory::Flush
            | HandCategory::FullHouse
            | HandCategory::StraightFlush => 5,
        }
    }

    pub fn default_multiplier(self) -> f64 {
        match self {
            HandCategory::HighCard => 1.0,
            HandCategory::Pair => 2.0,
            HandCategory::TwoPair => 3.0,
            HandCategory::ThreeOfAKind => 3.0,
            HandCategory::Straight => 4.0,
            HandCategory::Flush => 4.0,
            HandCategory::FullHouse => 4.0,
            HandCategory::FourOfAKind => 6.0,
            HandCategory::StraightFlush => 8.0,
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        HandCategory::ALL
            .iter()
            .copied()
            .find(|category| category.id() == value)
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of classifying a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandEvaluation {
    pub category: HandCategory,
    /// Indices into the evaluated selection of the cards that score.
    pub scoring_indices: Vec<usize>,
    /// Highest contributing rank, used to describe ties. The wheel
    /// (A-2-3-4-5) reports its Five.
    pub high_rank: Option<Rank>,
}

/// Classifies the selection alone; cards left in hand never count.
pub fn evaluate_hand(cards: &[Card]) -> HandEvaluation {
    if cards.is_empty() {
        return HandEvaluation {
            category: HandCategory::HighCard,
            scoring_indices: Vec::new(),
            high_rank: None,
        };
    }

    let mut rank_counts = [0u8; 15];
    for card in cards {
        rank_counts[card.rank.value() as usize] += 1;
    }
    // (count, value) for each rank present, biggest group first.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .filter(|value| rank_counts[*value as usize] > 0)
        .map(|value| (rank_counts[value as usize], value))
        .collect();
    groups.sort_by(|a, b| b.cmp(a));
    let shape: Vec<u8> = groups.iter().map(|(count, _)| *count).collect();

    let len = cards.len();
    let flush = len == 5 && cards.iter().all(|card| card.suit == cards[0].suit);
    let straight_high = if len == 5 && shape.len() == 5 {
        straight_high_value(&groups)
    } else {
        None
    };

    let category = if flush && straight_high.is_some() {
        HandCategory::StraightFlush
    } else if shape[0] == 4 {
        HandCategory::FourOfAKind
    } else if shape == [3, 2] {
        HandCategory::FullHouse
    } else if flush {
        HandCategory::Flush
    } else if straight_high.is_some() {
        HandCategory::Straight
    } else if shape[0] == 3 {
        HandCategory::ThreeOfAKind
    } else if shape.len() >= 2 && shape[0] == 2 && shape[1] == 2 {
        HandCategory::TwoPair
    } else if shape[0] == 2 {
        HandCategory::Pair
    } else {
        HandCategory::HighCard
    };

    let scoring_indices = scoring_indices(cards, category, &groups);
    let high_rank = match category {
        HandCategory::Straight | HandCategory::StraightFlush => {
            straight_high.and_then(Rank::from_value)
        }
        _ => scoring_indices
            .iter()
            .map(|idx| cards[*idx].rank)
            .max(),
    };

    HandEvaluation {
        category,
        scoring_indices,
        high_rank,
    }
}

fn straight_high_value(groups: &[(u8, u8)]) -> Option<u8> {
    let mut values: Vec<u8> = groups.iter().map(|(_, value)| *value).collect();
    values.sort_unstable();
    if values == [2, 3, 4, 5, 14] {
        return Some(5);
    }
    if values[4] - values[0] == 4 {
        return Some(values[4]);
    }
    None
}

fn scoring_indices(cards: &[Card], category: HandCategory, groups: &[(u8, u8)]) -> Vec<usize> {
    let matched_values: Vec<u8> = match category {
        HandCategory::Straight
        | HandCategory::Flush
        | HandCategory::FullHouse
        | HandCategory::StraightFlush => return (0..cards.len()).collect(),
        HandCategory::HighCard => {
            return highest_card_index(cards).into_iter().collect();
        }
        HandCategory::Pair | HandCategory::ThreeOfAKind | HandCategory::FourOfAKind => {
            groups.iter().take(1).map(|(_, value)| *value).collect()
        }
        HandCategory::TwoPair => groups.iter().take(2).map(|(_, value)| *value).collect(),
    };
    (0..cards.len())
        .filter(|idx| matched_values.contains(&cards[*idx].rank.value()))
        .collect()
}

fn highest_card_index(cards: &[Card]) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (idx, card) in cards.iter().enumerate() {
        let value = card.rank.value();
        if best.map(|(_, v)| value > v).unwrap_or(true) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Suit;

    fn cards(text: &str) -> Vec<Card> {
        text.split_whitespace()
            .map(|token| Card::parse(token).unwrap())
            .collect()
    }

    macro_rules! category_case {
        ($name:ident, $cards:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(evaluate_hand(&cards($cards)).category, $expected);
            }
        };
    }

    category_case!(single_card_is_high_card, "KS", HandCategory::HighCard);
    category_case!(two_of_a_rank_is_pair, "4H 4D", HandCategory::Pair);
    category_case!(three_of_a_rank, "9C 9H 9S", HandCategory::ThreeOfAKind);
    category_case!(four_cards_two_pair, "9C 9H 3S 3D", HandCategory::TwoPair);
    category_case!(four_cards_quads, "7C 7H 7S 7D", HandCategory::FourOfAKind);
    category_case!(quads_with_kicker, "7C 7H 7S 7D 2H", HandCategory::FourOfAKind);
    category_case!(full_house, "4H 4D 4S 9C 9H", HandCategory::FullHouse);
    category_case!(flush, "2H 7H 9H JH KH", HandCategory::Flush);
    category_case!(straight, "5C 6D 7H 8S 9C", HandCategory::Straight);
    category_case!(wheel_straight, "AC 2D 3H 4S 5C", HandCategory::Straight);
    category_case!(broadway_straight, "10C JD QH KS AC", HandCategory::Straight);
    category_case!(no_wraparound, "QC KD AH 2S 3C", HandCategory::HighCard);
    category_case!(straight_flush, "5S 6S 7S 8S 9S", HandCategory::StraightFlush);
    category_case!(royal_is_straight_flush, "10H JH QH KH AH", HandCategory::StraightFlush);
    category_case!(four_suited_cards_are_not_flush, "2H 7H 9H JH", HandCategory::HighCard);
    category_case!(four_run_is_not_straight, "5C 6D 7H 8S", HandCategory::HighCard);
    category_case!(five_card_two_pair, "QC QD 5H 5S 2C", HandCategory::TwoPair);
    category_case!(five_card_trips, "QC QD QH 5S 2C", HandCategory::ThreeOfAKind);

    #[test]
    fn pair_scores_only_the_pair() {
        let hand = cards("4H KD 4S 9C 2H");
        let eval = evaluate_hand(&hand);
        assert_eq!(eval.category, HandCategory::Pair);
        assert_eq!(eval.scoring_indices, vec![0, 2]);
        assert_eq!(eval.high_rank, Some(Rank::Four));
    }

    #[test]
    fn two_pair_scores_both_pairs() {
        let hand = cards("QC 2D 5H 5S QD");
        let eval = evaluate_hand(&hand);
        assert_eq!(eval.scoring_indices, vec![0, 2, 3, 4]);
        assert_eq!(eval.high_rank, Some(Rank::Queen));
    }

    #[test]
    fn high_card_scores_the_highest_card() {
        let hand = cards("3C JD 9H");
        let eval = evaluate_hand(&hand);
        assert_eq!(eval.category, HandCategory::HighCard);
        assert_eq!(eval.scoring_indices, vec![1]);
        assert_eq!(eval.high_rank, Some(Rank::Jack));
    }

    #[test]
    fn wheel_reports_five_high() {
        let eval = evaluate_hand(&cards("AC 2D 3H 4S 5C"));
        assert_eq!(eval.high_rank, Some(Rank::Five));
        assert_eq!(eval.scoring_indices.len(), 5);
    }

    #[test]
    fn empty_selection_is_high_card_without_scorers() {
        let eval = evaluate_hand(&[]);
        assert_eq!(eval.category, HandCategory::HighCard);
        assert!(eval.scoring_indices.is_empty());
        assert_eq!(eval.high_rank, None);
    }

    #[test]
    fn small_selections_never_reach_five_card_categories() {
        let suited = [
            Card::new(Rank::Ten, Suit::Hearts),
            Card::new(Rank::Jack, Suit::Hearts),
            Card::new(Rank::Queen, Suit::Hearts),
            Card::new(Rank::King, Suit::Hearts),
        ];
        for len in 1..=4 {
            let category = evaluate_hand(&suited[..len]).category;
            assert!(category.min_cards() <= len);
            assert_eq!(category, HandCategory::HighCard);
        }
    }

    #[test]
    fn ids_round_trip() {
        for category in HandCategory::ALL {
            assert_eq!(HandCategory::from_id(category.id()), Some(category));
        }
    }
}
