use crate::{Card, RngState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("card {0} is not in the expected pile")]
    InvalidCardReference(Card),
    #[error("deck invariant broken: missing {missing:?}, duplicated {duplicated:?}")]
    InvariantBroken {
        missing: Vec<Card>,
        duplicated: Vec<Card>,
    },
}

/// The 52 cards split across draw pile, hand and discard pile. The draw pile
/// is dealt from the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub draw: Vec<Card>,
    pub hand: Vec<Card>,
    pub discard: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard52()
    }
}

impl Deck {
    pub fn standard52() -> Self {
        Self {
            draw: Card::full_set(),
            hand: Vec::new(),
            discard: Vec::new(),
        }
    }

    /// Rebuilds the draw pile from all 52 cards in canonical order and
    /// shuffles it, so the result depends only on the generator state.
    pub fn shuffle(&mut self, rng: &mut RngState) {
        self.draw = Card::full_set();
        self.hand.clear();
        self.discard.clear();
        rng.shuffle(&mut self.draw);
        self.debug_check();
    }

    /// Moves up to `count` cards into the hand and returns how many moved.
    /// An exhausted draw pile takes the discard pile back mid-draw.
    pub fn draw(&mut self, count: usize, rng: &mut RngState) -> usize {
        let mut drawn = 0;
        while drawn < count {
            if self.draw.is_empty() {
                self.reshuffle_discard(rng);
            }
            match self.draw.pop() {
                Some(card) => {
                    self.hand.push(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        self.debug_check();
        drawn
    }

    /// Moves the given cards from the hand to the discard pile. Nothing moves
    /// unless every card is in the hand.
    pub fn discard(&mut self, cards: &[Card]) -> Result<(), DeckError> {
        for (pos, card) in cards.iter().enumerate() {
            let repeated = cards[..pos].contains(card);
            if repeated || !self.hand.contains(card) {
                return Err(DeckError::InvalidCardReference(*card));
            }
        }
        for card in cards {
            if let Some(idx) = self.hand.iter().position(|held| held == card) {
                let card = self.hand.remove(idx);
                self.discard.push(card);
            }
        }
        self.debug_check();
        Ok(())
    }

    /// Returns hand and discard to the draw pile and reshuffles it.
    pub fn reset_round(&mut self, rng: &mut RngState) {
        self.draw.append(&mut self.hand);
        self.draw.append(&mut self.discard);
        rng.shuffle(&mut self.draw);
        self.debug_check();
    }

    pub fn reshuffle_discard(&mut self, rng: &mut RngState) {
        if self.discard.is_empty() {
            return;
        }
        self.draw.append(&mut self.discard);
        rng.shuffle(&mut self.draw);
    }

    pub fn total(&self) -> usize {
        self.draw.len() + self.hand.len() + self.discard.len()
    }

    pub fn check_invariant(&self) -> Result<(), DeckError> {
        let mut seen = [0u8; 52];
        let piles = self.draw.iter().chain(&self.hand).chain(&self.discard);
        for card in piles {
            seen[card_slot(card)] = seen[card_slot(card)].saturating_add(1);
        }
        let full = Card::full_set();
        let missing: Vec<Card> = full
            .iter()
            .copied()
            .filter(|card| seen[card_slot(card)] == 0)
            .collect();
        let duplicated: Vec<Card> = full
            .iter()
            .copied()
            .filter(|card| seen[card_slot(card)] > 1)
            .collect();
        if missing.is_empty() && duplicated.is_empty() {
            Ok(())
        } else {
            Err(DeckError::InvariantBroken {
                missing,
                duplicated,
            })
        }
    }

    fn debug_check(&self) {
        debug_assert!(self.check_invariant().is_ok(), "deck invariant broken");
    }
}

fn card_slot(card: &Card) -> usize {
    let suit = crate::Suit::ALL
        .iter()
        .position(|suit| *suit == card.suit)
        .unwrap_or(0);
    suit * 13 + (card.rank.value() as usize - 2)
}
