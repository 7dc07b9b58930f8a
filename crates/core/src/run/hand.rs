use super::*;
use crate::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of scoring a selection, returned by both `play_hand` and
/// `preview_hand`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub category: HandCategory,
    pub level: u32,
    pub high_rank: Option<Rank>,
    pub scoring_cards: Vec<Card>,
    /// Before jokers, after any boss debuff.
    pub base: Score,
    pub score: Score,
    pub total: i64,
    pub money: i64,
    pub trace: Vec<ScoreTraceStep>,
    /// Encounter score after this hand (projected for previews).
    pub encounter_score: i64,
    pub target: i64,
    pub cleared: bool,
}

impl Run {
    pub fn play_hand(&mut self, indices: &[usize]) -> Result<ScoreOutcome, RunError> {
        self.require_phase(
            "play a hand",
            &[Phase::InDealerEncounter, Phase::InRandomEncounter],
        )?;
        let (hands_left, debuff) = self.encounter_limits()?;
        if hands_left == 0 {
            return Err(SelectionError::NoHandsLeft.into());
        }
        let selected = self.select(indices, debuff)?;
        let outcome = self.score_cards(&selected, debuff);

        self.deck.discard(&selected)?;
        self.money += outcome.money;
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.score = outcome.encounter_score;
            encounter.hands_left -= 1;
            encounter.last_hand = Some(outcome.category);
        }
        self.refill_hand();

        debug!(
            category = %outcome.category,
            chips = outcome.score.chips,
            mult = outcome.score.mult,
            total = outcome.total,
            "hand scored"
        );
        self.events.push(Event::HandScored {
            category: outcome.category,
            chips: outcome.score.chips,
            mult: outcome.score.mult,
            total: outcome.total,
            encounter_score: outcome.encounter_score,
        });
        if outcome.money != 0 {
            self.events.push(Event::JokerPaid {
                amount: outcome.money,
                money: self.money,
            });
        }
        self.settle_encounter();
        Ok(outcome)
    }

    /// Scores the selection without touching the run.
    pub fn preview_hand(&self, indices: &[usize]) -> Result<ScoreOutcome, RunError> {
        self.require_phase(
            "preview a hand",
            &[Phase::InDealerEncounter, Phase::InRandomEncounter],
        )?;
        let (_, debuff) = self.encounter_limits()?;
        let selected = self.select(indices, debuff)?;
        Ok(self.score_cards(&selected, debuff))
    }

    pub fn discard(&mut self, indices: &[usize]) -> Result<(), RunError> {
        self.require_phase(
            "discard",
            &[Phase::InDealerEncounter, Phase::InRandomEncounter],
        )?;
        let discards_left = self
            .encounter
            .as_ref()
            .map(|encounter| encounter.discards_left)
            .unwrap_or(0);
        if discards_left == 0 {
            return Err(SelectionError::NoDiscardsLeft.into());
        }
        let selected = self.select(indices, None)?;
        self.deck.discard(&selected)?;
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.discards_left -= 1;
        }
        self.refill_hand();
        self.events.push(Event::CardsDiscarded {
            count: selected.len(),
        });
        Ok(())
    }

    fn encounter_limits(&self) -> Result<(u8, Option<BossDebuff>), RunError> {
        self.encounter
            .as_ref()
            .map(|encounter| (encounter.hands_left, encounter.debuff))
            .ok_or_else(|| {
                TransitionError::WrongPhase {
                    action: "score",
                    phase: self.phase,
                }
                .into()
            })
    }

    /// Resolves hand indices to cards, in selection order.
    fn select(&self, indices: &[usize], debuff: Option<BossDebuff>) -> Result<Vec<Card>, RunError> {
        if indices.is_empty() {
            return Err(SelectionError::Empty.into());
        }
        let max = self.config.run.max_selection;
        if indices.len() > max {
            return Err(SelectionError::TooMany {
                count: indices.len(),
                max,
            }
            .into());
        }
        let mut cards = Vec::with_capacity(indices.len());
        for (pos, idx) in indices.iter().enumerate() {
            if indices[..pos].contains(idx) {
                return Err(SelectionError::Duplicate(*idx).into());
            }
            let card = self
                .deck
                .hand
                .get(*idx)
                .copied()
                .ok_or(SelectionError::OutOfRange(*idx))?;
            cards.push(card);
        }
        if debuff == Some(BossDebuff::PlayFiveCards) && cards.len() != 5 {
            return Err(SelectionError::MustPlayFive(cards.len()).into());
        }
        Ok(cards)
    }

    fn score_cards(&self, selected: &[Card], debuff: Option<BossDebuff>) -> ScoreOutcome {
        let breakdown = score_selection(selected, &self.tables, &self.hand_levels);
        let mut base = breakdown.base.clone();
        if debuff == Some(BossDebuff::HalvedBase) {
            base.chips /= 2;
        }
        let held: Vec<Card> = self
            .deck
            .hand
            .iter()
            .filter(|card| !selected.contains(card))
            .copied()
            .collect();
        let context = ScoringContext {
            category: breakdown.category,
            selection: selected,
            held: &held,
        };
        let mut score = base.clone();
        let jokers = apply_jokers(&self.jokers, &context, &mut score);
        let total = score.total();

        let (current, target) = self
            .encounter
            .as_ref()
            .map(|encounter| (encounter.score, encounter.target))
            .unwrap_or((0, 0));
        let encounter_score = current.saturating_add(total);
        ScoreOutcome {
            category: breakdown.category,
            level: breakdown.level,
            high_rank: breakdown.high_rank,
            scoring_cards: breakdown
                .scoring_indices
                .iter()
                .map(|idx| selected[*idx])
                .collect(),
            base,
            score,
            total,
            money: jokers.money,
            trace: jokers.trace,
            encounter_score,
            target,
            cleared: encounter_score >= target,
        }
    }

    fn refill_hand(&mut self) {
        let missing = self
            .config
            .run
            .hand_size
            .saturating_sub(self.deck.hand.len());
        if missing == 0 {
            return;
        }
        let dealt = self.deck.draw(missing, &mut self.rng);
        self.events.push(Event::HandDealt { count: dealt });
    }
}
