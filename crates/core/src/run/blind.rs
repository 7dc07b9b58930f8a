use super::*;
use crate::*;
use tracing::{debug, info};

const DEBUFFS: [BossDebuff; 2] = [BossDebuff::PlayFiveCards, BossDebuff::HalvedBase];

impl Run {
    pub(super) fn start_encounter(
        &mut self,
        kind: EncounterKind,
        phase: Phase,
    ) -> Result<(), RunError> {
        let node = self.current.unwrap_or_else(|| self.map.start());
        let rule = self.config.encounter_rule(kind);
        let target = self.config.target_for(node.depth, kind);
        let debuff = if kind.has_debuff() {
            self.roll_debuff()
        } else {
            None
        };

        self.deck.reset_round(&mut self.rng);
        let dealt = self.deck.draw(self.config.run.hand_size, &mut self.rng);
        self.encounter = Some(Encounter {
            kind,
            node,
            target,
            score: 0,
            hands_left: rule.hands,
            discards_left: rule.discards,
            debuff,
            last_hand: None,
        });
        self.phase = phase;

        debug!(?kind, depth = node.depth, target, ?debuff, "encounter started");
        self.events.push(Event::EncounterStarted {
            kind,
            depth: node.depth,
            target,
            hands: rule.hands,
            discards: rule.discards,
            debuff,
        });
        self.events.push(Event::HandDealt { count: dealt });
        Ok(())
    }

    fn roll_debuff(&mut self) -> Option<BossDebuff> {
        // Five-card hands are impossible under a smaller selection cap.
        let five_allowed = self.config.run.max_selection >= 5 && self.config.run.hand_size >= 5;
        let pool: &[BossDebuff] = if five_allowed {
            &DEBUFFS
        } else {
            &DEBUFFS[1..]
        };
        self.rng.index(pool.len()).map(|idx| pool[idx])
    }

    /// Settles the encounter after a hand: pays out on a clear, ends the run
    /// on the Boss or when hands run out.
    pub(super) fn settle_encounter(&mut self) {
        let Some(encounter) = self.encounter.as_ref() else {
            return;
        };
        if encounter.cleared() {
            let rule = self.config.encounter_rule(encounter.kind);
            let reward = rule.reward
                + self.config.economy.per_hand_reward * encounter.hands_left as i64;
            let score = encounter.score;
            let kind = encounter.kind;
            self.money += reward;
            self.encounter = None;
            self.events.push(Event::EncounterCleared {
                score,
                reward,
                money: self.money,
            });
            if kind == EncounterKind::Boss {
                self.phase = Phase::RunWon;
                info!(money = self.money, "run won");
                self.events.push(Event::RunWon { money: self.money });
            } else {
                self.phase = Phase::AtNode;
            }
        } else if encounter.hands_left == 0 {
            let (score, target) = (encounter.score, encounter.target);
            self.phase = Phase::RunLost;
            info!(depth = self.depth(), score, target, "run lost");
            self.events.push(Event::EncounterFailed { score, target });
            self.events.push(Event::RunLost {
                depth: self.depth(),
            });
        }
    }
}
