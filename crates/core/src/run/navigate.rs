use super::*;
use crate::*;
use tracing::debug;

impl Run {
    /// Moves to `id` and resolves its room. Only the start node (before the
    /// first move) or a successor of the current node is accepted.
    pub fn choose_next_node(&mut self, id: NodeId) -> Result<(), RunError> {
        self.require_phase("choose a node", &[Phase::AtNode])?;
        if !self.reachable_nodes().contains(&id) {
            return Err(TransitionError::NotReachable(id).into());
        }
        let room = self
            .map
            .node(id)
            .map(|node| node.room)
            .ok_or(TransitionError::NotReachable(id))?;

        if let Some(node) = self.map.node_mut(id) {
            node.visited = true;
        }
        self.current = Some(id);
        debug!(node = %id, room = room.label(), "entered node");
        self.events.push(Event::NodeEntered { node: id, room });

        match room {
            RoomType::Dealer => {
                self.start_encounter(EncounterKind::Dealer, Phase::InDealerEncounter)
            }
            RoomType::Boss => self.start_encounter(EncounterKind::Boss, Phase::InDealerEncounter),
            RoomType::Shop => self.enter_shop(),
            RoomType::Reward => {
                self.collect_reward();
                Ok(())
            }
            RoomType::Random => {
                let outcome = self.roll_random_outcome(id.depth);
                self.events.push(Event::RandomResolved { node: id, outcome });
                match outcome {
                    RandomOutcome::Reward => {
                        self.collect_reward();
                        Ok(())
                    }
                    RandomOutcome::SmallBoss => {
                        self.start_encounter(EncounterKind::SmallBoss, Phase::InRandomEncounter)
                    }
                    RandomOutcome::BigBoss => {
                        self.start_encounter(EncounterKind::BigBoss, Phase::InRandomEncounter)
                    }
                }
            }
        }
    }

    fn collect_reward(&mut self) {
        let Some(reward) = roll_reward(&self.config.economy, &mut self.rng) else {
            return;
        };
        self.money += reward.amount;
        debug!(tier = ?reward.tier, amount = reward.amount, money = self.money, "reward");
        self.events.push(Event::RewardCollected {
            tier: reward.tier,
            amount: reward.amount,
            money: self.money,
        });
    }

    /// Reward weight drifts against recent outcomes: down after rewards,
    /// up after fights, the latest room counting the most.
    pub fn random_weights(&self, depth: u8) -> [u32; 3] {
        let rule = &self.config.random_room;
        let boss_bonus = rule.boss_weight_per_depth.saturating_mul(depth as u32);
        let mut reward = rule.reward_weight as i64;
        for (age, outcome) in self
            .random_history
            .iter()
            .rev()
            .take(RANDOM_HISTORY)
            .enumerate()
        {
            let shift = rule.streak_step as i64 * (RANDOM_HISTORY - age) as i64;
            match outcome {
                RandomOutcome::Reward => reward -= shift,
                RandomOutcome::SmallBoss | RandomOutcome::BigBoss => reward += shift,
            }
        }
        [
            reward.max(0) as u32,
            rule.small_boss_weight + boss_bonus,
            rule.big_boss_weight + boss_bonus,
        ]
    }

    fn roll_random_outcome(&mut self, depth: u8) -> RandomOutcome {
        let weights = self.random_weights(depth);
        let outcome = match self.rng.pick_weighted(&weights) {
            Some(1) => RandomOutcome::SmallBoss,
            Some(2) => RandomOutcome::BigBoss,
            _ => RandomOutcome::Reward,
        };
        self.random_history.push(outcome);
        if self.random_history.len() > RANDOM_HISTORY {
            self.random_history.remove(0);
        }
        outcome
    }
}
