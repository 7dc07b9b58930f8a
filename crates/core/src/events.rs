use crate::{BossDebuff, EncounterKind, HandCategory, NodeId, RandomOutcome, RewardTier, RoomType};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RunStarted {
        seed: u64,
        depth: u8,
        money: i64,
    },
    NodeEntered {
        node: NodeId,
        room: RoomType,
    },
    RandomResolved {
        node: NodeId,
        outcome: RandomOutcome,
    },
    RewardCollected {
        tier: RewardTier,
        amount: i64,
        money: i64,
    },
    EncounterStarted {
        kind: EncounterKind,
        depth: u8,
        target: i64,
        hands: u8,
        discards: u8,
        debuff: Option<BossDebuff>,
    },
    HandDealt {
        count: usize,
    },
    HandScored {
        category: HandCategory,
        chips: i64,
        mult: f64,
        total: i64,
        encounter_score: i64,
    },
    JokerPaid {
        amount: i64,
        money: i64,
    },
    CardsDiscarded {
        count: usize,
    },
    EncounterCleared {
        score: i64,
        reward: i64,
        money: i64,
    },
    EncounterFailed {
        score: i64,
        target: i64,
    },
    ShopEntered {
        offers: usize,
    },
    JokerBought {
        id: String,
        price: i64,
        money: i64,
    },
    HandUpgraded {
        category: HandCategory,
        level: u32,
        money: i64,
    },
    JokerSold {
        id: String,
        sell_value: i64,
        money: i64,
    },
    ShopLeft,
    RunWon {
        money: i64,
    },
    RunLost {
        depth: u8,
    },
}

#[derive(Debug, Default, Clone)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        debug!(?event, "event");
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
