use crate::{Card, GameMap, HandCategory, NodeId, OwnedJoker, ShopState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    AtNode,
    InDealerEncounter,
    InRandomEncounter,
    InShop,
    RunWon,
    RunLost,
}

impl Phase {
    pub fn is_over(self) -> bool {
        matches!(self, Phase::RunWon | Phase::RunLost)
    }

    pub fn in_encounter(self) -> bool {
        matches!(self, Phase::InDealerEncounter | Phase::InRandomEncounter)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EncounterKind {
    Dealer,
    SmallBoss,
    BigBoss,
    /// The final node of the map.
    Boss,
}

impl EncounterKind {
    pub fn has_debuff(self) -> bool {
        matches!(self, EncounterKind::BigBoss | EncounterKind::Boss)
    }
}

/// Restriction a big boss places on the encounter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BossDebuff {
    /// Every played hand must use exactly five cards.
    PlayFiveCards,
    /// Chips are halved before jokers apply.
    HalvedBase,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RandomOutcome {
    Reward,
    SmallBoss,
    BigBoss,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Encounter {
    pub kind: EncounterKind,
    pub node: NodeId,
    pub target: i64,
    pub score: i64,
    pub hands_left: u8,
    pub discards_left: u8,
    pub debuff: Option<BossDebuff>,
    pub last_hand: Option<HandCategory>,
}

impl Encounter {
    pub fn cleared(&self) -> bool {
        self.score >= self.target
    }
}

/// Read-only picture of a run, serializable for drivers and tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunView {
    pub seed: u64,
    pub phase: Phase,
    pub money: i64,
    pub current: Option<NodeId>,
    pub reachable: Vec<NodeId>,
    pub hand: Vec<Card>,
    pub draw_pile: usize,
    pub discard_pile: usize,
    pub jokers: Vec<OwnedJoker>,
    pub hand_levels: Vec<(HandCategory, u32)>,
    pub encounter: Option<Encounter>,
    pub shop: Option<ShopState>,
    pub map: GameMap,
}
