use crate::{
    Card, ConfigError, Deck, DeckError, Encounter, EventBus, GameConfig, GameMap, HandCategory,
    NodeId, OwnedJoker, Phase, RandomOutcome, RngState, ScoreTables, ShopState, StockPool,
};
use std::collections::HashMap;
use thiserror::Error;

mod blind;
mod hand;
mod navigate;
mod shop;
mod state;

pub use hand::ScoreOutcome;

/// How many past random rooms feed the anti-streak weighting.
const RANDOM_HISTORY: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no cards selected")]
    Empty,
    #[error("{count} cards selected, at most {max} allowed")]
    TooMany { count: usize, max: usize },
    #[error("card index {0} is outside the hand")]
    OutOfRange(usize),
    #[error("card index {0} selected twice")]
    Duplicate(usize),
    #[error("this encounter requires exactly five cards, got {0}")]
    MustPlayFive(usize),
    #[error("no hands left")]
    NoHandsLeft,
    #[error("no discards left")]
    NoDiscardsLeft,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} while {phase:?}")]
    WrongPhase { action: &'static str, phase: Phase },
    #[error("node {0} is not reachable from here")]
    NotReachable(NodeId),
    #[error("the run is over")]
    RunOver,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunError {
    #[error("card {0} is not where it was expected")]
    InvalidCardReference(Card),
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] TransitionError),
    #[error("price {price} exceeds balance {money}")]
    InsufficientFunds { price: i64, money: i64 },
    #[error("{0} is not on offer")]
    SoldOut(String),
    #[error("all joker slots are taken")]
    NoJokerSlots,
    #[error("invalid joker index")]
    InvalidJokerIndex,
    #[error("deck is corrupted: {0}")]
    Deck(DeckError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

impl From<DeckError> for RunError {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::InvalidCardReference(card) => RunError::InvalidCardReference(card),
            other => RunError::Deck(other),
        }
    }
}

/// One playthrough. Owns the map, the deck, the jokers and the single random
/// stream; every command goes through a method here.
#[derive(Debug, Clone)]
pub struct Run {
    pub config: GameConfig,
    pub tables: ScoreTables,
    pub rng: RngState,
    pub map: GameMap,
    pub deck: Deck,
    pub jokers: Vec<OwnedJoker>,
    pub hand_levels: HashMap<HandCategory, u32>,
    pub phase: Phase,
    pub current: Option<NodeId>,
    pub money: i64,
    pub encounter: Option<Encounter>,
    pub shop: Option<ShopState>,
    pub stock: StockPool,
    pub random_history: Vec<RandomOutcome>,
    next_acquired: u32,
    events: EventBus,
}

impl Run {
    fn require_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<(), RunError> {
        if allowed.contains(&self.phase) {
            return Ok(());
        }
        if self.phase.is_over() {
            return Err(TransitionError::RunOver.into());
        }
        Err(TransitionError::WrongPhase {
            action,
            phase: self.phase,
        }
        .into())
    }

    pub fn drain_events(&mut self) -> Vec<crate::Event> {
        self.events.drain().collect()
    }

    pub fn hand_level(&self, category: HandCategory) -> u32 {
        self.hand_levels.get(&category).copied().unwrap_or(1)
    }
}
