use super::*;
use crate::*;
use tracing::info;

impl Run {
    /// Starts a run with the built-in tuning.
    pub fn new_run(seed: u64) -> Self {
        Self::build(GameConfig::default(), seed)
    }

    pub fn new(config: GameConfig, seed: u64) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: GameConfig, seed: u64) -> Self {
        let mut rng = RngState::from_seed(seed);
        let map = GameMap::generate(&config.map, &mut rng);
        let mut deck = Deck::standard52();
        deck.shuffle(&mut rng);
        let tables = ScoreTables::from_config(&config);
        let stock = StockPool::from_catalog(&config.jokers);
        let money = config.run.starting_money;
        let mut run = Self {
            config,
            tables,
            rng,
            map,
            deck,
            jokers: Vec::new(),
            hand_levels: HashMap::new(),
            phase: Phase::AtNode,
            current: None,
            money,
            encounter: None,
            shop: None,
            stock,
            random_history: Vec::new(),
            next_acquired: 0,
            events: EventBus::default(),
        };
        info!(seed, depth = run.map.depth(), "run started");
        run.events.push(Event::RunStarted {
            seed,
            depth: run.map.depth(),
            money,
        });
        run
    }

    /// Nodes `choose_next_node` would accept right now.
    pub fn reachable_nodes(&self) -> Vec<NodeId> {
        if self.phase != Phase::AtNode {
            return Vec::new();
        }
        match self.current {
            None => vec![self.map.start()],
            Some(id) => self.map.successors(id),
        }
    }

    pub fn depth(&self) -> u8 {
        self.current.map(|id| id.depth).unwrap_or(0)
    }

    pub fn snapshot(&self) -> RunView {
        let mut hand_levels: Vec<(HandCategory, u32)> = self
            .hand_levels
            .iter()
            .map(|(category, level)| (*category, *level))
            .collect();
        hand_levels.sort();
        RunView {
            seed: self.rng.seed(),
            phase: self.phase,
            money: self.money,
            current: self.current,
            reachable: self.reachable_nodes(),
            hand: self.deck.hand.clone(),
            draw_pile: self.deck.draw.len(),
            discard_pile: self.deck.discard.len(),
            jokers: self.jokers.clone(),
            hand_levels,
            encounter: self.encounter.clone(),
            shop: self.shop.clone(),
            map: self.map.clone(),
        }
    }
}
