//! Layered map: depth 0 holds the start Dealer, the last depth holds the
//! Boss, and every edge goes from depth `k` to depth `k + 1`.

use crate::{MapRule, RngState};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MAX_OUT_DEGREE: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RoomType {
    Dealer,
    Reward,
    Random,
    Shop,
    Boss,
}

impl RoomType {
    pub fn label(self) -> &'static str {
        match self {
            RoomType::Dealer => "dealer",
            RoomType::Reward => "reward",
            RoomType::Random => "random",
            RoomType::Shop => "shop",
            RoomType::Boss => "boss",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub depth: u8,
    pub index: usize,
}

impl NodeId {
    pub fn new(depth: u8, index: usize) -> Self {
        Self { depth, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.depth, self.index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MapNode {
    pub id: NodeId,
    pub room: RoomType,
    /// Indices into the next depth, sorted.
    pub edges: Vec<usize>,
    pub visited: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapDefect {
    #[error("map has no levels between start and boss")]
    TooShallow,
    #[error("start level must hold a single dealer")]
    BadStart,
    #[error("last level must hold a single boss")]
    BadBoss,
    #[error("boss room {0} above the last level")]
    MisplacedBoss(NodeId),
    #[error("node {0} has out-degree {1}")]
    OutDegree(NodeId, usize),
    #[error("node {0} has an edge past the next level")]
    DanglingEdge(NodeId),
    #[error("node {0} is unreachable")]
    Unreachable(NodeId),
    #[error("dealer {0} has no shop successor")]
    DealerWithoutShop(NodeId),
    #[error("shop {0} is entered from a non-dealer")]
    ShopFromNonDealer(NodeId),
    #[error("dealer {0} sits right before the boss")]
    DealerBeforeBoss(NodeId),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameMap {
    levels: Vec<Vec<MapNode>>,
}

impl GameMap {
    pub fn generate(rule: &MapRule, rng: &mut RngState) -> Self {
        let last = rule.depth.max(2);
        let mut rooms: Vec<Vec<RoomType>> = vec![vec![RoomType::Dealer]];
        let mut levels: Vec<Vec<MapNode>> = Vec::with_capacity(last as usize + 1);

        for depth in 1..last {
            let prev = &rooms[depth as usize - 1];
            let level = roll_level(rule, depth, last, prev, rng);
            let edges = connect(prev, &level, rule.extra_edge_chance, rng);
            levels.push(to_nodes(depth - 1, prev, edges));
            rooms.push(level);
        }

        let before_boss = &rooms[last as usize - 1];
        let edges = vec![vec![0]; before_boss.len()];
        levels.push(to_nodes(last - 1, before_boss, edges));
        levels.push(vec![MapNode {
            id: NodeId::new(last, 0),
            room: RoomType::Boss,
            edges: Vec::new(),
            visited: false,
        }]);

        let map = Self { levels };
        debug_assert_eq!(map.verify(), Ok(()));
        map
    }

    /// Depth of the Boss level.
    pub fn depth(&self) -> u8 {
        self.levels.len().saturating_sub(1) as u8
    }

    pub fn levels(&self) -> &[Vec<MapNode>] {
        &self.levels
    }

    pub fn level(&self, depth: u8) -> &[MapNode] {
        self.levels
            .get(depth as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn start(&self) -> NodeId {
        NodeId::new(0, 0)
    }

    pub fn boss(&self) -> NodeId {
        NodeId::new(self.depth(), 0)
    }

    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        self.levels.get(id.depth as usize)?.get(id.index)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut MapNode> {
        self.levels.get_mut(id.depth as usize)?.get_mut(id.index)
    }

    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| {
                node.edges
                    .iter()
                    .map(|index| NodeId::new(id.depth + 1, *index))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        if id.depth == 0 {
            return Vec::new();
        }
        self.level(id.depth - 1)
            .iter()
            .filter(|node| node.edges.contains(&id.index))
            .map(|node| node.id)
            .collect()
    }

    pub fn verify(&self) -> Result<(), MapDefect> {
        if self.levels.len() < 3 {
            return Err(MapDefect::TooShallow);
        }
        let last = self.depth();
        let start = self.level(0);
        if start.len() != 1 || start[0].room != RoomType::Dealer {
            return Err(MapDefect::BadStart);
        }
        let boss = self.level(last);
        if boss.len() != 1 || boss[0].room != RoomType::Boss {
            return Err(MapDefect::BadBoss);
        }

        for depth in 0..last {
            let next = self.level(depth + 1);
            for node in self.level(depth) {
                if node.room == RoomType::Boss {
                    return Err(MapDefect::MisplacedBoss(node.id));
                }
                let degree = node.edges.len();
                if degree == 0 || degree > MAX_OUT_DEGREE {
                    return Err(MapDefect::OutDegree(node.id, degree));
                }
                if node.edges.iter().any(|index| *index >= next.len()) {
                    return Err(MapDefect::DanglingEdge(node.id));
                }
                if node.room == RoomType::Dealer {
                    if depth + 1 == last {
                        return Err(MapDefect::DealerBeforeBoss(node.id));
                    }
                    let has_shop = node
                        .edges
                        .iter()
                        .any(|index| next[*index].room == RoomType::Shop);
                    if !has_shop {
                        return Err(MapDefect::DealerWithoutShop(node.id));
                    }
                }
            }
        }

        for depth in 1..=last {
            for node in self.level(depth) {
                let preds = self.predecessors(node.id);
                if preds.is_empty() {
                    return Err(MapDefect::Unreachable(node.id));
                }
                if node.room == RoomType::Shop {
                    let all_dealers = preds.iter().all(|pred| {
                        self.node(*pred)
                            .map(|pred| pred.room == RoomType::Dealer)
                            .unwrap_or(false)
                    });
                    if !all_dealers {
                        return Err(MapDefect::ShopFromNonDealer(node.id));
                    }
                }
            }
        }
        Ok(())
    }
}

fn to_nodes(depth: u8, rooms: &[RoomType], edges: Vec<Vec<usize>>) -> Vec<MapNode> {
    rooms
        .iter()
        .zip(edges)
        .enumerate()
        .map(|(index, (room, edges))| MapNode {
            id: NodeId::new(depth, index),
            room: *room,
            edges,
            visited: false,
        })
        .collect()
}

/// Rolls the rooms of `depth` given the rooms one level up.
fn roll_level(
    rule: &MapRule,
    depth: u8,
    last: u8,
    prev: &[RoomType],
    rng: &mut RngState,
) -> Vec<RoomType> {
    let dealers = prev.iter().filter(|room| **room == RoomType::Dealer).count();
    let others = prev.len() - dealers;
    // Non-shop rooms need a source: non-dealers when there are any,
    // otherwise the dealers themselves.
    let sources = if others > 0 { others } else { dealers };
    let min_plain = usize::from(others > 0);

    let cap = rule.max_width.min((last - depth) as usize + 1).max(1);
    let floor = rule.min_width.min(cap);
    let width = rng.range_inclusive(floor as i64, cap as i64) as usize;

    let shops = if dealers == 0 {
        0
    } else {
        let most = dealers.min(width.saturating_sub(min_plain)).max(1);
        rng.range_inclusive(1, most as i64) as usize
    };
    let plain = width
        .saturating_sub(shops)
        .max(min_plain)
        .min(2 * sources);

    let dealer_weight = if depth + 1 == last {
        0
    } else {
        rule.dealer_weight
    };
    let random_weight = rule.random_weight + rule.random_weight_per_depth * depth as u32;
    let weights = [dealer_weight, rule.reward_weight, random_weight];
    let choices = [RoomType::Dealer, RoomType::Reward, RoomType::Random];

    let mut rooms = vec![RoomType::Shop; shops];
    for _ in 0..plain {
        let room = rng
            .pick_weighted(&weights)
            .map(|idx| choices[idx])
            .unwrap_or(RoomType::Reward);
        rooms.push(room);
    }
    rng.shuffle(&mut rooms);
    rooms
}

/// Edges from `prev` into `next`: dealers cover the shops, the remaining
/// rooms are covered by non-dealers (or by dealers when there are none),
/// then a few extra edges where the rules allow.
fn connect(
    prev: &[RoomType],
    next: &[RoomType],
    extra_edge_chance: f64,
    rng: &mut RngState,
) -> Vec<Vec<usize>> {
    let dealers = positions(prev, |room| room == RoomType::Dealer);
    let others = positions(prev, |room| room != RoomType::Dealer);
    let shops = positions(next, |room| room == RoomType::Shop);
    let plain = positions(next, |room| room != RoomType::Shop);

    let mut edges = vec![Vec::new(); prev.len()];
    cover(&dealers, &shops, &mut edges);
    let sources = if others.is_empty() { &dealers } else { &others };
    cover(sources, &plain, &mut edges);

    for (index, room) in prev.iter().enumerate() {
        if edges[index].len() >= MAX_OUT_DEGREE || !rng.chance(extra_edge_chance) {
            continue;
        }
        let allowed: Vec<usize> = if *room == RoomType::Dealer {
            (0..next.len()).collect()
        } else {
            plain.clone()
        };
        let fresh: Vec<usize> = allowed
            .into_iter()
            .filter(|target| !edges[index].contains(target))
            .collect();
        if let Some(pick) = rng.index(fresh.len()) {
            edges[index].push(fresh[pick]);
        }
    }

    for list in &mut edges {
        list.sort_unstable();
        list.dedup();
    }
    edges
}

/// Monotone covering between two ordered groups: every source gets at least
/// one target and every target at least one source, never more than two
/// targets per source while `targets <= 2 * sources`.
fn cover(sources: &[usize], targets: &[usize], edges: &mut [Vec<usize>]) {
    let (n, m) = (sources.len(), targets.len());
    if n == 0 || m == 0 {
        return;
    }
    if m >= n {
        for (j, target) in targets.iter().enumerate() {
            edges[sources[j * n / m]].push(*target);
        }
    } else {
        for (i, source) in sources.iter().enumerate() {
            edges[*source].push(targets[i * m / n]);
        }
    }
}

fn positions(rooms: &[RoomType], keep: impl Fn(RoomType) -> bool) -> Vec<usize> {
    rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| keep(**room))
        .map(|(index, _)| index)
        .collect()
}
