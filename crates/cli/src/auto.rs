use dealrun_core::{BossDebuff, Phase, RoomType, Run, RunError, ScoreOutcome};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutoReport {
    pub steps: usize,
    pub phase: Phase,
    pub money: i64,
}

/// Greedy driver: best previewed hand, cheapest-risk rooms first, most
/// expensive affordable joker in shops. Stops at the end of the run, at
/// `max_steps`, or on the first rejected command.
pub fn run_auto(run: &mut Run, max_steps: usize) -> AutoReport {
    let mut steps = 0;
    while steps < max_steps && !run.phase.is_over() {
        steps += 1;
        if let Err(err) = step(run) {
            warn!(%err, phase = ?run.phase, "autoplay stopped");
            break;
        }
    }
    AutoReport {
        steps,
        phase: run.phase,
        money: run.money,
    }
}

fn step(run: &mut Run) -> Result<(), RunError> {
    match run.phase {
        Phase::AtNode => choose_node(run),
        Phase::InDealerEncounter | Phase::InRandomEncounter => play_round(run),
        Phase::InShop => shop(run),
        Phase::RunWon | Phase::RunLost => Ok(()),
    }
}

fn room_preference(room: RoomType) -> u8 {
    match room {
        RoomType::Shop => 0,
        RoomType::Reward => 1,
        RoomType::Random => 2,
        RoomType::Dealer => 3,
        RoomType::Boss => 4,
    }
}

fn choose_node(run: &mut Run) -> Result<(), RunError> {
    let reachable = run.reachable_nodes();
    let choice = reachable.iter().copied().min_by_key(|id| {
        run.map
            .node(*id)
            .map(|node| room_preference(node.room))
            .unwrap_or(u8::MAX)
    });
    match choice {
        Some(id) => {
            debug!(node = %id, "auto: enter");
            run.choose_next_node(id)
        }
        None => Ok(()),
    }
}

fn play_round(run: &mut Run) -> Result<(), RunError> {
    let Some((indices, best)) = best_selection(run) else {
        return Ok(());
    };
    let Some(encounter) = run.encounter.as_ref() else {
        return Ok(());
    };
    let needed = encounter.target - encounter.score;
    let projected = best.total.saturating_mul(encounter.hands_left as i64);
    let must_play_five = encounter.debuff == Some(BossDebuff::PlayFiveCards);
    if encounter.discards_left > 0 && !must_play_five && projected < needed {
        let keep: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|idx| {
                run.deck
                    .hand
                    .get(*idx)
                    .map(|card| best.scoring_cards.contains(card))
                    .unwrap_or(false)
            })
            .collect();
        let toss: Vec<usize> = (0..run.deck.hand.len())
            .filter(|idx| !keep.contains(idx))
            .take(run.config.run.max_selection)
            .collect();
        if !toss.is_empty() {
            debug!(?toss, "auto: discard");
            return run.discard(&toss);
        }
    }
    debug!(?indices, category = %best.category, total = best.total, "auto: play");
    run.play_hand(&indices).map(|_| ())
}

/// Highest previewed total over every legal selection.
fn best_selection(run: &Run) -> Option<(Vec<usize>, ScoreOutcome)> {
    let hand_len = run.deck.hand.len();
    let max = run.config.run.max_selection.min(hand_len);
    let sizes = match run.encounter.as_ref().and_then(|encounter| encounter.debuff) {
        Some(BossDebuff::PlayFiveCards) => 5..=5,
        _ => 1..=max,
    };
    let mut best: Option<(Vec<usize>, ScoreOutcome)> = None;
    for size in sizes {
        for indices in combinations(hand_len, size) {
            let Ok(outcome) = run.preview_hand(&indices) else {
                continue;
            };
            let better = best
                .as_ref()
                .map(|(_, current)| outcome.total > current.total)
                .unwrap_or(true);
            if better {
                best = Some((indices, outcome));
            }
        }
    }
    best
}

fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    collect_combinations(0, n, k, &mut current, &mut out);
    out
}

fn collect_combinations(
    start: usize,
    n: usize,
    k: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    for idx in start..n {
        current.push(idx);
        collect_combinations(idx + 1, n, k, current, out);
        current.pop();
    }
}

fn shop(run: &mut Run) -> Result<(), RunError> {
    let Some(state) = run.shop.as_ref() else {
        return run.leave_shop();
    };
    if run.jokers.len() < run.config.run.joker_slots {
        let pick = state
            .jokers
            .iter()
            .filter(|offer| offer.price <= run.money)
            .max_by_key(|offer| offer.price)
            .map(|offer| offer.id.clone());
        if let Some(id) = pick {
            debug!(%id, "auto: buy");
            return run.buy_joker(&id);
        }
    }
    if let Some(upgrade) = state.upgrade {
        if upgrade.price <= run.money {
            debug!(category = %upgrade.category, "auto: upgrade");
            return run.upgrade_hand().map(|_| ());
        }
    }
    run.leave_shop()
}
