use dealrun_core::{Event, HandCategory, Phase, RoomType, Run, ScoreOutcome};

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::AtNode => "map",
        Phase::InDealerEncounter => "dealer",
        Phase::InRandomEncounter => "random",
        Phase::InShop => "shop",
        Phase::RunWon => "won",
        Phase::RunLost => "lost",
    }
}

pub fn print_help() {
    println!("commands:");
    println!("  state | s               show the run");
    println!("  map | m                 show the map");
    println!("  go <n> | g <n>          enter the n-th reachable node");
    println!("  play <idx..> | p        play cards (0 1 2, 0,1,2 or 0-4)");
    println!("  discard <idx..> | d     discard cards");
    println!("  preview <idx..>         score a selection without playing it");
    println!("  buy <id> | b            buy a joker from the shop");
    println!("  upgrade | u             buy the offered hand upgrade");
    println!("  sell <n>                sell the n-th owned joker");
    println!("  leave | l               leave the shop");
    println!("  auto [steps]            let the autoplayer act");
    println!("  json                    print the snapshot as JSON");
    println!("  new [seed]              start over");
    println!("  quit | q");
}

pub fn print_state(run: &Run) {
    println!("== {} ==", phase_label(run.phase));
    println!("{}", progress_line(run));
    if let Some(encounter) = &run.encounter {
        println!(
            "{:?} | score {}/{} | hands {} | discards {}{}",
            encounter.kind,
            encounter.score,
            encounter.target,
            encounter.hands_left,
            encounter.discards_left,
            encounter
                .debuff
                .map(|debuff| format!(" | debuff {debuff:?}"))
                .unwrap_or_default()
        );
    }
    if run.phase.in_encounter() {
        println!(
            "draw pile {} | discard pile {}",
            run.deck.draw.len(),
            run.deck.discard.len()
        );
        for (idx, card) in run.deck.hand.iter().enumerate() {
            println!("  {idx:>2}: {card}");
        }
    }
    if !run.jokers.is_empty() {
        println!("jokers ({}/{}):", run.jokers.len(), run.config.run.joker_slots);
        for (idx, joker) in run.jokers.iter().enumerate() {
            println!("  {idx:>2}: {} ({:?}, paid {})", joker.name, joker.rarity, joker.price_paid);
        }
    }
    if let Some(shop) = &run.shop {
        println!("shop:");
        for offer in &shop.jokers {
            println!(
                "  {:<16} {:<20} {:?} ${}",
                offer.id, offer.name, offer.rarity, offer.price
            );
        }
        if let Some(upgrade) = shop.upgrade {
            println!(
                "  upgrade {} (level {}) ${}",
                upgrade.category,
                run.hand_level(upgrade.category),
                upgrade.price
            );
        }
    }
    if run.phase == Phase::AtNode {
        println!("reachable:");
        for (idx, id) in run.reachable_nodes().iter().enumerate() {
            let room = run.map.node(*id).map(|node| node.room);
            println!("  {idx}: {id} {}", room.map(RoomType::label).unwrap_or("?"));
        }
    }
    let levels: Vec<String> = HandCategory::ALL
        .iter()
        .filter(|category| run.hand_level(**category) > 1)
        .map(|category| format!("{category} {}", run.hand_level(*category)))
        .collect();
    if !levels.is_empty() {
        println!("levels: {}", levels.join(", "));
    }
}

/// Depth out of the boss depth, node and money.
pub fn progress_line(run: &Run) -> String {
    let current = run
        .current
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "depth {}/{} | node {} | money ${}",
        run.depth(),
        run.map.depth(),
        current,
        run.money
    )
}

pub fn print_map(run: &Run) {
    for (depth, level) in run.map.levels().iter().enumerate() {
        let row: Vec<String> = level
            .iter()
            .map(|node| {
                let marker = if Some(node.id) == run.current {
                    "*"
                } else if node.visited {
                    "."
                } else {
                    " "
                };
                let edges: Vec<String> = node.edges.iter().map(|edge| edge.to_string()).collect();
                format!("{marker}{}[{}]", node.room.label(), edges.join(","))
            })
            .collect();
        println!("{depth:>2}: {}", row.join("  "));
    }
}

pub fn print_outcome(outcome: &ScoreOutcome) {
    println!("{} (level {})", outcome.category, outcome.level);
    let scoring: Vec<String> = outcome
        .scoring_cards
        .iter()
        .map(|card| card.to_string())
        .collect();
    println!("scoring: {}", scoring.join(" "));
    println!(
        "base: chips={} mult={:.2}",
        outcome.base.chips, outcome.base.mult
    );
    for step in &outcome.trace {
        println!(
            "  {}: {}x{:.2} -> {}x{:.2}",
            step.source, step.before.chips, step.before.mult, step.after.chips, step.after.mult
        );
    }
    println!(
        "total {} | encounter {}/{}{}",
        outcome.total,
        outcome.encounter_score,
        outcome.target,
        if outcome.cleared { " cleared" } else { "" }
    );
    if outcome.money != 0 {
        println!("jokers paid {}", outcome.money);
    }
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::RunStarted { seed, depth, money } => {
            format!("run started: seed {seed} depth {depth} money {money}")
        }
        Event::NodeEntered { node, room } => format!("entered {node} ({})", room.label()),
        Event::RandomResolved { node, outcome } => format!("random room {node}: {outcome:?}"),
        Event::RewardCollected {
            tier,
            amount,
            money,
        } => format!("reward: {tier:?} +{amount} money {money}"),
        Event::EncounterStarted {
            kind,
            depth,
            target,
            hands,
            discards,
            debuff,
        } => format!(
            "encounter started: {kind:?} depth {depth} target {target} hands {hands} discards {discards}{}",
            debuff
                .map(|debuff| format!(" debuff {debuff:?}"))
                .unwrap_or_default()
        ),
        Event::HandDealt { count } => format!("hand dealt: {count} cards"),
        Event::HandScored {
            category,
            chips,
            mult,
            total,
            encounter_score,
        } => format!("hand scored: {category} {chips}x{mult:.2} = {total} (encounter {encounter_score})"),
        Event::JokerPaid { amount, money } => format!("jokers paid {amount} money {money}"),
        Event::CardsDiscarded { count } => format!("discarded {count} cards"),
        Event::EncounterCleared {
            score,
            reward,
            money,
        } => format!("encounter cleared: score {score} reward {reward} money {money}"),
        Event::EncounterFailed { score, target } => {
            format!("encounter failed: score {score} of {target}")
        }
        Event::ShopEntered { offers } => format!("shop entered: {offers} jokers on offer"),
        Event::JokerBought { id, price, money } => {
            format!("joker bought: {id} price {price} money {money}")
        }
        Event::HandUpgraded {
            category,
            level,
            money,
        } => format!("hand upgraded: {category} level {level} money {money}"),
        Event::JokerSold {
            id,
            sell_value,
            money,
        } => format!("joker sold: {id} value {sell_value} money {money}"),
        Event::ShopLeft => "shop left".to_string(),
        Event::RunWon { money } => format!("run won with {money}"),
        Event::RunLost { depth } => format!("run lost at depth {depth}"),
    }
}
