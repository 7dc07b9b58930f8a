use dealrun_core::{
    Bonus, BossDebuff, Card, EncounterKind, Event, GameConfig, JokerEffect, JokerRarity, NodeId,
    OwnedJoker, Phase, RandomOutcome, Rank, RoomType, Run, RunError, SelectionError, ShopState,
    TransitionError, Trigger,
};

fn cards(text: &str) -> Vec<Card> {
    text.split_whitespace()
        .map(|token| Card::parse(token).unwrap())
        .collect()
}

/// Replaces the current hand with `wanted`, keeping all 52 cards accounted for.
fn rig_hand(run: &mut Run, wanted: &[Card]) {
    let mut rest: Vec<Card> = run
        .deck
        .draw
        .drain(..)
        .chain(run.deck.hand.drain(..))
        .chain(run.deck.discard.drain(..))
        .collect();
    rest.retain(|card| !wanted.contains(card));
    run.deck.draw = rest;
    run.deck.hand = wanted.to_vec();
    assert!(run.deck.check_invariant().is_ok());
}

fn start_dealer(seed: u64) -> Run {
    let mut run = Run::new_run(seed);
    run.choose_next_node(NodeId::new(0, 0)).unwrap();
    assert_eq!(run.phase, Phase::InDealerEncounter);
    run
}

/// Parks the run on `node` without resolving it.
fn park_at(run: &mut Run, node: NodeId) {
    run.current = Some(node);
    run.phase = Phase::AtNode;
    run.encounter = None;
}

fn first_successor(run: &Run, room: RoomType) -> Option<NodeId> {
    run.reachable_nodes()
        .into_iter()
        .find(|id| run.map.node(*id).map(|node| node.room) == Some(room))
}

#[test]
fn new_run_waits_before_the_start_node() {
    let mut run = Run::new_run(42);
    let view = run.snapshot();
    assert_eq!(view.phase, Phase::AtNode);
    assert_eq!(view.money, 5);
    assert_eq!(view.reachable, vec![NodeId::new(0, 0)]);
    assert_eq!(view.draw_pile, 52);
    let events = run.drain_events();
    assert!(matches!(events[0], Event::RunStarted { seed: 42, .. }));
    assert!(run.drain_events().is_empty());
}

#[test]
fn entering_the_start_deals_a_full_hand() {
    let run = start_dealer(7);
    let encounter = run.encounter.clone().unwrap();
    assert_eq!(encounter.kind, EncounterKind::Dealer);
    assert_eq!(encounter.target, 300);
    assert_eq!(encounter.hands_left, 5);
    assert_eq!(encounter.discards_left, 3);
    assert_eq!(run.deck.hand.len(), 8);
    assert_eq!(run.deck.draw.len(), 44);
    assert!(run.map.node(NodeId::new(0, 0)).unwrap().visited);
}

#[test]
fn full_house_scores_one_hundred_twenty() {
    let mut run = start_dealer(1);
    rig_hand(&mut run, &cards("4H 4D 4S 9C 9H 2C 7D JS"));
    let outcome = run.play_hand(&[0, 1, 2, 3, 4]).unwrap();
    assert_eq!(outcome.category.name(), "Full House");
    assert_eq!(outcome.total, 120);
    assert_eq!(run.encounter.as_ref().map(|e| e.score), Some(120));
    assert_eq!(run.encounter.as_ref().map(|e| e.hands_left), Some(4));
    assert_eq!(run.deck.hand.len(), 8);
    assert_eq!(run.deck.discard.len(), 5);
}

#[test]
fn preview_matches_play_and_changes_nothing() {
    let mut run = start_dealer(3);
    rig_hand(&mut run, &cards("KH KD 5S 5C 2H 3D 8S 9C"));
    let before = run.snapshot();
    let preview = run.preview_hand(&[0, 1, 2, 3]).unwrap();
    assert_eq!(run.snapshot(), before);
    let played = run.play_hand(&[0, 1, 2, 3]).unwrap();
    assert_eq!(preview, played);
    assert_eq!(played.total, 90);
}

#[test]
fn invalid_selections_leave_the_run_unchanged() {
    let mut run = start_dealer(5);
    let before = run.snapshot();
    let cases: Vec<(Vec<usize>, SelectionError)> = vec![
        (vec![], SelectionError::Empty),
        (vec![0, 1, 2, 3, 4, 5], SelectionError::TooMany { count: 6, max: 5 }),
        (vec![0, 8], SelectionError::OutOfRange(8)),
        (vec![1, 2, 1], SelectionError::Duplicate(1)),
    ];
    for (indices, expected) in cases {
        assert_eq!(
            run.play_hand(&indices),
            Err(RunError::InvalidSelection(expected.clone()))
        );
        assert_eq!(run.discard(&indices), Err(RunError::InvalidSelection(expected)));
        assert_eq!(run.snapshot(), before);
    }
}

#[test]
fn commands_in_the_wrong_phase_are_rejected() {
    let mut run = Run::new_run(9);
    let before = run.snapshot();
    assert!(matches!(
        run.play_hand(&[0]),
        Err(RunError::InvalidTransition(TransitionError::WrongPhase { .. }))
    ));
    assert!(matches!(
        run.buy_joker("moon"),
        Err(RunError::InvalidTransition(TransitionError::WrongPhase { .. }))
    ));
    assert!(matches!(
        run.leave_shop(),
        Err(RunError::InvalidTransition(TransitionError::WrongPhase { .. }))
    ));
    assert_eq!(
        run.choose_next_node(NodeId::new(1, 0)),
        Err(RunError::InvalidTransition(TransitionError::NotReachable(
            NodeId::new(1, 0)
        )))
    );
    assert_eq!(run.snapshot(), before);

    run.choose_next_node(NodeId::new(0, 0)).unwrap();
    let during = run.snapshot();
    assert!(run.choose_next_node(NodeId::new(1, 0)).is_err());
    assert_eq!(run.snapshot(), during);
}

#[test]
fn discards_run_out() {
    let mut run = start_dealer(11);
    for left in (0..3).rev() {
        run.discard(&[0, 1]).unwrap();
        assert_eq!(run.encounter.as_ref().map(|e| e.discards_left), Some(left));
        assert_eq!(run.deck.hand.len(), 8);
    }
    assert_eq!(
        run.discard(&[0]),
        Err(RunError::InvalidSelection(SelectionError::NoDiscardsLeft))
    );
}

#[test]
fn clearing_pays_reward_and_unused_hands() {
    let mut run = start_dealer(13);
    if let Some(encounter) = run.encounter.as_mut() {
        encounter.target = 1;
    }
    let outcome = run.play_hand(&[0]).unwrap();
    assert!(outcome.cleared);
    assert_eq!(run.phase, Phase::AtNode);
    assert!(run.encounter.is_none());
    // 5 starting + 5 dealer reward + 4 unused hands.
    assert_eq!(run.money, 14);
    assert_eq!(run.reachable_nodes(), run.map.successors(NodeId::new(0, 0)));
    let events = run.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EncounterCleared { reward: 9, .. })));
}

#[test]
fn running_out_of_hands_loses_the_run() {
    let mut run = start_dealer(17);
    if let Some(encounter) = run.encounter.as_mut() {
        encounter.target = i64::MAX;
    }
    for _ in 0..5 {
        run.play_hand(&[0]).unwrap();
    }
    assert_eq!(run.phase, Phase::RunLost);
    assert_eq!(
        run.play_hand(&[0]),
        Err(RunError::InvalidTransition(TransitionError::RunOver))
    );
    assert_eq!(
        run.choose_next_node(NodeId::new(1, 0)),
        Err(RunError::InvalidTransition(TransitionError::RunOver))
    );
}

#[test]
fn beating_the_boss_wins() {
    let mut run = Run::new_run(19);
    let boss = run.map.boss();
    let before_boss = run.map.predecessors(boss)[0];
    park_at(&mut run, before_boss);
    run.choose_next_node(boss).unwrap();
    assert_eq!(run.phase, Phase::InDealerEncounter);
    let encounter = run.encounter.clone().unwrap();
    assert_eq!(encounter.kind, EncounterKind::Boss);
    assert!(encounter.debuff.is_some());
    if let Some(encounter) = run.encounter.as_mut() {
        encounter.target = 1;
    }
    run.play_hand(&[0, 1, 2, 3, 4]).unwrap();
    assert_eq!(run.phase, Phase::RunWon);
    assert!(run.reachable_nodes().is_empty());
}

#[test]
fn five_card_debuff_rejects_short_hands() {
    let mut run = start_dealer(23);
    if let Some(encounter) = run.encounter.as_mut() {
        encounter.debuff = Some(BossDebuff::PlayFiveCards);
    }
    let before = run.snapshot();
    assert_eq!(
        run.play_hand(&[0, 1]),
        Err(RunError::InvalidSelection(SelectionError::MustPlayFive(2)))
    );
    assert_eq!(run.snapshot(), before);
    assert!(run.play_hand(&[0, 1, 2, 3, 4]).is_ok());
}

#[test]
fn halved_base_debuff_halves_chips() {
    let mut run = start_dealer(29);
    rig_hand(&mut run, &cards("4H 4D 4S 9C 9H 2C 7D JS"));
    if let Some(encounter) = run.encounter.as_mut() {
        encounter.debuff = Some(BossDebuff::HalvedBase);
    }
    let outcome = run.preview_hand(&[0, 1, 2, 3, 4]).unwrap();
    assert_eq!(outcome.base.chips, 15);
    assert_eq!(outcome.total, 60);
}

fn shop_run(config: GameConfig, seed: u64) -> Run {
    let mut run = Run::new(config, seed).unwrap();
    park_at(&mut run, NodeId::new(0, 0));
    let shop = first_successor(&run, RoomType::Shop).expect("start dealer has a shop successor");
    run.choose_next_node(shop).unwrap();
    assert_eq!(run.phase, Phase::InShop);
    run
}

#[test]
fn insufficient_funds_leaves_the_shop_untouched() {
    let mut config = GameConfig::default();
    config.run.starting_money = 10;
    for joker in &mut config.jokers {
        joker.price = 12;
    }
    let mut run = shop_run(config, 42);
    let offer = run.shop.as_ref().unwrap().jokers[0].id.clone();
    let before = run.snapshot();
    assert_eq!(
        run.buy_joker(&offer),
        Err(RunError::InsufficientFunds {
            price: 12,
            money: 10
        })
    );
    assert_eq!(run.snapshot(), before);
}

#[test]
fn buying_a_joker_ends_the_visit() {
    let mut run = shop_run(GameConfig::default(), 42);
    run.money = 100;
    let offer = run.shop.as_ref().unwrap().jokers[0].clone();
    run.buy_joker(&offer.id).unwrap();
    assert_eq!(run.phase, Phase::AtNode);
    assert_eq!(run.money, 100 - offer.price);
    assert_eq!(run.jokers.len(), 1);
    assert_eq!(run.jokers[0].acquired, 0);
    assert!(run.shop.is_none());
}

#[test]
fn unknown_offer_is_sold_out() {
    let mut run = shop_run(GameConfig::default(), 8);
    run.money = 100;
    let before = run.snapshot();
    assert_eq!(
        run.buy_joker("no_such_joker"),
        Err(RunError::SoldOut("no_such_joker".to_string()))
    );
    assert_eq!(run.snapshot(), before);
}

#[test]
fn full_joker_slots_block_purchases() {
    let mut config = GameConfig::default();
    config.run.joker_slots = 0;
    let mut run = shop_run(config, 4);
    run.money = 100;
    let offer = run.shop.as_ref().unwrap().jokers[0].id.clone();
    assert_eq!(run.buy_joker(&offer), Err(RunError::NoJokerSlots));
}

#[test]
fn upgrade_and_sell_in_the_shop() {
    let mut run = shop_run(GameConfig::default(), 6);
    run.money = 100;
    let category = run.upgrade_hand().unwrap();
    assert_eq!(run.hand_level(category), 2);
    assert_eq!(run.money, 96);
    assert_eq!(run.phase, Phase::InShop);
    assert_eq!(
        run.upgrade_hand(),
        Err(RunError::SoldOut("hand upgrade".to_string()))
    );

    let offer = run.shop.as_ref().unwrap().jokers[0].clone();
    run.buy_joker(&offer.id).unwrap();
    run.phase = Phase::InShop;
    run.shop = Some(ShopState::default());
    assert_eq!(run.sell_joker(3), Err(RunError::InvalidJokerIndex));
    let value = run.sell_joker(0).unwrap();
    assert_eq!(value, (offer.price / 2).max(1));
    assert!(run.jokers.is_empty());
    run.leave_shop().unwrap();
    assert_eq!(run.phase, Phase::AtNode);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = GameConfig::default();
    config.map.depth = 1;
    assert!(matches!(Run::new(config, 1), Err(RunError::Config(_))));
}

#[test]
fn random_rooms_lean_against_streaks() {
    let mut run = Run::new_run(31);
    let base = run.random_weights(0);
    assert_eq!(base, [30, 35, 35]);
    run.random_history = vec![RandomOutcome::Reward, RandomOutcome::Reward];
    let after_rewards = run.random_weights(0);
    assert_eq!(after_rewards[0], 30 - 4 * 3 - 4 * 2);
    run.random_history = vec![RandomOutcome::SmallBoss];
    assert_eq!(run.random_weights(0)[0], 30 + 4 * 3);
    assert_eq!(run.random_weights(5)[1], 35 + 2 * 5);
}

/// Plays a fixed policy: first reachable node, first five cards, leave shops.
fn scripted(seed: u64) -> (Run, Vec<Event>) {
    let mut run = Run::new_run(seed);
    let mut events = Vec::new();
    for _ in 0..200 {
        match run.phase {
            Phase::AtNode => {
                let next = run.reachable_nodes()[0];
                run.choose_next_node(next).unwrap();
            }
            Phase::InDealerEncounter | Phase::InRandomEncounter => {
                run.play_hand(&[0, 1, 2, 3, 4]).unwrap();
            }
            Phase::InShop => run.leave_shop().unwrap(),
            Phase::RunWon | Phase::RunLost => break,
        }
        events.extend(run.drain_events());
    }
    (run, events)
}

#[test]
fn same_seed_same_run() {
    let (a, events_a) = scripted(42);
    let (b, events_b) = scripted(42);
    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(events_a, events_b);
    assert!(a.phase.is_over());
}

/// Every node of `room` past the start across `seeds`, with one predecessor
/// to park on.
fn rooms_of(room: RoomType, seeds: std::ops::Range<u64>) -> Vec<(Run, NodeId, NodeId)> {
    let mut found = Vec::new();
    for seed in seeds {
        let run = Run::new_run(seed);
        let pairs: Vec<(NodeId, NodeId)> = run
            .map
            .levels()
            .iter()
            .skip(1)
            .flatten()
            .filter(|node| node.room == room)
            .filter_map(|node| {
                run.map
                    .predecessors(node.id)
                    .first()
                    .map(|from| (*from, node.id))
            })
            .collect();
        for (from, to) in pairs {
            found.push((run.clone(), from, to));
        }
    }
    found
}

#[test]
fn reward_rooms_pay_and_stay_on_the_map() {
    let (mut run, from, reward) = rooms_of(RoomType::Reward, 0..50)
        .into_iter()
        .next()
        .expect("some map has a reward room");
    park_at(&mut run, from);
    run.drain_events();
    let money = run.money;
    run.choose_next_node(reward).unwrap();
    assert_eq!(run.phase, Phase::AtNode);
    assert_eq!(run.current, Some(reward));
    assert!(run.encounter.is_none());
    let gained = run.money - money;
    assert!((5..=25).contains(&gained), "gained {gained}");
    let events = run.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        Event::RewardCollected { amount, money: total, .. }
            if *amount == gained && *total == run.money
    )));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::RandomResolved { .. })));
    assert!(!run.reachable_nodes().is_empty());
}

#[test]
fn random_rooms_resolve_to_a_reward_or_a_fight() {
    let mut rewards = 0;
    let mut fights = 0;
    for (mut run, from, random) in rooms_of(RoomType::Random, 0..60) {
        park_at(&mut run, from);
        run.drain_events();
        let money = run.money;
        run.choose_next_node(random).unwrap();
        let events = run.drain_events();
        let outcome = events
            .iter()
            .find_map(|event| match event {
                Event::RandomResolved { node, outcome } if *node == random => Some(*outcome),
                _ => None,
            })
            .expect("random room reports its outcome");
        match outcome {
            RandomOutcome::Reward => {
                rewards += 1;
                assert_eq!(run.phase, Phase::AtNode);
                let gained = run.money - money;
                assert!((5..=25).contains(&gained), "gained {gained}");
                assert!(events
                    .iter()
                    .any(|event| matches!(event, Event::RewardCollected { .. })));
            }
            RandomOutcome::SmallBoss | RandomOutcome::BigBoss => {
                fights += 1;
                assert_eq!(run.phase, Phase::InRandomEncounter);
                let kind = run.encounter.as_ref().map(|encounter| encounter.kind);
                let expected = if outcome == RandomOutcome::SmallBoss {
                    EncounterKind::SmallBoss
                } else {
                    EncounterKind::BigBoss
                };
                assert_eq!(kind, Some(expected));
                if let Some(encounter) = run.encounter.as_mut() {
                    encounter.target = 1;
                }
                run.play_hand(&[0, 1, 2, 3, 4]).unwrap();
                assert_eq!(run.phase, Phase::AtNode);
                assert!(run.money > money);
            }
        }
    }
    assert!(rewards > 0, "no random room paid out");
    assert!(fights > 0, "no random room started a fight");
}

#[test]
fn held_cards_feed_held_rank_jokers() {
    let mut run = start_dealer(37);
    rig_hand(&mut run, &cards("KH KS QD QC 2H 4D 6C 8S"));
    let plain = run.preview_hand(&[0, 1]).unwrap();
    run.jokers.push(OwnedJoker {
        id: "court".to_string(),
        name: "Court".to_string(),
        rarity: JokerRarity::Common,
        effect: JokerEffect::Conditional(Bonus { chips: 0, mult: 2.0 }),
        trigger: Trigger::HeldRank(Rank::Queen),
        price_paid: 5,
        acquired: 0,
    });
    let boosted = run.preview_hand(&[0, 1]).unwrap();
    let fired = boosted
        .trace
        .iter()
        .filter(|step| step.source == "court")
        .count();
    assert_eq!(fired, 2);
    assert_eq!(boosted.score.mult, plain.score.mult + 4.0);
    // Playing the queens leaves none held.
    let played = run.preview_hand(&[2, 3]).unwrap();
    assert!(played.trace.iter().all(|step| step.source != "court"));
}
