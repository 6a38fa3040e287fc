#![cfg(test)]

use crate::cards::{hand_value, Card, Rank, Suit, DECK_SIZE};

use super::errors::ActionError;
use super::game::Game;
use super::rng::GameRng;
use super::types::*;
use super::validate::{draw_options, run_if_valid, validate_discard, DiscardKind};

fn c(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

fn joker() -> Card {
    Card::joker(0)
}

fn two_player_game(seed: u64) -> Game {
    Game::new(
        vec![Player::human("alice"), Player::human("bob")],
        GameRng::seeded(seed),
    )
    .unwrap()
}

/// Build a game with exact hands, deck, and pile for scoring scenarios.
fn rigged_game(
    players: Vec<Player>,
    deck: Vec<Card>,
    discard_pile: Vec<Card>,
    last_discard: Vec<Card>,
    current: usize,
) -> Game {
    let previous_scores = players.iter().map(|p| p.score).collect();
    Game::from_parts(
        players,
        deck,
        discard_pile,
        last_discard,
        current,
        previous_scores,
        None,
        GameRng::seeded(7),
    )
}

fn player_with_hand(name: &str, score: u32, hand: Vec<Card>) -> Player {
    let mut player = Player::human(name);
    player.score = score;
    player.hand = hand;
    player
}

/// Every card not used by the given hands/pile, for rigging a full deck.
fn rest_of_deck(used: &[Card]) -> Vec<Card> {
    Card::full_deck()
        .into_iter()
        .filter(|c| !used.contains(c))
        .collect()
}

fn conservation_holds(game: &Game) -> bool {
    let mut ids: Vec<u8> = game
        .players()
        .iter()
        .flat_map(|p| p.hand.iter().map(|c| c.id()))
        .collect();
    ids.extend(game.discard_pile().iter().map(|c| c.id()));
    // Deck contents are private; count is enough to prove the partition
    // once hand/pile ids are distinct and the total is 54.
    let deck = game.deck_size();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len() == ids.len() && ids.len() + deck == DECK_SIZE
}

// ── Validator ───────────────────────────────────────────────────────

#[test]
fn pair_of_unequal_cards_is_not_a_discard() {
    let cards = [c(Rank::Four, Suit::Hearts), c(Rank::Five, Suit::Hearts)];
    assert_eq!(validate_discard(&cards), None);
}

#[test]
fn single_card_is_always_legal() {
    assert_eq!(
        validate_discard(&[c(Rank::King, Suit::Spades)]),
        Some(DiscardKind::Single)
    );
    assert_eq!(validate_discard(&[joker()]), Some(DiscardKind::Single));
}

#[test]
fn same_rank_set_with_joker_is_legal() {
    let cards = [
        c(Rank::Seven, Suit::Hearts),
        c(Rank::Seven, Suit::Spades),
        joker(),
    ];
    assert_eq!(validate_discard(&cards), Some(DiscardKind::Set));
}

#[test]
fn all_joker_discard_is_a_set() {
    assert_eq!(
        validate_discard(&[Card::joker(0), Card::joker(1)]),
        Some(DiscardKind::Set)
    );
}

#[test]
fn run_with_interior_joker_is_legal() {
    let cards = [
        c(Rank::Four, Suit::Hearts),
        joker(),
        c(Rank::Six, Suit::Hearts),
    ];
    let run = match validate_discard(&cards) {
        Some(DiscardKind::Run(run)) => run,
        other => panic!("expected run, got {other:?}"),
    };
    assert_eq!(run[0], c(Rank::Four, Suit::Hearts));
    assert!(run[1].is_joker());
    assert_eq!(run[2], c(Rank::Six, Suit::Hearts));
}

#[test]
fn run_rejects_mixed_suits_and_duplicates() {
    assert_eq!(
        run_if_valid(&[
            c(Rank::Four, Suit::Hearts),
            c(Rank::Five, Suit::Spades),
            c(Rank::Six, Suit::Hearts),
        ]),
        None
    );
    assert_eq!(
        run_if_valid(&[
            c(Rank::Four, Suit::Hearts),
            c(Rank::Four, Suit::Hearts),
            c(Rank::Five, Suit::Hearts),
        ]),
        None
    );
}

#[test]
fn joker_cannot_extend_below_ace_or_above_king() {
    assert_eq!(
        run_if_valid(&[joker(), c(Rank::Ace, Suit::Hearts), c(Rank::Two, Suit::Hearts)]),
        None
    );
    assert_eq!(
        run_if_valid(&[c(Rank::Queen, Suit::Hearts), c(Rank::King, Suit::Hearts), joker()]),
        None
    );
    // One step in from the edge is fine.
    assert!(run_if_valid(&[joker(), c(Rank::Two, Suit::Hearts), c(Rank::Three, Suit::Hearts)]).is_some());
}

#[test]
fn draw_options_expose_run_ends_only() {
    let run = [
        c(Rank::Four, Suit::Hearts),
        c(Rank::Five, Suit::Hearts),
        c(Rank::Six, Suit::Hearts),
    ];
    assert_eq!(
        draw_options(&run),
        vec![c(Rank::Four, Suit::Hearts), c(Rank::Six, Suit::Hearts)]
    );

    let set = [c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades)];
    assert_eq!(draw_options(&set), set.to_vec());
}

// ── Dealing & turn mechanics ────────────────────────────────────────

#[test]
fn deal_leaves_five_cards_each_and_one_flipped() {
    let mut game = two_player_game(0);
    game.start_game();
    for player in game.players() {
        assert_eq!(player.hand.len(), 5);
    }
    assert_eq!(game.last_discard().len(), 1);
    assert_eq!(game.discard_pile().len(), 1);
    assert_eq!(game.deck_size(), DECK_SIZE - 2 * 5 - 1);
    assert!(game.current_index() < 2);
    assert!(conservation_holds(&game));
}

#[test]
fn seeded_games_deal_identically() {
    let mut a = two_player_game(42);
    let mut b = two_player_game(42);
    a.start_game();
    b.start_game();
    assert_eq!(a.current_index(), b.current_index());
    for (pa, pb) in a.players().iter().zip(b.players()) {
        assert_eq!(pa.hand, pb.hand);
    }
    assert_eq!(a.last_discard(), b.last_discard());
}

#[test]
fn start_turn_sorts_hand_by_id() {
    let mut game = two_player_game(3);
    game.start_game();
    let (index, _) = game.start_turn();
    let hand = &game.player(index).hand;
    assert!(hand.windows(2).all(|w| w[0].id() <= w[1].id()));
}

#[test]
fn play_turn_keeps_last_discard_a_suffix_of_pile() {
    let mut game = two_player_game(9);
    game.start_game();
    for _ in 0..6 {
        let (index, _) = game.start_turn();
        let card = game.player(index).hand[0];
        game.play_turn(
            index,
            TurnAction {
                discard: vec![card],
                draw: DrawChoice::Deck,
            },
        )
        .unwrap();

        let pile = game.discard_pile();
        let last = game.last_discard();
        assert_eq!(&pile[pile.len() - last.len()..], last);
        assert!(conservation_holds(&game));
    }
}

#[test]
fn pile_draw_moves_the_chosen_card_into_hand() {
    let mut game = two_player_game(11);
    game.start_game();
    let (index, options) = game.start_turn();
    let target = options[0];
    let discard = game.player(index).hand[0];
    game.play_turn(
        index,
        TurnAction {
            discard: vec![discard],
            draw: DrawChoice::Pile(0),
        },
    )
    .unwrap();
    assert!(game.player(index).hand.contains(&target));
    assert!(!game.discard_pile().contains(&target));
    assert!(conservation_holds(&game));
}

#[test]
fn rejected_actions_do_not_mutate_state() {
    let mut game = two_player_game(5);
    game.start_game();
    let (index, _) = game.start_turn();
    let hand_before = game.player(index).hand.clone();
    let deck_before = game.deck_size();
    let pile_before = game.discard_pile().to_vec();

    // A card the player does not hold.
    let foreign = Card::full_deck()
        .into_iter()
        .find(|card| !game.players().iter().any(|p| p.hand.contains(card)))
        .unwrap();
    let err = game
        .play_turn(
            index,
            TurnAction {
                discard: vec![foreign],
                draw: DrawChoice::Deck,
            },
        )
        .unwrap_err();
    assert_eq!(err, ActionError::CardNotInHand);

    let err = game
        .play_turn(
            index,
            TurnAction {
                discard: vec![game.player(index).hand[0]],
                draw: DrawChoice::Pile(5),
            },
        )
        .unwrap_err();
    assert_eq!(err, ActionError::DrawOutOfRange);

    let err = game
        .play_turn(
            index,
            TurnAction {
                discard: vec![],
                draw: DrawChoice::Deck,
            },
        )
        .unwrap_err();
    assert_eq!(err, ActionError::EmptyDiscard);

    assert_eq!(game.player(index).hand, hand_before);
    assert_eq!(game.deck_size(), deck_before);
    assert_eq!(game.discard_pile(), &pile_before[..]);
    assert_eq!(game.current_index(), index);
}

#[test]
fn empty_deck_reshuffles_pile_below_last_discard() {
    let hand_a = vec![c(Rank::Two, Suit::Clubs), c(Rank::Nine, Suit::Spades)];
    let hand_b = vec![c(Rank::Three, Suit::Clubs)];
    let pile = vec![
        c(Rank::King, Suit::Hearts),
        c(Rank::Queen, Suit::Diamonds),
        c(Rank::Seven, Suit::Hearts),
    ];
    let last = vec![c(Rank::Seven, Suit::Hearts)];
    let mut game = rigged_game(
        vec![
            player_with_hand("alice", 0, hand_a),
            player_with_hand("bob", 0, hand_b),
        ],
        Vec::new(),
        pile,
        last,
        0,
    );

    game.play_turn(
        0,
        TurnAction {
            discard: vec![c(Rank::Two, Suit::Clubs)],
            draw: DrawChoice::Deck,
        },
    )
    .unwrap();

    // The two cards below the seven went back into the deck; one was drawn.
    assert_eq!(game.deck_size(), 1);
    assert_eq!(game.discard_pile(), &[c(Rank::Seven, Suit::Hearts), c(Rank::Two, Suit::Clubs)][..]);
    assert_eq!(game.last_discard(), &[c(Rank::Two, Suit::Clubs)][..]);
    let drawn = game.player(0).hand[1];
    assert!(
        drawn == c(Rank::King, Suit::Hearts) || drawn == c(Rank::Queen, Suit::Diamonds),
        "drawn card should come from the reshuffled pile, got {drawn:?}"
    );
}

// ── Scoring ─────────────────────────────────────────────────────────

#[test]
fn clean_yaniv_scores_only_the_opponents() {
    let declarer_hand = vec![c(Rank::Ace, Suit::Clubs)];
    let opponent_hand = vec![c(Rank::King, Suit::Spades), c(Rank::Queen, Suit::Spades)];
    let mut used = declarer_hand.clone();
    used.extend(opponent_hand.clone());
    let mut game = rigged_game(
        vec![
            player_with_hand("dana", 0, declarer_hand),
            player_with_hand("omer", 0, opponent_hand),
        ],
        rest_of_deck(&used),
        Vec::new(),
        Vec::new(),
        0,
    );

    let outcome = game.declare_yaniv(0).unwrap();
    assert_eq!(outcome.declarer, "dana");
    assert_eq!(outcome.declarer_hand_value, 1);
    assert!(outcome.assaf.is_none());
    assert!(outcome.winner.is_none());

    let dana = &outcome.score_changes[0];
    assert_eq!(dana.added, 0);
    assert_eq!(dana.new_score, 0);
    assert_eq!(
        dana.final_hand.iter().map(|c| c.rank_label()).collect::<Vec<_>>(),
        vec!["A"]
    );

    let omer = &outcome.score_changes[1];
    assert_eq!(omer.added, 20);
    assert_eq!(omer.new_score, 20);
    assert_eq!(
        omer.final_hand.iter().map(|c| c.rank_label()).collect::<Vec<_>>(),
        vec!["K", "Q"]
    );

    // A fresh hand was dealt.
    for player in game.players() {
        assert_eq!(player.hand.len(), 5);
    }
}

#[test]
fn assaf_penalizes_the_declarer_thirty() {
    let declarer_hand = vec![c(Rank::Two, Suit::Hearts), c(Rank::Three, Suit::Hearts)];
    let opponent_hand = vec![
        c(Rank::Ace, Suit::Clubs),
        c(Rank::Ace, Suit::Diamonds),
        c(Rank::Ace, Suit::Spades),
    ];
    let mut used = declarer_hand.clone();
    used.extend(opponent_hand.clone());
    let mut game = rigged_game(
        vec![
            player_with_hand("dana", 0, declarer_hand),
            player_with_hand("omer", 0, opponent_hand),
        ],
        rest_of_deck(&used),
        Vec::new(),
        Vec::new(),
        0,
    );

    let outcome = game.declare_yaniv(0).unwrap();
    let assaf = outcome.assaf.expect("expected assaf");
    assert_eq!(assaf.assafed, "dana");
    assert_eq!(assaf.by, "omer");
    assert_eq!(outcome.score_changes[0].added, 30);
    assert_eq!(outcome.score_changes[0].new_score, 30);
    assert_eq!(outcome.score_changes[1].added, 0);
}

#[test]
fn landing_exactly_on_fifty_resets_to_zero() {
    // Opponent at 45 gains 5 -> 50, previous 45 < 50 -> reset.
    let declarer_hand = vec![c(Rank::Ace, Suit::Clubs)];
    let opponent_hand = vec![c(Rank::Five, Suit::Spades)];
    let mut used = declarer_hand.clone();
    used.extend(opponent_hand.clone());
    let mut game = rigged_game(
        vec![
            player_with_hand("dana", 0, declarer_hand),
            player_with_hand("omer", 45, opponent_hand),
        ],
        rest_of_deck(&used),
        Vec::new(),
        Vec::new(),
        0,
    );

    let outcome = game.declare_yaniv(0).unwrap();
    assert_eq!(outcome.resets, vec!["omer".to_owned()]);
    let omer = &outcome.score_changes[1];
    assert!(omer.reset);
    assert_eq!(omer.new_score, 0);
    // `added` reports the pre-reset gain.
    assert_eq!(omer.added, 5);
}

#[test]
fn declarer_staying_put_is_not_a_reset() {
    // Declarer at 45 gains 0: score 45, not 50 -> no reset.
    let declarer_hand = vec![c(Rank::Ace, Suit::Clubs)];
    let opponent_hand = vec![c(Rank::King, Suit::Spades)];
    let mut used = declarer_hand.clone();
    used.extend(opponent_hand.clone());
    let mut game = rigged_game(
        vec![
            player_with_hand("dana", 45, declarer_hand),
            player_with_hand("omer", 0, opponent_hand),
        ],
        rest_of_deck(&used),
        Vec::new(),
        Vec::new(),
        0,
    );

    let outcome = game.declare_yaniv(0).unwrap();
    assert!(outcome.resets.is_empty());
    assert_eq!(outcome.score_changes[0].new_score, 45);
}

#[test]
fn elimination_over_one_hundred_and_winner() {
    let declarer_hand = vec![c(Rank::Ace, Suit::Clubs)];
    let opponent_hand = vec![c(Rank::King, Suit::Spades), c(Rank::Queen, Suit::Spades)];
    let mut used = declarer_hand.clone();
    used.extend(opponent_hand.clone());
    let mut game = rigged_game(
        vec![
            player_with_hand("dana", 10, declarer_hand),
            player_with_hand("omer", 95, opponent_hand),
        ],
        rest_of_deck(&used),
        Vec::new(),
        Vec::new(),
        1,
    );

    let outcome = game.declare_yaniv(0).unwrap();
    assert_eq!(outcome.eliminated, vec!["omer".to_owned()]);
    assert_eq!(outcome.winner.as_deref(), Some("dana"));
    assert_eq!(game.players().len(), 1);
}

#[test]
fn yaniv_above_five_points_is_rejected() {
    let declarer_hand = vec![c(Rank::Four, Suit::Clubs), c(Rank::Two, Suit::Hearts)];
    let opponent_hand = vec![c(Rank::King, Suit::Spades)];
    let mut used = declarer_hand.clone();
    used.extend(opponent_hand.clone());
    let mut game = rigged_game(
        vec![
            player_with_hand("dana", 0, declarer_hand),
            player_with_hand("omer", 0, opponent_hand),
        ],
        rest_of_deck(&used),
        Vec::new(),
        Vec::new(),
        0,
    );
    assert_eq!(game.declare_yaniv(0).unwrap_err(), ActionError::YanivAboveLimit);
}

// ── Slamdown ────────────────────────────────────────────────────────

/// Deck rigged so the next deck draw is a known card.
fn slamdown_setup(top_of_deck: Card) -> Game {
    let hand_a = vec![
        c(Rank::Seven, Suit::Hearts),
        c(Rank::Seven, Suit::Spades),
        c(Rank::Two, Suit::Clubs),
        c(Rank::Nine, Suit::Diamonds),
    ];
    let hand_b = vec![c(Rank::King, Suit::Clubs)];
    let pile = vec![c(Rank::Ace, Suit::Hearts)];
    let mut used = hand_a.clone();
    used.extend(hand_b.clone());
    used.extend(pile.clone());
    used.push(top_of_deck);
    let mut deck = rest_of_deck(&used);
    deck.push(top_of_deck); // top = back
    rigged_game(
        vec![
            player_with_hand("alice", 0, hand_a),
            player_with_hand("bob", 0, hand_b),
        ],
        deck,
        pile.clone(),
        pile,
        0,
    )
}

#[test]
fn deck_draw_matching_discarded_set_offers_slamdown() {
    let mut game = slamdown_setup(c(Rank::Seven, Suit::Diamonds));
    game.play_turn(
        0,
        TurnAction {
            discard: vec![c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades)],
            draw: DrawChoice::Deck,
        },
    )
    .unwrap();

    let slam = game.slamdown().expect("slamdown should be available");
    assert_eq!(slam.player, "alice");
    assert_eq!(slam.card, c(Rank::Seven, Suit::Diamonds));

    let card = game.perform_slamdown(0).unwrap();
    assert_eq!(card, c(Rank::Seven, Suit::Diamonds));
    assert!(game.slamdown().is_none());
    assert_eq!(*game.last_discard().last().unwrap(), card);
    assert!(!game.player(0).hand.contains(&card));
}

#[test]
fn pile_draw_never_offers_slamdown() {
    let mut game = slamdown_setup(c(Rank::Seven, Suit::Diamonds));
    game.play_turn(
        0,
        TurnAction {
            discard: vec![c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades)],
            draw: DrawChoice::Pile(0),
        },
    )
    .unwrap();
    assert!(game.slamdown().is_none());
}

#[test]
fn run_extension_offers_slamdown() {
    let hand_a = vec![
        c(Rank::Four, Suit::Hearts),
        c(Rank::Five, Suit::Hearts),
        c(Rank::Six, Suit::Hearts),
        c(Rank::Nine, Suit::Diamonds),
    ];
    let hand_b = vec![c(Rank::King, Suit::Clubs)];
    let pile = vec![c(Rank::Ace, Suit::Spades)];
    let top = c(Rank::Seven, Suit::Hearts);
    let mut used = hand_a.clone();
    used.extend(hand_b.clone());
    used.extend(pile.clone());
    used.push(top);
    let mut deck = rest_of_deck(&used);
    deck.push(top);
    let mut game = rigged_game(
        vec![
            player_with_hand("alice", 0, hand_a),
            player_with_hand("bob", 0, hand_b),
        ],
        deck,
        pile.clone(),
        pile,
        0,
    );

    game.play_turn(
        0,
        TurnAction {
            discard: vec![
                c(Rank::Four, Suit::Hearts),
                c(Rank::Five, Suit::Hearts),
                c(Rank::Six, Suit::Hearts),
            ],
            draw: DrawChoice::Deck,
        },
    )
    .unwrap();

    let slam = game.slamdown().expect("run extension should slam");
    assert_eq!(slam.card, c(Rank::Seven, Suit::Hearts));
}

#[test]
fn slamdown_expires_on_next_discard() {
    let mut game = slamdown_setup(c(Rank::Seven, Suit::Diamonds));
    game.play_turn(
        0,
        TurnAction {
            discard: vec![c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades)],
            draw: DrawChoice::Deck,
        },
    )
    .unwrap();
    assert!(game.slamdown().is_some());

    // Bob plays; the pending slamdown disappears.
    let (index, _) = game.start_turn();
    let card = game.player(index).hand[0];
    game.play_turn(
        index,
        TurnAction {
            discard: vec![card],
            draw: DrawChoice::Deck,
        },
    )
    .unwrap();
    assert!(game.slamdown().is_none());
    assert_eq!(game.perform_slamdown(0).unwrap_err(), ActionError::SlamdownUnavailable);
}

#[test]
fn ai_players_never_trigger_slamdowns() {
    let hand_a = vec![
        c(Rank::Seven, Suit::Hearts),
        c(Rank::Seven, Suit::Spades),
        c(Rank::Two, Suit::Clubs),
    ];
    let hand_b = vec![c(Rank::King, Suit::Clubs)];
    let pile = vec![c(Rank::Ace, Suit::Hearts)];
    let top = c(Rank::Seven, Suit::Diamonds);
    let mut used = hand_a.clone();
    used.extend(hand_b.clone());
    used.extend(pile.clone());
    used.push(top);
    let mut deck = rest_of_deck(&used);
    deck.push(top);

    let mut ai = Player::ai("bot");
    ai.hand = hand_a;
    let mut game = rigged_game(
        vec![ai, player_with_hand("bob", 0, hand_b)],
        deck,
        pile.clone(),
        pile,
        0,
    );

    game.play_turn(
        0,
        TurnAction {
            discard: vec![c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades)],
            draw: DrawChoice::Deck,
        },
    )
    .unwrap();
    assert!(game.slamdown().is_none());
}

// ── Snapshot round-trip ─────────────────────────────────────────────

#[test]
fn snapshot_round_trip_preserves_visible_state() {
    let mut game = two_player_game(21);
    game.start_game();
    for _ in 0..4 {
        let (index, _) = game.start_turn();
        let card = game.player(index).hand[0];
        game.play_turn(
            index,
            TurnAction {
                discard: vec![card],
                draw: DrawChoice::Deck,
            },
        )
        .unwrap();
    }

    let snapshot = game.snapshot();
    let restored = Game::restore(snapshot.clone(), GameRng::seeded(99)).unwrap();
    let round_tripped = restored.snapshot();

    assert_eq!(snapshot, round_tripped);
    assert!(conservation_holds(&restored));
    assert_eq!(restored.last_discard(), game.last_discard());
}

#[test]
fn restore_rejects_corrupt_snapshots() {
    let mut game = two_player_game(1);
    game.start_game();
    let mut snapshot = game.snapshot();
    snapshot.players[0].hand.push(99);
    assert!(matches!(
        Game::restore(snapshot, GameRng::seeded(0)),
        Err(super::errors::RestoreError::UnknownCard(99))
    ));

    let mut snapshot = game.snapshot();
    let dup = snapshot.players[0].hand[0];
    snapshot.players[1].hand.push(dup);
    assert!(matches!(
        Game::restore(snapshot, GameRng::seeded(0)),
        Err(super::errors::RestoreError::DuplicateCard(_))
    ));
}

// ── Long-running property ───────────────────────────────────────────

#[test]
fn conservation_and_sort_hold_across_many_turns() {
    let mut game = Game::new(
        vec![
            Player::human("a"),
            Player::human("b"),
            Player::human("c"),
        ],
        GameRng::seeded(1234),
    )
    .unwrap();
    game.start_game();

    for turn in 0..60 {
        let (index, options) = game.start_turn();
        let hand = &game.player(index).hand;
        assert!(hand.windows(2).all(|w| w[0].id() <= w[1].id()));

        // Alternate deck and pile draws, always discarding the highest card.
        let discard = *hand.last().unwrap();
        let draw = if turn % 3 == 0 && !options.is_empty() {
            DrawChoice::Pile(0)
        } else {
            DrawChoice::Deck
        };
        game.play_turn(
            index,
            TurnAction {
                discard: vec![discard],
                draw,
            },
        )
        .unwrap();

        assert!(conservation_holds(&game), "conservation broken at turn {turn}");
        let pile = game.discard_pile();
        let last = game.last_discard();
        assert_eq!(&pile[pile.len() - last.len()..], last);
    }
}

#[test]
fn hand_values_sum_card_values() {
    let hand = [
        c(Rank::Ace, Suit::Clubs),
        c(Rank::Ten, Suit::Hearts),
        c(Rank::King, Suit::Spades),
        joker(),
    ];
    assert_eq!(hand_value(&hand), 21);
}
