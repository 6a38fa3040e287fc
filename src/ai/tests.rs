#![cfg(test)]

use crate::cards::{Card, Rank, Suit};
use crate::engine::types::{DrawChoice, RoundPlayerInfo, TurnRecord};
use crate::engine::validate::validate_discard;
use crate::engine::{Game, GameRng, Player};

use super::enumerate::discard_options;
use super::memo::{hand_signature, MemoCache};
use super::observer::AiPlayer;

fn c(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

fn joker() -> Card {
    Card::joker(0)
}

fn infos(entries: &[(&str, u32)]) -> Vec<RoundPlayerInfo> {
    entries
        .iter()
        .map(|(name, score)| RoundPlayerInfo {
            name: (*name).to_owned(),
            score: *score,
        })
        .collect()
}

fn turn(player: &str, hand_count: usize, discarded: Vec<Card>, drawn: Option<Card>) -> TurnRecord {
    TurnRecord {
        player: player.to_owned(),
        hand_count,
        discarded,
        drawn,
    }
}

// ── Discard enumeration ─────────────────────────────────────────────

#[test]
fn enumerates_singletons_sets_and_joker_sets() {
    let hand = [c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades), joker()];
    let options = discard_options(&hand);

    assert!(options.contains(&vec![c(Rank::Seven, Suit::Hearts)]));
    assert!(options.contains(&vec![joker()]));
    assert!(options.contains(&vec![c(Rank::Seven, Suit::Hearts), c(Rank::Seven, Suit::Spades)]));
    assert!(options.contains(&vec![
        c(Rank::Seven, Suit::Hearts),
        c(Rank::Seven, Suit::Spades),
        joker()
    ]));
}

#[test]
fn enumerates_runs_with_gap_fill_and_extensions() {
    let hand = [
        c(Rank::Four, Suit::Hearts),
        c(Rank::Six, Suit::Hearts),
        c(Rank::Seven, Suit::Hearts),
        joker(),
    ];
    let options = discard_options(&hand);

    // The joker fills the 4-6 gap.
    let gap_filled = vec![
        c(Rank::Four, Suit::Hearts),
        joker(),
        c(Rank::Six, Suit::Hearts),
        c(Rank::Seven, Suit::Hearts),
    ];
    assert!(options.contains(&gap_filled));

    // 6-7 with the joker as a high or low extension.
    assert!(options.contains(&vec![
        joker(),
        c(Rank::Six, Suit::Hearts),
        c(Rank::Seven, Suit::Hearts)
    ]));
    assert!(options.contains(&vec![
        c(Rank::Six, Suit::Hearts),
        c(Rank::Seven, Suit::Hearts),
        joker()
    ]));
}

#[test]
fn run_extensions_respect_ace_and_king_bounds() {
    let low = [
        c(Rank::Ace, Suit::Hearts),
        c(Rank::Two, Suit::Hearts),
        c(Rank::Three, Suit::Hearts),
        joker(),
    ];
    let options = discard_options(&low);
    assert!(!options.contains(&vec![
        joker(),
        c(Rank::Ace, Suit::Hearts),
        c(Rank::Two, Suit::Hearts),
        c(Rank::Three, Suit::Hearts)
    ]));
    assert!(options.contains(&vec![
        c(Rank::Ace, Suit::Hearts),
        c(Rank::Two, Suit::Hearts),
        c(Rank::Three, Suit::Hearts),
        joker()
    ]));

    let high = [
        c(Rank::Jack, Suit::Spades),
        c(Rank::Queen, Suit::Spades),
        c(Rank::King, Suit::Spades),
        joker(),
    ];
    let options = discard_options(&high);
    assert!(!options.contains(&vec![
        c(Rank::Jack, Suit::Spades),
        c(Rank::Queen, Suit::Spades),
        c(Rank::King, Suit::Spades),
        joker()
    ]));
}

#[test]
fn every_enumerated_option_is_a_legal_discard() {
    let hand = [
        c(Rank::Ace, Suit::Clubs),
        c(Rank::Two, Suit::Clubs),
        c(Rank::Four, Suit::Clubs),
        c(Rank::Four, Suit::Hearts),
        c(Rank::Four, Suit::Spades),
        Card::joker(0),
        Card::joker(1),
    ];
    for option in discard_options(&hand) {
        assert!(
            validate_discard(&option).is_some(),
            "illegal option enumerated: {option:?}"
        );
    }
}

// ── Memo cache ──────────────────────────────────────────────────────

#[test]
fn memo_cache_evicts_least_recently_used() {
    let mut cache: MemoCache<u32, u32> = MemoCache::new(3);
    cache.insert(1, 10);
    cache.insert(2, 20);
    cache.insert(3, 30);

    // Touch 1 so 2 becomes the oldest.
    assert_eq!(cache.get(&1), Some(10));
    cache.insert(4, 40);

    assert_eq!(cache.get(&2), None);
    assert_eq!(cache.get(&1), Some(10));
    assert_eq!(cache.get(&3), Some(30));
    assert_eq!(cache.get(&4), Some(40));
    assert_eq!(cache.len(), 3);
}

#[test]
fn hand_signature_is_order_independent() {
    let a = [c(Rank::King, Suit::Spades), c(Rank::Ace, Suit::Clubs)];
    let b = [c(Rank::Ace, Suit::Clubs), c(Rank::King, Suit::Spades)];
    assert_eq!(hand_signature(&a), hand_signature(&b));
}

// ── Observer ────────────────────────────────────────────────────────

#[test]
fn pile_pickups_become_known_until_discarded() {
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));

    let picked = c(Rank::King, Suit::Spades);
    ai.observe_turn(
        &turn("opp", 5, vec![c(Rank::Two, Suit::Clubs)], Some(picked)),
        &[c(Rank::Two, Suit::Clubs)],
        &[c(Rank::Two, Suit::Clubs)],
        &[],
    );
    let model = &ai.opponents()["opp"];
    assert_eq!(model.known_cards, vec![picked]);
    assert_eq!(model.collected_ranks.get(&13), Some(&1));
    assert!(model.collected_suit_ranks[&Suit::Spades].contains(&13));

    // Discarding the king removes it from the known set but not from the
    // collection signal.
    ai.observe_turn(
        &turn("opp", 5, vec![picked], None),
        &[c(Rank::Two, Suit::Clubs), picked],
        &[picked],
        &[],
    );
    let model = &ai.opponents()["opp"];
    assert!(model.known_cards.is_empty());
    assert_eq!(model.collected_ranks.get(&13), Some(&1));
    assert_eq!(
        model.discard_history,
        vec![c(Rank::Two, Suit::Clubs), picked]
    );
}

#[test]
fn estimates_combine_known_cards_and_unseen_mean() {
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));

    let picked = c(Rank::King, Suit::Spades);
    ai.observe_turn(
        &turn("opp", 3, vec![], Some(picked)),
        &[],
        &[],
        &[],
    );
    let model = &ai.opponents()["opp"];
    // Known 10 plus two unknowns at the unseen mean (53 unseen cards).
    assert!(model.estimated_score > 10.0);
    assert!(model.estimated_score < 10.0 + 2.0 * 7.0);
}

#[test]
fn observe_round_resets_state() {
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));
    ai.observe_turn(
        &turn("opp", 5, vec![], Some(c(Rank::King, Suit::Spades))),
        &[c(Rank::Two, Suit::Clubs)],
        &[c(Rank::Two, Suit::Clubs)],
        &[],
    );
    ai.observe_round(&infos(&[("opp", 12)]));
    let model = &ai.opponents()["opp"];
    assert!(model.known_cards.is_empty());
    assert_eq!(model.current_score, 12);
    assert_eq!(model.hand_count, 5);
}

// ── Policy ──────────────────────────────────────────────────────────

#[test]
fn decide_action_is_deterministic_for_equal_state() {
    let hand = [
        c(Rank::King, Suit::Spades),
        c(Rank::Nine, Suit::Hearts),
        c(Rank::Four, Suit::Clubs),
        c(Rank::Two, Suit::Diamonds),
        c(Rank::Ace, Suit::Clubs),
    ];
    let build = || {
        let mut ai = AiPlayer::new();
        ai.observe_round(&infos(&[("opp", 10)]));
        ai.observe_turn(
            &turn("opp", 5, vec![c(Rank::Six, Suit::Clubs)], None),
            &[c(Rank::Six, Suit::Clubs)],
            &[c(Rank::Six, Suit::Clubs)],
            &hand,
        );
        ai
    };
    let action_a = build().decide_action(&hand, 0);
    let action_b = build().decide_action(&hand, 0);
    assert_eq!(action_a, action_b);
}

#[test]
fn decide_action_returns_a_playable_move() {
    let hand = [
        c(Rank::King, Suit::Spades),
        c(Rank::Nine, Suit::Hearts),
        c(Rank::Four, Suit::Clubs),
        c(Rank::Two, Suit::Diamonds),
        c(Rank::Ace, Suit::Clubs),
    ];
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 10)]));
    ai.seed_draw_options(&[c(Rank::Six, Suit::Clubs)]);

    let action = ai.decide_action(&hand, 0);
    assert!(validate_discard(&action.discard).is_some());
    for card in &action.discard {
        assert!(hand.contains(card));
    }
    if let DrawChoice::Pile(i) = action.draw {
        assert!(i < 1);
    }
}

#[test]
fn reset_shortcut_lands_score_on_a_multiple_of_fifty() {
    let hand = [
        c(Rank::King, Suit::Spades),
        c(Rank::Nine, Suit::Hearts),
        c(Rank::Four, Suit::Clubs),
    ];
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));
    // Opponent down to one known ace: estimated hand is tiny.
    ai.observe_turn(
        &turn("opp", 1, vec![], Some(c(Rank::Ace, Suit::Clubs))),
        &[c(Rank::Five, Suit::Hearts)],
        &[c(Rank::Five, Suit::Hearts)],
        &hand,
    );

    // score 45: discarding the king (10) and picking up the five lands on
    // 45 + 10 - 5 = 50.
    let action = ai.decide_action(&hand, 45);
    assert_eq!(action.discard, vec![c(Rank::King, Suit::Spades)]);
    assert_eq!(action.draw, DrawChoice::Pile(0));
}

#[test]
fn yaniv_with_no_opponent_model_requires_two_points() {
    let mut ai = AiPlayer::new();
    assert!(ai.should_declare_yaniv(&[c(Rank::Ace, Suit::Clubs)], 0));
    assert!(ai.should_declare_yaniv(&[c(Rank::Two, Suit::Clubs)], 0));
    assert!(!ai.should_declare_yaniv(&[c(Rank::Three, Suit::Clubs)], 0));
}

#[test]
fn yaniv_never_fires_above_five_points() {
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));
    let hand = [c(Rank::Four, Suit::Clubs), c(Rank::Two, Suit::Hearts)];
    assert!(!ai.should_declare_yaniv(&hand, 0));
}

#[test]
fn yaniv_declines_when_an_opponent_is_certainly_lower() {
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));
    // Opponent holds exactly one known ace: they are at 1 point for sure.
    ai.observe_turn(
        &turn("opp", 1, vec![], Some(c(Rank::Ace, Suit::Clubs))),
        &[],
        &[],
        &[],
    );
    let hand = [c(Rank::Two, Suit::Clubs), c(Rank::Three, Suit::Diamonds)];
    assert!(!ai.should_declare_yaniv(&hand, 0));
}

#[test]
fn yaniv_fires_against_clearly_heavier_opponents() {
    let mut ai = AiPlayer::new();
    ai.observe_round(&infos(&[("opp", 0)]));
    // Opponent known to hold two face cards.
    ai.observe_turn(
        &turn("opp", 2, vec![], Some(c(Rank::King, Suit::Spades))),
        &[],
        &[],
        &[],
    );
    ai.observe_turn(
        &turn("opp", 2, vec![], Some(c(Rank::Queen, Suit::Spades))),
        &[],
        &[],
        &[],
    );
    let hand = [c(Rank::Ace, Suit::Clubs)];
    assert!(ai.should_declare_yaniv(&hand, 0));
}

// ── Engine integration ──────────────────────────────────────────────

#[test]
fn ai_turns_play_out_through_the_engine() {
    let mut game = Game::new(
        vec![Player::ai("bot-1"), Player::ai("bot-2")],
        GameRng::seeded(77),
    )
    .unwrap();
    game.start_game();

    for _ in 0..20 {
        let (index, _) = game.start_turn();
        if game.can_declare_yaniv(index) && game.ai_should_declare_yaniv(index) {
            let outcome = game.declare_yaniv(index).unwrap();
            if outcome.winner.is_some() {
                return;
            }
            continue;
        }
        let action = game.ai_decide_action(index).expect("ai seat");
        game.play_turn(index, action).expect("ai action should be legal");
    }
}
