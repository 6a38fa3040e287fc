//! The Yaniv game: deck, hands, turn cursor, scoring, slamdown.
//!
//! One `Game` is owned by one room; every mutation path runs to completion
//! before the next begins, so the card-conservation invariant (hands ∪ deck
//! ∪ discard pile is a permutation of the 54-card deck) holds between calls.

use crate::cards::Card;

use super::errors::ActionError;
use super::rng::GameRng;
use super::types::*;
use super::validate::{self, run_if_valid, validate_discard};

pub const HAND_SIZE: usize = 5;
pub const YANIV_LIMIT: u32 = 5;
pub const ASSAF_PENALTY: u32 = 30;
pub const ELIMINATION_SCORE: u32 = 100;

/// A pending bonus discard: the named player may immediately slam `card`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slamdown {
    pub player: String,
    pub card: Card,
}

#[derive(Debug)]
pub struct Game {
    players: Vec<Player>,
    /// Remaining draw pile; the top is the back of the vec.
    deck: Vec<Card>,
    /// Full history of discarded cards.
    discard_pile: Vec<Card>,
    /// The cards placed by the most recent turn, in play order. Always a
    /// suffix of `discard_pile`.
    last_discard: Vec<Card>,
    current: usize,
    /// Scores snapshotted at the last Yaniv declaration, for the reset rule.
    previous_scores: Vec<u32>,
    slamdown: Option<Slamdown>,
    rng: GameRng,
}

impl Game {
    pub fn new(players: Vec<Player>, mut rng: GameRng) -> Result<Self, ActionError> {
        if players.len() < 2 {
            return Err(ActionError::NotEnoughPlayers);
        }
        let current = rng.index(players.len());
        let previous_scores = players.iter().map(|p| p.score).collect();
        Ok(Game {
            players,
            deck: Vec::new(),
            discard_pile: Vec::new(),
            last_discard: Vec::new(),
            current,
            previous_scores,
            slamdown: None,
            rng,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> &Player {
        &self.players[index]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    pub fn last_discard(&self) -> &[Card] {
        &self.last_discard
    }

    pub fn slamdown(&self) -> Option<&Slamdown> {
        self.slamdown.as_ref()
    }

    pub fn previous_scores(&self) -> &[u32] {
        &self.previous_scores
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        players: Vec<Player>,
        deck: Vec<Card>,
        discard_pile: Vec<Card>,
        last_discard: Vec<Card>,
        current: usize,
        previous_scores: Vec<u32>,
        slamdown: Option<Slamdown>,
        rng: GameRng,
    ) -> Game {
        Game {
            players,
            deck,
            discard_pile,
            last_discard,
            current,
            previous_scores,
            slamdown,
            rng,
        }
    }

    pub(crate) fn shuffle_deck(&mut self) {
        let mut deck = std::mem::take(&mut self.deck);
        self.rng.shuffle(&mut deck);
        self.deck = deck;
    }

    pub(crate) fn reprime_observers(&mut self) {
        self.notify_round();
    }

    pub fn find_player(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    /// Deal the opening hand and tell AI observers the round has begun.
    pub fn start_game(&mut self) {
        self.deal_new_hand();
        self.notify_round();
    }

    /// Sort the current hand for a stable client render and expose the pile
    /// pickup options. Safe to call repeatedly.
    pub fn start_turn(&mut self) -> (usize, Vec<Card>) {
        let index = self.current;
        self.players[index].hand.sort();
        (index, self.draw_options())
    }

    pub fn draw_options(&self) -> Vec<Card> {
        validate::draw_options(&self.last_discard)
    }

    pub fn can_declare_yaniv(&self, index: usize) -> bool {
        self.players[index].hand_value() <= YANIV_LIMIT
    }

    /// Execute one turn for the player at `index`. All validation happens
    /// before any state changes, so a rejected action leaves the game
    /// untouched.
    pub fn play_turn(&mut self, index: usize, action: TurnAction) -> Result<TurnSummary, ActionError> {
        if action.discard.is_empty() {
            return Err(ActionError::EmptyDiscard);
        }
        validate_discard(&action.discard).ok_or(ActionError::InvalidDiscard)?;

        let mut remaining: Vec<Card> = self.players[index].hand.clone();
        for card in &action.discard {
            let pos = remaining
                .iter()
                .position(|c| c == card)
                .ok_or(ActionError::CardNotInHand)?;
            remaining.remove(pos);
        }

        let options = self.draw_options();
        if let DrawChoice::Pile(i) = action.draw {
            if i >= options.len() {
                return Err(ActionError::DrawOutOfRange);
            }
        }

        let drew_from_deck = matches!(action.draw, DrawChoice::Deck);
        let drawn = match action.draw {
            DrawChoice::Deck => self.draw_from_deck()?,
            DrawChoice::Pile(i) => {
                let card = options[i];
                if let Some(pos) = self.discard_pile.iter().rposition(|c| *c == card) {
                    self.discard_pile.remove(pos);
                }
                card
            }
        };
        self.players[index].hand.push(drawn);
        let revealed = (!drew_from_deck).then_some(drawn);

        self.apply_discard(index, &action.discard);
        self.detect_slamdown(index, &action.discard, drawn, drew_from_deck);

        let record = TurnRecord {
            player: self.players[index].name.clone(),
            hand_count: self.players[index].hand.len(),
            discarded: action.discard.clone(),
            drawn: revealed,
        };
        self.notify_turn(index, record);

        self.current = (self.current + 1) % self.players.len();
        Ok(TurnSummary {
            discarded: action.discard,
            draw: action.draw,
            drawn_card: revealed,
        })
    }

    /// Execute a pending slamdown for the player at `index`.
    pub fn perform_slamdown(&mut self, index: usize) -> Result<Card, ActionError> {
        let slam = self.slamdown.as_ref().ok_or(ActionError::SlamdownUnavailable)?;
        if slam.player != self.players[index].name {
            return Err(ActionError::SlamdownUnavailable);
        }
        let card = slam.card;
        let hand = &mut self.players[index].hand;
        let pos = hand
            .iter()
            .position(|c| *c == card)
            .ok_or(ActionError::SlamdownCardMissing)?;
        if hand.len() <= 1 {
            return Err(ActionError::SlamdownLastCard);
        }
        hand.remove(pos);
        self.discard_pile.push(card);
        self.last_discard.push(card);
        self.slamdown = None;
        Ok(card)
    }

    /// Score the round for a declarer at `index`: clean Yaniv or assaf,
    /// then resets, eliminations, and either a winner or a fresh deal.
    pub fn declare_yaniv(&mut self, index: usize) -> Result<RoundOutcome, ActionError> {
        let declarer_hand_value = self.players[index].hand_value();
        if declarer_hand_value > YANIV_LIMIT {
            return Err(ActionError::YanivAboveLimit);
        }

        self.slamdown = None;
        self.previous_scores = self.players.iter().map(|p| p.score).collect();
        let declarer = self.players[index].name.clone();
        let scores_before: Vec<u32> = self.previous_scores.clone();
        let hands_before: Vec<Vec<Card>> = self.players.iter().map(|p| p.hand.clone()).collect();

        let other_points: Vec<(usize, u32)> = self
            .players
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(i, p)| (i, p.hand_value()))
            .collect();
        let (min_index, min_points) = other_points
            .iter()
            .copied()
            .min_by_key(|(_, points)| *points)
            .ok_or(ActionError::NotEnoughPlayers)?;

        let assaf = if declarer_hand_value < min_points {
            for (i, points) in &other_points {
                self.players[*i].score += points;
            }
            None
        } else {
            self.players[index].score += ASSAF_PENALTY;
            Some(Assaf {
                assafed: declarer.clone(),
                by: self.players[min_index].name.clone(),
            })
        };

        let mut resets = Vec::new();
        for (i, player) in self.players.iter_mut().enumerate() {
            if (player.score == 50 || player.score == 100) && self.previous_scores[i] < player.score
            {
                player.score -= 50;
                resets.push(player.name.clone());
            }
        }

        let eliminated: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.score > ELIMINATION_SCORE)
            .map(|p| p.name.clone())
            .collect();

        let score_changes: Vec<ScoreChange> = self
            .players
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let reset = resets.contains(&p.name);
                let net = p.score as i32 - scores_before[i] as i32;
                ScoreChange {
                    name: p.name.clone(),
                    added: if reset { net + 50 } else { net },
                    new_score: p.score,
                    reset,
                    eliminated: eliminated.contains(&p.name),
                    final_hand: hands_before[i].clone(),
                }
            })
            .collect();

        self.players.retain(|p| p.score <= ELIMINATION_SCORE);
        if !self.players.is_empty() {
            self.current %= self.players.len();
        }

        let winner = (self.players.len() <= 1)
            .then(|| self.players.first().map(|p| p.name.clone()))
            .flatten();
        if winner.is_none() && !self.players.is_empty() {
            self.deal_new_hand();
            self.notify_round();
        }

        Ok(RoundOutcome {
            declarer,
            declarer_hand_value,
            assaf,
            resets,
            eliminated,
            score_changes,
            winner,
        })
    }

    /// Let the AI at `index` choose its turn. Returns `None` for humans.
    pub fn ai_decide_action(&mut self, index: usize) -> Option<TurnAction> {
        let Player { hand, score, kind, .. } = &mut self.players[index];
        match kind {
            PlayerKind::Ai(brain) => Some(brain.decide_action(hand, *score)),
            PlayerKind::Human => None,
        }
    }

    /// Whether the AI at `index` wants to call Yaniv. `false` for humans.
    pub fn ai_should_declare_yaniv(&mut self, index: usize) -> bool {
        let Player { hand, score, kind, .. } = &mut self.players[index];
        match kind {
            PlayerKind::Ai(brain) => brain.should_declare_yaniv(hand, *score),
            PlayerKind::Human => false,
        }
    }

    fn deal_new_hand(&mut self) {
        self.discard_pile.clear();
        self.last_discard.clear();
        self.deck = Card::full_deck();
        self.rng.shuffle(&mut self.deck);
        for player in &mut self.players {
            player.hand.clear();
            for _ in 0..HAND_SIZE {
                if let Some(card) = self.deck.pop() {
                    player.hand.push(card);
                }
            }
        }
        if let Some(first) = self.deck.pop() {
            self.discard_pile.push(first);
            self.last_discard.push(first);
        }
    }

    fn draw_from_deck(&mut self) -> Result<Card, ActionError> {
        if self.deck.is_empty() {
            // Rebuild from everything below the last set or run.
            let keep = self
                .discard_pile
                .split_off(self.discard_pile.len() - self.last_discard.len());
            self.deck = std::mem::replace(&mut self.discard_pile, keep);
            self.rng.shuffle(&mut self.deck);
        }
        self.deck.pop().ok_or(ActionError::DeckExhausted)
    }

    fn apply_discard(&mut self, index: usize, cards: &[Card]) {
        // A new discard expires any pending slamdown.
        self.slamdown = None;
        self.last_discard.clear();
        for card in cards {
            if let Some(pos) = self.players[index].hand.iter().position(|c| c == card) {
                self.players[index].hand.remove(pos);
            }
            self.discard_pile.push(*card);
            self.last_discard.push(*card);
        }
    }

    fn detect_slamdown(&mut self, index: usize, discarded: &[Card], drawn: Card, drew_from_deck: bool) {
        self.slamdown = None;

        let player = &self.players[index];
        if player.is_ai() || !drew_from_deck || player.hand.len() < 2 || drawn.is_joker() {
            return;
        }

        let non_jokers: Vec<Card> = discarded.iter().copied().filter(|c| !c.is_joker()).collect();

        // Rank match against a discarded single or set.
        let is_set = !non_jokers.is_empty()
            && non_jokers
                .iter()
                .all(|c| c.rank_index() == non_jokers[0].rank_index());
        if is_set && drawn.rank_index() == non_jokers[0].rank_index() {
            self.slamdown = Some(Slamdown {
                player: player.name.clone(),
                card: drawn,
            });
            return;
        }

        // Same-suit extension of a discarded run on either end.
        if let Some(run) = run_if_valid(discarded) {
            let run_non_jokers: Vec<Card> = run.iter().copied().filter(|c| !c.is_joker()).collect();
            let Some(first) = run_non_jokers.first() else {
                return;
            };
            if drawn.suit() != first.suit() {
                return;
            }
            let low = run_non_jokers.iter().map(|c| c.rank_index()).min().unwrap_or(0);
            let high = run_non_jokers.iter().map(|c| c.rank_index()).max().unwrap_or(0);
            let rank = drawn.rank_index();
            if rank + 1 == low || rank == high + 1 {
                self.slamdown = Some(Slamdown {
                    player: self.players[index].name.clone(),
                    card: drawn,
                });
            }
        }
    }

    fn round_infos(&self) -> Vec<RoundPlayerInfo> {
        self.players
            .iter()
            .map(|p| RoundPlayerInfo {
                name: p.name.clone(),
                score: p.score,
            })
            .collect()
    }

    /// Reset every AI observer for the new round, then seed their pickup
    /// options with the flipped opener.
    fn notify_round(&mut self) {
        let infos = self.round_infos();
        let opener = self.draw_options();
        for player in &mut self.players {
            if let PlayerKind::Ai(brain) = &mut player.kind {
                let others: Vec<RoundPlayerInfo> = infos
                    .iter()
                    .filter(|info| info.name != player.name)
                    .cloned()
                    .collect();
                brain.observe_round(&others);
                brain.seed_draw_options(&opener);
            }
        }
    }

    fn notify_turn(&mut self, actor: usize, record: TurnRecord) {
        let pile = self.discard_pile.clone();
        let options = self.draw_options();
        for i in 0..self.players.len() {
            if i == actor {
                continue;
            }
            let own_hand = self.players[i].hand.clone();
            if let PlayerKind::Ai(brain) = &mut self.players[i].kind {
                brain.observe_turn(&record, &pile, &options, &own_hand);
            }
        }
    }
}
