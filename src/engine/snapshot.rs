//! Persistable view of a game.
//!
//! Only hands, the discard pile, scores, the turn cursor, and the slamdown
//! fields are stored. Restoring rebuilds the deck from the canonical 54
//! cards minus everything visible, then reshuffles; deck order is the one
//! thing a snapshot round-trip does not preserve.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, DECK_SIZE};

use super::errors::RestoreError;
use super::game::{Game, Slamdown};
use super::rng::GameRng;
use super::types::Player;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub score: u32,
    pub hand: Vec<u8>,
    pub is_ai: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub discard_pile: Vec<u8>,
    pub current_player_index: usize,
    pub previous_scores: Vec<u32>,
    pub last_discard_size: usize,
    pub slamdown_player: Option<String>,
    pub slamdown_card: Option<u8>,
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self
                .players()
                .iter()
                .map(|p| PlayerSnapshot {
                    name: p.name.clone(),
                    score: p.score,
                    hand: p.hand.iter().map(|c| c.id()).collect(),
                    is_ai: p.is_ai(),
                })
                .collect(),
            discard_pile: self.discard_pile().iter().map(|c| c.id()).collect(),
            current_player_index: self.current_index(),
            previous_scores: self.previous_scores().to_vec(),
            last_discard_size: self.last_discard().len(),
            slamdown_player: self.slamdown().map(|s| s.player.clone()),
            slamdown_card: self.slamdown().map(|s| s.card.id()),
        }
    }

    /// Rebuild a game from a snapshot. The deck becomes every card not in a
    /// hand or the pile, shuffled with `rng`; AI observers are re-primed
    /// with the round standing.
    pub fn restore(snapshot: GameSnapshot, rng: GameRng) -> Result<Game, RestoreError> {
        if snapshot.players.len() < 2 {
            return Err(RestoreError::NotEnoughPlayers);
        }
        if snapshot.current_player_index >= snapshot.players.len() {
            return Err(RestoreError::BadPlayerIndex {
                index: snapshot.current_player_index,
                players: snapshot.players.len(),
            });
        }
        if snapshot.last_discard_size > snapshot.discard_pile.len() {
            return Err(RestoreError::BadLastDiscardSize {
                size: snapshot.last_discard_size,
                pile: snapshot.discard_pile.len(),
            });
        }

        let mut used = [false; DECK_SIZE];
        let mut claim = |id: u8| -> Result<Card, RestoreError> {
            let card = Card::from_id(id).ok_or(RestoreError::UnknownCard(id))?;
            if used[id as usize] {
                return Err(RestoreError::DuplicateCard(id));
            }
            used[id as usize] = true;
            Ok(card)
        };

        let mut players = Vec::with_capacity(snapshot.players.len());
        for ps in &snapshot.players {
            let mut player = if ps.is_ai {
                Player::ai(ps.name.clone())
            } else {
                Player::human(ps.name.clone())
            };
            player.score = ps.score;
            for &id in &ps.hand {
                player.hand.push(claim(id)?);
            }
            players.push(player);
        }

        let mut discard_pile = Vec::with_capacity(snapshot.discard_pile.len());
        for &id in &snapshot.discard_pile {
            discard_pile.push(claim(id)?);
        }
        let last_discard =
            discard_pile[discard_pile.len() - snapshot.last_discard_size..].to_vec();

        let deck: Vec<Card> = Card::full_deck()
            .into_iter()
            .filter(|c| !used[c.id() as usize])
            .collect();

        let previous_scores = if snapshot.previous_scores.len() == players.len() {
            snapshot.previous_scores.clone()
        } else {
            players.iter().map(|p| p.score).collect()
        };

        let slamdown = match (&snapshot.slamdown_player, snapshot.slamdown_card) {
            (Some(player), Some(id)) => Some(Slamdown {
                player: player.clone(),
                card: Card::from_id(id).ok_or(RestoreError::UnknownCard(id))?,
            }),
            _ => None,
        };

        let mut game = Game::from_parts(
            players,
            deck,
            discard_pile,
            last_discard,
            snapshot.current_player_index,
            previous_scores,
            slamdown,
            rng,
        );
        game.shuffle_deck();
        game.reprime_observers();
        Ok(game)
    }
}
