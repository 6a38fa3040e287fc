//! What an AI knows about the table.
//!
//! The model is built entirely from public information: turn notifications,
//! the discard pile, and the current pickup options. Pickups from the pile
//! are known cards until discarded again; deck draws only shrink the
//! unseen pool.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cards::{Card, Suit};
use crate::engine::types::{RoundPlayerInfo, TurnRecord};

use super::memo::MemoTables;

pub const DEFAULT_ROLLOUT_SAMPLES: usize = 24;

/// How many of an opponent's most recent discards count as "recent" for the
/// feed penalty.
pub(crate) const RECENT_DISCARDS: usize = 3;

#[derive(Debug, Clone)]
pub struct OpponentModel {
    pub current_score: u32,
    pub hand_count: usize,
    /// Cards this opponent picked up from the pile and has not discarded.
    pub known_cards: Vec<Card>,
    pub estimated_score: f64,
    pub pickup_history: Vec<Card>,
    pub discard_history: Vec<Card>,
    /// Rank index -> number of pile pickups of that rank. Never pruned; a
    /// soft signal of what the opponent is collecting.
    pub collected_ranks: HashMap<u8, u32>,
    pub collected_suit_ranks: HashMap<Suit, BTreeSet<u8>>,
}

impl OpponentModel {
    fn new(current_score: u32) -> Self {
        OpponentModel {
            current_score,
            hand_count: 5,
            known_cards: Vec::new(),
            estimated_score: 50.0,
            pickup_history: Vec::new(),
            discard_history: Vec::new(),
            collected_ranks: HashMap::new(),
            collected_suit_ranks: HashMap::new(),
        }
    }

    pub(crate) fn known_sum(&self) -> u32 {
        self.known_cards.iter().map(|c| c.value()).sum()
    }

    pub(crate) fn unknown_count(&self) -> usize {
        self.hand_count.saturating_sub(self.known_cards.len())
    }

    pub(crate) fn recently_discarded_rank(&self, rank_index: u8) -> bool {
        self.discard_history
            .iter()
            .rev()
            .take(RECENT_DISCARDS)
            .any(|c| !c.is_joker() && c.rank_index() == rank_index)
    }
}

/// Observer state plus the policy caches. One per AI seat.
#[derive(Debug)]
pub struct AiPlayer {
    pub(crate) rollout_samples: usize,
    /// Keyed by opponent name; BTreeMap keeps iteration (and the rollout
    /// seed) deterministic.
    pub(crate) opponents: BTreeMap<String, OpponentModel>,
    pub(crate) draw_options: Vec<Card>,
    pub(crate) public_discard_pile: Vec<Card>,
    pub(crate) memo: MemoTables,
}

impl AiPlayer {
    pub fn new() -> Self {
        Self::with_rollout_samples(DEFAULT_ROLLOUT_SAMPLES)
    }

    pub fn with_rollout_samples(rollout_samples: usize) -> Self {
        AiPlayer {
            rollout_samples: rollout_samples.max(4),
            opponents: BTreeMap::new(),
            draw_options: Vec::new(),
            public_discard_pile: Vec::new(),
            memo: MemoTables::new(),
        }
    }

    pub fn opponents(&self) -> &BTreeMap<String, OpponentModel> {
        &self.opponents
    }

    /// Reset all per-round state. `others` is every *other* player still in
    /// the game with their current score.
    pub fn observe_round(&mut self, others: &[RoundPlayerInfo]) {
        self.opponents.clear();
        self.draw_options.clear();
        self.public_discard_pile.clear();
        self.memo.clear();
        for info in others {
            self.opponents
                .insert(info.name.clone(), OpponentModel::new(info.score));
        }
    }

    /// Make the freshly flipped pile cards visible right after a deal.
    pub fn seed_draw_options(&mut self, options: &[Card]) {
        self.draw_options = options.to_vec();
    }

    /// Fold one opponent turn into the model. `own_hand` is this AI's own
    /// hand, needed to scope the unseen pool.
    pub fn observe_turn(
        &mut self,
        record: &TurnRecord,
        discard_pile: &[Card],
        draw_options: &[Card],
        own_hand: &[Card],
    ) {
        self.draw_options = draw_options.to_vec();
        self.public_discard_pile = discard_pile.to_vec();

        let Some(model) = self.opponents.get_mut(&record.player) else {
            return;
        };
        model.hand_count = record.hand_count;

        for card in &record.discarded {
            if let Some(pos) = model.known_cards.iter().position(|c| c == card) {
                model.known_cards.remove(pos);
            }
            model.discard_history.push(*card);
        }

        if let Some(drawn) = record.drawn {
            model.known_cards.push(drawn);
            model.pickup_history.push(drawn);
            if let Some(suit) = drawn.suit() {
                *model.collected_ranks.entry(drawn.rank_index()).or_insert(0) += 1;
                model
                    .collected_suit_ranks
                    .entry(suit)
                    .or_default()
                    .insert(drawn.rank_index());
            }
        }

        self.estimate_hand_values(own_hand);
    }

    /// Re-estimate every opponent's hand total: known cards at face value,
    /// unknown cards at the mean of the unseen pool.
    pub(crate) fn estimate_hand_values(&mut self, own_hand: &[Card]) {
        let unseen = self.unseen_cards(own_hand);
        let (mean_value, _) = mean_and_variance(&unseen);
        for model in self.opponents.values_mut() {
            model.estimated_score =
                model.known_sum() as f64 + model.unknown_count() as f64 * mean_value;
        }
    }

    /// Cards that could still be anywhere: the full deck minus our hand,
    /// the public pile, the visible pickup options, and every known
    /// opponent card.
    pub(crate) fn unseen_cards(&self, own_hand: &[Card]) -> Vec<Card> {
        let mut visible = [false; crate::cards::DECK_SIZE];
        for card in own_hand
            .iter()
            .chain(self.draw_options.iter())
            .chain(self.public_discard_pile.iter())
        {
            visible[card.id() as usize] = true;
        }
        for model in self.opponents.values() {
            for card in &model.known_cards {
                visible[card.id() as usize] = true;
            }
        }
        Card::full_deck()
            .into_iter()
            .filter(|c| !visible[c.id() as usize])
            .collect()
    }
}

impl Default for AiPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean and population variance of card values; the neutral prior when the
/// pool is empty.
pub(crate) fn mean_and_variance(cards: &[Card]) -> (f64, f64) {
    if cards.is_empty() {
        return (5.0, 8.0);
    }
    let values: Vec<f64> = cards.iter().map(|c| c.value() as f64).collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance)
}
