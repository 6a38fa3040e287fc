//! Turn selection and the Yaniv call.
//!
//! Every candidate (discard, draw) pair gets an expected-cost score; lower
//! is better. Pile draws are evaluated exactly, deck draws over a seeded
//! sample of the unseen pool so repeated evaluations of the same turn are
//! identical.

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cards::{hand_value, Card, Suit};
use crate::engine::types::{DrawChoice, TurnAction};

use super::memo::hand_signature;
use super::observer::{mean_and_variance, AiPlayer, OpponentModel};

const IMMEDIATE_THREAT_WEIGHT: f64 = 0.06;
const FEED_PENALTY_WEIGHT: f64 = 0.22;
const JOKER_PENALTY_WEIGHT: f64 = 0.08;
const UNCERTAINTY_WEIGHT: f64 = 0.04;
const COMPOSITION_WEIGHT: f64 = 0.10;
const JOKER_DISCARD_PENALTY: f64 = 1.5;
const RESET_BONUS_CAP: f64 = 24.0;
const RESET_IMPACT_CAP: f64 = 4.0;
const THREAT_CAP: f64 = 1.5;

/// Per-turn evaluation inputs, built once before the candidate loop.
struct ActionContext {
    sampled: Vec<Card>,
    deck_variance: f64,
    known_ranks: HashSet<u8>,
    known_suit_ranks: HashMap<Suit, BTreeSet<u8>>,
    threat: f64,
    yaniv_next_turn_prob: f64,
}

impl AiPlayer {
    /// Pick the turn to play for `hand` at the given running score.
    pub fn decide_action(&mut self, hand: &[Card], score: u32) -> TurnAction {
        // Someone looks ready to call Yaniv: grab a reset landing if one is
        // on the table.
        if self
            .opponents
            .values()
            .any(|model| model.estimated_score <= 5.0)
        {
            if let Some(action) = self.action_to_reset(hand, score) {
                return action;
            }
        }

        let context = self.build_context(hand, score);
        let pile_options = self.draw_options.clone();
        let discard_candidates = self.discard_options_cached(hand);

        let mut best: Option<(TurnAction, f64, u32)> = None;
        let consider = |best: &mut Option<(TurnAction, f64, u32)>,
                            action: TurnAction,
                            action_score: f64,
                            discard_value: u32| {
            let replace = match best {
                None => true,
                Some((_, current, value)) => {
                    action_score < *current || (action_score == *current && discard_value > *value)
                }
            };
            if replace {
                *best = Some((action, action_score, discard_value));
            }
        };

        for discard in &discard_candidates {
            let post_discard = remove_cards(hand, discard);
            let post_sum = hand_value(&post_discard);
            let discard_value = hand_value(discard);
            let feed = self.feed_penalty(discard, &context.known_ranks, &context.known_suit_ranks);
            let joker_penalty = JOKER_DISCARD_PENALTY
                * discard.iter().filter(|c| c.is_joker()).count() as f64;

            for (i, draw_card) in pile_options.iter().enumerate() {
                let (future, best_next) = self.simulate_action(&post_discard, *draw_card, false);
                let immediate = (post_sum + draw_card.value()) as f64;
                let heuristic = heuristic_cost(context.threat, immediate, feed, joker_penalty);
                let reset_bonus = self.reset_bonus(
                    post_sum + draw_card.value(),
                    context.yaniv_next_turn_prob,
                    score,
                );
                let composition = COMPOSITION_WEIGHT
                    * self.composition_bonus(&post_discard, *draw_card, best_next.as_deref());
                let action_score = future + heuristic - reset_bonus - composition;
                consider(
                    &mut best,
                    TurnAction {
                        discard: discard.clone(),
                        draw: DrawChoice::Pile(i),
                    },
                    action_score,
                    discard_value,
                );
            }

            let deck = self.evaluate_deck_draw(&post_discard, &context, score);
            let uncertainty =
                UNCERTAINTY_WEIGHT * context.deck_variance.sqrt() * (1.0 + context.threat);
            let heuristic = heuristic_cost(context.threat, deck.immediate, feed, joker_penalty);
            let action_score =
                deck.future + heuristic + uncertainty - deck.reset_bonus - deck.composition;
            consider(
                &mut best,
                TurnAction {
                    discard: discard.clone(),
                    draw: DrawChoice::Deck,
                },
                action_score,
                discard_value,
            );
        }

        match best {
            Some((action, _, _)) => action,
            None => self.action_to_minimize_score(hand),
        }
    }

    /// Whether to call Yaniv now: compare the modeled assaf risk against a
    /// hand-value threshold tightened by score pressure and reset impact.
    pub fn should_declare_yaniv(&mut self, hand: &[Card], score: u32) -> bool {
        let own_value = hand_value(hand);
        if own_value > 5 {
            return false;
        }
        if self.opponents.is_empty() {
            return own_value <= 2;
        }

        let unseen = self.unseen_cards(hand);
        let (mean_value, var_value) = mean_and_variance(&unseen);

        let mut not_assaf = 1.0;
        for model in self.opponents.values() {
            let p = estimate_assaf_probability(model, own_value, mean_value, var_value);
            not_assaf *= 1.0 - p;
        }
        let assaf_risk = 1.0 - not_assaf;

        let mut threshold = match own_value {
            0 => 0.60,
            1 => 0.55,
            2 => 0.45,
            3 => 0.32,
            4 => 0.20,
            5 => 0.12,
            _ => 0.10,
        };

        // A high running score makes getting assafed more expensive.
        let score_pressure = (score as f64 / 100.0).clamp(0.0, 1.0);
        threshold *= 1.0 - 0.35 * score_pressure;
        threshold = threshold.max(0.03);
        threshold -= 0.04 * self.reset_impact();

        assaf_risk <= threshold
    }

    /// A discard/draw pair that lands our score exactly on a multiple of 50.
    fn action_to_reset(&mut self, hand: &[Card], score: u32) -> Option<TurnAction> {
        let pile_options = self.draw_options.clone();
        for discard in self.discard_options_cached(hand) {
            let discard_value = hand_value(&discard) as i64;
            for (i, draw_card) in pile_options.iter().enumerate() {
                let landing = discard_value - draw_card.value() as i64 + score as i64;
                if landing.rem_euclid(50) == 0 {
                    return Some(TurnAction {
                        discard,
                        draw: DrawChoice::Pile(i),
                    });
                }
            }
        }
        None
    }

    /// Greedy fallback: the move that minimizes next-turn residual points.
    fn action_to_minimize_score(&mut self, hand: &[Card]) -> TurnAction {
        let options = self.discard_options_cached(hand);
        let mut best_discard = best_discard_options(&options)
            .first()
            .cloned()
            .or_else(|| options.first().cloned())
            .unwrap_or_else(|| hand.first().map(|c| vec![*c]).unwrap_or_default());
        let mut best_score = (hand_value(hand) - hand_value(&best_discard)) as f64;
        let mut best_draw = DrawChoice::Deck;

        for discard in &options {
            let post_discard = remove_cards(hand, discard);
            let (draw, score) = self.best_pile_draw(&post_discard);
            if score < best_score
                || (score == best_score && hand_value(discard) < hand_value(&best_discard))
            {
                best_score = score;
                best_draw = draw;
                best_discard = discard.clone();
            }
        }

        TurnAction {
            discard: best_discard,
            draw: best_draw,
        }
    }

    /// Best known pile pickup for a post-discard hand, or the deck when no
    /// pickup beats it.
    fn best_pile_draw(&mut self, post_discard: &[Card]) -> (DrawChoice, f64) {
        let pile_options = self.draw_options.clone();
        let mut best = (DrawChoice::Deck, f64::INFINITY);
        for (i, draw_card) in pile_options.iter().enumerate() {
            let (score, _) = self.simulate_action(post_discard, *draw_card, true);
            if score < best.1 {
                best = (DrawChoice::Pile(i), score);
            }
        }
        best
    }

    fn build_context(&mut self, hand: &[Card], score: u32) -> ActionContext {
        let unseen = self.unseen_cards(hand);
        let (sampled, deck_variance) = self.rollout_sample(&unseen, hand, score);
        let (known_ranks, known_suit_ranks) = self.known_card_indexes();
        ActionContext {
            sampled,
            deck_variance,
            known_ranks,
            known_suit_ranks,
            threat: self.opponent_threat_score(),
            yaniv_next_turn_prob: self.opponent_yaniv_next_turn_probability(),
        }
    }

    /// Sample the unseen pool for deck-draw evaluation. The seed is derived
    /// from observable state only, so equal observable states sample
    /// identically.
    fn rollout_sample(&self, unseen: &[Card], hand: &[Card], score: u32) -> (Vec<Card>, f64) {
        if unseen.is_empty() {
            return (Vec::new(), 8.0);
        }
        let (_, variance) = mean_and_variance(unseen);
        let count = self.rollout_samples.min(unseen.len());
        if count == unseen.len() {
            return (unseen.to_vec(), variance);
        }
        let mut rng = StdRng::seed_from_u64(self.state_seed(hand, score) as u64);
        let sampled = rand::seq::index::sample(&mut rng, unseen.len(), count)
            .iter()
            .map(|i| unseen[i])
            .collect();
        (sampled, variance)
    }

    /// FNV-1a over the observable state, mirrored field-for-field so equal
    /// states produce equal rollouts.
    fn state_seed(&self, hand: &[Card], score: u32) -> u32 {
        let mut values: Vec<u32> = vec![score];
        let mut hand_ids: Vec<u32> = hand.iter().map(|c| c.id() as u32).collect();
        hand_ids.sort_unstable();
        values.extend(hand_ids);
        let mut option_ids: Vec<u32> = self.draw_options.iter().map(|c| c.id() as u32).collect();
        option_ids.sort_unstable();
        values.extend(option_ids);
        values.push(self.public_discard_pile.len() as u32);
        values.extend(self.opponents.values().map(|m| m.hand_count as u32));

        let mut seed: u32 = 2_166_136_261;
        for value in values {
            seed ^= value.wrapping_add(0x9E37_79B9);
            seed = seed.wrapping_mul(16_777_619);
        }
        seed
    }

    fn known_card_indexes(&self) -> (HashSet<u8>, HashMap<Suit, BTreeSet<u8>>) {
        let mut known_ranks = HashSet::new();
        let mut known_suit_ranks: HashMap<Suit, BTreeSet<u8>> = HashMap::new();
        for model in self.opponents.values() {
            for card in &model.known_cards {
                let Some(suit) = card.suit() else {
                    continue;
                };
                known_ranks.insert(card.rank_index());
                known_suit_ranks.entry(suit).or_default().insert(card.rank_index());
            }
        }
        (known_ranks, known_suit_ranks)
    }

    /// How dangerous the closest opponent looks, in `[0, 1.5]`.
    fn opponent_threat_score(&self) -> f64 {
        let mut threat: f64 = 0.0;
        for model in self.opponents.values() {
            let mut player_threat = ((8.0 - model.estimated_score) / 8.0).max(0.0);
            if model.hand_count <= 2 {
                player_threat += 0.30;
            }
            if model.hand_count <= 1 {
                player_threat += 0.25;
            }
            threat = threat.max(player_threat);
        }
        threat.min(THREAT_CAP)
    }

    /// Probability that at least one opponent calls Yaniv on their next
    /// turn, assuming independence.
    fn opponent_yaniv_next_turn_probability(&self) -> f64 {
        if self.opponents.is_empty() {
            return 0.0;
        }
        let mut not_yaniv = 1.0;
        for model in self.opponents.values() {
            let estimated = model.estimated_score;
            if estimated > 6.5 {
                continue;
            }
            let mut p = if estimated <= 5.0 {
                0.55 + (5.0 - estimated) * 0.08
            } else {
                0.18 + (6.5 - estimated) * 0.25
            };
            if model.hand_count <= 2 {
                p += 0.10;
            } else if model.hand_count == 3 {
                p += 0.05;
            }
            let low_known = model.known_cards.iter().filter(|c| c.value() <= 3).count();
            p += 0.03 * low_known as f64;
            p = p.clamp(0.0, 0.92);
            not_yaniv *= 1.0 - p;
        }
        1.0 - not_yaniv
    }

    /// Expected value of ending this turn exactly on 50 or 100: an opponent
    /// must both Yaniv and beat us for the reset to land.
    fn reset_bonus(&self, hand_total: u32, yaniv_next_turn_prob: f64, score: u32) -> f64 {
        let projected = score + hand_total;
        if projected != 50 && projected != 100 {
            return 0.0;
        }
        let success_factor = if hand_total <= 5 {
            0.25
        } else if hand_total <= 7 {
            0.55
        } else {
            0.75
        };
        (50.0 * yaniv_next_turn_prob * success_factor).min(RESET_BONUS_CAP)
    }

    /// How hard calling Yaniv now would push opponents onto their own
    /// 50/100 reset, capped at 4.0.
    fn reset_impact(&self) -> f64 {
        let mut impact = 0.0;
        for model in self.opponents.values() {
            let projected = model.current_score as f64 + model.estimated_score;
            let distance = (projected - 50.0).abs().min((projected - 100.0).abs());
            if distance <= 3.0 {
                impact += 1.0 - distance / 3.0;
            }
        }
        impact.min(RESET_IMPACT_CAP)
    }

    /// Cost of handing the discarded cards to the table.
    fn feed_penalty(
        &self,
        discard: &[Card],
        known_ranks: &HashSet<u8>,
        known_suit_ranks: &HashMap<Suit, BTreeSet<u8>>,
    ) -> f64 {
        let mut penalty = 0.0;
        for card in discard {
            if card.is_joker() {
                penalty += 4.0;
                continue;
            }
            let value = card.value();
            penalty += if value <= 3 {
                1.5
            } else if value <= 5 {
                1.0
            } else {
                0.2
            };

            let rank = card.rank_index();
            let Some(suit) = card.suit() else {
                continue;
            };
            if known_ranks.contains(&rank) {
                penalty += 1.3;
            }
            if let Some(ranks) = known_suit_ranks.get(&suit) {
                if ranks.contains(&rank)
                    || (rank > 1 && ranks.contains(&(rank - 1)))
                    || ranks.contains(&(rank + 1))
                {
                    penalty += 0.8;
                }
            }

            for model in self.opponents.values() {
                if let Some(&count) = model.collected_ranks.get(&rank) {
                    penalty += 2.0 * count as f64;
                }
                if let Some(collected) = model.collected_suit_ranks.get(&suit) {
                    let below = rank > 1 && collected.contains(&(rank - 1));
                    let above = collected.contains(&(rank + 1));
                    if below || above {
                        penalty += 1.5;
                    }
                    if below && above {
                        penalty += 2.5;
                    }
                }
                if model.recently_discarded_rank(rank) {
                    penalty -= 0.6;
                }
            }
        }
        penalty
    }

    /// Averaged deck-draw evaluation over the rollout sample.
    fn evaluate_deck_draw(
        &mut self,
        post_discard: &[Card],
        context: &ActionContext,
        score: u32,
    ) -> DeckEvaluation {
        let post_sum = hand_value(post_discard);
        if context.sampled.is_empty() {
            return DeckEvaluation {
                future: self.best_residual(post_discard) as f64,
                immediate: post_sum as f64 + 5.0,
                reset_bonus: 0.0,
                composition: 0.0,
            };
        }

        let mut future = 0.0;
        let mut immediate = 0.0;
        let mut reset_bonus = 0.0;
        let mut composition = 0.0;
        for draw_card in &context.sampled {
            let (sample_future, best_next) = self.simulate_action(post_discard, *draw_card, false);
            future += sample_future;
            immediate += (post_sum + draw_card.value()) as f64;
            reset_bonus += self.reset_bonus(
                post_sum + draw_card.value(),
                context.yaniv_next_turn_prob,
                score,
            );
            composition += COMPOSITION_WEIGHT
                * self.composition_bonus(post_discard, *draw_card, best_next.as_deref());
        }
        let n = context.sampled.len() as f64;
        DeckEvaluation {
            future: future / n,
            immediate: immediate / n,
            reset_bonus: reset_bonus / n,
            composition: composition / n,
        }
    }

    /// Best residual after the next turn given the drawn card: minimum over
    /// the next hand's discard options.
    fn simulate_action(
        &mut self,
        post_discard: &[Card],
        draw_card: Card,
        prune_to_best_discard: bool,
    ) -> (f64, Option<Vec<Card>>) {
        let mut new_hand = post_discard.to_vec();
        new_hand.push(draw_card);
        let key = (hand_signature(&new_hand), prune_to_best_discard);
        if let Some(cached) = self.memo.simulate_action.get(&key) {
            return cached;
        }

        let candidates = if prune_to_best_discard {
            self.best_discard_options_cached(&new_hand)
        } else {
            self.discard_options_cached(&new_hand)
        };

        let total = hand_value(&new_hand);
        let mut future = f64::INFINITY;
        let mut best_next = None;
        for option in candidates {
            let residual = (total - hand_value(&option)) as f64;
            if residual <= future {
                future = residual;
                best_next = Some(option);
            }
        }

        let out = (future, best_next);
        self.memo.simulate_action.insert(key, out.clone());
        out
    }

    /// Shape bonus for the hand we would hold after drawing and making the
    /// best next discard.
    fn composition_bonus(
        &mut self,
        post_discard: &[Card],
        draw_card: Card,
        best_next_discard: Option<&[Card]>,
    ) -> f64 {
        let mut hand_after = post_discard.to_vec();
        hand_after.push(draw_card);
        if let Some(discard) = best_next_discard {
            hand_after = remove_cards(&hand_after, discard);
        }
        self.meld_potential(&hand_after)
    }

    /// How much meld structure a hand still holds: rewards long and
    /// high-value combos.
    fn meld_potential(&mut self, hand: &[Card]) -> f64 {
        let options = self.discard_options_cached(hand);
        let combos: Vec<&Vec<Card>> = options.iter().filter(|o| o.len() >= 2).collect();
        if combos.is_empty() {
            return 0.0;
        }
        let longest = combos.iter().map(|o| o.len()).max().unwrap_or(0);
        let strongest = combos.iter().map(|o| hand_value(o)).max().unwrap_or(0);
        0.7 * longest as f64 + 0.1 * strongest as f64
    }

    fn best_residual(&mut self, hand: &[Card]) -> u32 {
        let signature = hand_signature(hand);
        if let Some(cached) = self.memo.best_residual.get(&signature) {
            return cached;
        }
        let total = hand_value(hand);
        let best = self
            .discard_options_cached(hand)
            .iter()
            .map(|option| total - hand_value(option))
            .min()
            .unwrap_or(total);
        self.memo.best_residual.insert(signature, best);
        best
    }

    pub(crate) fn discard_options_cached(&mut self, hand: &[Card]) -> Vec<Vec<Card>> {
        let signature = hand_signature(hand);
        if let Some(cached) = self.memo.discard_options.get(&signature) {
            return cached;
        }
        let options = super::enumerate::discard_options(hand);
        self.memo.discard_options.insert(signature, options.clone());
        options
    }

    fn best_discard_options_cached(&mut self, hand: &[Card]) -> Vec<Vec<Card>> {
        let signature = hand_signature(hand);
        if let Some(cached) = self.memo.best_discard_options.get(&signature) {
            return cached;
        }
        let options = self.discard_options_cached(hand);
        let best = best_discard_options(&options);
        self.memo
            .best_discard_options
            .insert(signature, best.clone());
        best
    }
}

struct DeckEvaluation {
    future: f64,
    immediate: f64,
    reset_bonus: f64,
    composition: f64,
}

fn heuristic_cost(threat: f64, immediate_points: f64, feed_penalty: f64, joker_penalty: f64) -> f64 {
    IMMEDIATE_THREAT_WEIGHT * threat * immediate_points
        + FEED_PENALTY_WEIGHT * feed_penalty
        + JOKER_PENALTY_WEIGHT * joker_penalty
}

/// Hand minus the given cards, matching one card per entry.
fn remove_cards(hand: &[Card], cards: &[Card]) -> Vec<Card> {
    let mut remaining = hand.to_vec();
    for card in cards {
        if let Some(pos) = remaining.iter().position(|c| c == card) {
            remaining.remove(pos);
        }
    }
    remaining
}

/// The highest-value discards; ties prefer fewer cards, equal shapes are
/// all kept.
fn best_discard_options(options: &[Vec<Card>]) -> Vec<Vec<Card>> {
    let mut best: Vec<Vec<Card>> = Vec::new();
    let mut best_points = 0;
    for option in options {
        let points = hand_value(option);
        if points > best_points {
            best_points = points;
            best = vec![option.clone()];
        } else if points == best_points && !best.is_empty() {
            if option.len() < best[0].len() {
                best = vec![option.clone()];
            } else if option.len() == best[0].len() {
                best.push(option.clone());
            }
        }
    }
    best
}

/// P(opponent's hand ≤ ours), modeling the unknown cards as Normal with a
/// continuity correction.
fn estimate_assaf_probability(
    model: &OpponentModel,
    own_hand_value: u32,
    mean_value: f64,
    var_value: f64,
) -> f64 {
    let known_sum = model.known_sum();
    let unknown_count = model.unknown_count();
    if unknown_count == 0 {
        return if known_sum <= own_hand_value { 1.0 } else { 0.0 };
    }
    let expected = known_sum as f64 + unknown_count as f64 * mean_value;
    let variance = (unknown_count as f64 * var_value).max(0.01);
    let z = ((own_hand_value as f64 + 0.5) - expected) / variance.sqrt();
    let cdf = 0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2));
    cdf.clamp(0.01, 0.99)
}

/// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}
