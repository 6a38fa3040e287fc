//! Enumeration of every legal discard a hand can make.

use itertools::Itertools;

use crate::cards::Card;

/// All legal discards: singletons, same-rank sets with any joker subset,
/// and same-suit runs whose gaps the jokers can fill, plus single-joker
/// extensions of those runs at either end (bounded by A and K).
pub fn discard_options(hand: &[Card]) -> Vec<Vec<Card>> {
    let mut options: Vec<Vec<Card>> = hand.iter().map(|c| vec![*c]).collect();

    let jokers: Vec<Card> = hand.iter().copied().filter(|c| c.is_joker()).collect();
    let non_jokers: Vec<Card> = hand.iter().copied().filter(|c| !c.is_joker()).collect();

    for size in 2..=non_jokers.len() {
        for combo in non_jokers.iter().copied().combinations(size) {
            if combo.iter().all(|c| c.rank_index() == combo[0].rank_index()) {
                for joker_count in 0..=jokers.len() {
                    for joker_combo in jokers.iter().copied().combinations(joker_count) {
                        let mut option = combo.clone();
                        option.extend(joker_combo);
                        options.push(option);
                    }
                }
                continue;
            }

            if !combo.iter().all(|c| c.suit() == combo[0].suit()) {
                continue;
            }

            let mut sorted = combo.clone();
            sorted.sort_by_key(|c| c.rank_index());
            let gaps: Vec<usize> = sorted
                .windows(2)
                .map(|w| (w[1].rank_index() - w[0].rank_index() - 1) as usize)
                .collect();
            let total_gap: usize = gaps.iter().sum();
            if total_gap > jokers.len() {
                continue;
            }

            // Interleave gap-filling jokers in rank order.
            let mut run = Vec::with_capacity(sorted.len() + total_gap);
            let mut joker_iter = jokers.iter().copied();
            for (i, card) in sorted.iter().enumerate() {
                run.push(*card);
                if let Some(&gap) = gaps.get(i) {
                    for _ in 0..gap {
                        run.extend(joker_iter.next());
                    }
                }
            }

            let remaining: Vec<Card> = joker_iter.collect();
            for joker in remaining {
                if run[0].rank_index() > 1 {
                    let mut extended = Vec::with_capacity(run.len() + 1);
                    extended.push(joker);
                    extended.extend(run.iter().copied());
                    options.push(extended);
                }
                if run[run.len() - 1].rank_index() < 13 {
                    let mut extended = run.clone();
                    extended.push(joker);
                    options.push(extended);
                }
            }

            if run.len() >= 3 {
                options.push(run);
            }
        }
    }

    options
}
