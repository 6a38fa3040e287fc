//! Discard legality: single, set (same rank plus any jokers), or run
//! (3+ same-suit cards, strictly increasing, jokers filling the gaps).
//!
//! Pure functions; the run variant returns the cards in play order so the
//! two pickup ends can be read off directly.

use crate::cards::Card;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscardKind {
    Single,
    Set,
    /// The run with jokers interleaved into their gap positions.
    Run(Vec<Card>),
}

/// Decide whether `cards` form a legal discard.
pub fn validate_discard(cards: &[Card]) -> Option<DiscardKind> {
    if cards.is_empty() {
        return None;
    }
    if cards.len() == 1 {
        return Some(DiscardKind::Single);
    }
    let non_jokers: Vec<Card> = cards.iter().copied().filter(|c| !c.is_joker()).collect();
    if non_jokers.is_empty()
        || non_jokers
            .iter()
            .all(|c| c.rank_index() == non_jokers[0].rank_index())
    {
        return Some(DiscardKind::Set);
    }
    run_if_valid(cards).map(DiscardKind::Run)
}

/// Return the ordered run when `cards` form one, low end first.
///
/// Interior jokers fill rank gaps; surplus jokers sit at an end, and only
/// where the run has room: below the low card if its rank is above A, above
/// the high card if its rank is below K. Jokers already placed at an end in
/// play order keep that end.
pub fn run_if_valid(cards: &[Card]) -> Option<Vec<Card>> {
    if cards.len() < 3 {
        return None;
    }

    let non_jokers: Vec<Card> = cards.iter().copied().filter(|c| !c.is_joker()).collect();
    if non_jokers.is_empty() {
        return None;
    }
    let suit = non_jokers[0].suit()?;
    if non_jokers.iter().any(|c| c.suit() != Some(suit)) {
        return None;
    }

    let mut sorted = non_jokers.clone();
    sorted.sort_by_key(|c| c.rank_index());
    if sorted.windows(2).any(|w| w[0].rank_index() == w[1].rank_index()) {
        return None;
    }

    let gaps: Vec<usize> = sorted
        .windows(2)
        .map(|w| (w[1].rank_index() - w[0].rank_index() - 1) as usize)
        .collect();
    let jokers_needed: usize = gaps.iter().sum();
    let joker_count = cards.len() - non_jokers.len();
    if jokers_needed > joker_count {
        return None;
    }

    // Split jokers by where they sit in play order.
    let leading = cards.iter().take_while(|c| c.is_joker()).count();
    let trailing = cards[leading..]
        .iter()
        .rev()
        .take_while(|c| c.is_joker())
        .count();
    let mut leading_jokers: Vec<Card> = cards[..leading].to_vec();
    let mut trailing_jokers: Vec<Card> = cards[cards.len() - trailing..].to_vec();
    let mut interior_jokers: Vec<Card> = cards[leading..cards.len() - trailing]
        .iter()
        .copied()
        .filter(|c| c.is_joker())
        .collect();

    // Gap fill draws interior jokers first, then the innermost edge jokers.
    let mut gap_jokers: Vec<Card> = Vec::with_capacity(jokers_needed);
    while gap_jokers.len() < jokers_needed {
        if let Some(joker) = interior_jokers.pop() {
            gap_jokers.push(joker);
        } else if let Some(joker) = leading_jokers.pop() {
            gap_jokers.push(joker);
        } else if let Some(joker) = trailing_jokers.first().copied() {
            trailing_jokers.remove(0);
            gap_jokers.push(joker);
        } else {
            return None;
        }
    }

    // Surplus jokers extend an end one rank each; A and K are hard stops.
    let low_rank = sorted[0].rank_index();
    let high_rank = sorted[sorted.len() - 1].rank_index();
    let mut low_room = (low_rank - 1) as usize;
    let mut high_room = (13 - high_rank) as usize;
    if leading_jokers.len() > low_room || trailing_jokers.len() > high_room {
        return None;
    }
    low_room -= leading_jokers.len();
    high_room -= trailing_jokers.len();

    // Leftover interior jokers go to whichever end still has room.
    let mut low_extras: Vec<Card> = Vec::new();
    let mut high_extras: Vec<Card> = Vec::new();
    for joker in interior_jokers {
        if low_room > 0 {
            low_room -= 1;
            low_extras.push(joker);
        } else if high_room > 0 {
            high_room -= 1;
            high_extras.push(joker);
        } else {
            return None;
        }
    }

    let mut ordered = Vec::with_capacity(cards.len());
    ordered.extend(leading_jokers);
    ordered.extend(low_extras);
    let mut gap_iter = gap_jokers.into_iter();
    for (i, card) in sorted.iter().enumerate() {
        ordered.push(*card);
        if let Some(&gap) = gaps.get(i) {
            for _ in 0..gap {
                ordered.extend(gap_iter.next());
            }
        }
    }
    ordered.extend(high_extras);
    ordered.extend(trailing_jokers);

    (ordered.len() >= 3).then_some(ordered)
}

/// Pickup options from the just-played discard: a run exposes only its two
/// ends, anything else exposes every card.
pub fn draw_options(last_discard: &[Card]) -> Vec<Card> {
    match run_if_valid(last_discard) {
        Some(run) => vec![run[0], run[run.len() - 1]],
        None => last_discard.to_vec(),
    }
}
