//! Card identity and the canonical 54-card deck.
//!
//! A card is a single integer in `[0, 54)`. Ids 0 and 1 are the two jokers;
//! ids `2..54` encode the 52 standard cards as
//! `(rank_index - 1) * 4 + suit_index + 2` with ranks A..K and suits
//! Clubs, Diamonds, Hearts, Spades. The id is the wire format for hands and
//! draw options and is used as a hash key throughout the AI, so the encoding
//! is load-bearing and must stay stable across serialization.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DECK_SIZE: usize = 54;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn index(self) -> u8 {
        match self {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
        }
    }

    fn from_index(index: u8) -> Suit {
        Self::ALL[index as usize % 4]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
            Suit::Hearts => "Hearts",
            Suit::Spades => "Spades",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// 1-based rank index: A=1 .. K=13.
    pub fn index(self) -> u8 {
        self as u8 + 1
    }

    fn from_index(index: u8) -> Rank {
        Self::ALL[(index as usize - 1) % 13]
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

/// A card, identified by its integer id. Serializes to the bare id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(u8);

impl Card {
    pub fn from_id(id: u8) -> Option<Card> {
        ((id as usize) < DECK_SIZE).then_some(Card(id))
    }

    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card((rank.index() - 1) * 4 + suit.index() + 2)
    }

    /// One of the two jokers; `which` is 0 or 1.
    pub fn joker(which: u8) -> Card {
        Card(which % 2)
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn is_joker(self) -> bool {
        self.0 < 2
    }

    /// 1-based rank index (A=1 .. K=13); jokers are 0.
    pub fn rank_index(self) -> u8 {
        if self.is_joker() {
            0
        } else {
            (self.0 - 2) / 4 + 1
        }
    }

    pub fn rank(self) -> Option<Rank> {
        if self.is_joker() {
            None
        } else {
            Some(Rank::from_index(self.rank_index()))
        }
    }

    pub fn suit(self) -> Option<Suit> {
        if self.is_joker() {
            None
        } else {
            Some(Suit::from_index((self.0 - 2) % 4))
        }
    }

    /// Point value: jokers 0, face cards 10, everything else its rank.
    pub fn value(self) -> u32 {
        self.rank_index().min(10) as u32
    }

    pub fn rank_label(self) -> &'static str {
        match self.rank() {
            Some(rank) => rank.label(),
            None => "Joker",
        }
    }

    /// The 54 cards in id order.
    pub fn full_deck() -> Vec<Card> {
        (0..DECK_SIZE as u8).map(Card).collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rank(), self.suit()) {
            (Some(rank), Some(suit)) => write!(f, "{} of {}", rank.label(), suit.as_str()),
            _ => write!(f, "Joker"),
        }
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({} = {})", self.0, self)
    }
}

/// Sum of card values in a hand.
pub fn hand_value(cards: &[Card]) -> u32 {
    cards.iter().map(|c| c.value()).sum()
}

/// Client-facing card shape: `{id, rank, suit, value}` with `suit: null`
/// for jokers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDto {
    pub id: u8,
    pub rank: String,
    pub suit: Option<String>,
    pub value: u32,
}

impl From<Card> for CardDto {
    fn from(card: Card) -> Self {
        CardDto {
            id: card.id(),
            rank: card.rank_label().to_owned(),
            suit: card.suit().map(|s| s.as_str().to_owned()),
            value: card.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_encoding_round_trips() {
        for card in Card::full_deck() {
            if card.is_joker() {
                continue;
            }
            let (rank, suit) = (card.rank().unwrap(), card.suit().unwrap());
            assert_eq!(Card::new(rank, suit), card);
        }
    }

    #[test]
    fn jokers_have_no_rank_or_suit() {
        for which in 0..2 {
            let joker = Card::joker(which);
            assert!(joker.is_joker());
            assert_eq!(joker.rank(), None);
            assert_eq!(joker.suit(), None);
            assert_eq!(joker.rank_index(), 0);
            assert_eq!(joker.value(), 0);
        }
    }

    #[test]
    fn encoding_formula_pins_card_ids() {
        // 2 of Clubs is the first non-joker id.
        assert_eq!(Card::new(Rank::Two, Suit::Clubs).id(), 6);
        assert_eq!(Card::new(Rank::Ace, Suit::Clubs).id(), 2);
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).id(), 5);
        assert_eq!(Card::new(Rank::King, Suit::Spades).id(), 53);
    }

    #[test]
    fn values_cap_at_ten() {
        assert_eq!(Card::new(Rank::Ace, Suit::Hearts).value(), 1);
        assert_eq!(Card::new(Rank::Nine, Suit::Hearts).value(), 9);
        assert_eq!(Card::new(Rank::Ten, Suit::Hearts).value(), 10);
        assert_eq!(Card::new(Rank::Jack, Suit::Hearts).value(), 10);
        assert_eq!(Card::new(Rank::King, Suit::Hearts).value(), 10);
    }

    #[test]
    fn full_deck_is_fifty_four_unique_ids() {
        let deck = Card::full_deck();
        assert_eq!(deck.len(), DECK_SIZE);
        for (i, card) in deck.iter().enumerate() {
            assert_eq!(card.id() as usize, i);
        }
    }

    #[test]
    fn serializes_to_bare_id() {
        let card = Card::new(Rank::Seven, Suit::Hearts);
        assert_eq!(serde_json::to_string(&card).unwrap(), card.id().to_string());
        let back: Card = serde_json::from_str(&card.id().to_string()).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn dto_shape() {
        let dto = CardDto::from(Card::new(Rank::Queen, Suit::Diamonds));
        assert_eq!(dto.rank, "Q");
        assert_eq!(dto.suit.as_deref(), Some("Diamonds"));
        assert_eq!(dto.value, 10);

        let joker = CardDto::from(Card::joker(0));
        assert_eq!(joker.rank, "Joker");
        assert_eq!(joker.suit, None);
        assert_eq!(joker.value, 0);
    }
}
