use thiserror::Error;

/// A rejected turn action. State is never mutated when one of these is
/// returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Invalid 'draw' action. Index out of range of draw options.")]
    DrawOutOfRange,
    #[error("Card not in hand")]
    CardNotInHand,
    #[error(
        "Invalid discard: must be a single card, a set (same rank), \
         or a run (3 or more consecutive cards of the same suit)."
    )]
    InvalidDiscard,
    #[error("Must discard at least one card")]
    EmptyDiscard,
    #[error("Cannot declare Yaniv with more than 5 points.")]
    YanivAboveLimit,
    #[error("No slamdown available for this player.")]
    SlamdownUnavailable,
    #[error("Slamdown card not in hand.")]
    SlamdownCardMissing,
    #[error("Cannot slamdown your last card.")]
    SlamdownLastCard,
    #[error("Need at least 2 players")]
    NotEnoughPlayers,
    #[error("Deck exhausted")]
    DeckExhausted,
}

/// A game snapshot that cannot be restored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RestoreError {
    #[error("unknown card id {0}")]
    UnknownCard(u8),
    #[error("card id {0} appears more than once")]
    DuplicateCard(u8),
    #[error("last discard size {size} exceeds pile size {pile}")]
    BadLastDiscardSize { size: usize, pile: usize },
    #[error("current player index {index} out of range for {players} players")]
    BadPlayerIndex { index: usize, players: usize },
    #[error("Need at least 2 players")]
    NotEnoughPlayers,
}
