use crate::ai::AiPlayer;
use crate::cards::{hand_value, Card};

/// A seated player. The AI variant carries the observer/policy state; the
/// game itself never dispatches on anything else.
#[derive(Debug)]
pub struct Player {
    pub name: String,
    pub score: u32,
    pub hand: Vec<Card>,
    pub kind: PlayerKind,
}

#[derive(Debug)]
pub enum PlayerKind {
    Human,
    Ai(AiPlayer),
}

impl Player {
    pub fn human(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            score: 0,
            hand: Vec::new(),
            kind: PlayerKind::Human,
        }
    }

    pub fn ai(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            score: 0,
            hand: Vec::new(),
            kind: PlayerKind::Ai(AiPlayer::new()),
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.kind, PlayerKind::Ai(_))
    }

    pub fn hand_value(&self) -> u32 {
        hand_value(&self.hand)
    }
}

/// Where the drawn card comes from: the face-down deck, or one of the
/// current pile pickup options by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawChoice {
    Deck,
    Pile(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnAction {
    pub discard: Vec<Card>,
    pub draw: DrawChoice,
}

/// What the rest of the table learns about a turn. `drawn` is revealed only
/// for pile draws; deck draws stay private to the drawer.
#[derive(Clone, Debug)]
pub struct TurnRecord {
    pub player: String,
    pub hand_count: usize,
    pub discarded: Vec<Card>,
    pub drawn: Option<Card>,
}

/// Result of a successfully executed turn, for room-level bookkeeping.
#[derive(Clone, Debug)]
pub struct TurnSummary {
    pub discarded: Vec<Card>,
    pub draw: DrawChoice,
    /// The picked-up card when drawn from the pile.
    pub drawn_card: Option<Card>,
}

/// Round-start standing shared with AI observers.
#[derive(Clone, Debug)]
pub struct RoundPlayerInfo {
    pub name: String,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assaf {
    pub assafed: String,
    pub by: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreChange {
    pub name: String,
    /// Points gained this round, before any reset was applied.
    pub added: i32,
    pub new_score: u32,
    pub reset: bool,
    pub eliminated: bool,
    pub final_hand: Vec<Card>,
}

/// Everything that happened when a Yaniv was declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub declarer: String,
    pub declarer_hand_value: u32,
    pub assaf: Option<Assaf>,
    pub resets: Vec<String>,
    pub eliminated: Vec<String>,
    pub score_changes: Vec<ScoreChange>,
    pub winner: Option<String>,
}
