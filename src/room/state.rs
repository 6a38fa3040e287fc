//! Per-room authoritative state and turn/round bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardDto};
use crate::engine::{DrawChoice, Game, RoundOutcome, TurnSummary};

/// Humans per room; AI seats come on top of this.
pub const MAX_HUMAN_MEMBERS: usize = 4;
pub const MAX_AI_MEMBERS: i64 = 3;
pub const NAME_LIMIT: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

impl RoomStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
        }
    }

    pub fn parse(value: &str) -> Option<RoomStatus> {
        match value {
            "waiting" => Some(RoomStatus::Waiting),
            "playing" => Some(RoomStatus::Playing),
            "finished" => Some(RoomStatus::Finished),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub pid: String,
    pub name: String,
    pub is_ai: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOptions {
    #[serde(default)]
    pub slamdowns_allowed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawSource {
    Deck,
    Pile,
    Slamdown,
}

/// The most recent play, kept for client display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastTurn {
    pub player: String,
    pub discarded: Vec<CardDto>,
    pub drawn_from: DrawSource,
    pub drawn_card: Option<CardDto>,
    pub is_slamdown: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssafSummary {
    pub assafed: String,
    pub by: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChangeSummary {
    pub name: String,
    pub added: i32,
    pub new_score: u32,
    pub reset: bool,
    pub eliminated: bool,
    pub final_hand: Vec<CardDto>,
}

/// The most recent Yaniv/assaf outcome, shown until the banner expires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastRound {
    pub declarer: String,
    pub declarer_hand_value: u32,
    pub assaf: Option<AssafSummary>,
    pub resets: Vec<String>,
    pub eliminated: Vec<String>,
    pub score_changes: Vec<ScoreChangeSummary>,
}

impl From<&RoundOutcome> for LastRound {
    fn from(outcome: &RoundOutcome) -> Self {
        LastRound {
            declarer: outcome.declarer.clone(),
            declarer_hand_value: outcome.declarer_hand_value,
            assaf: outcome.assaf.as_ref().map(|a| AssafSummary {
                assafed: a.assafed.clone(),
                by: a.by.clone(),
            }),
            resets: outcome.resets.clone(),
            eliminated: outcome.eliminated.clone(),
            score_changes: outcome
                .score_changes
                .iter()
                .map(|change| ScoreChangeSummary {
                    name: change.name.clone(),
                    added: change.added,
                    new_score: change.new_score,
                    reset: change.reset,
                    eliminated: change.eliminated,
                    final_hand: change.final_hand.iter().map(|c| CardDto::from(*c)).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug)]
pub struct Room {
    pub code: String,
    pub status: RoomStatus,
    pub members: Vec<Member>,
    pub game: Option<Game>,
    pub winner: Option<String>,
    pub last_turn: Option<LastTurn>,
    pub last_round: Option<LastRound>,
    pub round_banner_turns_left: usize,
    pub options: RoomOptions,
    pub next_room: Option<String>,
    pub ai_worker_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(code: String, members: Vec<Member>) -> Room {
        Room {
            code,
            status: RoomStatus::Waiting,
            members,
            game: None,
            winner: None,
            last_turn: None,
            last_round: None,
            round_banner_turns_left: 0,
            options: RoomOptions::default(),
            next_room: None,
            ai_worker_active: false,
            created_at: Utc::now(),
        }
    }

    /// The creator is always the first member.
    pub fn creator(&self) -> Option<&Member> {
        self.members.first()
    }

    pub fn member(&self, pid: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.pid == pid)
    }

    pub fn human_count(&self) -> usize {
        self.members.iter().filter(|m| !m.is_ai).count()
    }

    pub fn has_ai_member(&self) -> bool {
        self.members.iter().any(|m| m.is_ai)
    }

    /// Tick the round banner down; at zero the round result disappears.
    pub fn advance_round_banner(&mut self) {
        if self.round_banner_turns_left > 0 {
            self.round_banner_turns_left -= 1;
            if self.round_banner_turns_left == 0 {
                self.last_round = None;
            }
        } else {
            self.last_round = None;
        }
    }

    /// Record a completed turn for display. `draw_opts_before` are the
    /// pickup options the player chose from.
    pub fn record_turn(&mut self, player: &str, summary: &TurnSummary, draw_opts_before: &[Card]) {
        self.advance_round_banner();
        let (drawn_from, drawn_card) = match summary.draw {
            DrawChoice::Deck => (DrawSource::Deck, None),
            DrawChoice::Pile(i) => (
                DrawSource::Pile,
                draw_opts_before.get(i).map(|c| CardDto::from(*c)),
            ),
        };
        self.last_turn = Some(LastTurn {
            player: player.to_owned(),
            discarded: summary.discarded.iter().map(|c| CardDto::from(*c)).collect(),
            drawn_from,
            drawn_card,
            is_slamdown: false,
        });
    }

    pub fn record_slamdown(&mut self, player: &str, card: Card) {
        self.last_turn = Some(LastTurn {
            player: player.to_owned(),
            discarded: vec![CardDto::from(card)],
            drawn_from: DrawSource::Slamdown,
            drawn_card: None,
            is_slamdown: true,
        });
    }

    /// Fold a Yaniv outcome into the room. Returns true when the game just
    /// finished.
    pub fn apply_round_outcome(&mut self, outcome: &RoundOutcome) -> bool {
        self.last_round = Some(LastRound::from(outcome));
        self.round_banner_turns_left = self
            .game
            .as_ref()
            .map(|g| g.players().len())
            .unwrap_or_default();
        self.last_turn = None;

        let remaining = self.game.as_ref().map(|g| g.players().len()).unwrap_or(0);
        if outcome.winner.is_some() || remaining <= 1 {
            self.status = RoomStatus::Finished;
            self.winner = outcome.winner.clone();
            return true;
        }
        false
    }
}

/// Trim and bound a display name, falling back to "Player".
pub fn sanitize_name(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim();
    let bounded: String = trimmed.chars().take(NAME_LIMIT).collect();
    if bounded.is_empty() {
        "Player".to_owned()
    } else {
        bounded
    }
}
