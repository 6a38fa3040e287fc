//! Per-recipient room snapshots: the one payload every endpoint and the
//! push channel serve.
//!
//! Hands, draw options, `canYaniv`, and the slamdown card are populated
//! only for the requesting pid; everyone else sees counts.

use serde::Serialize;

use crate::cards::CardDto;
use crate::engine::Game;

use super::state::{LastRound, LastTurn, Member, Room, RoomOptions, RoomStatus};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub score: u32,
    pub hand_count: usize,
    pub is_ai: bool,
    pub is_current: bool,
    pub pid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<CardDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_self: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_yaniv: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub players: Vec<PlayerView>,
    pub discard_top: Vec<CardDto>,
    pub draw_options: Vec<CardDto>,
    pub current_player_name: String,
    pub is_my_turn: bool,
    pub deck_size: usize,
    pub can_slamdown: bool,
    pub slamdown_card: Option<CardDto>,
    pub slamdowns_allowed: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: String,
    pub status: RoomStatus,
    pub members: Vec<Member>,
    pub game: Option<GameView>,
    pub winner: Option<String>,
    pub last_turn: Option<LastTurn>,
    pub last_round: Option<LastRound>,
    pub next_room: Option<String>,
    pub options: RoomOptions,
}

/// Build the snapshot a given pid should see. Sorts the current hand as a
/// side effect (stable client render), hence `&mut Room`.
pub fn build_snapshot(room: &mut Room, pid: Option<&str>) -> RoomSnapshot {
    let game_view = match room.status {
        RoomStatus::Finished => room
            .game
            .as_ref()
            .map(|game| finished_game_view(game, &room.members, &room.options)),
        _ => {
            let members = room.members.clone();
            let options = room.options;
            room.game
                .as_mut()
                .map(|game| active_game_view(game, &members, &options, pid))
        }
    };

    RoomSnapshot {
        code: room.code.clone(),
        status: room.status,
        members: room.members.clone(),
        game: game_view,
        winner: room.winner.clone(),
        last_turn: room.last_turn.clone(),
        last_round: room.last_round.clone(),
        next_room: room.next_room.clone(),
        options: room.options,
    }
}

/// Game over: scores only. `start_turn` is not safe to call once players
/// have been eliminated.
fn finished_game_view(game: &Game, members: &[Member], options: &RoomOptions) -> GameView {
    let players = game
        .players()
        .iter()
        .map(|p| PlayerView {
            name: p.name.clone(),
            score: p.score,
            hand_count: p.hand.len(),
            is_ai: p.is_ai(),
            is_current: false,
            pid: member_pid(members, &p.name),
            hand: None,
            is_self: None,
            can_yaniv: None,
        })
        .collect();
    GameView {
        players,
        discard_top: Vec::new(),
        draw_options: Vec::new(),
        current_player_name: String::new(),
        is_my_turn: false,
        deck_size: 0,
        can_slamdown: false,
        slamdown_card: None,
        slamdowns_allowed: options.slamdowns_allowed,
    }
}

fn active_game_view(
    game: &mut Game,
    members: &[Member],
    options: &RoomOptions,
    pid: Option<&str>,
) -> GameView {
    let (current_index, draw_options) = game.start_turn();
    let current_name = game.player(current_index).name.clone();

    let viewer = pid.and_then(|p| members.iter().find(|m| m.pid == p));

    let players = game
        .players()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let member_pid = member_pid(members, &p.name);
            let is_self = viewer
                .map(|m| !p.is_ai() && m.name == p.name)
                .unwrap_or(false);
            PlayerView {
                name: p.name.clone(),
                score: p.score,
                hand_count: p.hand.len(),
                is_ai: p.is_ai(),
                is_current: i == current_index,
                pid: member_pid,
                hand: is_self.then(|| p.hand.iter().map(|c| CardDto::from(*c)).collect()),
                is_self: is_self.then_some(true),
                can_yaniv: is_self.then(|| game.can_declare_yaniv(i)),
            }
        })
        .collect();

    let is_my_turn = viewer.map(|m| m.name == current_name).unwrap_or(false);
    let my_draw_options = if is_my_turn {
        draw_options.iter().map(|c| CardDto::from(*c)).collect()
    } else {
        Vec::new()
    };
    let slamdown_card = viewer.and_then(|m| {
        game.slamdown()
            .filter(|s| s.player == m.name)
            .map(|s| CardDto::from(s.card))
    });

    GameView {
        players,
        discard_top: game.last_discard().iter().map(|c| CardDto::from(*c)).collect(),
        draw_options: my_draw_options,
        current_player_name: current_name,
        is_my_turn,
        deck_size: game.deck_size(),
        can_slamdown: slamdown_card.is_some(),
        slamdown_card,
        slamdowns_allowed: options.slamdowns_allowed,
    }
}

/// The pid of the human member matching a seated player name.
fn member_pid(members: &[Member], name: &str) -> Option<String> {
    members
        .iter()
        .find(|m| m.name == name && !m.is_ai)
        .map(|m| m.pid.clone())
}
