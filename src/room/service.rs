//! Mutation paths for every API operation.
//!
//! Each method locks one room, applies the change, fans the fresh snapshot
//! out to that room's subscribers, and writes through to the store, all
//! before the lock is released, so subscribers observe snapshots in
//! mutation order. Store failures are logged; memory stays authoritative.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cards::Card;
use crate::engine::{ActionError, DrawChoice, Game, GameRng, Player, TurnAction};
use crate::store::{PersistedRoom, RoomStore};
use crate::subscribe::SubscriberHub;

use super::registry::RoomRegistry;
use super::snapshot::{build_snapshot, RoomSnapshot};
use super::state::{
    sanitize_name, Member, Room, RoomOptions, RoomStatus, MAX_AI_MEMBERS, MAX_HUMAN_MEMBERS,
};
use super::worker::spawn_ai_worker;

const LOG_TARGET: &str = "room::service";

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room not found")]
    NotFound,
    #[error("Game already started")]
    AlreadyStarted,
    #[error("Room is full")]
    Full,
    #[error("Cannot leave after game has started")]
    LeaveAfterStart,
    #[error("Need at least 2 players")]
    NotEnoughMembers,
    #[error("Only the room creator can do that")]
    NotCreator,
    #[error("Options can only be changed before the game starts")]
    OptionsLocked,
    #[error("Cannot start")]
    CannotStart,
    #[error("Game not active")]
    GameNotActive,
    #[error("Not a member of this game")]
    NotMember,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Cannot declare Yaniv")]
    CannotDeclareYaniv,
    #[error("Slamdowns not enabled in this game")]
    SlamdownsDisabled,
    #[error("Slamdown no longer available")]
    SlamdownExpired,
    #[error("Game not finished")]
    NotFinished,
    #[error("Invalid AI player count")]
    InvalidAiCount,
    #[error(transparent)]
    Engine(#[from] ActionError),
}

/// One parsed `/api/action` request.
#[derive(Clone, Debug)]
pub enum ActionKind {
    Play { discard: Vec<i64>, draw: DrawRequest },
    DeclareYaniv,
    DeclareSlamdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawRequest {
    Deck,
    Pile(usize),
}

pub struct RoomService {
    registry: Arc<RoomRegistry>,
    subscribers: Arc<SubscriberHub>,
    store: Option<Arc<dyn RoomStore>>,
    /// Back-reference for handing the service to spawned AI workers.
    self_ref: std::sync::Weak<RoomService>,
}

impl RoomService {
    pub fn new(
        registry: Arc<RoomRegistry>,
        subscribers: Arc<SubscriberHub>,
        store: Option<Arc<dyn RoomStore>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| RoomService {
            registry,
            subscribers,
            store,
            self_ref: self_ref.clone(),
        })
    }

    fn kick_ai(&self, code: String) {
        if let Some(service) = self.self_ref.upgrade() {
            spawn_ai_worker(service, code);
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn subscribers(&self) -> &Arc<SubscriberHub> {
        &self.subscribers
    }

    /// Create a waiting room seating one human plus `ai_count` AI members.
    pub async fn create_room(
        &self,
        name: Option<String>,
        pid: Option<String>,
        ai_count: i64,
    ) -> Result<(String, String), RoomError> {
        if !(0..=MAX_AI_MEMBERS).contains(&ai_count) {
            return Err(RoomError::InvalidAiCount);
        }
        let pid = normalize_pid(pid);
        let name = sanitize_name(name.as_deref());

        let mut members = vec![Member {
            pid: pid.clone(),
            name,
            is_ai: false,
        }];
        for i in 0..ai_count {
            members.push(Member {
                pid: format!("ai-{i}"),
                name: format!("AI {}", i + 1),
                is_ai: true,
            });
        }

        let (code, shared) = self.registry.insert_new(|code| Room::new(code, members));
        info!(target: LOG_TARGET, %code, "room created");

        let mut room = shared.lock().await;
        self.publish(&mut room).await;
        Ok((code, pid))
    }

    pub async fn join_room(
        &self,
        code: &str,
        pid: Option<String>,
        name: Option<String>,
    ) -> Result<(String, String), RoomError> {
        let code = code.trim().to_lowercase();
        let pid = normalize_pid(pid);
        let name = sanitize_name(name.as_deref());

        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        let mut room = shared.lock().await;
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::AlreadyStarted);
        }
        if room.human_count() >= MAX_HUMAN_MEMBERS {
            return Err(RoomError::Full);
        }
        if room.member(&pid).is_none() {
            room.members.push(Member {
                pid: pid.clone(),
                name,
                is_ai: false,
            });
        }
        self.publish(&mut room).await;
        Ok((code, pid))
    }

    pub async fn leave_room(&self, code: &str, pid: &str) -> Result<(), RoomError> {
        let code = code.trim().to_lowercase();
        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        let mut room = shared.lock().await;
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::LeaveAfterStart);
        }
        room.members.retain(|m| m.pid != pid);
        self.publish(&mut room).await;
        Ok(())
    }

    pub async fn room_snapshot(
        &self,
        code: &str,
        pid: Option<&str>,
    ) -> Result<RoomSnapshot, RoomError> {
        let code = code.trim().to_lowercase();
        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        let mut room = shared.lock().await;
        Ok(build_snapshot(&mut room, pid))
    }

    /// Creator-only, waiting-only. Slamdowns silently collapse to off when
    /// any member is AI.
    pub async fn set_options(
        &self,
        code: &str,
        pid: &str,
        slamdowns_allowed: bool,
    ) -> Result<RoomOptions, RoomError> {
        let code = code.trim().to_lowercase();
        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        let mut room = shared.lock().await;
        if room.creator().map(|m| m.pid.as_str()) != Some(pid) {
            return Err(RoomError::NotCreator);
        }
        if room.status != RoomStatus::Waiting {
            return Err(RoomError::OptionsLocked);
        }
        room.options.slamdowns_allowed = slamdowns_allowed && !room.has_ai_member();
        let options = room.options;
        self.publish(&mut room).await;
        Ok(options)
    }

    /// Deal the opening hand and hand control to the AI worker if an AI
    /// opens the game.
    pub async fn start(
        &self,
        code: &str,
        pid: &str,
        slamdowns_allowed: Option<bool>,
    ) -> Result<(), RoomError> {
        let code = code.trim().to_lowercase();
        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        {
            let mut room = shared.lock().await;
            if room.status != RoomStatus::Waiting {
                return Err(RoomError::CannotStart);
            }
            if room.members.len() < 2 {
                return Err(RoomError::NotEnoughMembers);
            }
            if room.creator().map(|m| m.pid.as_str()) != Some(pid) {
                return Err(RoomError::NotCreator);
            }

            if let Some(requested) = slamdowns_allowed {
                room.options.slamdowns_allowed = requested && !room.has_ai_member();
            } else {
                room.options.slamdowns_allowed =
                    room.options.slamdowns_allowed && !room.has_ai_member();
            }

            let players = seat_players(&room.members);
            let mut game = Game::new(players, GameRng::from_entropy())?;
            game.start_game();
            room.game = Some(game);
            room.status = RoomStatus::Playing;
            room.winner = None;
            room.last_round = None;
            room.last_turn = None;
            room.round_banner_turns_left = 0;
            self.publish(&mut room).await;
        }
        self.kick_ai(code);
        Ok(())
    }

    /// One `/api/action` request: play a turn, declare Yaniv, or slam.
    pub async fn action(&self, code: &str, pid: &str, kind: ActionKind) -> Result<(), RoomError> {
        let code = code.trim().to_lowercase();
        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        let mut kick_ai = false;
        {
            let mut guard = shared.lock().await;
            let room = &mut *guard;
            if room.status != RoomStatus::Playing {
                return Err(RoomError::GameNotActive);
            }
            let member = room.member(pid).cloned().ok_or(RoomError::NotMember)?;
            let game = room.game.as_mut().ok_or(RoomError::GameNotActive)?;
            let (current_index, draw_opts_before) = game.start_turn();

            match kind {
                // The slammer is not the current player: the turn has
                // already advanced past them.
                ActionKind::DeclareSlamdown => {
                    if !room.options.slamdowns_allowed {
                        return Err(RoomError::SlamdownsDisabled);
                    }
                    if game.slamdown().map(|s| s.player.as_str()) != Some(member.name.as_str()) {
                        return Err(RoomError::SlamdownExpired);
                    }
                    let index = game.find_player(&member.name).ok_or(RoomError::NotMember)?;
                    let card = game.perform_slamdown(index)?;
                    room.record_slamdown(&member.name, card);
                    self.publish(room).await;
                }
                ActionKind::DeclareYaniv => {
                    if game.player(current_index).name != member.name {
                        return Err(RoomError::NotYourTurn);
                    }
                    if !game.can_declare_yaniv(current_index) {
                        return Err(RoomError::CannotDeclareYaniv);
                    }
                    let outcome = game.declare_yaniv(current_index)?;
                    let finished = room.apply_round_outcome(&outcome);
                    self.publish(room).await;
                    kick_ai = !finished;
                }
                ActionKind::Play { discard, draw } => {
                    if game.player(current_index).name != member.name {
                        return Err(RoomError::NotYourTurn);
                    }
                    let cards = resolve_discard(&game.player(current_index).hand, &discard)?;
                    let action = TurnAction {
                        discard: cards,
                        draw: match draw {
                            DrawRequest::Deck => DrawChoice::Deck,
                            DrawRequest::Pile(i) => DrawChoice::Pile(i),
                        },
                    };
                    let summary = game.play_turn(current_index, action)?;
                    room.record_turn(&member.name, &summary, &draw_opts_before);
                    self.publish(room).await;
                    kick_ai = true;
                }
            }
        }
        if kick_ai {
            self.kick_ai(code);
        }
        Ok(())
    }

    /// Build the rematch room. Idempotent: repeated calls return the room
    /// created by the first one.
    pub async fn play_again(&self, code: &str, pid: &str) -> Result<String, RoomError> {
        let code = code.trim().to_lowercase();
        let shared = self.registry.get(&code).ok_or(RoomError::NotFound)?;
        let new_code;
        {
            let mut room = shared.lock().await;
            if room.status != RoomStatus::Finished {
                return Err(RoomError::NotFinished);
            }
            if room.member(pid).is_none() {
                return Err(RoomError::NotMember);
            }
            if let Some(existing) = &room.next_room {
                return Ok(existing.clone());
            }

            let members = room.members.clone();
            let options = room.options;
            let players = seat_players(&members);
            let mut game = Game::new(players, GameRng::from_entropy())?;
            game.start_game();

            let (created, new_shared) = self.registry.insert_new(|code| {
                let mut next = Room::new(code, members);
                next.status = RoomStatus::Playing;
                next.options = options;
                next.game = Some(game);
                next
            });
            new_code = created;
            room.next_room = Some(new_code.clone());
            info!(target: LOG_TARGET, code = %room.code, next_room = %new_code, "rematch room created");
            self.publish(&mut room).await;
            drop(room);

            let mut next = new_shared.lock().await;
            self.publish(&mut next).await;
        }
        self.kick_ai(new_code.clone());
        Ok(new_code)
    }

    /// Fan the room's current snapshot out to its subscribers, then write
    /// through to the store.
    pub async fn publish(&self, room: &mut Room) {
        let code = room.code.clone();
        for (pid, conn_id) in self.subscribers.subscribers_of(&code) {
            let snapshot = build_snapshot(room, Some(&pid));
            match serde_json::to_string(&snapshot) {
                Ok(payload) => self.subscribers.send(&code, &pid, conn_id, payload),
                Err(err) => {
                    warn!(target: LOG_TARGET, %code, error = %err, "snapshot serialization failed")
                }
            }
        }
        self.persist(room).await;
    }

    async fn persist(&self, room: &Room) {
        let Some(store) = &self.store else {
            return;
        };
        let row = PersistedRoom::from_room(room);
        if let Err(err) = store.save_room(&row).await {
            warn!(target: LOG_TARGET, code = %room.code, error = %err, "save_room failed");
        }
    }
}

fn normalize_pid(pid: Option<String>) -> String {
    match pid {
        Some(p) if !p.trim().is_empty() => p,
        _ => Uuid::new_v4().to_string(),
    }
}

fn seat_players(members: &[Member]) -> Vec<Player> {
    members
        .iter()
        .map(|m| {
            if m.is_ai {
                Player::ai(m.name.clone())
            } else {
                Player::human(m.name.clone())
            }
        })
        .collect()
}

/// Match requested card ids against the acting player's hand, consuming one
/// hand card per id.
fn resolve_discard(hand: &[Card], ids: &[i64]) -> Result<Vec<Card>, RoomError> {
    if ids.is_empty() {
        return Err(RoomError::Engine(ActionError::EmptyDiscard));
    }
    let mut remaining = hand.to_vec();
    let mut cards = Vec::with_capacity(ids.len());
    for &id in ids {
        let card = u8::try_from(id)
            .ok()
            .and_then(Card::from_id)
            .ok_or(RoomError::Engine(ActionError::CardNotInHand))?;
        let pos = remaining
            .iter()
            .position(|c| *c == card)
            .ok_or(RoomError::Engine(ActionError::CardNotInHand))?;
        remaining.remove(pos);
        cards.push(card);
    }
    Ok(cards)
}
