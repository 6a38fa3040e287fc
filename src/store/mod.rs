//! Durable room snapshots.
//!
//! Write-through on every mutation: the in-memory room is authoritative and
//! save failures are logged, never surfaced. Recovery runs once at boot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::GameSnapshot;
use crate::room::{LastRound, LastTurn, Member, Room, RoomOptions, RoomStatus};

pub mod entity;
pub mod memory;
pub mod sea_orm;

pub use memory::InMemoryRoomStore;
pub use self::sea_orm::{connect, SeaOrmRoomStore};

/// How long a playing room may sit untouched before boot marks it finished.
pub const PLAYING_ROOM_MAX_AGE_DAYS: i64 = 7;
/// How long a waiting room may sit untouched before boot deletes it.
pub const WAITING_ROOM_MAX_AGE_HOURS: i64 = 12;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] ::sea_orm::DbErr),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The full persisted shape of one room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedRoom {
    pub code: String,
    pub status: RoomStatus,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub members: Vec<Member>,
    pub game: Option<GameSnapshot>,
    pub last_round: Option<LastRound>,
    pub last_turn: Option<LastTurn>,
    pub round_banner_turns_left: i32,
    pub options: RoomOptions,
}

impl PersistedRoom {
    pub fn from_room(room: &Room) -> Self {
        PersistedRoom {
            code: room.code.clone(),
            status: room.status,
            winner: room.winner.clone(),
            created_at: room.created_at,
            members: room.members.clone(),
            game: room.game.as_ref().map(|g| g.snapshot()),
            last_round: room.last_round.clone(),
            last_turn: room.last_turn.clone(),
            round_banner_turns_left: room.round_banner_turns_left as i32,
            options: room.options,
        }
    }

    /// Rebuild the in-memory room. `game` is restored separately because it
    /// needs an rng and may fail independently of the rest of the row.
    pub fn into_room(self, game: Option<crate::engine::Game>) -> Room {
        Room {
            code: self.code,
            status: self.status,
            members: self.members,
            game,
            winner: self.winner,
            last_turn: self.last_turn,
            last_round: self.last_round,
            round_banner_turns_left: self.round_banner_turns_left.max(0) as usize,
            options: self.options,
            next_room: None,
            ai_worker_active: false,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub finished: u64,
    pub deleted: u64,
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Idempotent schema setup.
    async fn migrate(&self) -> Result<(), StoreError>;

    /// Upsert the room, its members, and its game state.
    async fn save_room(&self, room: &PersistedRoom) -> Result<(), StoreError>;

    /// Boot cleanup: age out playing rooms, drop stale waiting rooms.
    async fn cleanup_stale(&self, now: DateTime<Utc>) -> Result<CleanupStats, StoreError>;

    /// Every waiting or playing room.
    async fn load_active_rooms(&self) -> Result<Vec<PersistedRoom>, StoreError>;
}
