//! In-memory room store with the same cleanup semantics as the database
//! backend. Used by tests; production degraded mode simply runs with no
//! store at all.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::{
    CleanupStats, PersistedRoom, RoomStore, StoreError, PLAYING_ROOM_MAX_AGE_DAYS,
    WAITING_ROOM_MAX_AGE_HOURS,
};
use crate::room::RoomStatus;

#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: RwLock<HashMap<String, PersistedRoom>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<PersistedRoom> {
        self.rooms.read().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.read().is_empty()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn save_room(&self, room: &PersistedRoom) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write();
        match rooms.get_mut(&room.code) {
            Some(existing) => {
                // Members only accumulate, mirroring the insert-or-ignore
                // behavior of the database backend.
                let mut merged = existing.members.clone();
                for member in &room.members {
                    if !merged.iter().any(|m| m.pid == member.pid) {
                        merged.push(member.clone());
                    }
                }
                *existing = room.clone();
                existing.members = merged;
            }
            None => {
                rooms.insert(room.code.clone(), room.clone());
            }
        }
        Ok(())
    }

    async fn cleanup_stale(&self, now: DateTime<Utc>) -> Result<CleanupStats, StoreError> {
        let playing_cutoff = now - Duration::days(PLAYING_ROOM_MAX_AGE_DAYS);
        let waiting_cutoff = now - Duration::hours(WAITING_ROOM_MAX_AGE_HOURS);

        let mut stats = CleanupStats::default();
        let mut rooms = self.rooms.write();
        for room in rooms.values_mut() {
            if room.status == RoomStatus::Playing && room.created_at < playing_cutoff {
                room.status = RoomStatus::Finished;
                stats.finished += 1;
            }
        }
        rooms.retain(|_, room| {
            let stale = room.status == RoomStatus::Waiting && room.created_at < waiting_cutoff;
            if stale {
                stats.deleted += 1;
            }
            !stale
        });
        Ok(stats)
    }

    async fn load_active_rooms(&self) -> Result<Vec<PersistedRoom>, StoreError> {
        Ok(self
            .rooms
            .read()
            .values()
            .filter(|room| room.status != RoomStatus::Finished)
            .cloned()
            .collect())
    }
}
