//! The shared code → room registry.
//!
//! Only this type inserts or removes codes. Each room sits behind its own
//! async mutex; holding one room's lock never blocks another room.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use tokio::sync::Mutex;

use super::state::Room;

pub const CODE_LENGTH: usize = 5;

pub type SharedRoom = Arc<Mutex<Room>>;

#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, SharedRoom>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Five lowercase letters.
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LENGTH)
            .map(|_| char::from(b'a' + rng.gen_range(0..26)))
            .collect()
    }

    /// Insert a new room under a fresh code; collisions regenerate.
    pub fn insert_new(&self, build: impl FnOnce(String) -> Room) -> (String, SharedRoom) {
        loop {
            let code = Self::generate_code();
            match self.rooms.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Arc::new(Mutex::new(build(code.clone())));
                    slot.insert(Arc::clone(&room));
                    return (code, room);
                }
            }
        }
    }

    /// Insert a recovered room under its persisted code.
    pub fn insert(&self, code: String, room: Room) -> SharedRoom {
        let shared = Arc::new(Mutex::new(room));
        self.rooms.insert(code, Arc::clone(&shared));
        shared
    }

    pub fn get(&self, code: &str) -> Option<SharedRoom> {
        self.rooms.get(code).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn remove(&self, code: &str) {
        self.rooms.remove(code);
    }

    pub fn codes(&self) -> Vec<String> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
