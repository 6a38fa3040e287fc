//! Per-room subscriber fan-out.
//!
//! Each (room, pid) holds at most one live connection. Registration
//! replaces the previous connection outright; unregistration only removes
//! the entry when the caller still owns it, so a late teardown from a dead
//! connection can never evict a reconnected newer one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

const LOG_TARGET: &str = "subscribe";

/// Mirrors the bounded per-client queue of the push channel; a slow client
/// drops frames rather than stalling the mutation path.
pub const CHANNEL_CAPACITY: usize = 50;

struct Connection {
    id: u64,
    tx: mpsc::Sender<String>,
}

/// A registered connection: its identity plus the receiving end.
pub struct Subscription {
    pub id: u64,
    pub rx: mpsc::Receiver<String>,
}

#[derive(Default)]
pub struct SubscriberHub {
    rooms: Mutex<HashMap<String, HashMap<String, Connection>>>,
    next_id: AtomicU64,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `(code, pid)`, replacing any prior one.
    pub fn register(&self, code: &str, pid: &str) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut rooms = self.rooms.lock();
        rooms
            .entry(code.to_owned())
            .or_default()
            .insert(pid.to_owned(), Connection { id, tx });
        debug!(target: LOG_TARGET, code, pid, id, "subscriber registered");
        Subscription { id, rx }
    }

    /// Remove `(code, pid)` only if it still holds the connection `id`.
    pub fn unregister(&self, code: &str, pid: &str, id: u64) {
        let mut rooms = self.rooms.lock();
        let Some(clients) = rooms.get_mut(code) else {
            return;
        };
        if clients.get(pid).map(|c| c.id) == Some(id) {
            clients.remove(pid);
            debug!(target: LOG_TARGET, code, pid, id, "subscriber unregistered");
        }
        if clients.is_empty() {
            rooms.remove(code);
        }
    }

    /// Current subscribers of a room, as (pid, connection id) pairs.
    pub fn subscribers_of(&self, code: &str) -> Vec<(String, u64)> {
        let rooms = self.rooms.lock();
        rooms
            .get(code)
            .map(|clients| {
                clients
                    .iter()
                    .map(|(pid, conn)| (pid.clone(), conn.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push one frame to a specific connection. A full queue drops the
    /// frame; a closed receiver unregisters the connection.
    pub fn send(&self, code: &str, pid: &str, id: u64, payload: String) {
        let tx = {
            let rooms = self.rooms.lock();
            match rooms.get(code).and_then(|clients| clients.get(pid)) {
                Some(conn) if conn.id == id => conn.tx.clone(),
                _ => return,
            }
        };
        match tx.try_send(payload) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(target: LOG_TARGET, code, pid, "subscriber queue full, frame dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.unregister(code, pid, id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_replaces_and_stale_unregister_is_ignored() {
        let hub = SubscriberHub::new();
        let first = hub.register("abcde", "p1");
        let mut second = hub.register("abcde", "p1");

        // Only the replacement is live.
        assert_eq!(hub.subscribers_of("abcde"), vec![("p1".to_owned(), second.id)]);

        // A late teardown from the dead connection must not evict it.
        hub.unregister("abcde", "p1", first.id);
        assert_eq!(hub.subscribers_of("abcde").len(), 1);

        hub.send("abcde", "p1", second.id, "snapshot".to_owned());
        assert_eq!(second.rx.try_recv().unwrap(), "snapshot");

        // The real owner unregistering does remove the entry.
        hub.unregister("abcde", "p1", second.id);
        assert!(hub.subscribers_of("abcde").is_empty());
    }

    #[test]
    fn sends_to_a_stale_id_are_dropped() {
        let hub = SubscriberHub::new();
        let old = hub.register("abcde", "p1");
        let mut new = hub.register("abcde", "p1");

        hub.send("abcde", "p1", old.id, "stale".to_owned());
        assert!(new.rx.try_recv().is_err());

        hub.send("abcde", "p1", new.id, "fresh".to_owned());
        assert_eq!(new.rx.try_recv().unwrap(), "fresh");
    }

    #[test]
    fn closed_receiver_is_unregistered_on_send() {
        let hub = SubscriberHub::new();
        let sub = hub.register("abcde", "p1");
        drop(sub.rx);

        hub.send("abcde", "p1", sub.id, "frame".to_owned());
        assert!(hub.subscribers_of("abcde").is_empty());
    }
}
