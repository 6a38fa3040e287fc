//! Per-AI memo tables for the search hot path.
//!
//! Keys are hand signatures (sorted card ids), values are whatever a search
//! step computed for that hand. Capped LRU: a hit moves the entry to
//! most-recently-used, an insert past the cap evicts the oldest. Tables are
//! private to one AI instance and cleared every round, so hand contents never
//! leak across rooms.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::cards::Card;

pub const MAX_CACHE_ENTRIES: usize = 50_000;

pub type HandSig = Vec<u8>;

/// Signature of a hand: its card ids, sorted.
pub fn hand_signature(cards: &[Card]) -> HandSig {
    let mut ids: Vec<u8> = cards.iter().map(|c| c.id()).collect();
    ids.sort_unstable();
    ids
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    tick: u64,
}

#[derive(Debug)]
pub struct MemoCache<K, V> {
    map: HashMap<K, Entry<V>>,
    recency: BTreeMap<u64, K>,
    tick: u64,
    cap: usize,
}

impl<K: Eq + Hash + Clone, V: Clone> MemoCache<K, V> {
    pub fn new(cap: usize) -> Self {
        MemoCache {
            map: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.map.get_mut(key)?;
        self.recency.remove(&entry.tick);
        entry.tick = tick;
        self.recency.insert(tick, key.clone());
        Some(entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.tick += 1;
        if let Some(entry) = self.map.get_mut(&key) {
            self.recency.remove(&entry.tick);
            entry.value = value;
            entry.tick = self.tick;
            self.recency.insert(self.tick, key);
            return;
        }
        if self.map.len() >= self.cap {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.map.remove(&oldest);
            }
        }
        self.map.insert(
            key.clone(),
            Entry {
                value,
                tick: self.tick,
            },
        );
        self.recency.insert(self.tick, key);
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.recency.clear();
    }
}

/// The four search caches, grouped so a round reset clears them together.
#[derive(Debug)]
pub struct MemoTables {
    pub discard_options: MemoCache<HandSig, Vec<Vec<Card>>>,
    pub best_discard_options: MemoCache<HandSig, Vec<Vec<Card>>>,
    pub best_residual: MemoCache<HandSig, u32>,
    pub simulate_action: MemoCache<(HandSig, bool), (f64, Option<Vec<Card>>)>,
}

impl MemoTables {
    pub fn new() -> Self {
        MemoTables {
            discard_options: MemoCache::new(MAX_CACHE_ENTRIES),
            best_discard_options: MemoCache::new(MAX_CACHE_ENTRIES),
            best_residual: MemoCache::new(MAX_CACHE_ENTRIES),
            simulate_action: MemoCache::new(MAX_CACHE_ENTRIES),
        }
    }

    pub fn clear(&mut self) {
        self.discard_options.clear();
        self.best_discard_options.clear();
        self.best_residual.clear();
        self.simulate_action.clear();
    }
}

impl Default for MemoTables {
    fn default() -> Self {
        Self::new()
    }
}
