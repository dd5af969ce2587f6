use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Values that are valid for a single tick. Everything is expired the first
/// time the cache is touched on a later tick.
pub struct TickCache<K, V> {
    tick: Option<u32>,
    entries: HashMap<K, V>,
}

impl<K, V> Default for TickCache<K, V> {
    fn default() -> Self {
        TickCache {
            tick: None,
            entries: HashMap::new(),
        }
    }
}

impl<K, V> TickCache<K, V>
where
    K: Eq + Hash,
{
    pub fn has_expired(&self, tick: u32) -> bool {
        self.tick.map(|t| t != tick).unwrap_or(false)
    }

    pub fn expire(&mut self) {
        self.entries.clear();
        self.tick = None;
    }

    fn refresh(&mut self, tick: u32) {
        if self.has_expired(tick) {
            self.expire();
        }

        self.tick = Some(tick);
    }

    pub fn get(&mut self, tick: u32, key: &K) -> Option<&V> {
        self.refresh(tick);

        self.entries.get(key)
    }

    /// Cached value for `key` this tick, filling it with `fill` on a miss. A
    /// fill returning `None` is not cached.
    pub fn maybe_get_or_insert_with<F>(&mut self, tick: u32, key: K, fill: F) -> Option<&V>
    where
        F: FnOnce() -> Option<V>,
    {
        self.refresh(tick);

        match self.entries.entry(key) {
            Entry::Occupied(entry) => Some(entry.into_mut()),
            Entry::Vacant(entry) => Some(entry.insert(fill()?)),
        }
    }
}
