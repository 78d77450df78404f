//! A thread-safe store for the final output of a run.
//!
//! Reducers running on different partitions write here concurrently. The table uses open
//! addressing with linear probing; one `RwLock` guards the whole table, so a resize replaces
//! the slot array atomically with respect to readers.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{error, trace};

const INITIAL_CAPACITY: usize = 23;

/// Slot hash: `h = (h * 31 + byte) % capacity` over the key's bytes.
fn slot_hash(key: &str, capacity: usize) -> usize {
    let mut h = 0;
    for b in key.bytes() {
        h = (h * 31 + b as usize) % capacity;
    }
    h
}

struct Table<V> {
    slots: Vec<Option<(String, V)>>,
    size: usize,
}

impl<V> Table<V> {
    fn with_capacity(capacity: usize) -> Table<V> {
        Table {
            slots: (0..capacity).map(|_| None).collect(),
            size: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of key's slot, or of the empty slot ending its probe sequence. None if the
    /// whole table was probed without finding either.
    fn probe(&self, key: &str) -> Option<usize> {
        let cap = self.capacity();
        let mut i = slot_hash(key, cap);
        for _ in 0..cap {
            match &self.slots[i] {
                Some((k, _)) if k != key => i = (i + 1) % cap,
                _ => return Some(i),
            }
        }
        None
    }

    fn find(&self, key: &str) -> Option<usize> {
        let i = self.probe(key)?;
        self.slots[i].as_ref().map(|_| i)
    }

    /// Places an entry whose key is known not to be present.
    fn place(&mut self, key: String, value: V) {
        match self.probe(&key) {
            Some(i) => self.slots[i] = Some((key, value)),
            None => {
                let doubled = self.capacity() * 2;
                self.resize(doubled);
                self.place(key, value);
            }
        }
    }

    fn resize(&mut self, capacity: usize) {
        trace!("result store grows from {} to {} slots", self.capacity(), capacity);
        let old = std::mem::replace(&mut self.slots, (0..capacity).map(|_| None).collect());
        for (k, v) in old.into_iter().flatten() {
            self.place(k, v);
        }
    }

    fn put(&mut self, key: &str, value: V) {
        // At most half of the slots are in use once the entry is in.
        if (self.size + 1) * 2 > self.capacity() {
            let doubled = self.capacity() * 2;
            self.resize(doubled);
        }
        if let Some(i) = self.find(key) {
            if let Some((_, v)) = &mut self.slots[i] {
                *v = value;
            }
        } else {
            self.place(String::from(key), value);
            self.size += 1;
        }
    }

    fn remove(&mut self, key: &str) -> Option<V> {
        let cap = self.capacity();
        let i = self.find(key)?;
        let (_, value) = self.slots[i].take()?;
        self.size -= 1;

        // Re-place the rest of the cluster so no probe sequence is cut short by the hole.
        let mut j = (i + 1) % cap;
        while let Some((k, v)) = self.slots[j].take() {
            self.place(k, v);
            j = (j + 1) % cap;
        }
        Some(value)
    }
}

pub struct ResultStore<V> {
    table: RwLock<Table<V>>,
}

impl<V: Clone> Default for ResultStore<V> {
    fn default() -> ResultStore<V> {
        ResultStore::new()
    }
}

impl<V: Clone> ResultStore<V> {
    pub fn new() -> ResultStore<V> {
        ResultStore::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> ResultStore<V> {
        ResultStore {
            table: RwLock::new(Table::with_capacity(capacity.max(1))),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Table<V>> {
        match self.table.read() {
            Ok(t) => t,
            Err(e) => {
                error!("result store lock is poisoned");
                panic!("result store lock is poisoned: {}", e)
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table<V>> {
        match self.table.write() {
            Ok(t) => t,
            Err(e) => {
                error!("result store lock is poisoned");
                panic!("result store lock is poisoned: {}", e)
            }
        }
    }

    /// Inserts value under key, replacing an existing value. Doubles the table first if
    /// the insert would put more than half of it in use.
    pub fn put(&self, key: &str, value: V) {
        self.write().put(key, value)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let t = self.read();
        t.find(key).and_then(|i| t.slots[i].as_ref().map(|(_, v)| v.clone()))
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.read().size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.read().capacity()
    }

    /// All entries, sorted by key.
    pub fn entries(&self) -> Vec<(String, V)> {
        let t = self.read();
        let mut entries: Vec<(String, V)> = t.slots.iter().flatten().cloned().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
