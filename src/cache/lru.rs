//! LRU Index Module
//!
//! Recency ordering of cache entries with O(1) lookup, move-to-front and
//! removal.

use std::collections::HashMap;

use crate::cache::CacheEntry;

/// Sentinel slot index meaning "no node".
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<V> {
    entry: CacheEntry<V>,
    prev: usize,
    next: usize,
}

// == LRU Index ==
/// Doubly-linked recency list plus a key → slot map.
///
/// Nodes live in a slab (`slots`) and link to each other by index, so the
/// list needs no unsafe pointers. Freed slots are recycled through `free`.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Every key in `lookup` points at exactly one occupied slot, and every
/// occupied slot is reachable from `head`.
#[derive(Debug)]
pub struct LruIndex<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    lookup: HashMap<String, usize>,
    head: usize,
    tail: usize,
}

impl<V> Default for LruIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LruIndex<V> {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            lookup: HashMap::new(),
            head: NIL,
            tail: NIL,
        }
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    // == Lookup ==
    /// Returns the entry for `key` without touching recency.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        let idx = *self.lookup.get(key)?;
        self.node(idx).map(|n| &n.entry)
    }

    /// Mutable variant of [`get`](Self::get); recency is left unchanged.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        let idx = *self.lookup.get(key)?;
        self.slots
            .get_mut(idx)
            .and_then(Option::as_mut)
            .map(|n| &mut n.entry)
    }

    // == Push Front ==
    /// Inserts a new entry at the head.
    ///
    /// If the key is already present, its old entry is replaced and returned.
    pub fn push_front(&mut self, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        let previous = self.remove(&entry.key);
        let key = entry.key.clone();
        let node = Node {
            entry,
            prev: NIL,
            next: NIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(idx);
        self.lookup.insert(key, idx);
        previous
    }

    // == Touch ==
    /// Moves `key` to the head. Returns false if the key is absent.
    pub fn touch(&mut self, key: &str) -> bool {
        match self.lookup.get(key) {
            Some(&idx) => {
                if self.head != idx {
                    self.unlink(idx);
                    self.link_front(idx);
                }
                true
            }
            None => false,
        }
    }

    // == Remove ==
    /// Removes `key` and returns its entry.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let idx = self.lookup.remove(key)?;
        self.release(idx)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry<V>> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        let entry = self.release(idx)?;
        self.lookup.remove(&entry.key);
        Some(entry)
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    pub fn peek_back(&self) -> Option<&CacheEntry<V>> {
        self.node(self.tail).map(|n| &n.entry)
    }

    // == Iteration ==
    /// Iterates keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor)?;
            cursor = node.next;
            Some(node.entry.key.as_str())
        })
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.lookup.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Number of keys in the lookup map, independent of the list walk.
    #[cfg(test)]
    pub(crate) fn lookup_len(&self) -> usize {
        self.lookup.len()
    }

    // == Internal Linking ==
    fn node(&self, idx: usize) -> Option<&Node<V>> {
        if idx == NIL {
            return None;
        }
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<V>> {
        if idx == NIL {
            return None;
        }
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = NIL;
            node.next = old_head;
        }
        match self.node_mut(old_head) {
            Some(head) => head.prev = idx,
            None => self.tail = idx,
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match self.node_mut(prev) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match self.node_mut(next) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }

    fn release(&mut self, idx: usize) -> Option<CacheEntry<V>> {
        self.unlink(idx);
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(node.entry)
    }
}
