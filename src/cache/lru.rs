//! Recency List Module
//!
//! Implements the recency ordering used for LRU eviction as a slot-indexed
//! doubly linked list.

use crate::cache::CacheEntry;

/// Position of a node inside a [`RecencyList`].
pub type Slot = usize;

#[derive(Debug)]
struct Node<K, V> {
    entry: CacheEntry<K, V>,
    prev: Option<Slot>,
    next: Option<Slot>,
}

// == Recency List ==
/// Orders live entries by recency of use.
///
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Nodes live in a slot vector; freed slots are recycled, so every
/// operation except `clear` runs in O(1).
#[derive(Debug)]
pub struct RecencyList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<Slot>,
    head: Option<Slot>,
    tail: Option<Slot>,
    len: usize,
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an entry at the head and returns its slot.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> Slot {
        let node = Node {
            entry,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.link_front(slot);
        self.len += 1;
        slot
    }

    // == Move To Front ==
    /// Marks the entry at `slot` as most recently used.
    ///
    /// Vacant slots are ignored.
    pub fn move_to_front(&mut self, slot: Slot) {
        if self.head == Some(slot) || self.node(slot).is_none() {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    // == Remove ==
    /// Removes the entry at `slot`, returning it if the slot was occupied.
    pub fn remove(&mut self, slot: Slot) -> Option<CacheEntry<K, V>> {
        self.node(slot)?;
        self.unlink(slot);
        let node = self.slots[slot].take()?;
        self.free.push(slot);
        self.len -= 1;
        Some(node.entry)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    #[cfg(test)]
    pub fn peek_back(&self) -> Option<&CacheEntry<K, V>> {
        self.tail.and_then(|slot| self.get(slot))
    }

    pub fn get(&self, slot: Slot) -> Option<&CacheEntry<K, V>> {
        self.node(slot).map(|node| &node.entry)
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut CacheEntry<K, V>> {
        self.slots
            .get_mut(slot)
            .and_then(Option::as_mut)
            .map(|node| &mut node.entry)
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every entry and releases all slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iter ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry<K, V>> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(&node.entry)
        })
    }

    fn node(&self, slot: Slot) -> Option<&Node<K, V>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, slot: Slot) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Links a detached node in at the head.
    fn link_front(&mut self, slot: Slot) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(slot) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|head| self.node_mut(head)) {
            Some(head) => head.prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    /// Detaches a node from its neighbours, leaving it in its slot.
    fn unlink(&mut self, slot: Slot) {
        let Some((prev, next)) = self.node(slot).map(|node| (node.prev, node.next)) else {
            return;
        };
        match prev.and_then(|p| self.node_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
        if let Some(node) = self.node_mut(slot) {
            node.prev = None;
            node.next = None;
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TimerId;
    use std::time::Instant;

    fn entry(key: &str) -> CacheEntry<String, u32> {
        CacheEntry::new(key.to_string(), 0, TimerId::new(0), Instant::now())
    }

    fn keys(list: &RecencyList<String, u32>) -> Vec<&str> {
        list.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<String, u32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.peek_back().is_none());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["key3", "key2", "key1"]);
        // key1 is oldest (added first)
        assert_eq!(list.peek_back().map(|e| e.key.as_str()), Some("key1"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.push_front(entry("c"));

        // 'a' is oldest until touched
        list.move_to_front(a);

        assert_eq!(keys(&list), vec!["a", "c", "b"]);
        assert_eq!(list.peek_back().map(|e| e.key.as_str()), Some("b"));
    }

    #[test]
    fn test_move_to_front_middle_and_head() {
        let mut list = RecencyList::new();

        list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        let c = list.push_front(entry("c"));

        list.move_to_front(b);
        assert_eq!(keys(&list), vec!["b", "c", "a"]);

        // Already at head: no change
        list.move_to_front(b);
        assert_eq!(keys(&list), vec!["b", "c", "a"]);

        list.move_to_front(c);
        assert_eq!(keys(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_pop_back_in_lru_order() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.pop_back().map(|e| e.key), Some("key1".to_string()));
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_back().map(|e| e.key), Some("key2".to_string()));
        assert_eq!(list.pop_back().map(|e| e.key), Some("key3".to_string()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_pop_back_empty() {
        let mut list: RecencyList<String, u32> = RecencyList::new();
        assert!(list.pop_back().is_none());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        let key2 = list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        let removed = list.remove(key2);

        assert_eq!(removed.map(|e| e.key), Some("key2".to_string()));
        assert_eq!(list.len(), 2);
        assert_eq!(keys(&list), vec!["key3", "key1"]);
    }

    #[test]
    fn test_remove_vacant_slot() {
        let mut list = RecencyList::new();

        let slot = list.push_front(entry("key1"));
        list.remove(slot);

        // Removing twice or out of range must not disturb anything
        assert!(list.remove(slot).is_none());
        assert!(list.remove(42).is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut list = RecencyList::new();

        let first = list.push_front(entry("key1"));
        list.remove(first);
        let second = list.push_front(entry("key2"));

        assert_eq!(first, second);
        assert_eq!(keys(&list), vec!["key2"]);
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        assert!(list.peek_back().is_none());
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        let c = list.push_front(entry("c"));

        list.move_to_front(a);
        list.move_to_front(c);
        list.move_to_front(b);

        // Head to tail: b, c, a
        assert_eq!(list.pop_back().map(|e| e.key), Some("a".to_string()));
        assert_eq!(list.pop_back().map(|e| e.key), Some("c".to_string()));
        assert_eq!(list.pop_back().map(|e| e.key), Some("b".to_string()));
    }
}
