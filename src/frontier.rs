//! Keyed min-priority queue over grid positions, the open list of the search.
//!
//! A [BinaryHeap] cannot change or remove arbitrary entries, so the heap is paired with an
//! [IndexMap] from position to its current key. Every insertion gets a fresh stamp; heap entries
//! whose stamp no longer matches the index are stale. Stale entries are discarded as soon as they
//! reach the top, so the top of the heap is always a live entry.
use core::fmt;
use fxhash::FxBuildHasher;
use grid_util::Point;
use indexmap::IndexMap;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Two-component priority `[min(g, rhs) + h + km, min(g, rhs)]`, ordered lexicographically.
#[derive(Clone, Copy, Debug, Default)]
pub struct Key {
    pub k1: f64,
    pub k2: f64,
}

impl Key {
    pub fn new(k1: f64, k2: f64) -> Key {
        Key { k1, k2 }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.k1.total_cmp(&other.k1) {
            Ordering::Equal => self.k2.total_cmp(&other.k2),
            s => s,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.k1, self.k2)
    }
}

struct SmallestKeyHolder {
    key: Key,
    point: Point,
    stamp: u64,
}

impl Eq for SmallestKeyHolder {}

impl PartialEq for SmallestKeyHolder {
    fn eq(&self, other: &Self) -> bool {
        self.key.eq(&other.key)
    }
}

impl PartialOrd for SmallestKeyHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestKeyHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the smallest key. Equal keys are interchangeable.
        other.key.cmp(&self.key)
    }
}

/// The set of locally inconsistent cells awaiting repair, at most one entry per position.
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<SmallestKeyHolder>,
    index: FxIndexMap<Point, (Key, u64)>,
    next_stamp: u64,
    mutations: u64,
}

impl Frontier {
    pub fn new() -> Frontier {
        Frontier::default()
    }
    pub fn len(&self) -> usize {
        self.index.len()
    }
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
    pub fn contains(&self, point: &Point) -> bool {
        self.index.contains_key(point)
    }
    pub fn key_of(&self, point: &Point) -> Option<Key> {
        self.index.get(point).map(|&(key, _)| key)
    }
    /// Number of observable mutations since creation.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    fn insert(&mut self, key: Key, point: Point) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.index.insert(point, (key, stamp));
        self.heap.push(SmallestKeyHolder { key, point, stamp });
        self.mutations += 1;
        self.compact();
        self.discard_stale();
    }

    /// Queues `point` with `key`. Fails if the point is already queued.
    pub fn push(&mut self, key: Key, point: Point) -> Result<()> {
        if self.contains(&point) {
            return Err(Error::AlreadyQueued(point));
        }
        self.insert(key, point);
        Ok(())
    }

    /// Replaces the key of a queued point in one step. Fails if the point is not queued.
    pub fn update_key(&mut self, key: Key, point: Point) -> Result<()> {
        if !self.contains(&point) {
            return Err(Error::NotQueued(point));
        }
        // Overwriting the index entry invalidates the old heap entry through its stamp.
        self.insert(key, point);
        Ok(())
    }

    /// Queues `point` with `key`, replacing its key if it is already queued.
    pub fn insert_or_update(&mut self, key: Key, point: Point) {
        self.insert(key, point);
    }

    pub fn remove(&mut self, point: &Point) -> Option<Key> {
        let (key, _) = self.index.swap_remove(point)?;
        self.mutations += 1;
        self.discard_stale();
        Some(key)
    }

    /// Returns the entry with the smallest key without removing it.
    pub fn peek_min(&self) -> Option<(Key, Point)> {
        self.heap.peek().map(|holder| (holder.key, holder.point))
    }

    pub fn pop(&mut self) -> Option<(Key, Point)> {
        let holder = self.heap.pop()?;
        self.index.swap_remove(&holder.point);
        self.mutations += 1;
        self.discard_stale();
        Some((holder.key, holder.point))
    }

    pub fn clear(&mut self) {
        if !self.index.is_empty() {
            self.mutations += 1;
        }
        self.heap.clear();
        self.index.clear();
    }

    /// All queued entries ordered by key.
    pub fn entries(&self) -> Vec<(Key, Point)> {
        self.index
            .iter()
            .map(|(&point, &(key, _))| (key, point))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect()
    }

    fn is_live(&self, holder: &SmallestKeyHolder) -> bool {
        matches!(self.index.get(&holder.point), Some(&(_, stamp)) if stamp == holder.stamp)
    }

    fn discard_stale(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.is_live(top) {
                break;
            }
            self.heap.pop();
        }
    }

    // Rebuilds the heap from the index once stale entries outnumber live ones.
    fn compact(&mut self) {
        if self.heap.len() <= 2 * self.index.len() + 64 {
            return;
        }
        self.heap = self
            .index
            .iter()
            .map(|(&point, &(key, stamp))| SmallestKeyHolder { key, point, stamp })
            .collect();
    }
}

impl fmt::Debug for Frontier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}
