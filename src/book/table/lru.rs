//! Ordered-map level store with a direct-scanned LRU cache in front.
//!
//! Levels live in a slot arena; an ordered map keyed by polarized price
//! maps each live level to its slot, and a small fixed-capacity cache of
//! recently touched prices short-circuits the map lookup. The cache is a
//! pair of parallel arrays scanned linearly (it is small), with eviction
//! decided by an O(1) kick list.

use super::LevelStore;
use crate::book::error::BookError;
use crate::book::level::{LevelAlloc, PriceLevel, SoaPriceLevel};
use crate::book::side::{SidePrice, SideOps};
use crate::book::types::Price;
use std::collections::BTreeMap;

/// Construction parameters for [`LruMapLevelStore`].
#[derive(Debug, Clone, Copy)]
pub struct LruConfig {
    /// Cache capacity; clamped to `[4, 254]`.
    pub cache_capacity: usize,
}

impl Default for LruConfig {
    fn default() -> Self {
        Self { cache_capacity: 32 }
    }
}

/// Tracks usage of cache slot indexes and answers "which index was used
/// least recently" in O(1), with no branches on the main path.
///
/// All indexes are threaded on one doubly-linked list (head = least
/// recently used, tail = most recently used), stored in a flat node array
/// with one extra anchor node holding head and tail. Marking an index as
/// used moves it to the tail; freeing one moves it to the head.
#[derive(Debug)]
pub(crate) struct KickList {
    nodes: Vec<KickNode>,
    count: u8,
}

#[derive(Debug, Clone, Copy, Default)]
struct KickNode {
    prev: u8,
    next: u8,
}

impl KickList {
    pub(crate) const MAX_ELEMENTS: usize = u8::MAX as usize;

    /// Builds a list over `size` indexes (clamped to `[4, 255)`), initially
    /// ordered `0, 1, .., n-1` from least to most recently used.
    pub(crate) fn new(size: usize) -> Self {
        let count = size.clamp(4, Self::MAX_ELEMENTS) as u8;
        let mut nodes = vec![KickNode::default(); count as usize + 1];

        nodes[0] = KickNode {
            prev: count,
            next: 1,
        };
        for i in 1..count {
            nodes[i as usize] = KickNode {
                prev: i - 1,
                next: i + 1,
            };
        }
        // The anchor: next is the head (LRU), prev is the tail (MRU).
        nodes[count as usize] = KickNode {
            prev: count - 1,
            next: 0,
        };

        Self { nodes, count }
    }

    /// Number of tracked indexes.
    pub(crate) fn len(&self) -> usize {
        self.count as usize
    }

    /// Marks `index` as the most recently used.
    pub(crate) fn use_index(&mut self, index: usize) {
        debug_assert!(index < self.len());
        self.insert(index as u8, self.anchor());
    }

    /// Marks `index` as free: it becomes the first eviction candidate.
    pub(crate) fn free_index(&mut self, index: usize) {
        debug_assert!(index < self.len());
        let head = self.head();
        if index as u8 == head {
            return;
        }
        self.insert(index as u8, head);
    }

    /// The least recently used index.
    pub(crate) fn lru_index(&self) -> usize {
        self.head() as usize
    }

    /// The indexes from least to most recently used (test support).
    #[cfg(test)]
    pub(crate) fn dump(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        let mut i = self.head();
        while i != self.anchor() && out.len() < self.len() {
            out.push(i as usize);
            i = self.nodes[i as usize].next;
        }
        out
    }

    fn head(&self) -> u8 {
        self.nodes[self.anchor() as usize].next
    }

    fn anchor(&self) -> u8 {
        self.count
    }

    /// Relinks node `i` immediately before `pos`.
    fn insert(&mut self, i: u8, pos: u8) {
        let t = self.nodes[pos as usize].prev;
        if t == i {
            return;
        }

        let node = self.nodes[i as usize];
        self.nodes[node.prev as usize].next = node.next;
        self.nodes[node.next as usize].prev = node.prev;

        self.nodes[i as usize] = KickNode { prev: t, next: pos };
        self.nodes[pos as usize].prev = i;
        self.nodes[t as usize].next = i;
    }
}

/// LRU-cached ordered-map level store.
#[derive(Debug)]
pub struct LruMapLevelStore<S: SideOps, L = SoaPriceLevel> {
    /// Slot arena; freed slots keep their level for in-place reuse.
    arena: Vec<L>,
    free_slots: Vec<u32>,
    by_price: BTreeMap<SidePrice<S>, u32>,
    cache_prices: Vec<Price>,
    cache_slots: Vec<Option<u32>>,
    kick: KickList,
}

impl<S: SideOps, L: PriceLevel> LruMapLevelStore<S, L> {
    /// Configured cache capacity.
    pub fn cache_capacity(&self) -> usize {
        self.kick.len()
    }

    /// Number of levels currently resident in the cache.
    pub fn cached_levels(&self) -> usize {
        self.cache_slots.iter().filter(|s| s.is_some()).count()
    }

    fn cache_find(&self, price: Price) -> Option<(usize, u32)> {
        (0..self.cache_prices.len()).find_map(|i| match self.cache_slots[i] {
            Some(slot) if self.cache_prices[i] == price => Some((i, slot)),
            _ => None,
        })
    }

    fn alloc_slot(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> u32 {
        match self.free_slots.pop() {
            Some(slot) => {
                self.arena[slot as usize].reset(price);
                slot
            }
            None => {
                debug_assert!(self.arena.len() < u32::MAX as usize);
                self.arena.push(alloc.make(price));
                (self.arena.len() - 1) as u32
            }
        }
    }
}

impl<S: SideOps, L: PriceLevel> LevelStore<S, L> for LruMapLevelStore<S, L> {
    type Config = LruConfig;

    fn new() -> Self {
        let capacity = LruConfig::default().cache_capacity;
        Self {
            arena: Vec::new(),
            free_slots: Vec::new(),
            by_price: BTreeMap::new(),
            cache_prices: vec![Price::default(); capacity],
            cache_slots: vec![None; capacity],
            kick: KickList::new(capacity),
        }
    }

    fn with_config(config: LruConfig) -> Result<Self, BookError> {
        let capacity = config.cache_capacity.clamp(4, KickList::MAX_ELEMENTS - 1);
        Ok(Self {
            arena: Vec::new(),
            free_slots: Vec::new(),
            by_price: BTreeMap::new(),
            cache_prices: vec![Price::default(); capacity],
            cache_slots: vec![None; capacity],
            kick: KickList::new(capacity),
        })
    }

    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L {
        if let Some((ci, slot)) = self.cache_find(price) {
            self.kick.use_index(ci);
            return &mut self.arena[slot as usize];
        }

        let slot = match self.by_price.get(&SidePrice::new(price)) {
            Some(&slot) => slot,
            None => {
                let slot = self.alloc_slot(alloc, price);
                self.by_price.insert(SidePrice::new(price), slot);
                slot
            }
        };

        // Install over the least recently used cache slot.
        let ci = self.kick.lru_index();
        self.cache_prices[ci] = price;
        self.cache_slots[ci] = Some(slot);
        self.kick.use_index(ci);

        &mut self.arena[slot as usize]
    }

    fn retire_level(&mut self, _alloc: &mut LevelAlloc<L>, price: Price) {
        if let Some((ci, _)) = self.cache_find(price) {
            self.kick.free_index(ci);
            self.cache_slots[ci] = None;
        }

        let removed = self.by_price.remove(&SidePrice::new(price));
        debug_assert!(removed.is_some(), "retire of an unknown level {price}");
        if let Some(slot) = removed {
            self.free_slots.push(slot);
        }
    }

    fn is_empty(&self) -> bool {
        self.by_price.is_empty()
    }

    fn top_level(&self) -> Option<&L> {
        let slot = *self.by_price.first_key_value()?.1;
        self.arena.get(slot as usize)
    }

    fn top_level_mut(&mut self) -> Option<&mut L> {
        let slot = *self.by_price.first_key_value()?.1;
        self.arena.get_mut(slot as usize)
    }

    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a,
    {
        self.by_price
            .values()
            .map(|&slot| &self.arena[slot as usize])
    }
}
