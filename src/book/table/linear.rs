//! Linear (vector-backed) level stores.
//!
//! All three variants keep slot `[0]` at the price farthest from the
//! opposite side, so the levels that see most of the traffic (the ones
//! near the top) sit at the back of the vector:
//!
//! * [`DenseLinearLevelStore`] — one slot per price tick from a base
//!   price; the top is the last non-empty slot and trailing empties are
//!   popped on retire.
//! * [`TrackedLinearLevelStore`] — like the dense store but remembers the
//!   top price explicitly, tolerates interior and trailing empties, and
//!   reclaims the whole vector when the side drains.
//! * [`SortedVecLevelStore`] — only non-empty levels, kept sorted; binary
//!   search on lookup, O(n) inserts in the middle.

use super::LevelStore;
use crate::book::error::BookError;
use crate::book::level::{LevelAlloc, PriceLevel, SoaPriceLevel};
use crate::book::side::SideOps;
use crate::book::types::Price;
use std::marker::PhantomData;

/// Number of levels provisioned beyond a new base price so a steadily
/// drifting price does not rebase on every tick.
const OVERPROVISION: usize = 16;
const DEFAULT_CAPACITY: usize = 4 * OVERPROVISION;

/// Dense vector store indexed by `distance(price, base_price)`.
#[derive(Debug)]
pub struct DenseLinearLevelStore<S: SideOps, L = SoaPriceLevel> {
    levels: Vec<L>,
    base_price: Price,
    _side: PhantomData<S>,
}

impl<S: SideOps, L: PriceLevel> DenseLinearLevelStore<S, L> {
    fn storage_index(&self, price: Price) -> usize {
        debug_assert!(S::le(price, self.base_price));
        let dist = S::distance(price, self.base_price);
        debug_assert!(dist >= 0);
        dist as usize
    }

    /// Ensures the vector covers `price`, rebasing or extending as needed.
    fn cover(&mut self, alloc: &mut LevelAlloc<L>, price: Price) {
        if self.levels.is_empty() {
            // First price on an empty side: put the base a comfortable
            // distance behind it so nearby traffic stays in-range.
            self.base_price = S::advance_backward(price, (2 * OVERPROVISION) as i64);
            self.levels.push(alloc.make(self.base_price));
        } else if S::lt(self.base_price, price) {
            // The price falls behind the base: rebase with overprovision
            // and shift the existing levels up.
            let new_base = S::advance_backward(price, OVERPROVISION as i64);
            let to_add = S::distance(self.base_price, new_base) as usize;

            let mut rebased: Vec<L> = Vec::with_capacity(
                (to_add + (self.levels.len() + OVERPROVISION).min(self.levels.capacity()))
                    .max(DEFAULT_CAPACITY),
            );
            let mut p = new_base;
            while S::lt(self.base_price, p) {
                rebased.push(alloc.make(p));
                p = S::advance_forward(p, 1);
            }
            rebased.append(&mut self.levels);

            self.levels = rebased;
            self.base_price = new_base;
        }

        // Extend toward the opposite side until the price is covered,
        // creating intermediate empty levels along the way.
        let mut best_stored = S::advance_forward(self.base_price, self.levels.len() as i64 - 1);
        while S::lt(price, best_stored) {
            best_stored = S::advance_forward(best_stored, 1);
            self.levels.push(alloc.make(best_stored));
        }
    }
}

impl<S: SideOps, L: PriceLevel> LevelStore<S, L> for DenseLinearLevelStore<S, L> {
    type Config = ();

    fn new() -> Self {
        Self {
            levels: Vec::with_capacity(DEFAULT_CAPACITY),
            base_price: Price::default(),
            _side: PhantomData,
        }
    }

    fn with_config(_config: ()) -> Result<Self, BookError> {
        Ok(Self::new())
    }

    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L {
        self.cover(alloc, price);
        let ix = self.storage_index(price);
        debug_assert_eq!(self.levels[ix].price(), price);
        &mut self.levels[ix]
    }

    fn retire_level(&mut self, alloc: &mut LevelAlloc<L>, _price: Price) {
        // Interior empties stay; only trailing empties are reclaimed, so
        // the back slot is always the (non-empty) top.
        while self.levels.last().is_some_and(L::is_empty) {
            if let Some(lvl) = self.levels.pop() {
                alloc.retire(lvl);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn top_level(&self) -> Option<&L> {
        self.levels.last()
    }

    fn top_level_mut(&mut self) -> Option<&mut L> {
        self.levels.last_mut()
    }

    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a,
    {
        self.levels.iter().rev().filter(|lvl| !lvl.is_empty())
    }
}

/// Dense vector store with an explicitly tracked top price.
///
/// The storage only grows; emptied levels anywhere are tolerated and the
/// top price steps backward past them on retire. The side is empty exactly
/// when the tracked top has fallen behind the base price.
#[derive(Debug)]
pub struct TrackedLinearLevelStore<S: SideOps, L = SoaPriceLevel> {
    levels: Vec<L>,
    base_price: Price,
    top_price: Price,
    _side: PhantomData<S>,
}

impl<S: SideOps, L: PriceLevel> TrackedLinearLevelStore<S, L> {
    fn storage_index(&self, price: Price) -> usize {
        debug_assert!(S::le(price, self.base_price));
        let dist = S::distance(price, self.base_price);
        debug_assert!(dist >= 0);
        dist as usize
    }

    fn cover(&mut self, alloc: &mut LevelAlloc<L>, price: Price) {
        if self.levels.is_empty() {
            self.base_price = S::advance_backward(price, (2 * OVERPROVISION) as i64);
            self.top_price = self.base_price;
            self.levels.push(alloc.make(self.base_price));
        } else if S::lt(self.base_price, price) {
            let new_base = S::advance_backward(price, OVERPROVISION as i64);
            let to_add = S::distance(self.base_price, new_base) as usize;

            let mut rebased: Vec<L> = Vec::with_capacity(
                (to_add + (self.levels.len() + OVERPROVISION).min(self.levels.capacity()))
                    .max(DEFAULT_CAPACITY),
            );
            let mut p = new_base;
            while S::lt(self.base_price, p) {
                rebased.push(alloc.make(p));
                p = S::advance_forward(p, 1);
            }
            rebased.append(&mut self.levels);

            self.levels = rebased;
            self.base_price = new_base;
        }

        let mut best_stored = S::advance_forward(self.base_price, self.levels.len() as i64 - 1);
        while S::lt(price, best_stored) {
            best_stored = S::advance_forward(best_stored, 1);
            self.levels.push(alloc.make(best_stored));
        }
    }
}

impl<S: SideOps, L: PriceLevel> LevelStore<S, L> for TrackedLinearLevelStore<S, L> {
    type Config = ();

    fn new() -> Self {
        let base_price = Price::default();
        Self {
            levels: Vec::with_capacity(DEFAULT_CAPACITY),
            base_price,
            top_price: S::advance_backward(base_price, 1),
            _side: PhantomData,
        }
    }

    fn with_config(_config: ()) -> Result<Self, BookError> {
        Ok(Self::new())
    }

    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L {
        self.cover(alloc, price);
        self.top_price = S::min(self.top_price, price);
        let ix = self.storage_index(price);
        debug_assert_eq!(self.levels[ix].price(), price);
        &mut self.levels[ix]
    }

    fn retire_level(&mut self, alloc: &mut LevelAlloc<L>, price: Price) {
        debug_assert!(S::le(self.top_price, price));
        if self.top_price != price {
            return;
        }

        // Step the top back past the retired level and any empty levels
        // behind it.
        let mut ix = self.storage_index(self.top_price);
        self.top_price = S::advance_backward(self.top_price, 1);
        while ix > 0 && self.levels[ix - 1].is_empty() {
            ix -= 1;
            self.top_price = S::advance_backward(self.top_price, 1);
        }

        if self.is_empty() {
            for lvl in self.levels.drain(..) {
                alloc.retire(lvl);
            }
        }
    }

    fn is_empty(&self) -> bool {
        S::lt(self.base_price, self.top_price)
    }

    fn top_level(&self) -> Option<&L> {
        if self.is_empty() {
            None
        } else {
            self.levels.get(self.storage_index(self.top_price))
        }
    }

    fn top_level_mut(&mut self) -> Option<&mut L> {
        if self.is_empty() {
            None
        } else {
            let ix = self.storage_index(self.top_price);
            self.levels.get_mut(ix)
        }
    }

    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a,
    {
        let end = if self.is_empty() {
            0
        } else {
            self.storage_index(self.top_price) + 1
        };
        self.levels[..end].iter().rev().filter(|lvl| !lvl.is_empty())
    }
}

/// Compact sorted-vector store: only non-empty levels, ordered so the top
/// sits at the back.
#[derive(Debug)]
pub struct SortedVecLevelStore<S: SideOps, L = SoaPriceLevel> {
    levels: Vec<L>,
    _side: PhantomData<S>,
}

impl<S: SideOps, L: PriceLevel> SortedVecLevelStore<S, L> {
    /// Position of the first stored level at or better than `price`.
    fn partition_index(&self, price: Price) -> usize {
        self.levels
            .partition_point(|lvl| S::lt(price, lvl.price()))
    }
}

impl<S: SideOps, L: PriceLevel> LevelStore<S, L> for SortedVecLevelStore<S, L> {
    type Config = ();

    fn new() -> Self {
        Self {
            levels: Vec::with_capacity(DEFAULT_CAPACITY),
            _side: PhantomData,
        }
    }

    fn with_config(_config: ()) -> Result<Self, BookError> {
        Ok(Self::new())
    }

    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L {
        let pos = self.partition_index(price);
        if pos == self.levels.len() || self.levels[pos].price() != price {
            self.levels.insert(pos, alloc.make(price));
        }
        &mut self.levels[pos]
    }

    fn retire_level(&mut self, alloc: &mut LevelAlloc<L>, price: Price) {
        let pos = self.partition_index(price);
        debug_assert!(pos < self.levels.len() && self.levels[pos].price() == price);
        if pos < self.levels.len() && self.levels[pos].price() == price {
            alloc.retire(self.levels.remove(pos));
        }
    }

    fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn top_level(&self) -> Option<&L> {
        self.levels.last()
    }

    fn top_level_mut(&mut self) -> Option<&mut L> {
        self.levels.last_mut()
    }

    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a,
    {
        self.levels.iter().rev()
    }
}
