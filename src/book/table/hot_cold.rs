//! Hot/cold level store.
//!
//! The levels near the top — where almost all events land — live in a
//! fixed-capacity circular buffer of *consecutive* prices (the hot
//! window); everything farther out lives in an ordered map (the cold
//! store). A bitmask converts a virtual index (0 = window head, the price
//! closest to the opposite side) into a real slot, so locating a hot level
//! is a subtraction and an AND.
//!
//! The window follows the market:
//!
//! * a price better than the head slides the window forward so the new
//!   top sits in the middle (virtual `H/2 - 1`), evicting displaced
//!   non-empty tail levels to cold;
//! * when the top level drains and its successor sits in the last quarter
//!   of the window, the window slides backward, pulling levels back out
//!   of cold;
//! * when the whole window drains, the best cold level (if any) is
//!   promoted into the middle, otherwise the window parks at the worst
//!   representable prices of the side.
//!
//! Sliding clamps at the extreme representable prices so the window never
//! addresses a price outside `i64`.

use super::LevelStore;
use crate::book::error::BookError;
use crate::book::level::{LevelAlloc, PriceLevel, SoaPriceLevel};
use crate::book::side::{SidePrice, SideOps};
use crate::book::types::Price;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Default number of hot levels.
pub const DEFAULT_HOT_LEVELS: usize = 32;
/// Smallest allowed hot window.
pub const MIN_HOT_LEVELS: usize = 8;
/// Largest allowed hot window.
pub const MAX_HOT_LEVELS: usize = 4096;

/// Construction parameters for [`HotColdLevelStore`].
#[derive(Debug, Clone, Copy)]
pub struct HotColdConfig {
    /// Number of hot levels; rounded up to a power of two, then required
    /// to fall within `[MIN_HOT_LEVELS, MAX_HOT_LEVELS]`.
    pub hot_levels_count: usize,
}

impl Default for HotColdConfig {
    fn default() -> Self {
        Self {
            hot_levels_count: DEFAULT_HOT_LEVELS,
        }
    }
}

/// Hot-window + cold-map level store.
#[derive(Debug)]
pub struct HotColdLevelStore<S: SideOps, L = SoaPriceLevel> {
    hot: Vec<L>,
    /// Real slot of virtual index 0.
    head_real: usize,
    /// Virtual index of the top level. `hot.len() - 1` when parked.
    top_virtual: usize,
    /// `hot.len() - 1`; the capacity is a power of two.
    mask: usize,
    cold: BTreeMap<SidePrice<S>, L>,
    _side: PhantomData<S>,
}

impl<S: SideOps, L: PriceLevel> HotColdLevelStore<S, L> {
    /// Head price for a window parked at the extreme worst prices of the
    /// side, so the initial state addresses only representable prices.
    fn parked_head_price(window: usize) -> Price {
        S::advance_forward(S::MIN_VALUE, window as i64 - 1)
    }

    fn build(hot_levels_count: usize) -> Self {
        let window = hot_levels_count;
        debug_assert!(window.is_power_of_two());

        let head_price = Self::parked_head_price(window);
        let hot: Vec<L> = (0..window)
            .map(|i| L::new(S::advance_backward(head_price, i as i64)))
            .collect();

        Self {
            hot,
            head_real: 0,
            top_virtual: window - 1,
            mask: window - 1,
            cold: BTreeMap::new(),
            _side: PhantomData,
        }
    }

    /// Number of levels from the top through the end of the hot window.
    pub fn hot_levels_len(&self) -> usize {
        self.hot.len() - self.top_virtual
    }

    /// Number of levels in the cold store.
    pub fn cold_levels_len(&self) -> usize {
        self.cold.len()
    }

    /// Capacity of the hot window.
    pub fn hot_window_capacity(&self) -> usize {
        self.hot.len()
    }

    fn real_index(&self, virtual_index: usize) -> usize {
        (self.head_real + virtual_index) & self.mask
    }

    fn head_price(&self) -> Price {
        self.hot[self.real_index(0)].price()
    }

    /// Slides the window forward so that `price` (better than the current
    /// head) lands at virtual `H/2 - 1`, clamping the head at the extreme
    /// best representable price. Displaced non-empty tail levels move to
    /// cold. Returns the new top's real slot.
    fn slide_forward(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> usize {
        let h = self.hot.len();
        let head_price = self.head_price();

        // How far the head must move so the new top sits in the middle,
        // unless that would address prices beyond the representable
        // extreme; then the head clamps at the extreme itself.
        let middle_diff = S::safe_u64_distance(price, head_price) + (h as u64 / 2) - 1;
        let extreme_diff = S::safe_u64_distance(S::MAX_VALUE, head_price);

        let (new_head, head_diff) = if middle_diff < extreme_diff {
            (S::advance_forward(price, h as i64 / 2 - 1), middle_diff)
        } else {
            (S::MAX_VALUE, extreme_diff)
        };

        self.head_real = (self.head_real + h - (head_diff as usize & self.mask)) & self.mask;

        // The slots displaced off the tail are exactly the ones that now
        // form the front of the window: evict their levels to cold (when
        // non-empty) and re-initialize them at their new prices.
        let refreshed = (head_diff.min(h as u64)) as usize;
        for v in 0..refreshed {
            let i = self.real_index(v);
            let new_price = S::advance_backward(new_head, v as i64);
            if self.hot[i].is_empty() {
                self.hot[i].reset(new_price);
            } else {
                let evicted = std::mem::replace(&mut self.hot[i], alloc.make(new_price));
                self.cold.insert(SidePrice::new(evicted.price()), evicted);
            }
        }

        self.top_virtual = S::safe_u64_distance(new_head, price) as usize;
        self.real_index(self.top_virtual)
    }

    /// Slides the window backward by up to `shift` levels, pulling levels
    /// back from cold and stopping at the extreme worst price.
    fn slide_backward(&mut self, alloc: &mut LevelAlloc<L>, mut shift: usize) {
        debug_assert!(shift <= self.hot.len() / 2);

        let h = self.hot.len();
        let mut tail_price = self.hot[self.real_index(h - 1)].price();

        while shift != 0 {
            if tail_price == S::MIN_VALUE {
                // The tail already sits at the representable edge.
                break;
            }
            tail_price = S::advance_backward(tail_price, 1);

            // The head slot is above the old top, hence empty; it becomes
            // the new tail.
            debug_assert!(self.hot[self.head_real].is_empty());
            let pulled = match self.cold.first_key_value() {
                Some((k, _)) if k.get() == tail_price => {
                    self.cold.remove(&SidePrice::new(tail_price))
                }
                _ => None,
            };
            match pulled {
                Some(lvl) => {
                    let vacated = std::mem::replace(&mut self.hot[self.head_real], lvl);
                    alloc.retire(vacated);
                }
                None => self.hot[self.head_real].reset(tail_price),
            }

            self.head_real = (self.head_real + 1) & self.mask;
            debug_assert!(self.top_virtual > 0);
            self.top_virtual -= 1;
            shift -= 1;
        }
    }

    /// Handles the current top level becoming empty.
    fn drop_top_level(&mut self, alloc: &mut LevelAlloc<L>) {
        let h = self.hot.len();

        // Scan forward within the window for the next non-empty level.
        let next = ((self.top_virtual + 1)..h).find(|&v| !self.hot[self.real_index(v)].is_empty());

        if let Some(new_top) = next {
            self.top_virtual = new_top;
            let in_last_quarter = h - new_top <= h / 4;
            if in_last_quarter {
                // The market is drifting backward; recenter the window so
                // the new top moves to the middle.
                let shift = new_top - (h / 2 - 1);
                self.slide_backward(alloc, shift);
            }
            return;
        }

        // The hot window is exhausted; the next top can only be in cold.
        let parked_head = Self::parked_head_price(h);

        let Some((best_cold, _)) = self.cold.first_key_value() else {
            // The side is empty: park the window back at the extreme.
            for (i, slot) in self.hot.iter_mut().enumerate() {
                slot.reset(S::advance_backward(parked_head, i as i64));
            }
            self.head_real = 0;
            self.top_virtual = h - 1;
            return;
        };
        let new_top = best_cold.get();

        // Promote the best cold level to the middle of a rebuilt window,
        // unless that would address prices beyond the representable
        // extreme; then the window parks and the level lands where its
        // price falls.
        let middle_offset = h as i64 / 2 - 1;
        let parked_middle = S::advance_backward(parked_head, middle_offset);
        let new_head = if S::lt(new_top, parked_middle) {
            S::advance_forward(new_top, middle_offset)
        } else {
            parked_head
        };

        self.top_virtual = S::safe_u64_distance(new_head, new_top) as usize;
        for (i, slot) in self.hot.iter_mut().enumerate() {
            let price = S::advance_backward(new_head, i as i64);
            let pulled = match self.cold.first_key_value() {
                Some((k, _)) if k.get() == price => self.cold.remove(&SidePrice::new(price)),
                _ => None,
            };
            match pulled {
                Some(lvl) => {
                    let vacated = std::mem::replace(slot, lvl);
                    debug_assert!(vacated.is_empty());
                    alloc.retire(vacated);
                }
                None => slot.reset(price),
            }
        }
        self.head_real = 0;
    }
}

impl<S: SideOps, L: PriceLevel> LevelStore<S, L> for HotColdLevelStore<S, L> {
    type Config = HotColdConfig;

    fn new() -> Self {
        Self::build(DEFAULT_HOT_LEVELS)
    }

    fn with_config(config: HotColdConfig) -> Result<Self, BookError> {
        // Only powers of two are usable: real-slot lookup is an AND with a
        // mask instead of a division.
        let rounded = config.hot_levels_count.next_power_of_two();
        if !(MIN_HOT_LEVELS..=MAX_HOT_LEVELS).contains(&rounded) {
            return Err(BookError::HotLevelsCountOutOfRange {
                requested: config.hot_levels_count,
                rounded,
            });
        }
        Ok(Self::build(rounded))
    }

    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L {
        let head_price = self.head_price();

        if S::le(head_price, price) {
            // At or behind the head: hot window or cold store.
            let v = S::safe_u64_distance(head_price, price);
            if v < self.hot.len() as u64 {
                self.top_virtual = self.top_virtual.min(v as usize);
                let i = self.real_index(v as usize);
                debug_assert_eq!(self.hot[i].price(), price);
                return &mut self.hot[i];
            }
            return self
                .cold
                .entry(SidePrice::new(price))
                .or_insert_with(|| alloc.make(price));
        }

        // Better than the head: the window must follow.
        let i = self.slide_forward(alloc, price);
        debug_assert_eq!(self.hot[i].price(), price);
        &mut self.hot[i]
    }

    fn retire_level(&mut self, alloc: &mut LevelAlloc<L>, price: Price) {
        let head_price = self.head_price();
        debug_assert!(S::le(head_price, price));

        let v = S::safe_u64_distance(head_price, price);
        if v >= self.hot.len() as u64 {
            let removed = self.cold.remove(&SidePrice::new(price));
            debug_assert!(removed.is_some(), "retire of an unknown cold level {price}");
            if let Some(lvl) = removed {
                alloc.retire(lvl);
            }
            return;
        }

        debug_assert!(v as usize >= self.top_virtual);
        if v as usize == self.top_virtual {
            self.drop_top_level(alloc);
        }
        // Retiring a non-top hot level leaves the window untouched; the
        // slot simply stays empty.
    }

    fn is_empty(&self) -> bool {
        self.hot[self.real_index(self.top_virtual)].is_empty()
    }

    fn top_level(&self) -> Option<&L> {
        let lvl = &self.hot[self.real_index(self.top_virtual)];
        if lvl.is_empty() { None } else { Some(lvl) }
    }

    fn top_level_mut(&mut self) -> Option<&mut L> {
        let i = self.real_index(self.top_virtual);
        let lvl = &mut self.hot[i];
        if lvl.is_empty() { None } else { Some(lvl) }
    }

    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a,
    {
        (self.top_virtual..self.hot.len())
            .map(|v| &self.hot[self.real_index(v)])
            .filter(|lvl| !lvl.is_empty())
            .chain(self.cold.values())
    }
}
