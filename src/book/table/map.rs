//! Map-based level store: an ordered map keyed by side-polarized price.
//!
//! The simplest strategy and the default: fully dynamic, O(log n) per
//! operation, with the best price always at the first key.

use super::LevelStore;
use crate::book::error::BookError;
use crate::book::level::{LevelAlloc, PriceLevel, SoaPriceLevel};
use crate::book::side::{SidePrice, SideOps};
use crate::book::types::Price;
use std::collections::BTreeMap;

/// Ordered-map level store.
#[derive(Debug)]
pub struct MapLevelStore<S: SideOps, L = SoaPriceLevel> {
    levels: BTreeMap<SidePrice<S>, L>,
}

impl<S: SideOps, L: PriceLevel> MapLevelStore<S, L> {
    /// Number of stored levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }
}

impl<S: SideOps, L: PriceLevel> LevelStore<S, L> for MapLevelStore<S, L> {
    type Config = ();

    fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    fn with_config(_config: ()) -> Result<Self, BookError> {
        Ok(Self::new())
    }

    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L {
        self.levels
            .entry(SidePrice::new(price))
            .or_insert_with(|| alloc.make(price))
    }

    fn retire_level(&mut self, alloc: &mut LevelAlloc<L>, price: Price) {
        let retired = self.levels.remove(&SidePrice::new(price));
        debug_assert!(retired.is_some(), "retire of an unknown level {price}");
        if let Some(lvl) = retired {
            alloc.retire(lvl);
        }
    }

    fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn top_level(&self) -> Option<&L> {
        self.levels.first_key_value().map(|(_, lvl)| lvl)
    }

    fn top_level_mut(&mut self) -> Option<&mut L> {
        self.levels.first_entry().map(|entry| entry.into_mut())
    }

    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a,
    {
        self.levels.values()
    }
}
