//! The two-sided book: the only surface clients drive directly.
//!
//! A book owns a buy table and a sell table, the order-reference index and
//! the level allocator they share, and a book sequence number stamped on
//! every accepted mutating event. Side-agnostic events (delete, execute,
//! reduce, modify by id) are routed to the correct table through the side
//! stored in the index entry.

use super::error::BookError;
use super::index::OrderRefsIndex;
use super::level::{LevelAlloc, PriceLevel, SoaPriceLevel};
use super::side::{BuySide, SellSide};
use super::table::{
    DenseLinearLevelStore, HotColdLevelStore, LevelStore, LruMapLevelStore, MapLevelStore,
    OrdersTable, SortedVecLevelStore, TrackedLinearLevelStore,
};
use super::types::{Bsn, Order, OrderId, OrderQty, Price, Side};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Book sequence number counter.
///
/// Two variants exist: the real counter and a void one for builds that do
/// not need sequencing. The choice is made at type level, not at runtime.
pub trait BsnCounter: Default + fmt::Debug {
    /// Advances the counter by one.
    fn inc(&mut self);

    /// Current value.
    fn value(&self) -> Bsn;
}

/// The standard monotonic counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdBsnCounter {
    bsn: Bsn,
}

impl BsnCounter for StdBsnCounter {
    fn inc(&mut self) {
        self.bsn = self.bsn.next();
    }

    fn value(&self) -> Bsn {
        self.bsn
    }
}

/// A counter that does nothing and always reads zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidBsnCounter;

impl BsnCounter for VoidBsnCounter {
    fn inc(&mut self) {}

    fn value(&self) -> Bsn {
        Bsn::new(0)
    }
}

/// The type-level recipe for a book: which level implementation, which
/// level-store strategy per side, and which BSN counter.
pub trait BookSpec {
    /// Price-level implementation shared by both sides.
    type Level: PriceLevel;
    /// Sequence counter variant.
    type Bsn: BsnCounter;
    /// Level-store strategy for the buy side.
    type BuyStore: LevelStore<BuySide, Self::Level>;
    /// Level-store strategy for the sell side.
    type SellStore: LevelStore<SellSide, Self::Level>;
}

/// Best bid and offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bbo {
    /// Best buy price, if any.
    pub bid: Option<Price>,
    /// Best sell price, if any.
    pub offer: Option<Price>,
}

/// A single-instrument limit order book.
pub struct Book<B: BookSpec> {
    buy: OrdersTable<BuySide, B::BuyStore, B::Level>,
    sell: OrdersTable<SellSide, B::SellStore, B::Level>,
    index: OrderRefsIndex<<B::Level as PriceLevel>::Ref>,
    alloc: LevelAlloc<B::Level>,
    bsn: B::Bsn,
}

impl<B: BookSpec> Book<B> {
    /// Creates an empty book with default strategy parameters.
    pub fn new() -> Self {
        Self {
            buy: OrdersTable::new(B::BuyStore::new()),
            sell: OrdersTable::new(B::SellStore::new()),
            index: OrderRefsIndex::new(),
            alloc: LevelAlloc::new(),
            bsn: B::Bsn::default(),
        }
    }

    /// Creates an empty book with explicit per-side strategy parameters.
    ///
    /// # Errors
    /// Returns a configuration error when a store rejects its parameters
    /// (see [`BookError`]).
    pub fn with_config(
        buy_config: <B::BuyStore as LevelStore<BuySide, B::Level>>::Config,
        sell_config: <B::SellStore as LevelStore<SellSide, B::Level>>::Config,
    ) -> Result<Self, BookError> {
        Ok(Self {
            buy: OrdersTable::new(B::BuyStore::with_config(buy_config)?),
            sell: OrdersTable::new(B::SellStore::with_config(sell_config)?),
            index: OrderRefsIndex::new(),
            alloc: LevelAlloc::new(),
            bsn: B::Bsn::default(),
        })
    }

    /// Current book sequence number: the count of accepted mutating
    /// events.
    pub fn bsn(&self) -> Bsn {
        self.bsn.value()
    }

    /// The buy-side table.
    pub fn buy(&self) -> &OrdersTable<BuySide, B::BuyStore, B::Level> {
        &self.buy
    }

    /// The sell-side table.
    pub fn sell(&self) -> &OrdersTable<SellSide, B::SellStore, B::Level> {
        &self.sell
    }

    /// Whether both sides are empty.
    pub fn empty(&self) -> bool {
        self.buy.is_empty() && self.sell.is_empty()
    }

    /// Current best bid and offer.
    pub fn bbo(&self) -> Bbo {
        Bbo {
            bid: self.buy.top_price(),
            offer: self.sell.top_price(),
        }
    }

    /// Number of live orders across both sides.
    pub fn live_orders(&self) -> usize {
        self.index.len()
    }

    /// Adds a new order on `side`.
    ///
    /// The order id must not be live in the book.
    pub fn add_order(&mut self, order: Order, side: Side) {
        trace!("adding order {} {} qty={} price={}", order.id, side, order.qty, order.price);
        match side {
            Side::Buy => self.buy.add_order(&mut self.index, &mut self.alloc, order),
            Side::Sell => self.sell.add_order(&mut self.index, &mut self.alloc, order),
        }
        self.bsn.inc();
    }

    /// Deletes the order with `id`. The id must be live.
    pub fn delete_order(&mut self, id: OrderId) {
        let Some(side) = self.index.get(id).map(|entry| entry.side()) else {
            debug_assert!(false, "delete of unknown order id {id}");
            return;
        };
        trace!("deleting order {} {}", id, side);
        match side {
            Side::Buy => self.buy.delete_order(&mut self.index, &mut self.alloc, id),
            Side::Sell => self.sell.delete_order(&mut self.index, &mut self.alloc, id),
        }
        self.bsn.inc();
    }

    /// Executes `exec_qty` against the order with `id`.
    ///
    /// The id must be live and must refer to the first order at the top
    /// price of its side.
    pub fn execute_order(&mut self, id: OrderId, exec_qty: OrderQty) {
        let Some(side) = self.index.get(id).map(|entry| entry.side()) else {
            debug_assert!(false, "execute of unknown order id {id}");
            return;
        };
        trace!("executing order {} {} qty={}", id, side, exec_qty);
        match side {
            Side::Buy => self
                .buy
                .execute_order(&mut self.index, &mut self.alloc, id, exec_qty),
            Side::Sell => self
                .sell
                .execute_order(&mut self.index, &mut self.alloc, id, exec_qty),
        }
        self.bsn.inc();
    }

    /// Reduces the open quantity of the order with `id` by `canceled_qty`.
    ///
    /// The id must be live and `canceled_qty` must be strictly less than
    /// the order's open quantity; zeroing an order goes through
    /// [`Book::delete_order`].
    pub fn reduce_order(&mut self, id: OrderId, canceled_qty: OrderQty) {
        let Some(side) = self.index.get(id).map(|entry| entry.side()) else {
            debug_assert!(false, "reduce of unknown order id {id}");
            return;
        };
        trace!("reducing order {} {} qty={}", id, side, canceled_qty);
        match side {
            Side::Buy => self
                .buy
                .reduce_order(&mut self.index, &mut self.alloc, id, canceled_qty),
            Side::Sell => self
                .sell
                .reduce_order(&mut self.index, &mut self.alloc, id, canceled_qty),
        }
        self.bsn.inc();
    }

    /// Replaces the quantity and price of the order with `modified.id`.
    ///
    /// The id must be live; the side never changes. A modify re-queues the
    /// order at the tail of its destination level, even when the price is
    /// unchanged.
    pub fn modify_order(&mut self, modified: Order) {
        let Some(side) = self.index.get(modified.id).map(|entry| entry.side()) else {
            debug_assert!(false, "modify of unknown order id {}", modified.id);
            return;
        };
        trace!(
            "modifying order {} {} qty={} price={}",
            modified.id, side, modified.qty, modified.price
        );
        match side {
            Side::Buy => self
                .buy
                .modify_order(&mut self.index, &mut self.alloc, modified),
            Side::Sell => self
                .sell
                .modify_order(&mut self.index, &mut self.alloc, modified),
        }
        self.bsn.inc();
    }
}

impl<B: BookSpec> Default for Book<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BookSpec> fmt::Debug for Book<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Book")
            .field("bsn", &self.bsn.value())
            .field("bbo", &self.bbo())
            .field("live_orders", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// Book over [`MapLevelStore`]: the simplest strategy and a good default.
#[derive(Debug)]
pub struct MapBookSpec;

impl BookSpec for MapBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = StdBsnCounter;
    type BuyStore = MapLevelStore<BuySide>;
    type SellStore = MapLevelStore<SellSide>;
}

/// Book over [`MapLevelStore`] without sequencing.
#[derive(Debug)]
pub struct UnsequencedMapBookSpec;

impl BookSpec for UnsequencedMapBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = VoidBsnCounter;
    type BuyStore = MapLevelStore<BuySide>;
    type SellStore = MapLevelStore<SellSide>;
}

/// Book over [`DenseLinearLevelStore`].
#[derive(Debug)]
pub struct DenseLinearBookSpec;

impl BookSpec for DenseLinearBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = StdBsnCounter;
    type BuyStore = DenseLinearLevelStore<BuySide>;
    type SellStore = DenseLinearLevelStore<SellSide>;
}

/// Book over [`TrackedLinearLevelStore`].
#[derive(Debug)]
pub struct TrackedLinearBookSpec;

impl BookSpec for TrackedLinearBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = StdBsnCounter;
    type BuyStore = TrackedLinearLevelStore<BuySide>;
    type SellStore = TrackedLinearLevelStore<SellSide>;
}

/// Book over [`SortedVecLevelStore`].
#[derive(Debug)]
pub struct SortedVecBookSpec;

impl BookSpec for SortedVecBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = StdBsnCounter;
    type BuyStore = SortedVecLevelStore<BuySide>;
    type SellStore = SortedVecLevelStore<SellSide>;
}

/// Book over [`LruMapLevelStore`].
#[derive(Debug)]
pub struct LruBookSpec;

impl BookSpec for LruBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = StdBsnCounter;
    type BuyStore = LruMapLevelStore<BuySide>;
    type SellStore = LruMapLevelStore<SellSide>;
}

/// Book over [`HotColdLevelStore`].
#[derive(Debug)]
pub struct HotColdBookSpec;

impl BookSpec for HotColdBookSpec {
    type Level = SoaPriceLevel;
    type Bsn = StdBsnCounter;
    type BuyStore = HotColdLevelStore<BuySide>;
    type SellStore = HotColdLevelStore<SellSide>;
}

/// Book with the default (map-based) strategy.
pub type MapBook = Book<MapBookSpec>;
/// Map-based book without sequencing.
pub type UnsequencedMapBook = Book<UnsequencedMapBookSpec>;
/// Book with the dense linear strategy.
pub type DenseLinearBook = Book<DenseLinearBookSpec>;
/// Book with the tracked linear strategy.
pub type TrackedLinearBook = Book<TrackedLinearBookSpec>;
/// Book with the sorted compact vector strategy.
pub type SortedVecBook = Book<SortedVecBookSpec>;
/// Book with the LRU-cached map strategy.
pub type LruBook = Book<LruBookSpec>;
/// Book with the hot/cold strategy.
pub type HotColdBook = Book<HotColdBookSpec>;
