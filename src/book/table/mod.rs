//! Per-side orders tables.
//!
//! An orders table maintains the set of non-empty price levels for one
//! side, answers best-price queries in O(1), and implements the five
//! mutating operations by coordinating its level store with the shared
//! order-reference index. The table logic is written once, generic over
//! the [`SideOps`] polarization and the [`LevelStore`] strategy; the
//! strategies differ only in the data structure holding the levels:
//!
//! | store | layout |
//! |---|---|
//! | [`MapLevelStore`] | ordered map keyed by polarized price |
//! | [`DenseLinearLevelStore`] | dense vector indexed by distance from a base price |
//! | [`TrackedLinearLevelStore`] | dense vector plus an explicitly tracked top price |
//! | [`SortedVecLevelStore`] | compact sorted vector of non-empty levels |
//! | [`LruMapLevelStore`] | ordered map behind a direct-scanned LRU cache |
//! | [`HotColdLevelStore`] | circular hot window near the top, ordered map for the rest |

pub mod hot_cold;
pub mod linear;
pub mod lru;
pub mod map;

pub use hot_cold::{HotColdConfig, HotColdLevelStore};
pub use linear::{DenseLinearLevelStore, SortedVecLevelStore, TrackedLinearLevelStore};
pub use lru::{LruConfig, LruMapLevelStore};
pub use map::MapLevelStore;

use super::error::BookError;
use super::index::{OrderRefsIndex, RefEntry};
use super::level::{LevelAlloc, OrderRef, PriceLevel, SoaPriceLevel};
use super::side::SideOps;
use super::types::{Order, OrderId, OrderQty, Price};
use std::marker::PhantomData;

/// Storage strategy for the price levels of one side.
///
/// `level_at` locates the level for a price, creating it (and updating any
/// best-price bookkeeping) when absent; `retire_level` is called by the
/// table after the last order of a level has been removed. The price is
/// the level locator: every strategy can find a level it stores from its
/// price alone.
pub trait LevelStore<S: SideOps, L: PriceLevel = SoaPriceLevel>: Sized {
    /// Construction parameters; `()` for strategies without any.
    type Config: Clone + Default;

    /// Creates a store with default parameters (always valid).
    fn new() -> Self;

    /// Creates a store with explicit parameters.
    ///
    /// # Errors
    /// Returns a configuration error when the parameters are out of the
    /// strategy's allowed range.
    fn with_config(config: Self::Config) -> Result<Self, BookError>;

    /// Returns the level at `price`, creating it if absent.
    fn level_at(&mut self, alloc: &mut LevelAlloc<L>, price: Price) -> &mut L;

    /// Handles the level at `price` becoming empty.
    fn retire_level(&mut self, alloc: &mut LevelAlloc<L>, price: Price);

    /// Whether the side holds no orders.
    fn is_empty(&self) -> bool;

    /// The non-empty level at the best price, if any.
    fn top_level(&self) -> Option<&L>;

    /// Mutable access to the top level.
    fn top_level_mut(&mut self) -> Option<&mut L>;

    /// Non-empty levels, best price first.
    fn levels<'a>(&'a self) -> impl Iterator<Item = &'a L> + 'a
    where
        L: 'a;

    /// The best price, or `None` when the side is empty.
    fn top_price(&self) -> Option<Price> {
        self.top_level().map(L::price)
    }

    /// Total quantity resting at the best price.
    fn top_price_qty(&self) -> Option<OrderQty> {
        self.top_level().map(L::total_qty)
    }

    /// The first order at the best price: the one an execution matches.
    fn first_order(&self) -> Option<Order> {
        self.top_level().map(L::first_order)
    }
}

/// A table of orders for a single side of the book.
///
/// The table owns its level store; the order-reference index and the level
/// allocator are owned by the book and shared with the opposite side, so
/// every operation borrows them for its duration. Operational
/// preconditions (unique id on add, known id otherwise, top-of-book
/// execute, strict reduce) are programmer errors: they are checked with
/// `debug_assert!` and violating events are dropped rather than recovered.
#[derive(Debug)]
pub struct OrdersTable<S: SideOps, St, L = SoaPriceLevel> {
    store: St,
    _marker: PhantomData<(S, L)>,
}

impl<S, L, St> OrdersTable<S, St, L>
where
    S: SideOps,
    L: PriceLevel,
    St: LevelStore<S, L>,
{
    /// Wraps a level store.
    pub(crate) fn new(store: St) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// The underlying level store, for strategy-specific introspection.
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Whether the side holds no orders.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The best price of the side, or `None` when empty.
    pub fn top_price(&self) -> Option<Price> {
        self.store.top_price()
    }

    /// Total quantity resting at the best price.
    pub fn top_price_qty(&self) -> Option<OrderQty> {
        self.store.top_price_qty()
    }

    /// The first order at the best price.
    pub fn first_order(&self) -> Option<Order> {
        self.store.first_order()
    }

    /// Non-empty levels, best price first.
    pub fn levels(&self) -> impl Iterator<Item = &L> + '_ {
        self.store.levels()
    }

    /// All resting orders, levels in best-first order, FIFO within a level.
    pub fn orders(&self) -> impl Iterator<Item = Order> + '_ {
        self.levels().flat_map(|lvl| lvl.orders())
    }

    pub(crate) fn add_order(
        &mut self,
        index: &mut OrderRefsIndex<L::Ref>,
        alloc: &mut LevelAlloc<L>,
        order: Order,
    ) {
        debug_assert!(!order.qty.is_zero());
        debug_assert!(!index.contains(order.id), "duplicate order id {}", order.id);

        let r = self.store.level_at(alloc, order.price).add_order(order);
        index.insert(order.id, RefEntry::new(r, S::SIDE));
    }

    pub(crate) fn delete_order(
        &mut self,
        index: &mut OrderRefsIndex<L::Ref>,
        alloc: &mut LevelAlloc<L>,
        id: OrderId,
    ) {
        let Some(entry) = index.get(id) else {
            debug_assert!(false, "delete of unknown order id {id}");
            return;
        };
        let r = entry.order_ref();
        let price = r.price();

        let lvl = self.store.level_at(alloc, price);
        lvl.delete_order(r);
        if lvl.is_empty() {
            self.store.retire_level(alloc, price);
        }

        index.remove(id);
    }

    pub(crate) fn execute_order(
        &mut self,
        index: &mut OrderRefsIndex<L::Ref>,
        alloc: &mut LevelAlloc<L>,
        id: OrderId,
        exec_qty: OrderQty,
    ) {
        debug_assert!(!exec_qty.is_zero());
        // An execute for an id the book no longer knows is dropped; the
        // event stream may legitimately race a delete it already emitted.
        let Some(entry) = index.get(id) else {
            return;
        };
        let order = entry.order();
        let r = entry.order_ref();

        debug_assert_eq!(
            Some(order.price),
            self.store.top_price(),
            "execute targets the top level"
        );
        debug_assert_eq!(
            self.store.first_order().map(|o| o.id),
            Some(id),
            "execute targets the first order of the top level"
        );
        debug_assert!(exec_qty <= order.qty);

        if exec_qty == order.qty {
            self.delete_order(index, alloc, id);
        } else if let Some(top) = self.store.top_level_mut() {
            let refreshed = top.reduce_qty(r, exec_qty);
            if let Some(entry) = index.get_mut(id) {
                entry.set_order_ref(refreshed);
            }
        }
    }

    pub(crate) fn reduce_order(
        &mut self,
        index: &mut OrderRefsIndex<L::Ref>,
        alloc: &mut LevelAlloc<L>,
        id: OrderId,
        canceled_qty: OrderQty,
    ) {
        debug_assert!(!canceled_qty.is_zero());
        let Some(entry) = index.get(id) else {
            debug_assert!(false, "reduce of unknown order id {id}");
            return;
        };
        let order = entry.order();
        let r = entry.order_ref();

        debug_assert!(canceled_qty < order.qty, "reduce must leave the order live");

        let refreshed = self
            .store
            .level_at(alloc, order.price)
            .reduce_qty(r, canceled_qty);
        if let Some(entry) = index.get_mut(id) {
            entry.set_order_ref(refreshed);
        }
    }

    pub(crate) fn modify_order(
        &mut self,
        index: &mut OrderRefsIndex<L::Ref>,
        alloc: &mut LevelAlloc<L>,
        modified: Order,
    ) {
        debug_assert!(!modified.qty.is_zero());
        let Some(entry) = index.get(modified.id) else {
            debug_assert!(false, "modify of unknown order id {}", modified.id);
            return;
        };
        let old = entry.order();
        let r = entry.order_ref();

        let refreshed = if old.price == modified.price {
            // Same-price modify re-queues the order at the tail of its
            // level: it loses time priority.
            let lvl = self.store.level_at(alloc, old.price);
            lvl.delete_order(r);
            lvl.add_order(modified)
        } else {
            // Settle the destination level's storage before touching the
            // source: creating the destination may reallocate or slide the
            // level storage, which would invalidate a source location
            // obtained earlier.
            let _ = self.store.level_at(alloc, modified.price);

            let src = self.store.level_at(alloc, old.price);
            src.delete_order(r);
            let src_emptied = src.is_empty();

            let refreshed = self
                .store
                .level_at(alloc, modified.price)
                .add_order(modified);

            if src_emptied {
                self.store.retire_level(alloc, old.price);
            }
            refreshed
        };

        if let Some(entry) = index.get_mut(modified.id) {
            entry.set_order_ref(refreshed);
        }
    }
}
