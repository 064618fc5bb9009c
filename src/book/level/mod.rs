//! Price levels: the FIFO queues of resting orders at a single price.
//!
//! A level supports O(1) append, O(1) removal through an opaque
//! [`OrderRef`], O(1) access to the first order, and linear traversal in
//! both directions, while maintaining its order count and total quantity in
//! constant time per mutation. Several storage layouts can satisfy that
//! contract; this crate ships the struct-of-arrays layout
//! ([`SoaPriceLevel`]), which keeps id and quantity scans sequential and
//! gives references that stay valid until the referenced order is removed.

mod soa;

pub use soa::{SoaPriceLevel, SoaRef};

use super::types::{Order, OrderQty, Price};
use std::fmt;

/// An opaque handle minted by a price level, locating one order inside it
/// in O(1).
///
/// A ref carries a snapshot of the order it points at; the snapshot is
/// refreshed whenever a mutation returns a new ref. Refs are owned by the
/// orders table through the order-reference index and are never retained
/// across events.
pub trait OrderRef: Copy + fmt::Debug {
    /// The order this ref points at, as of the last mutation that produced
    /// the ref.
    fn order(&self) -> Order;

    /// Price of the level that minted this ref.
    fn price(&self) -> Price;
}

/// The price-level contract.
///
/// Every mutation keeps `orders_count` and `total_qty` exact. Reference
/// stability beyond "valid until the referenced order is removed" is
/// implementation-defined; the orders table refreshes refs through the
/// order-reference index on every event and never relies on more.
pub trait PriceLevel: Sized {
    /// Handle type minted by [`PriceLevel::add_order`].
    type Ref: OrderRef;

    /// Creates an empty level at `price`.
    fn new(price: Price) -> Self;

    /// Re-initializes the level at a new price, keeping its storage.
    ///
    /// Must only be called on an empty level.
    fn reset(&mut self, price: Price);

    /// The level's price.
    fn price(&self) -> Price;

    /// Appends an order to the tail of the queue.
    ///
    /// Requires `order.price == self.price()` and `order.qty > 0`.
    fn add_order(&mut self, order: Order) -> Self::Ref;

    /// Removes the order a live ref points at.
    fn delete_order(&mut self, r: Self::Ref);

    /// Reduces the referenced order's quantity by `qty` and returns a
    /// refreshed ref to the same order.
    ///
    /// Requires `qty < order.qty`; zeroing an order goes through
    /// [`PriceLevel::delete_order`].
    fn reduce_qty(&mut self, r: Self::Ref, qty: OrderQty) -> Self::Ref;

    /// The order a live ref currently points at.
    fn order_at(&self, r: Self::Ref) -> Order;

    /// The order at the head of the queue.
    ///
    /// The level must not be empty.
    fn first_order(&self) -> Order;

    /// Number of resting orders.
    fn orders_count(&self) -> usize;

    /// Sum of quantities over all resting orders.
    fn total_qty(&self) -> OrderQty;

    /// Whether the level holds no orders.
    fn is_empty(&self) -> bool {
        self.orders_count() == 0
    }

    /// Orders in queue (FIFO) order. Valid until the next mutation.
    fn orders(&self) -> impl Iterator<Item = Order> + '_;

    /// Orders in reverse (LIFO) order. Valid until the next mutation.
    fn orders_rev(&self) -> impl Iterator<Item = Order> + '_;
}

/// The book-owned level allocator, shared by both sides.
///
/// Retired levels keep their storage in a bounded pool so a busy book that
/// churns levels near the top reuses their buffers instead of reallocating.
#[derive(Debug)]
pub struct LevelAlloc<L> {
    pool: Vec<L>,
}

impl<L: PriceLevel> LevelAlloc<L> {
    const MAX_POOLED: usize = 256;

    /// Creates an allocator with an empty pool.
    pub fn new() -> Self {
        Self { pool: Vec::new() }
    }

    /// Produces an empty level at `price`, reusing pooled storage when
    /// available.
    pub fn make(&mut self, price: Price) -> L {
        match self.pool.pop() {
            Some(mut lvl) => {
                lvl.reset(price);
                lvl
            }
            None => L::new(price),
        }
    }

    /// Takes back an emptied level.
    pub fn retire(&mut self, lvl: L) {
        debug_assert!(lvl.is_empty());
        if self.pool.len() < Self::MAX_POOLED {
            self.pool.push(lvl);
        }
    }

    /// Number of levels currently pooled.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}

impl<L: PriceLevel> Default for LevelAlloc<L> {
    fn default() -> Self {
        Self::new()
    }
}
