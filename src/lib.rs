//! # Single-Instrument Limit Order Book Engine
//!
//! An in-memory limit order book: it ingests a stream of order events
//! (add, execute, reduce, modify, delete) and maintains a consistent view
//! of outstanding buy and sell orders organized by price level in
//! price-time priority, with O(1) access to the best bid/offer and to the
//! first order at the top of each side.
//!
//! The engine executes only when told to by events — there is no matching
//! of aggressive orders, no routing, no transport. Those belong to the
//! producers and consumers around the book; what lives here is the data
//! structure problem in the middle.
//!
//! ## Architecture
//!
//! The book composes a small number of layers, each written once and
//! monomorphized per side through the side-polarized arithmetic in
//! [`book::side`]:
//!
//! - **Vocabulary types** ([`book::types`]) — strong wrappers for order
//!   ids, quantities, prices, and the book sequence number.
//! - **Price level** ([`book::level`]) — the FIFO queue of orders at one
//!   price, behind a contract that mints O(1) order references. The
//!   shipped implementation is a struct-of-arrays layout with an
//!   intrusive free list over slots.
//! - **Order-reference index** ([`book::index`]) — a hash map from order
//!   id to the order's location and side, so one lookup serves every
//!   id-addressed event.
//! - **Orders table** ([`book::table`]) — the per-side container of
//!   levels. Six interchangeable level-store strategies trade memory
//!   layout, cache locality, and per-event cost differently; they all
//!   satisfy one contract and yield identical observable state.
//! - **Book** ([`book::book`]) — the pair of tables plus the shared index
//!   and allocator, and the only API clients call directly.
//!
//! ## Choosing a strategy
//!
//! The strategy pair is fixed at compile time through a [`BookSpec`];
//! every combination behaves identically, so the choice is purely a
//! performance-tuning concern:
//!
//! | alias | store | favors |
//! |---|---|---|
//! | [`MapBook`] | ordered map | uniformly distributed prices; the default |
//! | [`DenseLinearBook`] | dense base-priced vector | action concentrated near the top |
//! | [`TrackedLinearBook`] | dense vector + tracked top | as above, with cheap top retires |
//! | [`SortedVecBook`] | compact sorted vector | small books, cheap iteration |
//! | [`LruBook`] | map + LRU level cache | repeated hits on few levels |
//! | [`HotColdBook`] | circular hot window + cold map | near-BBO-heavy streams |
//!
//! ## Example
//!
//! ```
//! use orderbook_core::prelude::*;
//!
//! let mut book = MapBook::new();
//! book.add_order(Order::new(1, 10, 100), Side::Buy);
//! book.add_order(Order::new(2, 5, 101), Side::Sell);
//!
//! assert_eq!(book.bbo().bid, Some(Price::new(100)));
//! assert_eq!(book.bbo().offer, Some(Price::new(101)));
//! assert_eq!(book.bsn().get(), 2);
//!
//! book.execute_order(OrderId::new(2), OrderQty::new(5));
//! assert_eq!(book.bbo().offer, None);
//! ```
//!
//! ## Concurrency model
//!
//! A book is single-owner: one instance processes events serially on one
//! thread, with no locking and no atomics. Observable state after event
//! *n* reflects exactly events *1..n*, and the book sequence number equals
//! the number of accepted events. Independent books can be hosted on
//! independent threads; nothing is shared between them.
//!
//! ## Error handling
//!
//! A malformed event stream is the caller's bug: operational
//! preconditions (unique ids on add, known ids elsewhere, top-of-book
//! executes, strict reduces) are asserted in debug builds and are not
//! recovered at runtime. The only `Result`-returning paths are strategy
//! configuration ([`BookError::HotLevelsCountOutOfRange`]) and event
//! decoding.

pub mod book;

pub mod prelude;

pub use book::book::{
    Bbo, Book, BookSpec, BsnCounter, DenseLinearBook, DenseLinearBookSpec, HotColdBook,
    HotColdBookSpec, LruBook, LruBookSpec, MapBook, MapBookSpec, SortedVecBook, SortedVecBookSpec,
    StdBsnCounter, TrackedLinearBook, TrackedLinearBookSpec, UnsequencedMapBook,
    UnsequencedMapBookSpec, VoidBsnCounter,
};
pub use book::error::BookError;
pub use book::events::{EVENT_RECORD_SIZE, Event, EventRecord, decode_events, encode_events};
pub use book::index::{LemireBuildHasher, LemireHasher, OrderRefsIndex, RefEntry};
pub use book::level::{LevelAlloc, OrderRef, PriceLevel, SoaPriceLevel, SoaRef};
pub use book::side::{BuySide, SellSide, SideOps, SidePrice};
pub use book::table::{
    DenseLinearLevelStore, HotColdConfig, HotColdLevelStore, LevelStore, LruConfig,
    LruMapLevelStore, MapLevelStore, OrdersTable, SortedVecLevelStore, TrackedLinearLevelStore,
};
pub use book::types::{Bsn, Order, OrderId, OrderQty, Price, Side};
