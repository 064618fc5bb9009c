//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use orderbook_core::prelude::*;
//! ```

// Vocabulary types
pub use crate::book::types::{Bsn, Order, OrderId, OrderQty, Price, Side};

// Side-polarized arithmetic
pub use crate::book::side::{BuySide, SellSide, SideOps, SidePrice};

// Price levels
pub use crate::book::level::{LevelAlloc, OrderRef, PriceLevel, SoaPriceLevel, SoaRef};

// Order-reference index
pub use crate::book::index::{OrderRefsIndex, RefEntry};

// Orders tables and level-store strategies
pub use crate::book::table::{
    DenseLinearLevelStore, HotColdConfig, HotColdLevelStore, LevelStore, LruConfig,
    LruMapLevelStore, MapLevelStore, OrdersTable, SortedVecLevelStore, TrackedLinearLevelStore,
};

// The book and its type-level specs
pub use crate::book::book::{
    Bbo, Book, BookSpec, BsnCounter, DenseLinearBook, DenseLinearBookSpec, HotColdBook,
    HotColdBookSpec, LruBook, LruBookSpec, MapBook, MapBookSpec, SortedVecBook, SortedVecBookSpec,
    StdBsnCounter, TrackedLinearBook, TrackedLinearBookSpec, UnsequencedMapBook,
    UnsequencedMapBookSpec, VoidBsnCounter,
};

// Event schema
pub use crate::book::events::{EVENT_RECORD_SIZE, Event, EventRecord, decode_events, encode_events};

// Errors
pub use crate::book::error::BookError;
