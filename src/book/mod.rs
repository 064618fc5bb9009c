//! Order book engine: vocabulary types, side-polarized arithmetic, price
//! levels, the order-reference index, per-side orders tables, and the
//! two-sided book that composes them.

pub mod book;
pub mod error;
pub mod events;
pub mod index;
pub mod level;
pub mod side;
pub mod table;
pub mod types;

#[cfg(test)]
mod tests;

pub use book::{
    Bbo, Book, BookSpec, BsnCounter, DenseLinearBook, DenseLinearBookSpec, HotColdBook,
    HotColdBookSpec, LruBook, LruBookSpec, MapBook, MapBookSpec, SortedVecBook, SortedVecBookSpec,
    StdBsnCounter, TrackedLinearBook, TrackedLinearBookSpec, UnsequencedMapBook,
    UnsequencedMapBookSpec, VoidBsnCounter,
};
pub use error::BookError;
pub use events::{EVENT_RECORD_SIZE, Event, EventRecord, decode_events, encode_events};
pub use index::{LemireBuildHasher, LemireHasher, OrderRefsIndex, RefEntry};
pub use level::{LevelAlloc, OrderRef, PriceLevel, SoaPriceLevel, SoaRef};
pub use side::{BuySide, SellSide, SideOps, SidePrice};
pub use table::{
    DenseLinearLevelStore, HotColdConfig, HotColdLevelStore, LevelStore, LruConfig,
    LruMapLevelStore, MapLevelStore, OrdersTable, SortedVecLevelStore, TrackedLinearLevelStore,
};
pub use types::{Bsn, Order, OrderId, OrderQty, Price, Side};
