//! The book event schema.
//!
//! One event is a packed 32-byte little-endian record; a stream is a plain
//! concatenation of records with no framing, header, or checksum. The
//! payload fields of every operation live at fixed offsets, so a single
//! flat layout covers all five op codes:
//!
//! | offset | size | field | used by |
//! |---|---|---|---|
//! | 0 | 4 | `book_id` | all (multiplexing) |
//! | 4 | 1 | `op_code` | all |
//! | 5 | 1 | `ts` (0 = Sell, else Buy) | add, modify |
//! | 6 | 2 | padding | |
//! | 8 | 8 | `id` | all |
//! | 16 | 4 | `qty` | add, modify, execute, reduce |
//! | 20 | 4 | padding | |
//! | 24 | 8 | `price` | add, modify |
//!
//! Reading event files and decoding exchange feeds are collaborators'
//! concerns; this module only defines the record layout and the slice
//! codec.

use super::book::{Book, BookSpec};
use super::error::BookError;
use super::types::{Order, OrderId, OrderQty, Price, Side};
use serde::{Deserialize, Serialize};
use zerocopy::little_endian::{I64, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of one event record in bytes.
pub const EVENT_RECORD_SIZE: usize = 32;

/// Event op codes as they appear on the wire.
pub mod op_code {
    /// Add a new order.
    pub const ADD: u8 = 0;
    /// Execute quantity against the first order at the top.
    pub const EXECUTE: u8 = 1;
    /// Reduce an order's open quantity.
    pub const REDUCE: u8 = 2;
    /// Replace an order's quantity and price.
    pub const MODIFY: u8 = 3;
    /// Delete an order.
    pub const DELETE: u8 = 4;
}

/// The persisted/in-memory image of one event record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
#[repr(C)]
pub struct EventRecord {
    book_id: U32,
    op_code: u8,
    ts: u8,
    padding0: [u8; 2],
    id: U64,
    qty: U32,
    padding1: U32,
    price: I64,
}

const _: () = assert!(std::mem::size_of::<EventRecord>() == EVENT_RECORD_SIZE);

impl EventRecord {
    /// The id of the book this record targets.
    pub fn book_id(&self) -> u32 {
        self.book_id.get()
    }

    /// The raw op code.
    pub fn op_code(&self) -> u8 {
        self.op_code
    }

    /// The order id the record addresses.
    pub fn order_id(&self) -> OrderId {
        OrderId::new(self.id.get())
    }

    /// The side carried by add/modify records.
    pub fn side(&self) -> Side {
        if self.ts == 0 { Side::Sell } else { Side::Buy }
    }

    /// Interprets the record as a typed event.
    ///
    /// # Errors
    /// Returns [`BookError::UnknownOpCode`] for op codes outside `0..=4`.
    pub fn decode(&self) -> Result<Event, BookError> {
        let id = self.order_id();
        let qty = OrderQty::new(self.qty.get());
        let order = Order {
            id,
            qty,
            price: Price::new(self.price.get()),
        };

        match self.op_code {
            op_code::ADD => Ok(Event::Add {
                order,
                side: self.side(),
            }),
            op_code::EXECUTE => Ok(Event::Execute { id, qty }),
            op_code::REDUCE => Ok(Event::Reduce { id, qty }),
            op_code::MODIFY => Ok(Event::Modify {
                order,
                side: self.side(),
            }),
            op_code::DELETE => Ok(Event::Delete { id }),
            code => Err(BookError::UnknownOpCode { code }),
        }
    }

    /// The record as raw little-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        IntoBytes::as_bytes(self)
    }
}

/// A decoded book event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Add a new resting order.
    Add {
        /// The order to add.
        order: Order,
        /// Side the order rests on.
        side: Side,
    },
    /// Execute quantity against the first order at the top of its side.
    Execute {
        /// Target order id.
        id: OrderId,
        /// Executed quantity; equal to the open quantity for a full fill.
        qty: OrderQty,
    },
    /// Reduce an order's open quantity, keeping its queue position.
    Reduce {
        /// Target order id.
        id: OrderId,
        /// Canceled quantity, strictly less than the open quantity.
        qty: OrderQty,
    },
    /// Replace an order's quantity and price.
    ///
    /// The side is carried on the wire but the book resolves the actual
    /// side from its index: an order's side never changes.
    Modify {
        /// The new order attributes (same id).
        order: Order,
        /// Side byte as carried by the record.
        side: Side,
    },
    /// Delete an order.
    Delete {
        /// Target order id.
        id: OrderId,
    },
}

impl Event {
    /// Packs the event into its 32-byte record image.
    pub fn encode(&self, book_id: u32) -> EventRecord {
        let mut record = EventRecord {
            book_id: U32::new(book_id),
            op_code: 0,
            ts: 0,
            padding0: [0; 2],
            id: U64::new(0),
            qty: U32::new(0),
            padding1: U32::new(0),
            price: I64::new(0),
        };

        match *self {
            Event::Add { order, side } => {
                record.op_code = op_code::ADD;
                record.ts = (side == Side::Buy) as u8;
                record.id = U64::new(order.id.get());
                record.qty = U32::new(order.qty.get());
                record.price = I64::new(order.price.get());
            }
            Event::Execute { id, qty } => {
                record.op_code = op_code::EXECUTE;
                record.id = U64::new(id.get());
                record.qty = U32::new(qty.get());
            }
            Event::Reduce { id, qty } => {
                record.op_code = op_code::REDUCE;
                record.id = U64::new(id.get());
                record.qty = U32::new(qty.get());
            }
            Event::Modify { order, side } => {
                record.op_code = op_code::MODIFY;
                record.ts = (side == Side::Buy) as u8;
                record.id = U64::new(order.id.get());
                record.qty = U32::new(order.qty.get());
                record.price = I64::new(order.price.get());
            }
            Event::Delete { id } => {
                record.op_code = op_code::DELETE;
                record.id = U64::new(id.get());
            }
        }

        record
    }
}

/// Reinterprets a byte buffer as a sequence of event records.
///
/// # Errors
/// Returns [`BookError::BadEventsLength`] unless the length is a multiple
/// of [`EVENT_RECORD_SIZE`].
pub fn decode_events(buf: &[u8]) -> Result<&[EventRecord], BookError> {
    if buf.len() % EVENT_RECORD_SIZE != 0 {
        return Err(BookError::BadEventsLength { len: buf.len() });
    }
    <[EventRecord]>::ref_from_bytes(buf).map_err(|_| BookError::BadEventsLength { len: buf.len() })
}

/// The raw bytes of a sequence of event records.
pub fn encode_events(records: &[EventRecord]) -> &[u8] {
    records.as_bytes()
}

impl<B: BookSpec> Book<B> {
    /// Applies one decoded event to the book.
    pub fn apply(&mut self, event: &Event) {
        match *event {
            Event::Add { order, side } => self.add_order(order, side),
            Event::Execute { id, qty } => self.execute_order(id, qty),
            Event::Reduce { id, qty } => self.reduce_order(id, qty),
            Event::Modify { order, .. } => self.modify_order(order),
            Event::Delete { id } => self.delete_order(id),
        }
    }
}
