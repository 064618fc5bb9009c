//! Vocabulary types shared by every layer of the book.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strong type for an order id.
///
/// Ids are unique across both sides of one book while the order is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(u64);

impl OrderId {
    /// Wraps a raw id value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the next id value.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Strong type for an order quantity.
///
/// Live orders always carry a quantity greater than zero; a zero quantity
/// only appears transiently inside level bookkeeping.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct OrderQty(u32);

impl OrderQty {
    /// Zero quantity.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw quantity value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw quantity value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether the quantity is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Add for OrderQty {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for OrderQty {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        debug_assert!(self.0 >= rhs.0);
        Self(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for OrderQty {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for OrderQty {
    fn sub_assign(&mut self, rhs: Self) {
        debug_assert!(self.0 >= rhs.0);
        self.0 -= rhs.0;
    }
}

impl fmt::Display for OrderQty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strong type for a price.
///
/// Prices are normalized integers; the engine never interprets them as
/// currency. The full `i64` range is addressable, including the extremes
/// used as side sentinels.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Price(i64);

impl Price {
    /// Wraps a raw price value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw price value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order id.
    pub id: OrderId,
    /// Remaining open quantity.
    pub qty: OrderQty,
    /// Limit price.
    pub price: Price,
}

impl Order {
    /// Builds an order from raw parts.
    pub const fn new(id: u64, qty: u32, price: i64) -> Self {
        Self {
            id: OrderId::new(id),
            qty: OrderQty::new(qty),
            price: Price::new(price),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.qty, self.id)
    }
}

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid side.
    Buy,
    /// Offer side.
    Sell,
}

impl Side {
    /// Converts the side to an index in `[0, 1]` (Buy = 0, Sell = 1).
    pub const fn index(self) -> usize {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// The opposite side.
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Book sequence number: a monotonic counter incremented once per accepted
/// mutating event.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Bsn(u64);

impl Bsn {
    /// Wraps a raw sequence value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The following sequence number.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The preceding sequence number.
    ///
    /// Must not be called on zero.
    pub fn prev(self) -> Self {
        debug_assert!(self.0 != 0);
        Self(self.0 - 1)
    }

    /// The preceding sequence number, saturating at zero.
    pub const fn safe_prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for Bsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_formats_as_hex() {
        assert_eq!(OrderId::new(0xBEEF).to_string(), "0xBEEF");
        assert_eq!(OrderId::new(10).next(), OrderId::new(11));
    }

    #[test]
    fn qty_arithmetic() {
        let mut q = OrderQty::new(10);
        q += OrderQty::new(5);
        assert_eq!(q, OrderQty::new(15));
        q -= OrderQty::new(15);
        assert!(q.is_zero());
        assert_eq!(OrderQty::new(7) + OrderQty::new(3), OrderQty::new(10));
        assert_eq!(OrderQty::new(7) - OrderQty::new(3), OrderQty::new(4));
    }

    #[test]
    fn order_formats_qty_then_id() {
        let order = Order::new(0xAB, 12, 500);
        assert_eq!(order.to_string(), "[12 0xAB]");
    }

    #[test]
    fn side_index_and_opposite() {
        assert_eq!(Side::Buy.index(), 0);
        assert_eq!(Side::Sell.index(), 1);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::Buy.to_string(), "buy");
        assert_eq!(Side::Sell.to_string(), "sell");
    }

    #[test]
    fn bsn_steps() {
        let bsn = Bsn::new(0);
        assert_eq!(bsn.next(), Bsn::new(1));
        assert_eq!(bsn.safe_prev(), Bsn::new(0));
        assert_eq!(Bsn::new(5).prev(), Bsn::new(4));
    }
}
