//! Side-polarized price arithmetic.
//!
//! Both sides of a book run the same algorithms, but every comparison and
//! every step along the price tape flips direction between them: the best
//! bid is the *highest* buy price while the best offer is the *lowest* sell
//! price. This module provides a common language for those questions so the
//! level stores and tables are written once and monomorphized per side.
//!
//! Throughout the crate, "forward" means *toward the opposite side* and
//! "closer to the top" means *better for this side*:
//!
//! ```text
//!            105 s s s s          |
//!            104 s s s s s s      |  Sell forward direction
//!            103 s s               v
//!            102 s s s s s      <- sell top (best offer)
//!             99
//!      b b b  98                <- buy top (best bid)
//!  b b b b b  97                   ^
//!        b b  96                   |  Buy forward direction
//!    b b b b  95                   |
//! ```

use super::types::{Price, Side};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Price arithmetic polarized for one side of the book.
///
/// Implemented by the two zero-sized markers [`BuySide`] and [`SellSide`];
/// level stores and orders tables are generic over this trait and all
/// dispatch resolves at compile time.
pub trait SideOps: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The side this implementor represents.
    const SIDE: Side;

    /// The extreme *best* price of the side: the farthest representable
    /// price toward the opposite side (`i64::MAX` for Buy, `i64::MIN` for
    /// Sell). An order at this price always becomes the top.
    const MAX_VALUE: Price;

    /// The extreme *worst* price of the side, the opposite of
    /// [`Self::MAX_VALUE`]. An order at this price always sits at the tail.
    const MIN_VALUE: Price;

    /// The opposite side's implementor.
    type Opposite: SideOps;

    /// Whether `a` is strictly closer to the top than `b`.
    fn lt(a: Price, b: Price) -> bool;

    /// Whether `a` is closer to the top than `b`, or equal to it.
    fn le(a: Price, b: Price) -> bool;

    /// The better of two prices (the one closer to the top).
    fn min(a: Price, b: Price) -> Price {
        if Self::lt(b, a) { b } else { a }
    }

    /// Signed distance between two prices, positive when `a` is closer to
    /// the top than `b`.
    ///
    /// ```
    /// use orderbook_core::prelude::*;
    ///
    /// let (a, b) = (Price::new(100), Price::new(200));
    /// assert_eq!(BuySide::distance(a, b), -100);
    /// assert_eq!(SellSide::distance(a, b), 100);
    /// ```
    fn distance(a: Price, b: Price) -> i64;

    /// Distance between two prices as an unsigned value, for spans that may
    /// not be representable in `i64` (e.g. from one extreme to the other).
    ///
    /// Requires `le(a, b)`.
    fn safe_u64_distance(a: Price, b: Price) -> u64;

    /// Steps a price `delta` ticks toward the opposite side.
    fn advance_forward(p: Price, delta: i64) -> Price;

    /// Steps a price `delta` ticks away from the opposite side.
    fn advance_backward(p: Price, delta: i64) -> Price;
}

/// Zero-sized marker implementing [`SideOps`] for the bid side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuySide;

/// Zero-sized marker implementing [`SideOps`] for the offer side.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SellSide;

impl SideOps for BuySide {
    const SIDE: Side = Side::Buy;
    const MAX_VALUE: Price = Price::new(i64::MAX);
    const MIN_VALUE: Price = Price::new(i64::MIN);

    type Opposite = SellSide;

    fn lt(a: Price, b: Price) -> bool {
        a.get() > b.get()
    }

    fn le(a: Price, b: Price) -> bool {
        a.get() >= b.get()
    }

    fn distance(a: Price, b: Price) -> i64 {
        a.get() - b.get()
    }

    fn safe_u64_distance(a: Price, b: Price) -> u64 {
        debug_assert!(Self::le(a, b));
        (a.get() as u64).wrapping_sub(b.get() as u64)
    }

    fn advance_forward(p: Price, delta: i64) -> Price {
        Price::new(p.get() + delta)
    }

    fn advance_backward(p: Price, delta: i64) -> Price {
        Price::new(p.get() - delta)
    }
}

impl SideOps for SellSide {
    const SIDE: Side = Side::Sell;
    const MAX_VALUE: Price = Price::new(i64::MIN);
    const MIN_VALUE: Price = Price::new(i64::MAX);

    type Opposite = BuySide;

    fn lt(a: Price, b: Price) -> bool {
        a.get() < b.get()
    }

    fn le(a: Price, b: Price) -> bool {
        a.get() <= b.get()
    }

    fn distance(a: Price, b: Price) -> i64 {
        b.get() - a.get()
    }

    fn safe_u64_distance(a: Price, b: Price) -> u64 {
        debug_assert!(Self::le(a, b));
        (b.get() as u64).wrapping_sub(a.get() as u64)
    }

    fn advance_forward(p: Price, delta: i64) -> Price {
        Price::new(p.get() - delta)
    }

    fn advance_backward(p: Price, delta: i64) -> Price {
        Price::new(p.get() + delta)
    }
}

/// A price wrapped with its side's ordering, for use as a key in ordered
/// containers: the smallest key is the best price, so `first_key_value`
/// yields the top of the side.
pub struct SidePrice<S> {
    price: Price,
    _side: PhantomData<S>,
}

impl<S: SideOps> SidePrice<S> {
    /// Wraps a price.
    pub fn new(price: Price) -> Self {
        Self {
            price,
            _side: PhantomData,
        }
    }

    /// Returns the wrapped price.
    pub fn get(&self) -> Price {
        self.price
    }
}

impl<S> Clone for SidePrice<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SidePrice<S> {}

impl<S> fmt::Debug for SidePrice<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SidePrice({})", self.price)
    }
}

impl<S: SideOps> PartialEq for SidePrice<S> {
    fn eq(&self, other: &Self) -> bool {
        self.price == other.price
    }
}

impl<S: SideOps> Eq for SidePrice<S> {}

impl<S: SideOps> PartialOrd for SidePrice<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: SideOps> Ord for SidePrice<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        if S::lt(self.price, other.price) {
            Ordering::Less
        } else if S::lt(other.price, self.price) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarized_comparisons() {
        let (a, b) = (Price::new(100), Price::new(200));

        // Higher prices are better bids.
        assert!(BuySide::lt(b, a));
        assert!(!BuySide::lt(a, b));
        assert!(BuySide::le(a, a));

        // Lower prices are better offers.
        assert!(SellSide::lt(a, b));
        assert!(!SellSide::lt(b, a));
        assert!(SellSide::le(b, b));
    }

    #[test]
    fn polarized_min_picks_the_better_price() {
        let (a, b) = (Price::new(100), Price::new(200));
        assert_eq!(BuySide::min(a, b), b);
        assert_eq!(SellSide::min(a, b), a);
        assert_eq!(BuySide::min(a, a), a);
    }

    #[test]
    fn distance_respects_direction() {
        let (a, b) = (Price::new(100), Price::new(200));
        assert_eq!(BuySide::distance(a, b), -100);
        assert_eq!(BuySide::distance(b, a), 100);
        assert_eq!(SellSide::distance(a, b), 100);
        assert_eq!(SellSide::distance(b, a), -100);
    }

    #[test]
    fn safe_distance_spans_the_whole_tape() {
        assert_eq!(
            BuySide::safe_u64_distance(BuySide::MAX_VALUE, BuySide::MIN_VALUE),
            u64::MAX
        );
        assert_eq!(
            SellSide::safe_u64_distance(SellSide::MAX_VALUE, SellSide::MIN_VALUE),
            u64::MAX
        );
        assert_eq!(
            SellSide::safe_u64_distance(Price::new(100), Price::new(105)),
            5
        );
    }

    #[test]
    fn advancing_moves_toward_the_opposite_side() {
        let p = Price::new(100);
        assert_eq!(BuySide::advance_forward(p, 25), Price::new(125));
        assert_eq!(BuySide::advance_backward(p, 25), Price::new(75));
        assert_eq!(SellSide::advance_forward(p, 25), Price::new(75));
        assert_eq!(SellSide::advance_backward(p, 25), Price::new(125));
    }

    #[test]
    fn sentinels_sit_at_the_extremes() {
        assert_eq!(BuySide::MAX_VALUE, Price::new(i64::MAX));
        assert_eq!(BuySide::MIN_VALUE, Price::new(i64::MIN));
        assert_eq!(SellSide::MAX_VALUE, Price::new(i64::MIN));
        assert_eq!(SellSide::MIN_VALUE, Price::new(i64::MAX));

        // MAX_VALUE is the least element in the polarized ordering.
        assert!(BuySide::le(BuySide::MAX_VALUE, Price::new(0)));
        assert!(SellSide::le(SellSide::MAX_VALUE, Price::new(0)));
        assert!(BuySide::le(Price::new(0), BuySide::MIN_VALUE));
        assert!(SellSide::le(Price::new(0), SellSide::MIN_VALUE));
    }

    #[test]
    fn side_price_orders_best_first() {
        let mut prices: Vec<SidePrice<BuySide>> = [95, 101, 99, 100]
            .into_iter()
            .map(|p| SidePrice::new(Price::new(p)))
            .collect();
        prices.sort();
        let sorted: Vec<i64> = prices.iter().map(|p| p.get().get()).collect();
        assert_eq!(sorted, vec![101, 100, 99, 95]);

        let mut prices: Vec<SidePrice<SellSide>> = [95, 101, 99, 100]
            .into_iter()
            .map(|p| SidePrice::new(Price::new(p)))
            .collect();
        prices.sort();
        let sorted: Vec<i64> = prices.iter().map(|p| p.get().get()).collect();
        assert_eq!(sorted, vec![95, 99, 100, 101]);
    }
}
