//! Cross-component tests for the book engine.


use super::book::{Book, BookSpec};
use super::level::PriceLevel;
use super::side::{BuySide, SellSide, SideOps};
use super::types::{Order, OrderQty, Side};

/// Observable image of one price level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelImage {
    pub price: i64,
    pub total_qty: u32,
    pub count: usize,
    pub orders: Vec<(u64, u32)>,
}

/// Observable image of a whole book, for cross-strategy comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BookImage {
    pub bsn: u64,
    pub bid: Option<i64>,
    pub offer: Option<i64>,
    pub buys: Vec<LevelImage>,
    pub sells: Vec<LevelImage>,
}

fn level_images<'a, L: PriceLevel + 'a>(
    levels: impl Iterator<Item = &'a L>,
) -> Vec<LevelImage> {
    levels
        .map(|lvl| LevelImage {
            price: lvl.price().get(),
            total_qty: lvl.total_qty().get(),
            count: lvl.orders_count(),
            orders: lvl.orders().map(|o| (o.id.get(), o.qty.get())).collect(),
        })
        .collect()
}

pub(crate) fn snapshot<B: BookSpec>(book: &Book<B>) -> BookImage {
    BookImage {
        bsn: book.bsn().get(),
        bid: book.bbo().bid.map(|p| p.get()),
        offer: book.bbo().offer.map(|p| p.get()),
        buys: level_images(book.buy().levels()),
        sells: level_images(book.sell().levels()),
    }
}

/// Finds a live order and its side through the observable API.
pub(crate) fn find_order<B: BookSpec>(book: &Book<B>, id: u64) -> Option<(Order, Side)> {
    book.buy()
        .orders()
        .find(|o| o.id.get() == id)
        .map(|o| (o, Side::Buy))
        .or_else(|| {
            book.sell()
                .orders()
                .find(|o| o.id.get() == id)
                .map(|o| (o, Side::Sell))
        })
}

/// Checks every universal invariant of a book's observable state.
pub(crate) fn check_invariants<B: BookSpec>(book: &Book<B>) {
    fn check_side<'a, S: SideOps, L: PriceLevel + 'a>(
        levels: impl Iterator<Item = &'a L>,
        top_price: Option<i64>,
        top_qty: Option<u32>,
        first_order: Option<Order>,
    ) -> usize {
        let mut order_count = 0;
        let mut prev_price: Option<i64> = None;
        let mut first_level = true;

        for lvl in levels {
            // No empty levels are observable.
            assert!(!lvl.is_empty());
            assert!(lvl.orders_count() > 0);

            // Aggregates are exact.
            let orders: Vec<Order> = lvl.orders().collect();
            assert_eq!(lvl.orders_count(), orders.len());
            let qty_sum: u32 = orders.iter().map(|o| o.qty.get()).sum();
            assert_eq!(lvl.total_qty().get(), qty_sum);
            for order in &orders {
                assert!(!order.qty.is_zero());
                assert_eq!(order.price, lvl.price());
            }

            // LIFO view is the exact reverse of the FIFO view.
            let mut reversed: Vec<Order> = lvl.orders_rev().collect();
            reversed.reverse();
            assert_eq!(orders, reversed);

            // Prices strictly improve toward the front of the range.
            if let Some(prev) = prev_price {
                assert!(
                    S::lt(crate::book::types::Price::new(prev), lvl.price()),
                    "levels must be strictly ordered best-first"
                );
            }
            prev_price = Some(lvl.price().get());

            if first_level {
                assert_eq!(top_price, Some(lvl.price().get()));
                assert_eq!(top_qty, Some(lvl.total_qty().get()));
                assert_eq!(first_order, Some(lvl.first_order()));
                first_level = false;
            }

            order_count += orders.len();
        }

        if first_level {
            assert_eq!(top_price, None);
            assert_eq!(top_qty, None);
            assert_eq!(first_order, None);
        }

        order_count
    }

    let buys = check_side::<BuySide, _>(
        book.buy().levels(),
        book.buy().top_price().map(|p| p.get()),
        book.buy().top_price_qty().map(OrderQty::get),
        book.buy().first_order(),
    );
    let sells = check_side::<SellSide, _>(
        book.sell().levels(),
        book.sell().top_price().map(|p| p.get()),
        book.sell().top_price_qty().map(OrderQty::get),
        book.sell().first_order(),
    );

    // The index covers exactly the resting orders.
    assert_eq!(book.live_orders(), buys + sells);
    assert_eq!(book.empty(), buys + sells == 0);
}

/// Small deterministic generator for reproducible event scripts.
pub(crate) struct TestRng(u64);

impl TestRng {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}
