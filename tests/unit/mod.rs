//! Integration tests driving the engine exclusively through its public
//! API.

mod model;
mod public_api;

use orderbook_core::prelude::*;

/// Observable image of a book, comparable across strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookImage {
    pub bsn: u64,
    pub bid: Option<i64>,
    pub offer: Option<i64>,
    pub buys: Vec<(i64, u32, Vec<(u64, u32)>)>,
    pub sells: Vec<(i64, u32, Vec<(u64, u32)>)>,
}

pub fn snapshot<B: BookSpec>(book: &Book<B>) -> BookImage {
    fn side<'a, L: PriceLevel + 'a>(
        levels: impl Iterator<Item = &'a L>,
    ) -> Vec<(i64, u32, Vec<(u64, u32)>)> {
        levels
            .map(|lvl| {
                (
                    lvl.price().get(),
                    lvl.total_qty().get(),
                    lvl.orders().map(|o| (o.id.get(), o.qty.get())).collect(),
                )
            })
            .collect()
    }

    BookImage {
        bsn: book.bsn().get(),
        bid: book.bbo().bid.map(|p| p.get()),
        offer: book.bbo().offer.map(|p| p.get()),
        buys: side(book.buy().levels()),
        sells: side(book.sell().levels()),
    }
}

/// Asserts the universal invariants of the observable state.
pub fn check_invariants<B: BookSpec>(book: &Book<B>) {
    fn check_side<'a, S: SideOps, L: PriceLevel + 'a>(
        levels: impl Iterator<Item = &'a L>,
        top_price: Option<Price>,
        top_qty: Option<OrderQty>,
    ) -> usize {
        let mut total_orders = 0;
        let mut prev: Option<Price> = None;

        for (i, lvl) in levels.enumerate() {
            assert!(!lvl.is_empty(), "no empty level is observable");
            let orders: Vec<Order> = lvl.orders().collect();
            assert_eq!(orders.len(), lvl.orders_count());
            assert_eq!(
                orders.iter().map(|o| o.qty.get()).sum::<u32>(),
                lvl.total_qty().get()
            );
            assert!(orders.iter().all(|o| !o.qty.is_zero()));

            if let Some(prev) = prev {
                assert!(S::lt(prev, lvl.price()), "levels ordered best-first");
            }
            prev = Some(lvl.price());

            if i == 0 {
                assert_eq!(top_price, Some(lvl.price()));
                assert_eq!(top_qty, Some(lvl.total_qty()));
            }

            total_orders += orders.len();
        }

        if total_orders == 0 {
            assert_eq!(top_price, None);
            assert_eq!(top_qty, None);
        }

        total_orders
    }

    let buys = check_side::<BuySide, _>(
        book.buy().levels(),
        book.buy().top_price(),
        book.buy().top_price_qty(),
    );
    let sells = check_side::<SellSide, _>(
        book.sell().levels(),
        book.sell().top_price(),
        book.sell().top_price_qty(),
    );

    assert_eq!(book.live_orders(), buys + sells);
    assert_eq!(book.empty(), buys + sells == 0);
}
