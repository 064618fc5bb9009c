//! Randomized model tests: arbitrary raw operation streams are
//! interpreted into valid event sequences, and every strategy must agree
//! with the reference book on all observable state.

use crate::{check_invariants, snapshot};
use orderbook_core::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum RawOp {
    Add { buy: bool, price_off: u8, qty: u8 },
    Delete { pick: u16 },
    Execute { buy_first: bool, full: bool, part: u8 },
    Reduce { pick: u16, part: u8 },
    Modify { pick: u16, price_off: u8, qty: u8 },
}

fn raw_op() -> impl Strategy<Value = RawOp> {
    prop_oneof![
        3 => (any::<bool>(), any::<u8>(), 1..=50u8)
            .prop_map(|(buy, price_off, qty)| RawOp::Add { buy, price_off, qty }),
        1 => any::<u16>().prop_map(|pick| RawOp::Delete { pick }),
        2 => (any::<bool>(), any::<bool>(), any::<u8>())
            .prop_map(|(buy_first, full, part)| RawOp::Execute { buy_first, full, part }),
        1 => (any::<u16>(), any::<u8>()).prop_map(|(pick, part)| RawOp::Reduce { pick, part }),
        1 => (any::<u16>(), any::<u8>(), 1..=50u8)
            .prop_map(|(pick, price_off, qty)| RawOp::Modify { pick, price_off, qty }),
    ]
}

fn find_live(book: &MapBook, id: u64) -> Option<(Order, Side)> {
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

/// Turns a raw operation into a valid event, given the current reference
/// state; returns `None` when the raw operation has no valid
/// interpretation (e.g. a delete on an empty book).
fn interpret(
    raw: RawOp,
    reference: &MapBook,
    live: &mut Vec<u64>,
    next_id: &mut u64,
) -> Option<Event> {
    const PRICE_BASE: i64 = 1000;

    match raw {
        RawOp::Add { buy, price_off, qty } => {
            let id = *next_id;
            *next_id += 1;
            live.push(id);
            Some(Event::Add {
                order: Order::new(id, qty as u32, PRICE_BASE + (price_off % 40) as i64),
                side: if buy { Side::Buy } else { Side::Sell },
            })
        }
        RawOp::Delete { pick } => {
            if live.is_empty() {
                return None;
            }
            let id = live.swap_remove(pick as usize % live.len());
            Some(Event::Delete {
                id: OrderId::new(id),
            })
        }
        RawOp::Execute {
            buy_first,
            full,
            part,
        } => {
            let first = if buy_first {
                reference
                    .buy()
                    .first_order()
                    .or_else(|| reference.sell().first_order())
            } else {
                reference
                    .sell()
                    .first_order()
                    .or_else(|| reference.buy().first_order())
            };
            let order = first?;
            let open = order.qty.get();
            let qty = if full || open == 1 {
                open
            } else {
                1 + part as u32 % (open - 1)
            };
            if qty == open {
                live.retain(|&id| id != order.id.get());
            }
            Some(Event::Execute {
                id: order.id,
                qty: OrderQty::new(qty),
            })
        }
        RawOp::Reduce { pick, part } => {
            if live.is_empty() {
                return None;
            }
            let id = live[pick as usize % live.len()];
            let (order, _) = find_live(reference, id)?;
            let open = order.qty.get();
            if open < 2 {
                return None;
            }
            Some(Event::Reduce {
                id: order.id,
                qty: OrderQty::new(1 + part as u32 % (open - 1)),
            })
        }
        RawOp::Modify {
            pick,
            price_off,
            qty,
        } => {
            if live.is_empty() {
                return None;
            }
            let id = live[pick as usize % live.len()];
            let (_, side) = find_live(reference, id)?;
            Some(Event::Modify {
                order: Order::new(id, qty as u32, PRICE_BASE + (price_off % 40) as i64),
                side,
            })
        }
    }
}

fn replay<B: BookSpec>(book: &mut Book<B>, events: &[Event]) {
    for event in events {
        book.apply(event);
    }
    check_invariants(book);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_streams_keep_strategies_equivalent(
        raws in prop::collection::vec(raw_op(), 1..250)
    ) {
        let mut reference = MapBook::new();
        let mut live = Vec::new();
        let mut next_id = 1u64;
        let mut events = Vec::new();

        for raw in raws {
            if let Some(event) = interpret(raw, &reference, &mut live, &mut next_id) {
                reference.apply(&event);
                events.push(event);
            }
        }

        check_invariants(&reference);
        prop_assert_eq!(reference.bsn().get(), events.len() as u64);
        let expected = snapshot(&reference);

        let mut hot = Book::<HotColdBookSpec>::with_config(
            HotColdConfig { hot_levels_count: 8 },
            HotColdConfig { hot_levels_count: 8 },
        )
        .unwrap();
        replay(&mut hot, &events);
        prop_assert_eq!(snapshot(&hot), expected.clone());

        let mut tracked = Book::<TrackedLinearBookSpec>::new();
        replay(&mut tracked, &events);
        prop_assert_eq!(snapshot(&tracked), expected.clone());

        let mut sorted = Book::<SortedVecBookSpec>::new();
        replay(&mut sorted, &events);
        prop_assert_eq!(snapshot(&sorted), expected.clone());

        let mut lru = Book::<LruBookSpec>::with_config(
            LruConfig { cache_capacity: 4 },
            LruConfig { cache_capacity: 4 },
        )
        .unwrap();
        replay(&mut lru, &events);
        prop_assert_eq!(snapshot(&lru), expected);
    }

    #[test]
    fn event_records_survive_an_encode_decode_cycle(
        raws in prop::collection::vec(raw_op(), 1..100)
    ) {
        let mut reference = MapBook::new();
        let mut live = Vec::new();
        let mut next_id = 1u64;
        let mut events = Vec::new();

        for raw in raws {
            if let Some(event) = interpret(raw, &reference, &mut live, &mut next_id) {
                reference.apply(&event);
                events.push(event);
            }
        }

        let records: Vec<EventRecord> = events.iter().map(|e| e.encode(42)).collect();
        let bytes = encode_events(&records).to_vec();
        let decoded = decode_events(&bytes).unwrap();

        let mut replayed = MapBook::new();
        for record in decoded {
            prop_assert_eq!(record.book_id(), 42);
            replayed.apply(&record.decode().unwrap());
        }

        prop_assert_eq!(snapshot(&replayed), snapshot(&reference));
    }
}
