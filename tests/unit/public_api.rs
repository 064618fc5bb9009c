//! Public-API scenario coverage.

use crate::{check_invariants, snapshot};
use orderbook_core::prelude::*;

#[test]
fn minimal_bbo_through_the_prelude() {
    let mut book = MapBook::new();
    book.add_order(Order::new(1, 10, 100), Side::Buy);
    book.add_order(Order::new(2, 5, 101), Side::Sell);

    assert_eq!(book.bsn().get(), 2);
    assert_eq!(book.bbo().bid, Some(Price::new(100)));
    assert_eq!(book.bbo().offer, Some(Price::new(101)));
    check_invariants(&book);
}

#[test]
fn partial_then_full_fill() {
    let mut book = MapBook::new();
    book.add_order(Order::new(10, 100, 50), Side::Sell);

    book.execute_order(OrderId::new(10), OrderQty::new(30));
    assert_eq!(book.sell().top_price(), Some(Price::new(50)));
    assert_eq!(book.sell().top_price_qty(), Some(OrderQty::new(70)));

    book.execute_order(OrderId::new(10), OrderQty::new(70));
    assert!(book.sell().is_empty());
    assert_eq!(book.bsn().get(), 3);
    check_invariants(&book);
}

#[test]
fn same_price_modify_requeues_at_the_tail() {
    let mut book = MapBook::new();
    book.add_order(Order::new(1, 10, 100), Side::Buy);
    book.add_order(Order::new(2, 10, 100), Side::Buy);

    book.modify_order(Order::new(1, 10, 100));

    assert_eq!(book.buy().first_order().map(|o| o.id), Some(OrderId::new(2)));
    check_invariants(&book);
}

#[test]
fn cross_level_modify_moves_the_top() {
    let mut book = MapBook::new();
    book.add_order(Order::new(1, 10, 100), Side::Buy);
    book.add_order(Order::new(2, 5, 99), Side::Buy);

    book.modify_order(Order::new(2, 5, 101));

    assert_eq!(book.buy().top_price(), Some(Price::new(101)));
    assert_eq!(book.buy().top_price_qty(), Some(OrderQty::new(5)));
    let prices: Vec<i64> = book.buy().levels().map(|l| l.price().get()).collect();
    assert_eq!(prices, vec![101, 100]);
    check_invariants(&book);
}

#[test]
fn hot_cold_scenario_with_a_small_window() {
    let mut book = Book::<HotColdBookSpec>::with_config(
        HotColdConfig { hot_levels_count: 8 },
        HotColdConfig { hot_levels_count: 8 },
    )
    .unwrap();

    for (id, price) in [(1, 1000), (2, 1000), (3, 999), (4, 999), (5, 999)] {
        book.add_order(Order::new(id, 1, price), Side::Buy);
    }
    book.add_order(Order::new(6, 1, 1250), Side::Buy);

    assert_eq!(book.buy().top_price(), Some(Price::new(1250)));
    assert_eq!(book.buy().store().hot_levels_len(), 5);
    assert_eq!(book.buy().store().cold_levels_len(), 2);
    check_invariants(&book);
}

#[test]
fn hot_cold_rejects_bad_window_sizes() {
    for bad in [1, 5000] {
        let result = Book::<HotColdBookSpec>::with_config(
            HotColdConfig {
                hot_levels_count: bad,
            },
            HotColdConfig {
                hot_levels_count: 32,
            },
        );
        assert!(matches!(
            result,
            Err(BookError::HotLevelsCountOutOfRange { .. })
        ));
    }
}

#[test]
fn event_records_round_trip_through_bytes() {
    let script = [
        Event::Add {
            order: Order::new(1, 10, 100),
            side: Side::Buy,
        },
        Event::Add {
            order: Order::new(2, 5, 101),
            side: Side::Sell,
        },
        Event::Execute {
            id: OrderId::new(2),
            qty: OrderQty::new(5),
        },
        Event::Delete { id: OrderId::new(1) },
    ];

    let records: Vec<EventRecord> = script.iter().map(|e| e.encode(0)).collect();
    let bytes = encode_events(&records).to_vec();
    assert_eq!(bytes.len(), script.len() * EVENT_RECORD_SIZE);

    let mut book = MapBook::new();
    for record in decode_events(&bytes).unwrap() {
        book.apply(&record.decode().unwrap());
    }

    assert!(book.empty());
    assert_eq!(book.bsn().get(), 4);
}

#[test]
fn strategies_match_on_a_fixed_script() {
    fn run<B: BookSpec>() -> Book<B> {
        let mut book = Book::<B>::new();
        book.add_order(Order::new(1, 10, 100), Side::Buy);
        book.add_order(Order::new(2, 20, 101), Side::Buy);
        book.add_order(Order::new(3, 30, 200), Side::Sell);
        book.add_order(Order::new(4, 40, 199), Side::Sell);
        book.reduce_order(OrderId::new(2), OrderQty::new(5));
        book.modify_order(Order::new(1, 10, 102));
        book.execute_order(OrderId::new(4), OrderQty::new(40));
        book.delete_order(OrderId::new(3));
        check_invariants(&book);
        book
    }

    let expected = snapshot(&run::<MapBookSpec>());
    assert_eq!(snapshot(&run::<DenseLinearBookSpec>()), expected);
    assert_eq!(snapshot(&run::<TrackedLinearBookSpec>()), expected);
    assert_eq!(snapshot(&run::<SortedVecBookSpec>()), expected);
    assert_eq!(snapshot(&run::<LruBookSpec>()), expected);
    assert_eq!(snapshot(&run::<HotColdBookSpec>()), expected);
}

#[test]
fn observable_state_serializes() {
    let mut book = MapBook::new();
    book.add_order(Order::new(1, 10, 100), Side::Buy);

    let bbo = serde_json::to_value(book.bbo()).unwrap();
    assert_eq!(bbo["bid"], serde_json::json!(100));
    assert_eq!(bbo["offer"], serde_json::Value::Null);

    let order = serde_json::to_value(Order::new(1, 10, 100)).unwrap();
    assert_eq!(order["qty"], serde_json::json!(10));
}
