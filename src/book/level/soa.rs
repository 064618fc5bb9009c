//! Struct-of-arrays price level.
//!
//! Orders live in parallel `ids`/`qtys` arrays. Queue order is kept by a
//! small links array encoding a doubly-linked list over array slots, with
//! two anchor slots: one for the live-order list and one for the free list.
//! Appends take a slot from the free list (or grow the arrays), deletions
//! push the slot back; both are O(1) and nothing is ever shifted, so a ref
//! (a slot index) stays valid until its own order is removed.

use super::{OrderRef, PriceLevel};
use crate::book::types::{Order, OrderId, OrderQty, Price};
use smallvec::SmallVec;

/// Anchor slot for the live-order list.
const LIVE_ANCHOR: u32 = 0;
/// Anchor slot for the free list.
const FREE_ANCHOR: u32 = 1;
/// First slot backed by the data arrays.
const DATA_OFFSET: u32 = 2;

/// Inline capacity of the data arrays; the links array holds two extra
/// entries for the anchors.
const INLINE_ORDERS: usize = 8;

#[derive(Debug, Default, Clone, Copy)]
struct SlotLinks {
    prev: u32,
    next: u32,
}

/// Reference to an order inside a [`SoaPriceLevel`].
///
/// Carries the slot index and a snapshot of the order; the snapshot is what
/// the order-reference index reads back without touching the level.
#[derive(Debug, Clone, Copy)]
pub struct SoaRef {
    order: Order,
    slot: u32,
}

impl SoaRef {
    pub(crate) fn slot(&self) -> u32 {
        self.slot
    }
}

impl OrderRef for SoaRef {
    fn order(&self) -> Order {
        self.order
    }

    fn price(&self) -> Price {
        self.order.price
    }
}

/// A price level storing its queue as parallel arrays linked by slot
/// indices.
#[derive(Debug)]
pub struct SoaPriceLevel {
    price: Price,
    total_qty: OrderQty,
    count: usize,
    ids: SmallVec<[OrderId; INLINE_ORDERS]>,
    qtys: SmallVec<[OrderQty; INLINE_ORDERS]>,
    links: SmallVec<[SlotLinks; INLINE_ORDERS + 2]>,
}

impl SoaPriceLevel {
    fn data_index(slot: u32) -> usize {
        debug_assert!(slot >= DATA_OFFSET);
        (slot - DATA_OFFSET) as usize
    }

    fn order_in_slot(&self, slot: u32) -> Order {
        let i = Self::data_index(slot);
        Order {
            id: self.ids[i],
            qty: self.qtys[i],
            price: self.price,
        }
    }

    fn unlink(&mut self, slot: u32) {
        let SlotLinks { prev, next } = self.links[slot as usize];
        self.links[prev as usize].next = next;
        self.links[next as usize].prev = prev;
    }

    /// Links a detached `slot` in front of `pos` (appending to the tail of
    /// the list `pos` anchors).
    fn link_before(&mut self, slot: u32, pos: u32) {
        let tail = self.links[pos as usize].prev;
        self.links[slot as usize] = SlotLinks {
            prev: tail,
            next: pos,
        };
        self.links[pos as usize].prev = slot;
        self.links[tail as usize].next = slot;
    }

    /// Takes a slot from the free list, growing the arrays when none is
    /// available.
    fn allocate_slot(&mut self) -> u32 {
        let slot = self.links[FREE_ANCHOR as usize].prev;
        if slot != FREE_ANCHOR {
            self.unlink(slot);
            return slot;
        }

        debug_assert!(self.links.len() < u32::MAX as usize);
        let slot = self.links.len() as u32;
        self.links.push(SlotLinks::default());
        self.ids.push(OrderId::new(0));
        self.qtys.push(OrderQty::ZERO);
        slot
    }

    fn iterate(&self, forward: bool) -> impl Iterator<Item = Order> + '_ {
        let first = if forward {
            self.links[LIVE_ANCHOR as usize].next
        } else {
            self.links[LIVE_ANCHOR as usize].prev
        };

        std::iter::successors(Some(first), move |&slot| {
            let links = self.links[slot as usize];
            Some(if forward { links.next } else { links.prev })
        })
        .take_while(|&slot| slot != LIVE_ANCHOR)
        .map(|slot| self.order_in_slot(slot))
    }
}

impl PriceLevel for SoaPriceLevel {
    type Ref = SoaRef;

    fn new(price: Price) -> Self {
        let mut links = SmallVec::new();
        links.push(SlotLinks {
            prev: LIVE_ANCHOR,
            next: LIVE_ANCHOR,
        });
        links.push(SlotLinks {
            prev: FREE_ANCHOR,
            next: FREE_ANCHOR,
        });

        Self {
            price,
            total_qty: OrderQty::ZERO,
            count: 0,
            ids: SmallVec::new(),
            qtys: SmallVec::new(),
            links,
        }
    }

    fn reset(&mut self, price: Price) {
        debug_assert!(self.is_empty());
        self.price = price;
        self.total_qty = OrderQty::ZERO;
        self.count = 0;
        self.ids.clear();
        self.qtys.clear();
        self.links.clear();
        self.links.push(SlotLinks {
            prev: LIVE_ANCHOR,
            next: LIVE_ANCHOR,
        });
        self.links.push(SlotLinks {
            prev: FREE_ANCHOR,
            next: FREE_ANCHOR,
        });
    }

    fn price(&self) -> Price {
        self.price
    }

    fn add_order(&mut self, order: Order) -> SoaRef {
        debug_assert_eq!(order.price, self.price);
        debug_assert!(!order.qty.is_zero());

        let slot = self.allocate_slot();
        let i = Self::data_index(slot);
        self.ids[i] = order.id;
        self.qtys[i] = order.qty;

        self.total_qty += order.qty;
        self.count += 1;

        self.link_before(slot, LIVE_ANCHOR);

        SoaRef { order, slot }
    }

    fn delete_order(&mut self, r: SoaRef) {
        debug_assert_eq!(r.price(), self.price);

        let i = Self::data_index(r.slot);
        debug_assert!(self.total_qty >= self.qtys[i]);
        self.total_qty -= self.qtys[i];
        debug_assert!(self.count > 0);
        self.count -= 1;

        self.unlink(r.slot);
        self.link_before(r.slot, FREE_ANCHOR);
    }

    fn reduce_qty(&mut self, r: SoaRef, qty: OrderQty) -> SoaRef {
        debug_assert_eq!(r.price(), self.price);

        let i = Self::data_index(r.slot);
        debug_assert!(qty < self.qtys[i]);
        self.qtys[i] -= qty;
        self.total_qty -= qty;

        SoaRef {
            order: self.order_in_slot(r.slot),
            slot: r.slot,
        }
    }

    fn order_at(&self, r: SoaRef) -> Order {
        debug_assert_eq!(r.price(), self.price);
        self.order_in_slot(r.slot)
    }

    fn first_order(&self) -> Order {
        debug_assert!(!self.is_empty());
        self.order_in_slot(self.links[LIVE_ANCHOR as usize].next)
    }

    fn orders_count(&self) -> usize {
        self.count
    }

    fn total_qty(&self) -> OrderQty {
        self.total_qty
    }

    fn orders(&self) -> impl Iterator<Item = Order> + '_ {
        self.iterate(true)
    }

    fn orders_rev(&self) -> impl Iterator<Item = Order> + '_ {
        self.iterate(false)
    }
}
