//! Order-reference index: `OrderId -> (order ref, side)`.
//!
//! One lookup here is the first step of every id-addressed event. The entry
//! stores the side together with the ref so side-agnostic events (delete,
//! execute, reduce by id) dispatch to the right table without a second
//! lookup.

use super::level::OrderRef;
use super::types::{Order, OrderId, Side};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

/// Strongly universal 64-bit hash for dense integer keys: two independent
/// 32-bit universal hashes composed into one 64-bit value.
///
/// See <https://lemire.me/blog/2018/08/15/fast-strongly-universal-64-bit-hashing-everywhere/>
#[derive(Debug, Default, Clone, Copy)]
pub struct LemireHasher {
    value: u64,
}

impl LemireHasher {
    fn hash32_1(x: u64) -> u64 {
        const A: u64 = 0x65d200ce55b19ad8;
        const B: u64 = 0x4f2162926e40c299;
        const C: u64 = 0x162dd799029970f8;

        let low = x as u32 as u64;
        let high = (x >> 32) as u64;
        (A.wrapping_mul(low)
            .wrapping_add(B.wrapping_mul(high))
            .wrapping_add(C))
            >> 32
    }

    fn hash32_2(x: u64) -> u64 {
        const A: u64 = 0x68b665e6872bd1f4;
        const B: u64 = 0xb6cfcf9d79b51db2;
        const C: u64 = 0x7a2b92ae912898c2;

        let low = x as u32 as u64;
        let high = (x >> 32) as u64;
        (A.wrapping_mul(low)
            .wrapping_add(B.wrapping_mul(high))
            .wrapping_add(C))
            >> 32
    }
}

impl Hasher for LemireHasher {
    fn finish(&self) -> u64 {
        Self::hash32_1(self.value) | (Self::hash32_2(self.value) << 32)
    }

    fn write(&mut self, bytes: &[u8]) {
        // Generic path; order ids go through `write_u64`.
        for chunk in bytes.chunks(8) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            self.value ^= u64::from_le_bytes(buf);
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.value = i;
    }
}

/// [`BuildHasher`] plugging [`LemireHasher`] into a `HashMap`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LemireBuildHasher;

impl BuildHasher for LemireBuildHasher {
    type Hasher = LemireHasher;

    fn build_hasher(&self) -> LemireHasher {
        LemireHasher::default()
    }
}

/// One index entry: where the order lives and on which side.
#[derive(Debug, Clone, Copy)]
pub struct RefEntry<R> {
    order_ref: R,
    side: Side,
}

impl<R: OrderRef> RefEntry<R> {
    /// Builds an entry.
    pub fn new(order_ref: R, side: Side) -> Self {
        Self { order_ref, side }
    }

    /// Reconstructs the order from the stored ref snapshot.
    pub fn order(&self) -> Order {
        self.order_ref.order()
    }

    /// The stored ref.
    pub fn order_ref(&self) -> R {
        self.order_ref
    }

    /// Replaces the stored ref after a mutation returned a refreshed one.
    pub fn set_order_ref(&mut self, r: R) {
        self.order_ref = r;
    }

    /// The side of the table holding the order.
    pub fn side(&self) -> Side {
        self.side
    }
}

/// Hash index from order id to [`RefEntry`].
///
/// Shared by the two tables of one book; the book serializes all access.
#[derive(Debug)]
pub struct OrderRefsIndex<R> {
    map: HashMap<OrderId, RefEntry<R>, LemireBuildHasher>,
}

impl<R: OrderRef> OrderRefsIndex<R> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            map: HashMap::with_hasher(LemireBuildHasher),
        }
    }

    /// Inserts the entry for a newly added order.
    ///
    /// Requires that `id` is not present.
    pub fn insert(&mut self, id: OrderId, entry: RefEntry<R>) {
        let prev = self.map.insert(id, entry);
        debug_assert!(prev.is_none(), "duplicate order id {id}");
    }

    /// Removes and returns the entry for `id`.
    pub fn remove(&mut self, id: OrderId) -> Option<RefEntry<R>> {
        self.map.remove(&id)
    }

    /// Looks up the entry for `id`.
    pub fn get(&self, id: OrderId) -> Option<&RefEntry<R>> {
        self.map.get(&id)
    }

    /// Looks up the entry for `id` for in-place mutation.
    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut RefEntry<R>> {
        self.map.get_mut(&id)
    }

    /// Whether `id` is live in the book.
    pub fn contains(&self, id: OrderId) -> bool {
        self.map.contains_key(&id)
    }

    /// Number of live orders across both sides.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no orders are live.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over all live entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (OrderId, &RefEntry<R>)> {
        self.map.iter().map(|(id, entry)| (*id, entry))
    }
}

impl<R: OrderRef> Default for OrderRefsIndex<R> {
    fn default() -> Self {
        Self::new()
    }
}
