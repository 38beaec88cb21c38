/*!
Untyped pointer into a [`MemView`](crate::mem::MemView).
*/

use crate::mem::MemView;
use crate::types::{Address, MemRange};

use std::cmp;
use std::fmt;
use std::hash;

/// A `(view, address)` pair. Owns no memory - all conveniences forward to
/// `view` with `address` prepended.
///
/// Two `RawPointer`s are equal, ordered, and hashed purely by `address`; the
/// view is not part of identity, so pointers taken from different views of
/// the same target compare equal at the same address.
pub struct RawPointer<'v, V: MemView> {
    pub view: &'v V,
    pub address: Address,
}

impl<'v, V: MemView> RawPointer<'v, V> {
    pub fn new(view: &'v V, address: Address) -> Self {
        RawPointer { view, address }
    }

    /// Wrapping byte-offset arithmetic. Overflow/underflow wraps; bounding
    /// the result to anything sensible is the caller's responsibility.
    #[inline]
    pub fn offset(self, count: i64) -> Self {
        let address = if count >= 0 {
            self.address.wrapping_add(count as usize)
        } else {
            self.address.wrapping_sub((-count) as usize)
        };
        RawPointer {
            view: self.view,
            address,
        }
    }

    /// Builds the half-open range `[self, self+size)` over the same view.
    pub fn to_range(self, size: usize) -> MemRange<'v, V> {
        MemRange::new(self.view, self.address, size)
    }

    /// Builds the half-open range `[self, end)`. Fails if `end < self`.
    pub fn to_range_end(self, end: RawPointer<'v, V>) -> Option<MemRange<'v, V>> {
        if end.address < self.address {
            None
        } else {
            let size = (end.address - self.address) as usize;
            Some(MemRange::new(self.view, self.address, size))
        }
    }

    /// Applies a caller-supplied `RawPointer -> T` constructor.
    ///
    /// This is a conversion convention rather than a trait: it lets domain
    /// code build its own "construct me from a pointer" types without this
    /// crate needing to know about them or force them through a base class.
    pub fn to<T>(self, f: impl FnOnce(Self) -> T) -> T {
        f(self)
    }
}

impl<'v, V: MemView> Copy for RawPointer<'v, V> {}
impl<'v, V: MemView> Clone for RawPointer<'v, V> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'v, V: MemView> Eq for RawPointer<'v, V> {}
impl<'v, V: MemView> PartialEq for RawPointer<'v, V> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<'v, V: MemView> PartialOrd for RawPointer<'v, V> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<'v, V: MemView> Ord for RawPointer<'v, V> {
    #[inline]
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.address.cmp(&other.address)
    }
}

impl<'v, V: MemView> hash::Hash for RawPointer<'v, V> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl<'v, V: MemView> fmt::Debug for RawPointer<'v, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RawPointer({:#x})", self.address.as_u64())
    }
}

impl<'v, V: MemView> fmt::Display for RawPointer<'v, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::local::MemViewLocal;

    #[test]
    fn equality_and_ordering_ignore_the_view() {
        let a = MemViewLocal::new();
        let b = MemViewLocal::new();
        let p1 = RawPointer::new(&a, Address::from(0x1000u64));
        let p2 = RawPointer::new(&b, Address::from(0x1000u64));
        let p3 = RawPointer::new(&a, Address::from(0x2000u64));

        assert_eq!(p1, p2);
        assert!(p1 < p3);
    }

    #[test]
    fn offset_wraps_in_both_directions() {
        let view = MemViewLocal::new();
        let ptr = RawPointer::new(&view, Address::from(0x1000u64));

        assert_eq!(ptr.offset(0x10).address.as_u64(), 0x1010);
        assert_eq!(ptr.offset(-0x10).address.as_u64(), 0xFF0);
    }

    #[test]
    fn to_range_end_rejects_a_backwards_span() {
        let view = MemViewLocal::new();
        let start = RawPointer::new(&view, Address::from(0x2000u64));
        let end = RawPointer::new(&view, Address::from(0x1000u64));

        assert!(start.to_range_end(end).is_none());
        assert_eq!(end.to_range_end(start).unwrap().size, 0x1000);
    }
}
