/*!
Typed pointer into a [`MemView`](crate::mem::MemView), specialised to a POD
payload type.
*/

use dataview::Pod;
use std::cmp;
use std::fmt;
use std::hash;
use std::marker::PhantomData;

use crate::mem::MemView;
use crate::types::{Address, RawPointer};

/// A [`RawPointer`] tagged with a plain-old-data payload type `T`.
///
/// Arithmetic (`offset`/`add`/`sub`) is by **byte offset**, not by
/// `size_of::<T>()` stride - this is a frequent point of confusion, so it's
/// called out explicitly here: `ptr.offset(1)` moves one byte, not one `T`.
pub struct TypedPointer<'v, V: MemView, T> {
    pub raw: RawPointer<'v, V>,
    marker: PhantomData<fn() -> T>,
}

impl<'v, V: MemView, T> TypedPointer<'v, V, T> {
    pub fn new(view: &'v V, address: Address) -> Self {
        TypedPointer {
            raw: RawPointer::new(view, address),
            marker: PhantomData,
        }
    }

    pub fn from_raw(raw: RawPointer<'v, V>) -> Self {
        TypedPointer {
            raw,
            marker: PhantomData,
        }
    }

    pub fn address(&self) -> Address {
        self.raw.address
    }

    pub fn view(&self) -> &'v V {
        self.raw.view
    }

    /// Byte-offset arithmetic - see the type-level documentation.
    #[inline]
    pub fn offset(self, count: i64) -> Self {
        TypedPointer {
            raw: self.raw.offset(count),
            marker: PhantomData,
        }
    }
}

impl<'v, V: MemView, T: Pod> TypedPointer<'v, V, T> {
    /// Reads the pointee. `None` if the read was only partial.
    pub fn deref(self) -> Option<T> {
        self.raw.view.read_value::<T>(self.raw.address)
    }

    /// Writes `value` as the pointee. `false` if the write was only partial.
    pub fn write(self, value: &T) -> bool {
        self.raw.view.write_value(self.raw.address, value)
    }
}

/// Pointer-chasing specialisation: dereferencing a
/// `TypedPointer<TypedPointer<U>>` doesn't read a `TypedPointer` out of
/// target memory (it isn't POD - it carries a Rust reference to the view,
/// which has no representation in the target's address space). Instead it
/// reads one machine word's worth of bytes, interprets them as the address
/// of a `U`, and reattaches the *same* view - walking one level of
/// indirection without the caller re-deriving a view at each step.
impl<'v, V: MemView, U> TypedPointer<'v, V, TypedPointer<'v, V, U>> {
    pub fn deref(self) -> Option<TypedPointer<'v, V, U>> {
        let addr = self.raw.view.read_value::<u64>(self.raw.address)?;
        Some(TypedPointer::new(self.raw.view, Address::from(addr)))
    }
}

impl<'v, V: MemView, T> Copy for TypedPointer<'v, V, T> {}
impl<'v, V: MemView, T> Clone for TypedPointer<'v, V, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'v, V: MemView, T> Eq for TypedPointer<'v, V, T> {}
impl<'v, V: MemView, T> PartialEq for TypedPointer<'v, V, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<'v, V: MemView, T> PartialOrd for TypedPointer<'v, V, T> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.raw.cmp(&other.raw))
    }
}

impl<'v, V: MemView, T> Ord for TypedPointer<'v, V, T> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<'v, V: MemView, T> hash::Hash for TypedPointer<'v, V, T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<'v, V: MemView, T> fmt::Debug for TypedPointer<'v, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TypedPointer({:#x})", self.raw.address.as_u64())
    }
}

impl<'v, V: MemView, T> fmt::Display for TypedPointer<'v, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::local::MemViewLocal;

    #[test]
    fn deref_and_write_round_trip_a_pod_value() {
        let view = MemViewLocal::new();
        let mut value: u32 = 0;
        let address = Address::from(&mut value as *mut u32 as u64);
        let ptr: TypedPointer<MemViewLocal, u32> = TypedPointer::new(&view, address);

        assert!(ptr.write(&42));
        assert_eq!(ptr.deref(), Some(42));
    }

    #[test]
    fn chasing_a_pointer_to_pointer_reattaches_the_same_view() {
        let view = MemViewLocal::new();
        let mut target: u64 = 7;
        let target_addr = &mut target as *mut u64 as u64;
        let mut slot: u64 = target_addr;
        let slot_addr = Address::from(&mut slot as *mut u64 as u64);

        let outer: TypedPointer<MemViewLocal, TypedPointer<MemViewLocal, u64>> =
            TypedPointer::new(&view, slot_addr);
        let inner = outer.deref().expect("slot holds a valid address");

        assert_eq!(inner.address(), Address::from(target_addr));
        assert_eq!(inner.deref(), Some(7));
    }

    #[test]
    fn byte_offset_does_not_scale_by_stride() {
        let view = MemViewLocal::new();
        let ptr: TypedPointer<MemViewLocal, u64> = TypedPointer::new(&view, Address::from(0x1000u64));
        assert_eq!(ptr.offset(1).address().as_u64(), 0x1001);
    }
}
