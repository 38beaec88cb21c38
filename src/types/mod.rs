/*!
Value types layered on top of [`MemView`](crate::mem::MemView): addresses,
protection flags, raw/typed pointers, and memory ranges.
*/

pub mod address;
pub mod pointer;
pub mod protection;
pub mod range;
pub mod typed_pointer;

pub use address::Address;
pub use pointer::RawPointer;
pub use protection::Protection;
pub use range::MemRange;
pub use typed_pointer::TypedPointer;

/// Marker for types safely representable as a flat byte sequence: no
/// internal pointers, no non-trivial destructor, no padding-dependent
/// semantics. Re-exported from `dataview` rather than redefined - asserting
/// this at the type system level catches mistakes at compile time instead
/// of needing a runtime check before every raw read/write.
pub use dataview::Pod;
