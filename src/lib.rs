/*!
memview is a library for live memory introspection: reading, writing,
allocating and scanning the address space of the calling process or a
foreign one, behind a single [`MemView`](mem::MemView) capability.

The core is a [`MemView`](mem::MemView) trait that every backend - the
in-process [`mem::local::MemViewLocal`], the per-OS foreign-process
[`mem::user`] backends, or a custom driver - implements with six
primitives (read, write, allocate, free, protect, protection). Everything
else this crate offers - typed reads/writes, arrays, strings,
[`RawPointer`](types::RawPointer)/[`TypedPointer`](types::TypedPointer)
pointer arithmetic and chasing, and [`MemRange`](types::MemRange) byte-
pattern scanning - is built once, on top of that trait, for every backend
at no extra cost to whoever writes the next one.

Byte-pattern signatures use the IDA-style grammar: hex byte pairs, `??`
wildcards, and `#`-prefixed comments running to end of line. See
[`pattern::Pattern`] for the grammar and [`types::MemRange::scan`] for
scanning a concrete range.
*/

pub mod error;
pub mod mem;
pub mod module;
pub mod pattern;
pub mod platform;
pub mod process;
pub mod types;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::mem::{local::MemViewLocal, Encoding, MemView};
    pub use crate::module::ProcessModule;
    pub use crate::pattern::Pattern;
    pub use crate::platform::{Architecture, Platform};
    pub use crate::process::OsProcess;
    pub use crate::types::{Address, MemRange, Protection, RawPointer, TypedPointer};
}
