/*!
`MemView` implementations.

Every backend below implements the same six primitives (`read`, `write`,
`allocate`, `free`, `protect`, `protection`); everything else a caller
reaches for - typed reads, arrays, strings, pattern scans - comes from the
default methods on [`MemView`] itself.

| Backend                       | Target                              | Native surface                     |
|--------------------------------|--------------------------------------|-------------------------------------|
| [`local::MemViewLocal`]        | the calling process                 | `memcpy`, delegating allocation/protection to `user` |
| [`user::MemViewUser`] (Darwin)  | a foreign process, by pid or self    | `mach_vm_*`                         |
| [`user::MemViewUser`] (Windows) | a foreign process, by pid or self    | `Read/WriteProcessMemory`, `VirtualAlloc/Free/ProtectEx` |

A custom driver backend only needs to implement [`MemView`] itself - it
does not need to live in this module.
*/

pub mod local;
pub mod user;
mod view;

pub use view::{Encoding, MemView};
