/*!
Memory protection flags.

Only the six combinations a real MMU can express are representable: there is
no way to ask for write-without-read, because no mainstream platform can
honour it (Darwin's `VM_PROT_WRITE` always implies `VM_PROT_READ | VM_PROT_COPY`
under the hood). Round-tripping a `Protection` through an OS backend is
therefore lossy only in the write-implies-read direction.
*/

use std::fmt;

/// The (read, write, execute) permissions of a memory region, restricted to
/// the six combinations every supported backend can represent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Protection {
    /// No access at all.
    None,
    /// Read-only.
    R,
    /// Execute-only (not readable). Rare, but several platforms allow it.
    X,
    /// Read and write.
    Rw,
    /// Read and execute.
    Rx,
    /// Read, write and execute.
    Rwx,
}

impl Protection {
    #[inline]
    pub const fn can_read(self) -> bool {
        matches!(self, Protection::R | Protection::Rw | Protection::Rx | Protection::Rwx)
    }

    #[inline]
    pub const fn can_write(self) -> bool {
        matches!(self, Protection::Rw | Protection::Rwx)
    }

    #[inline]
    pub const fn can_execute(self) -> bool {
        matches!(self, Protection::X | Protection::Rx | Protection::Rwx)
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Protection::None => "---",
            Protection::R => "r--",
            Protection::X => "--x",
            Protection::Rw => "rw-",
            Protection::Rx => "r-x",
            Protection::Rwx => "rwx",
        };
        f.write_str(s)
    }
}

#[cfg(target_os = "macos")]
pub(crate) mod native {
    use super::Protection;
    use mach2::vm_prot::{vm_prot_t, VM_PROT_EXECUTE, VM_PROT_NONE, VM_PROT_READ, VM_PROT_WRITE};

    /// Translates a `Protection` into the `vm_prot_t` mask `mach_vm_protect`
    /// and `mach_vm_allocate` expect.
    ///
    /// Darwin always pairs `VM_PROT_WRITE` with `VM_PROT_READ`, so there is no
    /// lossy direction to worry about on the way in - every `Protection`
    /// variant maps onto a mask the kernel will accept as-is.
    pub fn to_native(prot: Protection) -> vm_prot_t {
        let mut mask = VM_PROT_NONE;
        if prot.can_read() {
            mask |= VM_PROT_READ;
        }
        if prot.can_write() {
            mask |= VM_PROT_WRITE;
        }
        if prot.can_execute() {
            mask |= VM_PROT_EXECUTE;
        }
        mask
    }

    /// Translates a `vm_prot_t` mask read back from `mach_vm_region` into a
    /// `Protection`. A `write`-only mask folds up to `Rw`/`Rwx` since write
    /// implies read on this platform.
    pub fn from_native(mask: vm_prot_t) -> Protection {
        let r = mask & VM_PROT_READ != 0;
        let w = mask & VM_PROT_WRITE != 0;
        let x = mask & VM_PROT_EXECUTE != 0;
        match (r || w, w, x) {
            (false, _, false) => Protection::None,
            (false, _, true) => Protection::X,
            (true, false, false) => Protection::R,
            (true, false, true) => Protection::Rx,
            (true, true, false) => Protection::Rw,
            (true, true, true) => Protection::Rwx,
        }
    }
}

#[cfg(target_os = "windows")]
pub(crate) mod native {
    use super::Protection;
    use windows_sys::Win32::System::Memory::{
        PAGE_EXECUTE, PAGE_EXECUTE_READ, PAGE_EXECUTE_READWRITE, PAGE_NOACCESS, PAGE_PROTECTION_FLAGS,
        PAGE_READONLY, PAGE_READWRITE,
    };

    pub fn to_native(prot: Protection) -> PAGE_PROTECTION_FLAGS {
        match prot {
            Protection::None => PAGE_NOACCESS,
            Protection::R => PAGE_READONLY,
            Protection::X => PAGE_EXECUTE,
            Protection::Rw => PAGE_READWRITE,
            Protection::Rx => PAGE_EXECUTE_READ,
            Protection::Rwx => PAGE_EXECUTE_READWRITE,
        }
    }

    pub fn from_native(flags: PAGE_PROTECTION_FLAGS) -> Protection {
        // Mask off the page modifier bits (PAGE_GUARD, PAGE_NOCACHE, ...);
        // only the base protection constant matters here.
        const MODIFIERS: PAGE_PROTECTION_FLAGS = 0xFF00;
        match flags & !MODIFIERS {
            PAGE_NOACCESS => Protection::None,
            PAGE_READONLY => Protection::R,
            PAGE_EXECUTE => Protection::X,
            PAGE_READWRITE | windows_sys::Win32::System::Memory::PAGE_WRITECOPY => Protection::Rw,
            PAGE_EXECUTE_READ => Protection::Rx,
            PAGE_EXECUTE_READWRITE | windows_sys::Win32::System::Memory::PAGE_EXECUTE_WRITECOPY => {
                Protection::Rwx
            }
            _ => Protection::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_helpers() {
        assert!(!Protection::None.can_read());
        assert!(Protection::Rwx.can_read() && Protection::Rwx.can_write() && Protection::Rwx.can_execute());
        assert!(Protection::R.can_read() && !Protection::R.can_write());
        assert!(Protection::X.can_execute() && !Protection::X.can_read());
    }

    #[test]
    fn display() {
        assert_eq!(Protection::Rw.to_string(), "rw-");
        assert_eq!(Protection::None.to_string(), "---");
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn darwin_round_trip() {
        use native::{from_native, to_native};
        for p in [
            Protection::None,
            Protection::R,
            Protection::Rw,
            Protection::Rx,
            Protection::Rwx,
        ] {
            assert_eq!(from_native(to_native(p)), p);
        }
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn windows_round_trip() {
        use native::{from_native, to_native};
        for p in [
            Protection::None,
            Protection::R,
            Protection::X,
            Protection::Rw,
            Protection::Rx,
            Protection::Rwx,
        ] {
            assert_eq!(from_native(to_native(p)), p);
        }
    }
}
