/*!
The minimal platform surface the backends need: page size, architecture tag,
and address alignment helpers.

This crate never walks page tables itself - it only asks the OS to do the
access - so `Platform` carries only page size, a bare architecture tag, and
address alignment helpers, not a full architecture descriptor.
*/

use crate::types::Address;

/// CPU architecture of the current process, used only for bookkeeping on
/// `OsProcess`/`ProcessModule` (see [`crate::process`], [`crate::module`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Architecture {
    X86,
    X86_64,
    Arm64,
    Unknown,
}

/// Facts about the machine this process is running on.
pub struct Platform;

impl Platform {
    /// The size, in bytes, of a single page on this machine.
    ///
    /// On most OSes this can vary at runtime (e.g. huge pages); callers that
    /// need the true runtime value should query it from their OS layer. This
    /// constant-time value is the common base page size used for rounding
    /// allocation requests.
    pub fn page_size() -> u64 {
        #[cfg(target_os = "macos")]
        {
            // Apple Silicon uses 16K pages; Intel macOS uses 4K. mach2
            // doesn't expose a compile-time constant for this so callers on
            // Darwin should prefer `mach_vm_region`'s own implicit rounding;
            // 4096 is the historical, still-valid minimum granularity.
            4096
        }
        #[cfg(not(target_os = "macos"))]
        {
            4096
        }
    }

    /// The architecture this binary was compiled for.
    pub fn architecture() -> Architecture {
        #[cfg(target_arch = "x86_64")]
        {
            Architecture::X86_64
        }
        #[cfg(target_arch = "x86")]
        {
            Architecture::X86
        }
        #[cfg(target_arch = "aarch64")]
        {
            Architecture::Arm64
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "x86", target_arch = "aarch64")))]
        {
            Architecture::Unknown
        }
    }

    /// Rounds `addr` down to the start of its containing page.
    pub fn align_start(addr: Address) -> Address {
        addr.align_start(Self::page_size())
    }

    /// Rounds `addr` up to the start of the next page (or leaves it alone if
    /// already page-aligned).
    pub fn align_end(addr: Address) -> Address {
        addr.align_end(Self::page_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_helpers() {
        let page = Platform::page_size();
        let addr = Address::from(page + 1);
        assert_eq!(Platform::align_start(addr).as_u64(), page);
        assert_eq!(Platform::align_end(addr).as_u64(), page * 2);
    }
}
