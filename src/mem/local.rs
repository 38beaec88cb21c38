/*!
The in-process backend: reads and writes are plain `memcpy`s into the
calling process's own address space; allocation, freeing, protection and
protection queries delegate to the current-process instantiation of
whichever OS backend is compiled in, since those operations have no
faster in-process equivalent.
*/

use crate::mem::MemView;
use crate::types::{Address, MemRange, Protection};

#[cfg(any(target_os = "macos", target_os = "windows"))]
use crate::mem::user::MemViewUser;

/// A `MemView` over the calling process's own address space.
pub struct MemViewLocal {
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    delegate: MemViewUser,
}

impl MemViewLocal {
    pub fn new() -> Self {
        MemViewLocal {
            #[cfg(any(target_os = "macos", target_os = "windows"))]
            delegate: MemViewUser::current(),
        }
    }
}

impl Default for MemViewLocal {
    fn default() -> Self {
        Self::new()
    }
}

impl MemView for MemViewLocal {
    fn read(&self, address: Address, buf: &mut [u8]) -> usize {
        if buf.is_empty() || address.is_null() {
            return 0;
        }
        unsafe {
            let src = address.as_usize() as *const u8;
            std::ptr::copy_nonoverlapping(src, buf.as_mut_ptr(), buf.len());
        }
        buf.len()
    }

    fn write(&self, address: Address, data: &[u8]) -> usize {
        if data.is_empty() || address.is_null() {
            return 0;
        }
        unsafe {
            let dst = address.as_usize() as *mut u8;
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }
        data.len()
    }

    #[cfg(any(target_os = "macos", target_os = "windows"))]
    fn allocate(&self, address: Option<Address>, size: usize, prot: Protection) -> Option<MemRange<'_, Self>>
    where
        Self: Sized,
    {
        let range = self.delegate.allocate(address, size, prot)?;
        Some(MemRange::new(self, range.base, range.size))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn allocate(&self, _address: Option<Address>, _size: usize, _prot: Protection) -> Option<MemRange<'_, Self>>
    where
        Self: Sized,
    {
        None
    }

    #[cfg(any(target_os = "macos", target_os = "windows"))]
    fn free(&self, address: Address, size: usize) -> bool {
        self.delegate.free(address, size)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn free(&self, _address: Address, _size: usize) -> bool {
        false
    }

    #[cfg(any(target_os = "macos", target_os = "windows"))]
    fn protect(&self, address: Address, size: usize, prot: Protection) -> bool {
        self.delegate.protect(address, size, prot)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn protect(&self, _address: Address, _size: usize, _prot: Protection) -> bool {
        false
    }

    #[cfg(any(target_os = "macos", target_os = "windows"))]
    fn protection(&self, address: Address) -> Option<Protection> {
        self.delegate.protection(address)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn protection(&self, _address: Address) -> Option<Protection> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pod;

    #[derive(Copy, Clone)]
    #[repr(C)]
    struct Pair(u32, u32);
    unsafe impl Pod for Pair {}

    #[test]
    fn read_and_write_round_trip_through_a_local_value() {
        let view = MemViewLocal::new();
        let mut value = Pair(0, 0);
        let address = Address::from(&mut value as *mut Pair as u64);

        assert!(view.write_value(address, &Pair(7, 9)));
        let read_back: Pair = view.read_value(address).unwrap();
        assert_eq!((read_back.0, read_back.1), (7, 9));
    }

    #[test]
    fn null_address_is_a_short_read_and_short_write() {
        let view = MemViewLocal::new();
        let mut buf = [0u8; 4];
        assert_eq!(view.read(Address::null(), &mut buf), 0);
        assert_eq!(view.write(Address::null(), &buf), 0);
    }

    #[cfg(any(target_os = "macos", target_os = "windows"))]
    #[test]
    fn allocate_delegates_to_the_current_process_backend() {
        let view = MemViewLocal::new();
        let range = view
            .allocate(None, 1, Protection::Rw)
            .expect("allocating through the local backend should delegate successfully");
        assert!(view.free(range.base, range.size));
    }

    #[test]
    fn scans_a_pattern_within_a_local_buffer() {
        let view = MemViewLocal::new();
        let haystack: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];
        let address = Address::from(haystack.as_ptr() as u64);
        let range = view.range(address, haystack.len());

        let hits = range.scan_str("AD ?? EF").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].address, address + 1);

        let hits = range.scan_str("DE AD BE").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].address, address);

        let hits = range.scan_str("FF FF").unwrap();
        assert_eq!(hits.len(), 0);
    }
}
