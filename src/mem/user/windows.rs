/*!
Windows backend: foreign-process memory access via `Read/WriteProcessMemory`
and the `VirtualAlloc/Free/ProtectEx` family.
*/

use std::ptr;

use log::{trace, warn};
use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ACCESS_DENIED, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Diagnostics::Debug::{ReadProcessMemory, WriteProcessMemory};
use windows_sys::Win32::System::Memory::{
    VirtualAllocEx, VirtualFreeEx, VirtualProtectEx, VirtualQueryEx, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE,
    MEMORY_BASIC_INFORMATION,
};
use windows_sys::Win32::System::Threading::{
    GetCurrentProcess, OpenProcess, PROCESS_VM_OPERATION, PROCESS_VM_READ, PROCESS_VM_WRITE,
};

use crate::error::SystemError;
use crate::mem::MemView;
use crate::platform::Platform;
use crate::types::{protection::native as prot_native, Address, MemRange, Protection};

/// A `MemView` mediated by a Windows process handle (`OpenProcess`, or the
/// pseudo-handle from `GetCurrentProcess` for the current process).
pub struct MemViewUser {
    handle: HANDLE,
    is_self: bool,
}

impl MemViewUser {
    /// Opens `pid` with the read/write/operation rights this backend needs.
    pub fn open(pid: u32) -> Result<Self, SystemError> {
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION,
                0,
                pid,
            )
        };

        // Both a null handle and `INVALID_HANDLE_VALUE` signal failure here;
        // `OpenProcess` is documented to return the former, but we treat the
        // latter the same way rather than assume which one we'll see.
        if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            let code = unsafe { GetLastError() };
            warn!("OpenProcess({pid}) failed with error {code}");
            return Err(if code == ERROR_ACCESS_DENIED {
                SystemError::AccessDenied
            } else {
                SystemError::OperationFailed
            });
        }

        Ok(MemViewUser {
            handle,
            is_self: false,
        })
    }

    /// A `MemView` over the calling process's own pseudo-handle.
    pub fn current() -> Self {
        MemViewUser {
            handle: unsafe { GetCurrentProcess() },
            is_self: true,
        }
    }

    fn read_bulk(&self, address: Address, buf: &mut [u8]) -> usize {
        let mut read = 0usize;
        let ok = unsafe {
            ReadProcessMemory(
                self.handle,
                address.as_u64() as *const _,
                buf.as_mut_ptr() as *mut _,
                buf.len(),
                &mut read,
            )
        };
        if ok != 0 {
            read
        } else {
            0
        }
    }
}

impl Drop for MemViewUser {
    fn drop(&mut self) {
        // Never close the pseudo-handle representing our own process, and
        // treat both sentinel values as already-closed.
        if !self.is_self && !self.handle.is_null() && self.handle != INVALID_HANDLE_VALUE {
            unsafe {
                CloseHandle(self.handle);
            }
        }
    }
}

impl MemView for MemViewUser {
    fn read(&self, address: Address, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }

        let n = self.read_bulk(address, buf);
        if n == buf.len() {
            return n;
        }

        trace!("ReadProcessMemory bulk copy failed at {address}, falling back to page-by-page");
        let page_size = Platform::page_size() as usize;
        let mut copied = 0usize;
        while copied < buf.len() {
            let page_addr = address.wrapping_add(copied).align_start(page_size as u64);
            let page_offset = (address.wrapping_add(copied).as_u64() - page_addr.as_u64()) as usize;
            let chunk_len = (page_size - page_offset).min(buf.len() - copied);

            let mut page_buf = vec![0u8; chunk_len];
            let got = self.read_bulk(page_addr.wrapping_add(page_offset), &mut page_buf);
            buf[copied..copied + got].copy_from_slice(&page_buf[..got]);
            copied += got;
            if got < chunk_len {
                break;
            }
        }
        copied
    }

    fn write(&self, address: Address, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let mut written = 0usize;
        let ok = unsafe {
            WriteProcessMemory(
                self.handle,
                address.as_u64() as *mut _,
                data.as_ptr() as *const _,
                data.len(),
                &mut written,
            )
        };
        if ok != 0 {
            written
        } else {
            0
        }
    }

    fn allocate(&self, address: Option<Address>, size: usize, prot: Protection) -> Option<MemRange<'_, Self>>
    where
        Self: Sized,
    {
        let page_size = Platform::page_size();
        let rounded = ((size as u64 + page_size - 1) / page_size) * page_size;

        let hint = address.map(|a| a.as_u64() as *mut _).unwrap_or(ptr::null_mut());
        let native = prot_native::to_native(prot);

        let allocated = unsafe {
            VirtualAllocEx(self.handle, hint, rounded as usize, MEM_COMMIT | MEM_RESERVE, native)
        };

        if allocated.is_null() {
            return None;
        }

        Some(MemRange::new(self, Address::from(allocated as u64), rounded as usize))
    }

    fn free(&self, address: Address, _size: usize) -> bool {
        // `MEM_RELEASE` requires a size of zero and always frees the whole
        // original allocation, regardless of what `size` the caller passes.
        unsafe { VirtualFreeEx(self.handle, address.as_u64() as *mut _, 0, MEM_RELEASE) != 0 }
    }

    fn protect(&self, address: Address, size: usize, prot: Protection) -> bool {
        let native = prot_native::to_native(prot);
        let mut old = 0u32;
        unsafe { VirtualProtectEx(self.handle, address.as_u64() as *mut _, size, native, &mut old) != 0 }
    }

    fn protection(&self, address: Address) -> Option<Protection> {
        let mut info: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
        let written = unsafe {
            VirtualQueryEx(
                self.handle,
                address.as_u64() as *const _,
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        if written == 0 {
            return None;
        }
        Some(prot_native::from_native(info.Protect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_self_and_never_closed() {
        let view = MemViewUser::current();
        assert!(view.is_self);
    }

    #[test]
    fn allocation_is_page_aligned_and_sized() {
        let view = MemViewUser::current();
        let page_size = Platform::page_size();
        let range = view
            .allocate(None, 1, Protection::Rw)
            .expect("allocating one byte should round up to a full page");

        assert_eq!(range.base.as_u64() % page_size, 0);
        assert_eq!(range.size as u64 % page_size, 0);
        assert!(view.free(range.base, range.size));
    }
}
