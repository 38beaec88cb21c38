/*!
Darwin backend: foreign-process memory access via `mach_vm_*`.
*/

use log::{trace, warn};
use mach2::kern_return::KERN_SUCCESS;
use mach2::port::{mach_port_t, MACH_PORT_NULL};
use mach2::traps::{mach_task_self, task_for_pid};
use mach2::vm::{
    mach_vm_allocate, mach_vm_deallocate, mach_vm_protect, mach_vm_read_overwrite, mach_vm_region,
    mach_vm_write,
};
use mach2::vm_prot::VM_PROT_NONE;
use mach2::vm_region::{vm_region_basic_info_64, VM_REGION_BASIC_INFO_64};
use mach2::vm_statistics::VM_FLAGS_ANYWHERE;
use mach2::vm_types::{mach_vm_address_t, mach_vm_size_t};

use crate::error::SystemError;
use crate::mem::MemView;
use crate::platform::Platform;
use crate::types::{protection::native as prot_native, Address, MemRange, Protection};

/// A `MemView` mediated by a Darwin task port (`task_for_pid`, or
/// `mach_task_self` for the current process).
pub struct MemViewUser {
    task: mach_port_t,
    is_self: bool,
}

impl MemViewUser {
    /// Opens the task port for `pid`.
    pub fn open(pid: u32) -> Result<Self, SystemError> {
        let mut task: mach_port_t = MACH_PORT_NULL;
        let kr = unsafe { task_for_pid(mach_task_self(), pid as i32, &mut task) };
        if kr != KERN_SUCCESS {
            warn!("task_for_pid({pid}) failed with kern_return_t {kr}");
            return Err(if kr == mach2::kern_return::KERN_NO_ACCESS || kr == mach2::kern_return::KERN_FAILURE
            {
                SystemError::AccessDenied
            } else {
                SystemError::OperationFailed
            });
        }
        Ok(MemViewUser {
            task,
            is_self: false,
        })
    }

    /// A `MemView` over the calling process's own task port.
    pub fn current() -> Self {
        MemViewUser {
            task: unsafe { mach_task_self() },
            is_self: true,
        }
    }

    fn read_bulk(&self, address: Address, buf: &mut [u8]) -> usize {
        let mut out_size: mach_vm_size_t = 0;
        let kr = unsafe {
            mach_vm_read_overwrite(
                self.task,
                address.as_u64() as mach_vm_address_t,
                buf.len() as mach_vm_size_t,
                buf.as_mut_ptr() as mach_vm_address_t,
                &mut out_size,
            )
        };
        if kr == KERN_SUCCESS {
            out_size as usize
        } else {
            0
        }
    }
}

impl Drop for MemViewUser {
    fn drop(&mut self) {
        // Never release the pseudo-port that represents our own task.
        if !self.is_self && self.task != MACH_PORT_NULL {
            unsafe {
                mach2::mach_port::mach_port_deallocate(mach_task_self(), self.task);
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

        // Bulk copy failed or was partial: fall back to page-by-page reads,
        // accumulating bytes until the first page that cannot be read.
        //
        // NOTE: frida-gum's commentary on `mach_vm_read_overwrite` suspects
        // a kernel-side leak on repeated partial reads of unmapped pages on
        // some Darwin versions. We haven't been able to confirm or rule this
        // out here; callers doing high-frequency scanning of sparsely mapped
        // ranges should be aware of it.
        trace!("mach_vm_read_overwrite bulk copy failed at {address}, falling back to page-by-page");
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
        let kr = unsafe {
            mach_vm_write(
                self.task,
                address.as_u64() as mach_vm_address_t,
                data.as_ptr() as mach2::vm_types::vm_offset_t,
                data.len() as mach2::message::mach_msg_type_number_t,
            )
        };
        if kr == KERN_SUCCESS {
            data.len()
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

        let mut addr: mach_vm_address_t = address.map(|a| a.as_u64()).unwrap_or(0);
        let flags = if address.is_some() { 0 } else { VM_FLAGS_ANYWHERE };

        let kr = unsafe { mach_vm_allocate(self.task, &mut addr, rounded as mach_vm_size_t, flags) };
        if kr != KERN_SUCCESS {
            return None;
        }

        if prot != Protection::Rwx {
            let native = prot_native::to_native(prot);
            let kr = unsafe {
                mach_vm_protect(self.task, addr, rounded as mach_vm_size_t, 0, native)
            };
            if kr != KERN_SUCCESS {
                unsafe {
                    mach_vm_deallocate(self.task, addr, rounded as mach_vm_size_t);
                }
                return None;
            }
        }

        Some(MemRange::new(self, Address::from(addr), rounded as usize))
    }

    fn free(&self, address: Address, size: usize) -> bool {
        let kr = unsafe {
            mach_vm_deallocate(self.task, address.as_u64() as mach_vm_address_t, size as mach_vm_size_t)
        };
        kr == KERN_SUCCESS
    }

    fn protect(&self, address: Address, size: usize, prot: Protection) -> bool {
        let native = prot_native::to_native(prot);
        let kr = unsafe {
            mach_vm_protect(
                self.task,
                address.as_u64() as mach_vm_address_t,
                size as mach_vm_size_t,
                0,
                native,
            )
        };
        kr == KERN_SUCCESS
    }

    fn protection(&self, address: Address) -> Option<Protection> {
        let mut region_addr = address.as_u64() as mach_vm_address_t;
        let mut region_size: mach_vm_size_t = 0;
        let mut info: vm_region_basic_info_64 = unsafe { std::mem::zeroed() };
        let mut info_count = (std::mem::size_of::<vm_region_basic_info_64>() / std::mem::size_of::<i32>())
            as mach2::message::mach_msg_type_number_t;
        let mut object_name: mach_port_t = MACH_PORT_NULL;

        let kr = unsafe {
            mach_vm_region(
                self.task,
                &mut region_addr,
                &mut region_size,
                VM_REGION_BASIC_INFO_64,
                &mut info as *mut _ as *mut i32,
                &mut info_count,
                &mut object_name,
            )
        };

        if kr != KERN_SUCCESS {
            return None;
        }
        if object_name != MACH_PORT_NULL {
            unsafe {
                mach2::mach_port::mach_port_deallocate(mach_task_self(), object_name);
            }
        }

        if info.protection == VM_PROT_NONE {
            Some(Protection::None)
        } else {
            Some(prot_native::from_native(info.protection))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_self_and_never_released() {
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
