/*!
The `MemView` capability: the abstract read/write/allocate/free/protect
surface every backend must implement, plus the large set of typed
conveniences that are provided once, for every backend, on top of it.

Only six primitives below are backend-specific (see the table in the
module-level documentation of [`crate::mem`]); everything else - typed
reads/writes, arrays, strings, pointers-of-pointers, range/pointer
constructors - is implemented here as default trait methods, so a backend
author only has to get the six primitives right.
*/

use dataview::{Pod, PodMethods};
use std::mem::{size_of, zeroed};

use crate::module::ProcessModule;
use crate::types::{Address, MemRange, Protection, RawPointer, TypedPointer};

/// Character encoding used by [`MemView::read_string`]/[`MemView::write_string`].
///
/// `max_scalar_width` is expressed in units of that encoding's own code
/// unit: the worst case for every supported encoding works out to exactly
/// 4 bytes per character, so `read_string` can size its read uniformly
/// regardless of which encoding it ends up decoding under.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16,
    Utf32,
}

impl Encoding {
    pub const fn max_scalar_width(self) -> usize {
        match self {
            Encoding::Utf8 => 4,
            Encoding::Utf16 => 2,
            Encoding::Utf32 => 1,
        }
    }

    const fn code_unit_size(self) -> usize {
        match self {
            Encoding::Utf8 => 1,
            Encoding::Utf16 => 2,
            Encoding::Utf32 => 4,
        }
    }
}

/// The abstract capability to read, write, allocate, free and protect some
/// address space - the current process, a foreign process, or anything
/// else a driver chooses to back it with.
///
/// A `MemView` is not inherently shareable across threads: its embedded OS
/// handle/port may be referenced without synchronisation. Callers that need
/// cross-thread access must either serialise calls themselves or construct
/// one view per thread against the same target - this trait adds no hidden
/// locks.
pub trait MemView {
    /// Reads `buf.len()` bytes starting at `address`, returning the number
    /// of bytes actually copied. Implementations should attempt a single
    /// bulk copy first and fall back to a page-by-page copy on failure,
    /// accumulating bytes until the first page that cannot be read.
    fn read(&self, address: Address, buf: &mut [u8]) -> usize;

    /// Writes `data` starting at `address`, returning the number of bytes
    /// actually written.
    fn write(&self, address: Address, data: &[u8]) -> usize;

    /// Reserves `size` bytes (rounded up to whole pages by the
    /// implementation) with protection `prot`, optionally hinting a
    /// preferred `address`. Returns `None` on any failure; a backend that
    /// partially succeeds must free what it allocated before returning.
    fn allocate(&self, address: Option<Address>, size: usize, prot: Protection) -> Option<MemRange<'_, Self>>
    where
        Self: Sized;

    /// Releases a previous `allocate` call's `[address, address+size)`
    /// region. Some platforms release the whole original allocation
    /// regardless of `size` - implementations must document that.
    fn free(&self, address: Address, size: usize) -> bool;

    /// Changes protection over `[address, address+size)`.
    fn protect(&self, address: Address, size: usize, prot: Protection) -> bool;

    /// The protection of the region containing `address`, if any.
    fn protection(&self, address: Address) -> Option<Protection>;

    // --- Derived conveniences -------------------------------------------------

    /// Reads a single `T`. `None` unless every byte of `T` was read.
    fn read_value<T: Pod>(&self, address: Address) -> Option<T> {
        let mut value: T = unsafe { zeroed() };
        let n = self.read(address, value.as_bytes_mut());
        if n == size_of::<T>() {
            Some(value)
        } else {
            None
        }
    }

    /// Writes a single `T`. `false` unless every byte of `T` was written.
    fn write_value<T: Pod>(&self, address: Address, value: &T) -> bool {
        self.write(address, value.as_bytes()) == size_of::<T>()
    }

    /// Reads up to `max_count` contiguous `T`s, trimming to however many
    /// whole elements were actually read. A zero-sized `T` yields an empty
    /// result rather than dividing by zero.
    fn read_array<T: Pod + Copy>(&self, address: Address, max_count: usize) -> Vec<T> {
        let stride = size_of::<T>();
        if stride == 0 || max_count == 0 {
            return Vec::new();
        }
        let mut buf: Vec<T> = vec![unsafe { zeroed() }; max_count];
        let n = {
            let bytes = unsafe {
                std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut u8, max_count * stride)
            };
            self.read(address, bytes)
        };
        buf.truncate(n / stride);
        buf
    }

    /// Writes `values` contiguously, returning the number of whole elements
    /// actually written.
    fn write_array<T: Pod>(&self, address: Address, values: &[T]) -> usize {
        let stride = size_of::<T>();
        if stride == 0 || values.is_empty() {
            return 0;
        }
        let bytes =
            unsafe { std::slice::from_raw_parts(values.as_ptr() as *const u8, values.len() * stride) };
        self.write(address, bytes) / stride
    }

    /// Reads `max_count` native-width addresses and reattaches them to
    /// `self`, producing untyped pointers into the same view.
    fn read_pointer_array(&self, address: Address, max_count: usize) -> Vec<RawPointer<'_, Self>>
    where
        Self: Sized,
    {
        self.read_array::<u64>(address, max_count)
            .into_iter()
            .map(|a| RawPointer::new(self, Address::from(a)))
            .collect()
    }

    /// Serialises `ptrs` as an array of native-width addresses.
    fn write_pointer_array(&self, address: Address, ptrs: &[RawPointer<'_, Self>]) -> usize
    where
        Self: Sized,
    {
        let addrs: Vec<u64> = ptrs.iter().map(|p| p.address.as_u64()).collect();
        self.write_array(address, &addrs)
    }

    /// Reads `max_count` native-width addresses and reattaches them to
    /// `self` as `TypedPointer<T>`s.
    fn read_typed_pointer_array<T>(&self, address: Address, max_count: usize) -> Vec<TypedPointer<'_, Self, T>>
    where
        Self: Sized,
    {
        self.read_array::<u64>(address, max_count)
            .into_iter()
            .map(|a| TypedPointer::new(self, Address::from(a)))
            .collect()
    }

    /// Serialises `ptrs` as an array of native-width addresses.
    fn write_typed_pointer_array<T>(&self, address: Address, ptrs: &[TypedPointer<'_, Self, T>]) -> usize
    where
        Self: Sized,
    {
        let addrs: Vec<u64> = ptrs.iter().map(|p| p.address().as_u64()).collect();
        self.write_array(address, &addrs)
    }

    /// Reads a string. Reads `max_chars * max_scalar_width(encoding)` code
    /// units (always 4 bytes per character worst-case, regardless of
    /// encoding); if `zero_term`, truncates at the first zero code unit;
    /// decodes under `encoding` with replacement-on-error; finally
    /// truncates the decoded string to at most `max_chars` characters.
    fn read_string(&self, address: Address, max_chars: usize, encoding: Encoding, zero_term: bool) -> String {
        let byte_len = max_chars * encoding.max_scalar_width() * encoding.code_unit_size();
        let mut buf = vec![0u8; byte_len];
        let n = self.read(address, &mut buf);
        buf.truncate(n);

        let decoded = match encoding {
            Encoding::Utf8 => {
                let slice = if zero_term {
                    match buf.iter().position(|&b| b == 0) {
                        Some(i) => &buf[..i],
                        None => &buf[..],
                    }
                } else {
                    &buf[..]
                };
                String::from_utf8_lossy(slice).into_owned()
            }
            Encoding::Utf16 => {
                let units: Vec<u16> = buf
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                let units: &[u16] = if zero_term {
                    match units.iter().position(|&u| u == 0) {
                        Some(i) => &units[..i],
                        None => &units[..],
                    }
                } else {
                    &units[..]
                };
                char::decode_utf16(units.iter().copied())
                    .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            Encoding::Utf32 => {
                let units: Vec<u32> = buf
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                let units: &[u32] = if zero_term {
                    match units.iter().position(|&u| u == 0) {
                        Some(i) => &units[..i],
                        None => &units[..],
                    }
                } else {
                    &units[..]
                };
                units
                    .iter()
                    .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
        };

        decoded.chars().take(max_chars).collect()
    }

    /// Writes a string. UTF-8 is a fast path (no transcode); other
    /// encodings transcode from the input `&str`, optionally appending one
    /// zero code unit.
    fn write_string(&self, address: Address, s: &str, encoding: Encoding, zero_term: bool) -> bool {
        match encoding {
            Encoding::Utf8 => {
                let mut bytes = s.as_bytes().to_vec();
                if zero_term {
                    bytes.push(0);
                }
                self.write(address, &bytes) == bytes.len()
            }
            Encoding::Utf16 => {
                let mut units: Vec<u16> = s.encode_utf16().collect();
                if zero_term {
                    units.push(0);
                }
                let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
                self.write(address, &bytes) == bytes.len()
            }
            Encoding::Utf32 => {
                let mut units: Vec<u32> = s.chars().map(|c| c as u32).collect();
                if zero_term {
                    units.push(0);
                }
                let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
                self.write(address, &bytes) == bytes.len()
            }
        }
    }

    /// Builds a `[address, address + size)` range over this view.
    fn range(&self, address: Address, size: usize) -> MemRange<'_, Self>
    where
        Self: Sized,
    {
        MemRange::new(self, address, size)
    }

    /// Builds a range spanning a known module's mapping.
    fn range_of_module(&self, module: &ProcessModule) -> MemRange<'_, Self>
    where
        Self: Sized,
    {
        MemRange::new(self, Address::from(module.base), module.size as usize)
    }

    /// Builds an untyped pointer at `address` over this view.
    fn ptr(&self, address: Address) -> RawPointer<'_, Self>
    where
        Self: Sized,
    {
        RawPointer::new(self, address)
    }

    /// Builds a `T`-typed pointer at `address` over this view.
    fn typed_ptr<T>(&self, address: Address) -> TypedPointer<'_, Self, T>
    where
        Self: Sized,
    {
        TypedPointer::new(self, address)
    }
}
