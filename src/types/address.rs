/*!
Abstraction over an address in a target address space.
*/

use dataview::Pod;
use std::fmt;
use std::ops;

/// An unsigned machine-word sized address.
///
/// This type always holds a `u64` internally so that a 32-bit host can still
/// describe addresses in a 64-bit target (and vice versa); the OS backends
/// are responsible for rejecting or truncating values that don't fit their
/// own word size. Arithmetic on `Address` wraps rather than panics - the
/// caller is responsible for keeping addresses within whatever range makes
/// sense for their target.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Address(u64);

impl Address {
    /// The address with a value of zero.
    pub const NULL: Address = Address(0);

    /// A sentinel address that cannot be reached by any valid access.
    pub const INVALID: Address = Address(!0);

    #[inline]
    pub const fn null() -> Self {
        Address::NULL
    }

    #[inline]
    pub const fn invalid() -> Self {
        Address::INVALID
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != !0
    }

    #[inline]
    pub fn non_null(self) -> Option<Address> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Rounds the address down to the start of the page containing it.
    #[inline]
    pub const fn align_start(self, page_size: u64) -> Address {
        Address(self.0 & !(page_size - 1))
    }

    /// Rounds the address up to the start of the next page, if it isn't
    /// already page-aligned.
    #[inline]
    pub const fn align_end(self, page_size: u64) -> Address {
        Address((self.0).wrapping_add(page_size - 1) & !(page_size - 1))
    }

    #[inline]
    pub const fn wrapping_add(self, other: usize) -> Address {
        Address(self.0.wrapping_add(other as u64))
    }

    #[inline]
    pub const fn wrapping_sub(self, other: usize) -> Address {
        Address(self.0.wrapping_sub(other as u64))
    }

    /// Checked add that never wraps past `u64::MAX`; used where a sum must
    /// not wrap past the top of the address space, as in `MemRange`'s size
    /// clamp.
    #[inline]
    pub const fn checked_add(self, other: usize) -> Option<Address> {
        match self.0.checked_add(other as u64) {
            Some(v) => Some(Address(v)),
            None => None,
        }
    }
}

impl From<u32> for Address {
    #[inline]
    fn from(v: u32) -> Self {
        Address(u64::from(v))
    }
}

impl From<u64> for Address {
    #[inline]
    fn from(v: u64) -> Self {
        Address(v)
    }
}

impl From<usize> for Address {
    #[inline]
    fn from(v: usize) -> Self {
        Address(v as u64)
    }
}

impl From<Address> for u64 {
    #[inline]
    fn from(a: Address) -> Self {
        a.0
    }
}

impl From<Address> for usize {
    #[inline]
    fn from(a: Address) -> Self {
        a.0 as usize
    }
}

impl ops::Add<usize> for Address {
    type Output = Address;
    #[inline]
    fn add(self, rhs: usize) -> Address {
        self.wrapping_add(rhs)
    }
}

impl ops::Sub<usize> for Address {
    type Output = Address;
    #[inline]
    fn sub(self, rhs: usize) -> Address {
        self.wrapping_sub(rhs)
    }
}

impl ops::Sub<Address> for Address {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Address) -> u64 {
        self.0.wrapping_sub(rhs.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

unsafe impl Pod for Address {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_arithmetic() {
        let addr = Address::from(0x1000u64);
        assert_eq!(addr.wrapping_add(0x10).as_u64(), 0x1010);
        assert_eq!(Address::NULL.wrapping_sub(1).as_u64(), u64::MAX);
    }

    #[test]
    fn alignment() {
        let addr = Address::from(0x1001u64);
        assert_eq!(addr.align_start(0x1000).as_u64(), 0x1000);
        assert_eq!(addr.align_end(0x1000).as_u64(), 0x2000);
        assert_eq!(Address::from(0x1000u64).align_end(0x1000).as_u64(), 0x1000);
    }

    #[test]
    fn null_and_invalid() {
        assert!(Address::NULL.is_null());
        assert!(!Address::INVALID.is_valid());
        assert_eq!(Address::NULL.non_null(), None);
        assert_eq!(Address::from(1u64).non_null(), Some(Address::from(1u64)));
    }
}
