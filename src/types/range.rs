/*!
A half-open window into a [`MemView`](crate::mem::MemView), with pattern
search.
*/

use crate::error::PatternError;
use crate::mem::MemView;
use crate::pattern::{Pattern, PatternIterator};
use crate::types::{Address, RawPointer};

/// The triple `(view, base, size)` describing `[base, base + size)`.
///
/// The constructor clamps `size` so that `base + size` never wraps past
/// `u64::MAX` - the invariant is enforced here rather than asserted, since a
/// caller-supplied size hint overrunning the address space is a mundane,
/// not exceptional, situation.
///
/// `contains` uses an **inclusive** upper bound (`base <= addr <= base +
/// size`), not the half-open convention the range itself is named for; this
/// is pinned by a dedicated test rather than silently "fixed" to be
/// consistent.
pub struct MemRange<'v, V: MemView> {
    pub view: &'v V,
    pub base: Address,
    pub size: usize,
}

impl<'v, V: MemView> MemRange<'v, V> {
    pub fn new(view: &'v V, base: Address, size: usize) -> Self {
        let max_size = u64::MAX - base.as_u64();
        let clamped = (size as u64).min(max_size) as usize;
        MemRange {
            view,
            base,
            size: clamped,
        }
    }

    pub fn base_ptr(&self) -> RawPointer<'v, V> {
        RawPointer::new(self.view, self.base)
    }

    pub fn end(&self) -> Address {
        self.base + self.size
    }

    /// `true` iff `base <= ptr.address <= base + size` (inclusive upper
    /// bound - see the type-level documentation).
    pub fn contains(&self, ptr: RawPointer<'v, V>) -> bool {
        ptr.address >= self.base && ptr.address <= self.end()
    }

    /// Materialises the entire range into a contiguous byte buffer.
    /// Pattern scanning requires a materialised buffer, so every `scan`/
    /// `find` call goes through this first.
    pub fn read(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size];
        let n = self.view.read(self.base, &mut buf);
        buf.truncate(n);
        buf
    }

    /// Scans the whole range for every (possibly overlapping) match of
    /// `pattern`, returning absolute pointers re-anchored through `base`.
    pub fn scan(&self, pattern: &Pattern) -> Vec<RawPointer<'v, V>> {
        let buf = self.read();
        PatternIterator::new(&buf, pattern)
            .map(|offset| RawPointer::new(self.view, self.base + offset))
            .collect()
    }

    /// Convenience over `scan` that compiles `signature` first.
    pub fn scan_str(&self, signature: &str) -> Result<Vec<RawPointer<'v, V>>, PatternError> {
        let pattern = Pattern::parse(signature)?;
        Ok(self.scan(&pattern))
    }

    /// The first match of `pattern`, if any.
    pub fn find(&self, pattern: &Pattern) -> Option<RawPointer<'v, V>> {
        let buf = self.read();
        PatternIterator::new(&buf, pattern)
            .next()
            .map(|offset| RawPointer::new(self.view, self.base + offset))
    }

    /// Convenience over `find` that compiles `signature` first.
    pub fn find_str(&self, signature: &str) -> Result<Option<RawPointer<'v, V>>, PatternError> {
        let pattern = Pattern::parse(signature)?;
        Ok(self.find(&pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::local::MemViewLocal;

    #[test]
    fn contains_uses_inclusive_upper_bound() {
        let view = MemViewLocal::new();
        let base = Address::from(0x1000u64);
        let range = MemRange::new(&view, base, 0x10);
        let at_end = RawPointer::new(&view, base + 0x10);
        let past_end = RawPointer::new(&view, base + 0x11);
        assert!(range.contains(at_end));
        assert!(!range.contains(past_end));
    }

    #[test]
    fn size_is_clamped_to_avoid_address_wrap() {
        let view = MemViewLocal::new();
        let base = Address::from(u64::MAX - 4);
        let range = MemRange::new(&view, base, 1000);
        assert_eq!(range.size as u64, 4);
    }
}
