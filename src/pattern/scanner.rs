/*!
Byte-offset scanning over a contiguous buffer, and a pointer-producing
adapter anchored to a base address.
*/

use crate::mem::MemView;
use crate::pattern::Pattern;
use crate::types::RawPointer;

/// A single-pass, naive O(n*m) scanner over an in-memory buffer.
///
/// Matches overlap: the cursor advances by one byte per call regardless of
/// whether the previous candidate matched, so `"AA AA"` over `[AA, AA, AA]`
/// yields offsets `{0, 1}`. If the pattern is longer than the buffer, the
/// iterator yields nothing and never panics.
pub struct PatternIterator<'b> {
    haystack: &'b [u8],
    pattern: &'b Pattern,
    cursor: usize,
}

impl<'b> PatternIterator<'b> {
    pub fn new(haystack: &'b [u8], pattern: &'b Pattern) -> Self {
        PatternIterator {
            haystack,
            pattern,
            cursor: 0,
        }
    }
}

impl<'b> Iterator for PatternIterator<'b> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let n = self.haystack.len();
        let m = self.pattern.len();
        if m > n {
            return None;
        }
        // Inclusive bound: the last valid starting offset is `n - m`.
        while self.cursor <= n - m {
            let i = self.cursor;
            self.cursor += 1;
            if self.pattern.matches_at(self.haystack, i) {
                return Some(i);
            }
        }
        None
    }
}

/// Adapts a [`PatternIterator`] into absolute pointers by mapping each
/// yielded offset through a base pointer. Lazy - each `next()` call pulls
/// exactly one step from the underlying scanner.
pub struct PointerPatternIterator<'b, 'v, V: MemView> {
    inner: PatternIterator<'b>,
    base: RawPointer<'v, V>,
}

impl<'b, 'v, V: MemView> PointerPatternIterator<'b, 'v, V> {
    pub fn new(inner: PatternIterator<'b>, base: RawPointer<'v, V>) -> Self {
        PointerPatternIterator { inner, base }
    }
}

impl<'b, 'v, V: MemView> Iterator for PointerPatternIterator<'b, 'v, V> {
    type Item = RawPointer<'v, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.inner.next()?;
        Some(RawPointer::new(self.base.view, self.base.address + offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_matches() {
        let pattern = Pattern::from_elements(vec![Some(0xAA), Some(0xAA)]);
        let haystack = [0xAAu8, 0xAA, 0xAA];
        let offsets: Vec<usize> = PatternIterator::new(&haystack, &pattern).collect();
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn overlapping_wildcard_matches() {
        let pattern = Pattern::from_elements(vec![None, None]);
        let haystack = [0x00u8, 0x11, 0x22];
        let offsets: Vec<usize> = PatternIterator::new(&haystack, &pattern).collect();
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn wildcard_at_any_position() {
        let pattern = Pattern::from_elements(vec![Some(0xAA), None, Some(0xCC)]);
        for middle in 0..=0xFFu8 {
            let haystack = [0xAAu8, middle, 0xCC];
            let offsets: Vec<usize> = PatternIterator::new(&haystack, &pattern).collect();
            assert_eq!(offsets, vec![0]);
        }
    }

    #[test]
    fn pattern_longer_than_buffer_yields_nothing() {
        let pattern = Pattern::from_elements(vec![Some(1), Some(2), Some(3)]);
        let haystack = [1u8, 2];
        assert_eq!(
            PatternIterator::new(&haystack, &pattern).collect::<Vec<_>>(),
            Vec::<usize>::new()
        );
    }

    #[test]
    fn single_pass_not_restartable() {
        let pattern = Pattern::from_elements(vec![Some(0xAA)]);
        let haystack = [0xAAu8, 0xAA];
        let mut it = PatternIterator::new(&haystack, &pattern);
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next(), None);
        // Exhausted, not restarted - a fresh iterator is required to scan again.
        assert_eq!(it.next(), None);
    }
}
