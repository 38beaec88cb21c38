/*!
A compiled byte-pattern signature.
*/

use crate::error::PatternError;
use crate::pattern::lexer::{PatternLexer, Token};

use std::fmt;

/// An ordered, fixed-length sequence of optional bytes. `None` elements are
/// wildcards and match any byte at scan time.
///
/// Once constructed a `Pattern` is immutable; equality and hashing are
/// structural over the sequence. The empty pattern is legal and, per its
/// scanner, matches at every in-range offset (including offset 0).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Pattern {
    elements: Vec<Option<u8>>,
}

impl Pattern {
    /// Builds a `Pattern` directly from a trusted sequence of optional
    /// bytes, skipping the lexer entirely.
    pub fn from_elements(elements: Vec<Option<u8>>) -> Self {
        Pattern { elements }
    }

    /// Compiles a signature string such as `"48 8B 05 ?? ?? ?? ?? E8"`.
    pub fn parse(signature: &str) -> Result<Self, PatternError> {
        let mut lexer = PatternLexer::new(signature);
        let mut elements = Vec::new();
        loop {
            match lexer.next()? {
                Token::Byte(b) => elements.push(Some(b)),
                Token::Wildcard => elements.push(None),
                Token::EndOfLine => return Ok(Pattern { elements }),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Option<u8>] {
        &self.elements
    }

    /// Checks whether `haystack[offset..offset + self.len()]` matches this
    /// pattern. `false` (never a panic) if the pattern doesn't fit at that
    /// offset.
    pub fn matches_at(&self, haystack: &[u8], offset: usize) -> bool {
        if offset + self.elements.len() > haystack.len() {
            return false;
        }
        self.elements
            .iter()
            .zip(&haystack[offset..])
            .all(|(expected, actual)| matches!(expected, None) || *expected == Some(*actual))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match element {
                Some(b) => write!(f, "{:02X}", b)?,
                None => write!(f, "??")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_render_round_trip() {
        let p = Pattern::parse("48 8B 05 ?? ?? ?? ?? E8").unwrap();
        assert_eq!(
            p.elements(),
            &[
                Some(0x48),
                Some(0x8B),
                Some(0x05),
                None,
                None,
                None,
                None,
                Some(0xE8)
            ]
        );
        assert_eq!(p.to_string(), "48 8B 05 ?? ?? ?? ?? E8");
    }

    #[test]
    fn whitespace_and_case_normalise_on_render() {
        let p = Pattern::parse("aa   bb\tcc").unwrap();
        assert_eq!(p.to_string(), "AA BB CC");
    }

    #[test]
    fn comments_are_dropped_on_render() {
        let p = Pattern::parse("AA # trailing\n?? BB").unwrap();
        assert_eq!(p.to_string(), "AA ?? BB");
    }

    #[test]
    fn empty_pattern_is_legal() {
        let p = Pattern::parse("").unwrap();
        assert!(p.is_empty());
        assert!(p.matches_at(b"", 0));
        assert!(p.matches_at(b"anything", 0));
    }

    #[test]
    fn matches_at_rejects_out_of_range_offset() {
        let p = Pattern::parse("AA BB").unwrap();
        assert!(!p.matches_at(&[0xAA], 0));
        assert!(!p.matches_at(&[0xAA, 0xBB], 5));
    }
}
