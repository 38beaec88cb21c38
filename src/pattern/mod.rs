/*!
IDA-style byte-pattern signatures: lexing, compilation, and scanning.
*/

pub mod lexer;
pub mod pattern;
pub mod scanner;

pub use lexer::{PatternLexer, Token};
pub use pattern::Pattern;
pub use scanner::{PatternIterator, PointerPatternIterator};
