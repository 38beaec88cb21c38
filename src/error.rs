/*!
Error types for memview.

Memory primitives never throw: `read`/`write` return a byte count,
`allocate` returns `Option<MemRange>`, `free`/`protect` return `bool`,
`protection` returns `Option<Protection>`. Per-byte accessibility is not
exceptional in this domain, so propagating every unreadable page as a
thrown error would force every pointer arithmetic call site to handle
failure that the caller usually just wants to see as a short read.

The two taxonomies that *are* surfaced as errors are the signature parser
(recoverable, call-site errors with precise location) and backend
construction (not recoverable - the library cannot grant itself a missing
privilege).
*/

use std::fmt;

/// Errors produced while lexing or compiling a byte-pattern signature.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PatternError {
    /// A character outside `[0-9A-Fa-f?# \t\n\r]` was encountered.
    ///
    /// `index` is the zero-based count of Unicode scalars from the start of
    /// the input, not bytes.
    UnexpectedCharacter { index: usize, value: char },
    /// The input ended in the middle of a two-character token (a lone hex
    /// digit or a lone `?`).
    EndOfStream,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PatternError::UnexpectedCharacter { index, value } => {
                write!(f, "Unexpected character '{}' at index {}.", value, index)
            }
            PatternError::EndOfStream => {
                write!(f, "Stream of characters ended unexpectedly.")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Errors returned when constructing a backend for a foreign process.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SystemError {
    /// The caller lacks the privilege to open the target (e.g. `task_for_pid`
    /// denied, or `OpenProcess` failed with `ERROR_ACCESS_DENIED`).
    AccessDenied,
    /// Any other OS-level failure constructing the backend.
    OperationFailed,
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SystemError::AccessDenied => write!(f, "access denied"),
            SystemError::OperationFailed => write!(f, "operation failed"),
        }
    }
}

impl std::error::Error for SystemError {}

pub type PatternResult<T> = std::result::Result<T, PatternError>;
pub type SystemResult<T> = std::result::Result<T, SystemError>;
