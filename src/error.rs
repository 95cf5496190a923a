//! Error handling for the jsonk library.
//!
//! Every fallible operation returns [`JsonkResult`]. The [`Error`] enum
//! distinguishes the failure classes the library can hit: lexical and
//! syntactic JSON errors, structural limit breaches, resource exhaustion,
//! type mismatches at the patch surface, output overflow, and lookup
//! misses.
//!
//! Mutation entry points are additionally contracted to report small
//! negative integer codes to embedders; [`Error::code`] provides that
//! errno-style mapping.

use thiserror::Error;

/// Result type used throughout the library.
pub type JsonkResult<T> = std::result::Result<T, Error>;

/// Failure classes surfaced by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Unrecognized or misplaced token at the given byte offset.
    #[error("invalid JSON at byte {0}")]
    InvalidSyntax(usize),

    /// String literal never terminated by an unescaped quote.
    #[error("unterminated string starting near byte {0}")]
    UnterminatedString(usize),

    /// Escape sequence other than the eight single-character escapes or
    /// `\u` followed by four hex digits.
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),

    /// Numeric literal violating the strict number grammar.
    #[error("invalid number at byte {0}")]
    InvalidNumber(usize),

    /// Input ended where a token or value was required.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// Nesting depth limit breached.
    #[error("nesting depth {0} exceeds limit {1}")]
    DepthExceeded(usize, usize),

    /// String length limit breached.
    #[error("string length {0} exceeds limit {1}")]
    StringTooLong(usize, usize),

    /// Object member count limit breached.
    #[error("object member count {0} exceeds limit {1}")]
    TooManyMembers(usize, usize),

    /// Array element count limit breached.
    #[error("array length {0} exceeds limit {1}")]
    ArrayTooLong(usize, usize),

    /// Object key length limit breached.
    #[error("key length {0} exceeds limit {1}")]
    KeyTooLong(usize, usize),

    /// The per-parse memory budget would be exceeded by the request.
    #[error("memory budget exhausted ({used} used + {requested} requested > {cap})")]
    MemoryLimit {
        /// Bytes already debited against the budget.
        used: usize,
        /// Size of the refused request.
        requested: usize,
        /// Budget cap in bytes.
        cap: usize,
    },

    /// The underlying allocator refused the request.
    #[error("allocation of {0} bytes failed")]
    AllocFailed(usize),

    /// A patch target or patch document is not a JSON object.
    #[error("value is not an object")]
    NotAnObject,

    /// Path or key lookup found no entry.
    #[error("no such entry")]
    NoSuchEntry,

    /// Malformed argument (empty path, oversized path, bad literal).
    #[error("invalid argument")]
    InvalidArgument,

    /// The caller-provided output buffer cannot hold the next byte.
    #[error("output buffer too small")]
    BufferOverflow,
}

impl Error {
    /// Errno-style negative integer for embedders that consume codes
    /// rather than rich errors.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidSyntax(_)
            | Error::UnterminatedString(_)
            | Error::InvalidEscape(_)
            | Error::InvalidNumber(_)
            | Error::NotAnObject
            | Error::InvalidArgument => -22,
            Error::UnexpectedEnd => -61,
            Error::DepthExceeded(..)
            | Error::StringTooLong(..)
            | Error::TooManyMembers(..)
            | Error::ArrayTooLong(..)
            | Error::KeyTooLong(..) => -28,
            Error::MemoryLimit { .. } | Error::AllocFailed(_) => -12,
            Error::NoSuchEntry => -2,
            Error::BufferOverflow => -75,
        }
    }

    /// True for errors produced while lexing or parsing document text.
    ///
    /// The patch engine uses this to tell "the patch document is
    /// malformed" (which degrades to a no-op) from resource failures.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidSyntax(_)
                | Error::UnterminatedString(_)
                | Error::InvalidEscape(_)
                | Error::InvalidNumber(_)
                | Error::UnexpectedEnd
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_negative() {
        let errors = [
            Error::InvalidSyntax(0),
            Error::UnexpectedEnd,
            Error::DepthExceeded(33, 32),
            Error::MemoryLimit {
                used: 0,
                requested: 1,
                cap: 0,
            },
            Error::NoSuchEntry,
            Error::BufferOverflow,
        ];
        for e in errors {
            assert!(e.code() < 0, "{e} must map to a negative code");
        }
    }

    #[test]
    fn test_parse_failure_classification() {
        assert!(Error::InvalidSyntax(3).is_parse_failure());
        assert!(Error::UnexpectedEnd.is_parse_failure());
        assert!(!Error::BufferOverflow.is_parse_failure());
        assert!(!Error::NotAnObject.is_parse_failure());
    }

    #[test]
    fn test_display_carries_context() {
        let e = Error::KeyTooLong(300, 256);
        assert_eq!(e.to_string(), "key length 300 exceeds limit 256");
    }
}
