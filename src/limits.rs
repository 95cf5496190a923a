//! Structural and resource limits.
//!
//! Deeply nested, oversized, or allocation-heavy documents must fail fast
//! rather than exhaust the host. The defaults below are compile-time
//! constants; the runtime [`Limits`] struct carries them through a parse so
//! tests can tighten individual bounds.

/// Maximum nesting depth for objects and arrays.
pub const MAX_DEPTH: usize = 32;

/// Maximum string length in bytes (unescaped source form).
pub const MAX_STRING_LENGTH: usize = 1024 * 1024;

/// Maximum number of elements in an array.
pub const MAX_ARRAY_SIZE: usize = 10_000;

/// Maximum number of members in an object.
pub const MAX_OBJECT_MEMBERS: usize = 1_000;

/// Maximum object key length in bytes.
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum bytes debited against a single parse.
pub const MAX_TOTAL_MEMORY: usize = 64 * 1024 * 1024;

/// Requests above this size bypass the recycling pool and are always
/// freshly allocated.
pub const LARGE_ALLOC_THRESHOLD: usize = 2 * 1024 * 1024;

/// Maximum accepted dot-path length in bytes.
pub const MAX_PATH_LEN: usize = 256;

/// Per-parse limit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting depth for objects and arrays.
    pub max_depth: usize,
    /// Maximum string length in bytes.
    pub max_string_length: usize,
    /// Maximum number of elements in an array.
    pub max_array_size: usize,
    /// Maximum number of members in an object.
    pub max_object_members: usize,
    /// Maximum object key length in bytes.
    pub max_key_length: usize,
    /// Memory budget for a single parse, in bytes.
    pub max_total_memory: usize,
}

impl Limits {
    /// The standard limit set.
    pub const fn standard() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_string_length: MAX_STRING_LENGTH,
            max_array_size: MAX_ARRAY_SIZE,
            max_object_members: MAX_OBJECT_MEMBERS,
            max_key_length: MAX_KEY_LENGTH,
            max_total_memory: MAX_TOTAL_MEMORY,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::standard()
    }
}
