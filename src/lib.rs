//! jsonk - bounded JSON parsing, serialization, and atomic merge patching.
//!
//! A JSON library for constrained, privileged execution environments:
//! dynamic memory is bounded per operation, every failure is graceful,
//! and patches to shared structured data apply all-or-nothing.
//!
//! # Architecture
//!
//! - [`lexer`] - token scanner over raw input bytes
//! - [`parser`] - recursive descent parser with depth/size/memory limits
//! - [`value`] - the value tree, constructors, mutators, deep copy
//! - [`serializer`] - compact rendering into caller buffers
//! - [`patch`] - atomic merge-patch engine
//! - [`path`] - dot-path lookup and mutation
//! - [`limits`] - structural and resource bounds
//! - [`alloc`] / [`pool`] - budgeted, size-routed buffer acquisition and
//!   node storage recycling
//! - [`error`] - failure classes and errno-style codes
//!
//! # Example
//!
//! ```
//! use jsonk::{parse, serialize, serialized_len};
//!
//! let doc = br#"{"name":"JSONK","version":1,"active":true}"#;
//! let value = parse(doc).unwrap();
//!
//! let mut buf = vec![0u8; serialized_len(&value)];
//! let written = serialize(&value, &mut buf).unwrap();
//! assert_eq!(&buf[..written], doc);
//! ```
//!
//! # Concurrency
//!
//! The library takes no locks. A tree is mutable while uniquely owned;
//! [`SharedValue`] provides atomically reference-counted read-only
//! sharing. Callers serialize access to shared trees.

// Library code must fail through Result, never panic.
// Tests are checked separately with `cargo test`.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod alloc;
pub mod error;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod patch;
pub mod path;
pub mod pool;
pub mod serializer;
pub mod value;

// Re-export commonly used items
pub use error::{Error, JsonkResult};
pub use limits::Limits;
pub use parser::{parse, parse_with_limits, ParseStats};
pub use patch::{apply_patch, is_empty_value, PatchOutcome, PatchReport};
pub use path::{get_by_path, set_by_path};
pub use serializer::{serialize, serialized_len};
pub use value::{
    JsonArray, JsonNumber, JsonObject, JsonString, JsonValue, Member, SharedValue,
};
