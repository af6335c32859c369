//! # ramify
//!
//! An adaptive radix tree ordered map for Rust.
//!
//! Keys are stored by their bytewise decomposition, and every internal node
//! picks one of four layouts (4, 16, 48 or 256 children) to match its actual
//! fan-out, growing and shrinking between them as entries come and go.
//! Single-child paths are compressed into node prefixes, so lookups,
//! insertions and removals run in O(key length) regardless of how many
//! entries the map holds, and iteration yields keys in ascending byte order.
//!
//! ## Quick start
//!
//! ```rust
//! use ramify::{ArrayKey, RadixMap};
//!
//! let mut map = RadixMap::<ArrayKey<16>, String>::new();
//!
//! map.insert("hello", "world".to_string());
//! map.insert("foo", "bar".to_string());
//!
//! assert_eq!(map.get("hello"), Some(&"world".to_string()));
//! assert_eq!(map.get("missing"), None);
//!
//! for (key, value) in map.iter() {
//!     println!("{:?} -> {}", key.as_ref(), value);
//! }
//! ```
//!
//! ## Key types
//!
//! Two [`BitwiseKey`] implementations ship with the crate:
//!
//! - [`ArrayKey<N>`]: fixed-capacity keys up to N bytes, stack-allocated
//! - [`HeapKey`]: variable-size keys, heap-allocated
//!
//! Both convert from common Rust types while preserving value order in the
//! produced bytes — big-endian for unsigned integers, a sign-bit flip on top
//! of that for signed ones, and a NUL terminator for strings:
//!
//! ```rust
//! use ramify::{ArrayKey, HeapKey};
//!
//! let key1: ArrayKey<16> = "hello".into();
//! let key2: ArrayKey<8> = 42u64.into();
//! let key3: HeapKey = (-7i32).into();
//! ```
//!
//! ## SIMD
//!
//! With the default `simd_keys` feature, child lookups in the narrow node
//! layouts use SSE2 or NEON where the target provides them. The scalar
//! fallbacks behave identically; disable the feature for Miri.

// Private implementation modules.
mod node;

// Internal modules, public for benchmarks and the Miri test suite; not part
// of the stable API.
#[doc(hidden)]
pub mod mapping;
#[doc(hidden)]
pub mod utils;

// Public API modules.
pub mod iter;
pub mod keys;
pub mod prefix;
pub mod range;
pub mod stats;
pub mod tree;

pub use keys::{BitwiseKey, array_key::ArrayKey, heap_key::HeapKey};
pub use prefix::Prefix;
pub use tree::RadixMap;
