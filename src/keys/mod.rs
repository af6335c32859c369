use crate::prefix::Prefix;

pub mod array_key;
pub mod heap_key;

/// The bytewise decomposition of a user key.
///
/// Implementations must guarantee that the ordering of user keys matches the
/// lexicographic ordering of the produced bytes: unsigned integers are laid
/// out big-endian, signed integers get their sign bit flipped first, and
/// string conversions append a NUL terminator. The terminator also keeps
/// stored keys prefix-free, which the tree relies on: no stored key may be a
/// strict prefix of another. Custom implementations must preserve both
/// properties.
pub trait BitwiseKey: Clone + PartialEq + Eq + Ord {
    type PrefixType: Prefix + Clone + PartialEq;

    /// An upper bound on key length in bytes, if the representation has one.
    const MAXIMUM_SIZE: Option<usize>;

    fn new_from_slice(slice: &[u8]) -> Self;
    fn new_from_prefix(prefix: &Self::PrefixType) -> Self;

    /// Appends a prefix fragment's bytes.
    fn extend_from_prefix(&self, prefix: &Self::PrefixType) -> Self;
    /// Appends a single byte.
    fn extend_with_byte(&self, byte: u8) -> Self;
    /// Keeps the first `len` bytes.
    fn truncate(&self, len: usize) -> Self;
    /// Returns the byte at `pos`.
    fn at(&self, pos: usize) -> u8;
    /// Remaining length from `depth` onwards.
    fn length_at(&self, depth: usize) -> usize;
    /// The key bytes from `depth` onwards, as a prefix fragment.
    fn to_prefix(&self, depth: usize) -> Self::PrefixType;
    fn matches_slice(&self, slice: &[u8]) -> bool;
}
