use crate::keys::BitwiseKey;

pub mod array_prefix;
pub mod heap_prefix;

/// A compressed key fragment held by a node: the bytes shared by every key
/// below it, excluding the discriminator byte its parent consumed to reach
/// it. Leaves store their remaining key suffix the same way.
pub trait Prefix: AsRef<[u8]> + Clone + PartialEq + Eq {
    /// Builds a prefix from raw bytes.
    fn from_slice(slice: &[u8]) -> Self;
    /// Returns the byte at `pos`.
    fn at(&self, pos: usize) -> u8;
    /// Returns the length of the prefix in bytes.
    fn len(&self) -> usize;
    /// Returns true if the prefix is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Returns the first `len` bytes.
    fn truncated(&self, len: usize) -> Self;
    /// Drops the `n` leading bytes. Used when a node is split and the bytes
    /// up to the split point move into a new parent.
    fn shift_right(&self, n: usize) -> Self;
    /// Prepends another fragment. Used when a collapsing node pushes its own
    /// prefix down into its last remaining child.
    fn shift_left(&self, front: &Self) -> Self;
    /// Prepends a single byte: the discriminator the collapsing node used to
    /// reach the surviving child.
    fn shift_left_byte(&self, byte: u8) -> Self;
    /// Length of the common prefix between `self` and `key` starting at
    /// `depth` within the key.
    fn common_prefix_with_key<'a, K>(&self, key: &'a K, depth: usize) -> usize
    where
        K: BitwiseKey<PrefixType = Self> + 'a;
    /// Length of the common prefix between `self` and `slice`.
    fn common_prefix_with_slice(&self, slice: &[u8]) -> usize;
    /// Slice view of the prefix bytes.
    fn to_slice(&self) -> &[u8];
}
