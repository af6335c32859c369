//! The ordered map facade over the adaptive radix tree.

use std::cmp::min;
use std::fmt;
use std::ops::RangeBounds;

use crate::iter::{Iter, RevIter, Values};
use crate::keys::BitwiseKey;
use crate::node::{Content, Node};
use crate::prefix::Prefix;
use crate::range::Range;
use crate::stats::TreeStats;

/// An ordered map backed by an adaptive radix tree.
///
/// Keys are stored by their bytewise decomposition (see [`BitwiseKey`]); the
/// tree adapts each node's layout to its fan-out, compresses single-child
/// paths into node prefixes, and yields keys in ascending byte order on
/// iteration.
///
/// # Examples
///
/// ```rust
/// use ramify::{ArrayKey, RadixMap};
///
/// let mut map = RadixMap::<ArrayKey<16>, i32>::new();
/// map.insert("apple", 1);
/// map.insert("apricot", 2);
/// map.insert("banana", 3);
///
/// assert_eq!(map.get("apple"), Some(&1));
/// assert_eq!(map.get("orange"), None);
/// assert_eq!(map.len(), 3);
///
/// let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
/// assert!(keys.windows(2).all(|w| w[0] < w[1]));
/// ```
///
/// Range queries take anything implementing `RangeBounds` over the key type:
///
/// ```rust
/// use ramify::{ArrayKey, RadixMap};
///
/// let mut map = RadixMap::<ArrayKey<16>, u64>::new();
/// for i in 0..100u64 {
///     map.insert(i, i);
/// }
/// let start: ArrayKey<16> = 10u64.into();
/// let end: ArrayKey<16> = 15u64.into();
/// let hits: Vec<u64> = map.range(start..end).map(|(_, v)| *v).collect();
/// assert_eq!(hits, vec![10, 11, 12, 13, 14]);
/// ```
pub struct RadixMap<K, V>
where
    K: BitwiseKey,
{
    root: Option<Node<K::PrefixType, V>>,
    size: usize,
}

impl<K: BitwiseKey, V> Default for RadixMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RadixMap<K, V>
where
    K: BitwiseKey,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            root: None,
            size: 0,
        }
    }

    /// Number of key-value pairs in the map.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// Looks up a value by anything convertible into the key type.
    #[inline]
    pub fn get<Q>(&self, key: Q) -> Option<&V>
    where
        Q: Into<K>,
    {
        self.get_k(&key.into())
    }

    /// Looks up a value by key reference.
    #[inline]
    pub fn get_k(&self, key: &K) -> Option<&V> {
        Self::get_iterate(self.root.as_ref()?, key)
    }

    #[inline]
    pub fn get_mut<Q>(&mut self, key: Q) -> Option<&mut V>
    where
        Q: Into<K>,
    {
        self.get_mut_k(&key.into())
    }

    #[inline]
    pub fn get_mut_k(&mut self, key: &K) -> Option<&mut V> {
        Self::get_iterate_mut(self.root.as_mut()?, key)
    }

    pub fn contains_key<Q>(&self, key: Q) -> bool
    where
        Q: Into<K>,
    {
        self.get_k(&key.into()).is_some()
    }

    /// Inserts a key-value pair, returning the previous value if the key was
    /// already present.
    #[inline]
    pub fn insert<Q>(&mut self, key: Q, value: V) -> Option<V>
    where
        Q: Into<K>,
    {
        self.insert_k(&key.into(), value)
    }

    /// Inserts by key reference, returning the previous value if the key was
    /// already present.
    pub fn insert_k(&mut self, key: &K, value: V) -> Option<V> {
        let Some(root) = self.root.as_mut() else {
            self.root = Some(Node::new_leaf(key.to_prefix(0), value));
            self.size = 1;
            return None;
        };

        let replaced = Self::insert_recurse(root, key, value, 0);
        if replaced.is_none() {
            self.size += 1;
        }
        replaced
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: Q) -> Option<V>
    where
        Q: Into<K>,
    {
        self.remove_k(&key.into())
    }

    /// Removes by key reference, returning the value if the key was present.
    pub fn remove_k(&mut self, key: &K) -> Option<V> {
        let root = self.root.as_mut()?;

        // Nothing to do unless the root's whole prefix lies on the key.
        let lcp = root.prefix.common_prefix_with_key(key, 0);
        if lcp != root.prefix.len() {
            return None;
        }

        if root.is_leaf() {
            if root.prefix.len() != key.length_at(0) {
                return None;
            }
            let taken = self.root.take().unwrap();
            self.size -= 1;
            return taken.into_leaf_value();
        }

        if key.length_at(0) <= root.prefix.len() {
            // The key ends at the root; inner nodes hold no values.
            return None;
        }

        let removed = Self::remove_recurse(root, key, root.prefix.len());
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    /// In-order iterator over key-value pairs, ascending by key.
    pub fn iter(&self) -> Iter<'_, K, K::PrefixType, V> {
        Iter::new(self.root.as_ref())
    }

    /// In-order iterator walking backwards, descending by key.
    pub fn iter_rev(&self) -> RevIter<'_, K, K::PrefixType, V> {
        RevIter::new(self.root.as_ref())
    }

    /// Iterator over values only, ascending by key. Cheaper than [`iter`]
    /// when the keys are not needed, since no key reconstruction happens.
    ///
    /// [`iter`]: RadixMap::iter
    pub fn values(&self) -> Values<'_, K::PrefixType, V> {
        Values::new(self.root.as_ref())
    }

    /// Iterator over the key-value pairs within `range`, ascending by key.
    /// The start bound is found by a single root-to-leaf descent rather than
    /// by scanning from the smallest key.
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        let iter = Iter::new_at(self.root.as_ref(), range.start_bound());
        Range::new(iter, range.end_bound().cloned())
    }

    /// Entry with the smallest key: one descent to the leftmost leaf.
    pub fn first(&self) -> Option<(K, &V)> {
        let mut node = self.root.as_ref()?;
        let mut key = K::new_from_slice(&[]).extend_from_prefix(&node.prefix);
        while !node.is_leaf() {
            let (_, byte, child) = node.leftmost_child(0)?;
            key = key.extend_with_byte(byte).extend_from_prefix(&child.prefix);
            node = child;
        }
        Some((key, node.value()?))
    }

    /// Entry with the largest key: one descent to the rightmost leaf.
    pub fn last(&self) -> Option<(K, &V)> {
        let mut node = self.root.as_ref()?;
        let mut key = K::new_from_slice(&[]).extend_from_prefix(&node.prefix);
        while !node.is_leaf() {
            let (_, byte, child) = node.rightmost_child(256)?;
            key = key.extend_with_byte(byte).extend_from_prefix(&child.prefix);
            node = child;
        }
        Some((key, node.value()?))
    }

    /// Per-flavor node counts and densities, for inspection and tests.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        if let Some(root) = &self.root {
            Self::stats_recurse(root, &mut stats, 1);
        }
        stats.finish();
        stats
    }

    /// Walks the whole tree asserting its structural invariants: per-flavor
    /// child counts within bounds, sorted key arrays, index tables consistent
    /// with their slots, and the leaf count matching `len()`. Panics on any
    /// violation. Debug tooling, not part of the stable API.
    #[doc(hidden)]
    pub fn check_integrity(&self) {
        let Some(root) = &self.root else {
            assert_eq!(self.size, 0, "empty tree with non-zero len");
            return;
        };
        let leaves = Self::check_node(root);
        assert_eq!(leaves, self.size, "leaf count does not match len");
    }
}

// Internals.
impl<K, V> RadixMap<K, V>
where
    K: BitwiseKey,
{
    fn get_iterate<'a>(cur_node: &'a Node<K::PrefixType, V>, key: &K) -> Option<&'a V> {
        let mut cur_node = cur_node;
        let mut depth = 0;
        loop {
            let lcp = cur_node.prefix.common_prefix_with_key(key, depth);
            if lcp != cur_node.prefix.len() {
                return None;
            }

            if cur_node.prefix.len() == key.length_at(depth) {
                return cur_node.value();
            }
            let k = key.at(depth + cur_node.prefix.len());
            depth += cur_node.prefix.len() + 1;
            cur_node = cur_node.seek_child(k)?;
        }
    }

    fn get_iterate_mut<'a>(cur_node: &'a mut Node<K::PrefixType, V>, key: &K) -> Option<&'a mut V> {
        let mut cur_node = cur_node;
        let mut depth = 0;
        loop {
            let lcp = cur_node.prefix.common_prefix_with_key(key, depth);
            if lcp != cur_node.prefix.len() {
                return None;
            }

            if cur_node.prefix.len() == key.length_at(depth) {
                return cur_node.value_mut();
            }
            let k = key.at(depth + cur_node.prefix.len());
            depth += cur_node.prefix.len() + 1;
            cur_node = cur_node.seek_child_mut(k)?;
        }
    }

    fn insert_recurse(
        cur_node: &mut Node<K::PrefixType, V>,
        key: &K,
        value: V,
        depth: usize,
    ) -> Option<V> {
        let lcp = cur_node.prefix.common_prefix_with_key(key, depth);
        let remaining = key.length_at(depth);

        let is_prefix_match = min(cur_node.prefix.len(), remaining) == lcp;

        // The key ends exactly at this node: replace the leaf value in place.
        if is_prefix_match && cur_node.prefix.len() == remaining {
            if let Content::Leaf(v) = &mut cur_node.content {
                return Some(std::mem::replace(v, value));
            }
        }

        // The key diverges inside this node's compressed path. Split: a new
        // inner node takes the shared bytes, and the current node and the new
        // leaf hang under it by their first differing bytes.
        if !is_prefix_match {
            let k1 = cur_node.prefix.at(lcp);
            let k2 = key.at(depth + lcp);

            let shared = cur_node.prefix.truncated(lcp);
            let below_split = cur_node.prefix.shift_right(lcp + 1);

            let mut old_node = std::mem::replace(cur_node, Node::new_inner(shared));
            old_node.prefix = below_split;

            let new_leaf = Node::new_leaf(key.to_prefix(depth + lcp + 1), value);

            cur_node.add_child(k1, old_node);
            cur_node.add_child(k2, new_leaf);
            return None;
        }

        // The whole prefix lies on the key; descend by the next byte, or
        // hang a new leaf off it.
        let k = key.at(depth + cur_node.prefix.len());
        let next_depth = depth + cur_node.prefix.len() + 1;

        let Some(child) = cur_node.seek_child_mut(k) else {
            debug_assert!(cur_node.is_inner());
            let new_leaf = Node::new_leaf(key.to_prefix(next_depth), value);
            cur_node.add_child(k, new_leaf);
            return None;
        };
        Self::insert_recurse(child, key, value, next_depth)
    }

    fn remove_recurse(
        parent_node: &mut Node<K::PrefixType, V>,
        key: &K,
        depth: usize,
    ) -> Option<V> {
        if key.length_at(depth) == 0 {
            return None;
        }
        let k = key.at(depth);
        let child_depth = depth + 1;

        let child_node = parent_node.seek_child_mut(k)?;
        let lcp = child_node.prefix.common_prefix_with_key(key, child_depth);
        if lcp != child_node.prefix.len() {
            return None;
        }

        if child_node.is_leaf() {
            if child_node.prefix.len() != key.length_at(child_depth) {
                return None;
            }
            // Deleting may shrink the parent or collapse it into its last
            // remaining child; delete_child handles both.
            let deleted = parent_node.delete_child(k).unwrap();
            return deleted.into_leaf_value();
        }

        Self::remove_recurse(child_node, key, child_depth + child_node.prefix.len())
    }

    fn stats_recurse(node: &Node<K::PrefixType, V>, stats: &mut TreeStats, height: usize) {
        if height > stats.max_height {
            stats.max_height = height;
        }
        if node.is_leaf() {
            stats.num_leaves += 1;
            return;
        }
        stats.record_inner(node.capacity(), node.num_children());
        node.for_each_child(&mut |_, child| {
            Self::stats_recurse(child, stats, height + 1);
        });
    }

    fn check_node(node: &Node<K::PrefixType, V>) -> usize {
        if node.is_leaf() {
            return 1;
        }
        let kind = node.kind();
        let count = node.num_children();
        assert!(
            count <= kind.capacity(),
            "{kind:?} holds {count} children, over capacity"
        );
        assert!(
            count >= kind.min_children(),
            "{kind:?} holds {count} children, under its minimum"
        );
        node.check_mapping_invariants();

        let mut leaves = 0;
        node.for_each_child(&mut |_, child| {
            leaves += Self::check_node(child);
        });
        leaves
    }
}

impl<K, V> fmt::Debug for RadixMap<K, V>
where
    K: BitwiseKey,
    V: fmt::Debug,
{
    /// Structural dump: one line per node with its flavor, prefix bytes and
    /// child count. The format is informational and not stable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RadixMap len={}", self.size)?;
        if let Some(root) = &self.root {
            Self::dump_node(f, None, root, 1)?;
        }
        Ok(())
    }
}

impl<K, V> RadixMap<K, V>
where
    K: BitwiseKey,
    V: fmt::Debug,
{
    fn dump_node(
        f: &mut fmt::Formatter<'_>,
        via: Option<u8>,
        node: &Node<K::PrefixType, V>,
        indent: usize,
    ) -> fmt::Result {
        write!(f, "{:width$}", "", width = indent * 2)?;
        if let Some(byte) = via {
            write!(f, "{byte:02x} -> ")?;
        }
        match node.value() {
            Some(value) => {
                writeln!(
                    f,
                    "Leaf prefix={:02x?} value={value:?}",
                    node.prefix.as_ref()
                )
            }
            None => {
                writeln!(
                    f,
                    "{:?} prefix={:02x?} children={}",
                    node.kind(),
                    node.prefix.as_ref(),
                    node.num_children()
                )?;
                let mut children = Vec::new();
                node.for_each_child(&mut |byte, child| children.push((byte, child)));
                for (byte, child) in children {
                    Self::dump_node(f, Some(byte), child, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}
