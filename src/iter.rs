//! Ordered traversal over the tree.
//!
//! A traversal position is a stack of (node, position) frames: the path from
//! the root to the current subtree, with each frame recording the slot or
//! key byte through which it reaches the next one. Advancing at a leaf asks
//! the nearest frame for its next child and descends to that subtree's
//! leftmost leaf; an exhausted frame pops, resuming in its parent. Keys are
//! reconstructed on the way by extending a working key with each node's
//! discriminator byte and prefix, and truncating it back on ascent.

use std::collections::Bound;

use smallvec::SmallVec;

use crate::keys::BitwiseKey;
use crate::node::Node;
use crate::prefix::Prefix;

struct Frame<'a, P: Prefix, V> {
    node: &'a Node<P, V>,
    /// Next position to visit: a slot index in the sorted flavors, a key
    /// byte in the byte-indexed ones.
    pos: usize,
    /// Length of the key path through this node's prefix. The working key is
    /// cut back to this length before the frame hands out another child.
    depth: usize,
}

/// Forward in-order iterator, yielding (key, value) in ascending bytewise
/// key order.
pub struct Iter<'a, K: BitwiseKey<PrefixType = P>, P: Prefix + 'a, V> {
    stack: SmallVec<[Frame<'a, P, V>; 8]>,
    cur_key: K,
    pending: Option<(K, &'a V)>,
}

impl<'a, K: BitwiseKey<PrefixType = P>, P: Prefix + 'a, V> Iter<'a, K, P, V> {
    pub(crate) fn new(root: Option<&'a Node<P, V>>) -> Self {
        let mut iter = Self::empty();
        if let Some(root) = root {
            iter.cur_key = iter.cur_key.extend_from_prefix(&root.prefix);
            iter.enter_subtree(root, root.prefix.len());
        }
        iter
    }

    /// Positions the iterator on the first leaf admitted by `start`, by
    /// walking down the tree once. At each node the bound key selects the
    /// first child at or after its next byte: an exactly-matching child is
    /// descended into, a greater one means its whole subtree qualifies, and
    /// none means this subtree is exhausted and the already-recorded parent
    /// frames take over.
    pub(crate) fn new_at(root: Option<&'a Node<P, V>>, start: Bound<&K>) -> Self {
        let (bound_key, exclusive) = match start {
            Bound::Unbounded => return Self::new(root),
            Bound::Included(k) => (k, false),
            Bound::Excluded(k) => (k, true),
        };
        let mut iter = Self::empty();
        let Some(mut node) = root else {
            return iter;
        };

        let mut depth = 0;
        loop {
            let lcp = node.prefix.common_prefix_with_key(bound_key, depth);
            let remaining = bound_key.length_at(depth);
            iter.cur_key = iter.cur_key.extend_from_prefix(&node.prefix);
            let node_depth = depth + node.prefix.len();

            if lcp < node.prefix.len() {
                // The bound diverges inside this node's compressed path; the
                // subtree lies entirely on one side of it.
                let subtree_greater =
                    lcp >= remaining || node.prefix.at(lcp) > bound_key.at(depth + lcp);
                if subtree_greater {
                    iter.enter_subtree(node, node_depth);
                }
                return iter;
            }

            if remaining == node.prefix.len() {
                // The bound ends exactly at this node.
                if node.is_leaf() {
                    if !exclusive {
                        iter.pending = node.value().map(|v| (iter.cur_key.clone(), v));
                    }
                } else {
                    // Every stored key below extends the bound, so all of
                    // them compare greater.
                    iter.enter_subtree(node, node_depth);
                }
                return iter;
            }

            if node.is_leaf() {
                // The stored key is a proper prefix of the bound: less than
                // it, skip.
                return iter;
            }

            let next_byte = bound_key.at(node_depth);
            let Some((pos, byte, child)) = node.lower_bound_child(next_byte) else {
                // Every child sorts below the bound.
                return iter;
            };
            iter.stack.push(Frame {
                node,
                pos: pos + 1,
                depth: node_depth,
            });
            iter.cur_key = iter.cur_key.extend_with_byte(byte);
            if byte > next_byte {
                iter.cur_key = iter.cur_key.extend_from_prefix(&child.prefix);
                iter.enter_subtree(child, node_depth + 1 + child.prefix.len());
                return iter;
            }
            node = child;
            depth = node_depth + 1;
        }
    }

    fn empty() -> Self {
        Self {
            stack: SmallVec::new(),
            cur_key: K::new_from_slice(&[]),
            pending: None,
        }
    }

    /// Admits all of `node`: a leaf is queued for the next `next()` call, an
    /// inner node becomes a frame starting at its first child. The working
    /// key must already run through `node`'s prefix.
    fn enter_subtree(&mut self, node: &'a Node<P, V>, depth: usize) {
        match node.value() {
            Some(v) => self.pending = Some((self.cur_key.clone(), v)),
            None => self.stack.push(Frame {
                node,
                pos: 0,
                depth,
            }),
        }
    }
}

impl<'a, K: BitwiseKey<PrefixType = P>, P: Prefix + 'a, V> Iterator for Iter<'a, K, P, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.pending.take() {
            return Some(first);
        }
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            let Some((pos, byte, child)) = node.leftmost_child(frame.pos) else {
                self.stack.pop();
                continue;
            };
            frame.pos = pos + 1;
            let depth = frame.depth;

            if let Some(value) = child.value() {
                let key = self
                    .cur_key
                    .truncate(depth)
                    .extend_with_byte(byte)
                    .extend_from_prefix(&child.prefix);
                return Some((key, value));
            }

            self.cur_key = self
                .cur_key
                .truncate(depth)
                .extend_with_byte(byte)
                .extend_from_prefix(&child.prefix);
            self.stack.push(Frame {
                node: child,
                pos: 0,
                depth: depth + 1 + child.prefix.len(),
            });
        }
    }
}

/// Reverse in-order iterator: the mirror image of [`Iter`], yielding keys in
/// descending order.
pub struct RevIter<'a, K: BitwiseKey<PrefixType = P>, P: Prefix + 'a, V> {
    stack: SmallVec<[Frame<'a, P, V>; 8]>,
    cur_key: K,
    pending: Option<(K, &'a V)>,
}

impl<'a, K: BitwiseKey<PrefixType = P>, P: Prefix + 'a, V> RevIter<'a, K, P, V> {
    pub(crate) fn new(root: Option<&'a Node<P, V>>) -> Self {
        let mut iter = Self {
            stack: SmallVec::new(),
            cur_key: K::new_from_slice(&[]),
            pending: None,
        };
        if let Some(root) = root {
            iter.cur_key = iter.cur_key.extend_from_prefix(&root.prefix);
            match root.value() {
                Some(v) => iter.pending = Some((iter.cur_key.clone(), v)),
                None => iter.stack.push(Frame {
                    node: root,
                    // Past every position, for all flavors; rightmost_child
                    // clamps.
                    pos: 256,
                    depth: root.prefix.len(),
                }),
            }
        }
        iter
    }
}

impl<'a, K: BitwiseKey<PrefixType = P>, P: Prefix + 'a, V> Iterator for RevIter<'a, K, P, V> {
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.pending.take() {
            return Some(first);
        }
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            let Some((pos, byte, child)) = node.rightmost_child(frame.pos) else {
                self.stack.pop();
                continue;
            };
            frame.pos = pos;
            let depth = frame.depth;

            if let Some(value) = child.value() {
                let key = self
                    .cur_key
                    .truncate(depth)
                    .extend_with_byte(byte)
                    .extend_from_prefix(&child.prefix);
                return Some((key, value));
            }

            self.cur_key = self
                .cur_key
                .truncate(depth)
                .extend_with_byte(byte)
                .extend_from_prefix(&child.prefix);
            self.stack.push(Frame {
                node: child,
                pos: 256,
                depth: depth + 1 + child.prefix.len(),
            });
        }
    }
}

/// Value-only in-order iterator. Skips key reconstruction entirely, for
/// scans that do not look at the keys.
pub struct Values<'a, P: Prefix, V> {
    stack: SmallVec<[(&'a Node<P, V>, usize); 8]>,
    pending: Option<&'a V>,
}

impl<'a, P: Prefix, V> Values<'a, P, V> {
    pub(crate) fn new(root: Option<&'a Node<P, V>>) -> Self {
        let mut values = Self {
            stack: SmallVec::new(),
            pending: None,
        };
        if let Some(root) = root {
            match root.value() {
                Some(v) => values.pending = Some(v),
                None => values.stack.push((root, 0)),
            }
        }
        values
    }
}

impl<'a, P: Prefix, V> Iterator for Values<'a, P, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.pending.take() {
            return Some(first);
        }
        loop {
            let top = self.stack.last_mut()?;
            let node = top.0;
            let Some((pos, _, child)) = node.leftmost_child(top.1) else {
                self.stack.pop();
                continue;
            };
            top.1 = pos + 1;
            match child.value() {
                Some(value) => return Some(value),
                None => self.stack.push((child, 0)),
            }
        }
    }
}
