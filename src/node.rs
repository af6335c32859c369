use crate::mapping::NodeMapping;
use crate::mapping::direct::DirectMapping;
use crate::mapping::indexed::IndexedMapping;
use crate::mapping::sorted::SortedMapping;
use crate::prefix::Prefix;

/// The five node flavors. Inner nodes are named for their child capacity;
/// which flavor a node occupies is decided purely by how many children it
/// has.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    Leaf,
    Inner4,
    Inner16,
    Inner48,
    Inner256,
}

impl NodeKind {
    pub const fn capacity(self) -> usize {
        match self {
            NodeKind::Leaf => 1,
            NodeKind::Inner4 => 4,
            NodeKind::Inner16 => 16,
            NodeKind::Inner48 => 48,
            NodeKind::Inner256 => 256,
        }
    }

    /// Fewest children an inner node of this flavor may keep. Dropping below
    /// this triggers a shrink to the next flavor down; an Inner4 down to one
    /// child collapses into that child.
    pub const fn min_children(self) -> usize {
        match self {
            NodeKind::Leaf => 1,
            NodeKind::Inner4 => 2,
            NodeKind::Inner16 => 5,
            NodeKind::Inner48 => 17,
            NodeKind::Inner256 => 49,
        }
    }
}

pub(crate) enum Content<P: Prefix, V> {
    Leaf(V),
    Inner4(SortedMapping<Node<P, V>, 4>),
    Inner16(SortedMapping<Node<P, V>, 16>),
    Inner48(Box<IndexedMapping<Node<P, V>, 48>>),
    Inner256(DirectMapping<Node<P, V>>),
}

/// One tree node: a compressed prefix plus either a value (leaf) or one of
/// the four child mappings. The prefix holds the bytes shared by everything
/// below the node, excluding the discriminator byte the parent consumed; a
/// leaf's prefix is its remaining key suffix.
pub struct Node<P: Prefix, V> {
    pub(crate) prefix: P,
    pub(crate) content: Content<P, V>,
}

impl<P: Prefix, V: PartialEq> PartialEq for Node<P, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.prefix != other.prefix || self.num_children() != other.num_children() {
            return false;
        }
        match (self.value(), other.value()) {
            (Some(a), Some(b)) => return a == b,
            (None, Some(_)) | (Some(_), None) => return false,
            (None, None) => {}
        }
        let mut pos = 0;
        while let Some((p, byte, child)) = self.leftmost_child(pos) {
            match other.seek_child(byte) {
                Some(other_child) if other_child == child => {}
                _ => return false,
            }
            pos = p + 1;
        }
        true
    }
}

impl<P: Prefix + std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Node<P, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("Node");
        dbg.field("prefix", &self.prefix);
        if let Some(v) = self.value() {
            dbg.field("value", v);
        } else {
            let mut children = Vec::new();
            self.for_each_child(&mut |byte, child| children.push((byte, format!("{child:?}"))));
            dbg.field("children", &children);
        }
        dbg.finish()
    }
}

impl<P: Prefix, V> Node<P, V> {
    #[inline]
    pub(crate) fn new_leaf(prefix: P, value: V) -> Self {
        Self {
            prefix,
            content: Content::Leaf(value),
        }
    }

    /// New inner node, in the smallest flavor. Grows on demand.
    #[inline]
    pub(crate) fn new_inner(prefix: P) -> Self {
        Self {
            prefix,
            content: Content::Inner4(SortedMapping::new()),
        }
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match &self.content {
            Content::Leaf(_) => NodeKind::Leaf,
            Content::Inner4(_) => NodeKind::Inner4,
            Content::Inner16(_) => NodeKind::Inner16,
            Content::Inner48(_) => NodeKind::Inner48,
            Content::Inner256(_) => NodeKind::Inner256,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(&self.content, Content::Leaf(_))
    }

    #[inline]
    pub(crate) fn is_inner(&self) -> bool {
        !self.is_leaf()
    }

    pub(crate) fn value(&self) -> Option<&V> {
        let Content::Leaf(value) = &self.content else {
            return None;
        };
        Some(value)
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        let Content::Leaf(value) = &mut self.content else {
            return None;
        };
        Some(value)
    }

    pub(crate) fn into_leaf_value(self) -> Option<V> {
        let Content::Leaf(value) = self.content else {
            return None;
        };
        Some(value)
    }

    pub(crate) fn num_children(&self) -> usize {
        match &self.content {
            Content::Leaf(_) => 0,
            Content::Inner4(m) => m.num_children(),
            Content::Inner16(m) => m.num_children(),
            Content::Inner48(m) => m.num_children(),
            Content::Inner256(m) => m.num_children(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.kind().capacity()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.num_children() == self.capacity()
    }

    pub(crate) fn seek_child(&self, key: u8) -> Option<&Self> {
        match &self.content {
            Content::Leaf(_) => None,
            Content::Inner4(m) => m.seek_child(key),
            Content::Inner16(m) => m.seek_child(key),
            Content::Inner48(m) => m.seek_child(key),
            Content::Inner256(m) => m.seek_child(key),
        }
    }

    pub(crate) fn seek_child_mut(&mut self, key: u8) -> Option<&mut Self> {
        match &mut self.content {
            Content::Leaf(_) => None,
            Content::Inner4(m) => m.seek_child_mut(key),
            Content::Inner16(m) => m.seek_child_mut(key),
            Content::Inner48(m) => m.seek_child_mut(key),
            Content::Inner256(m) => m.seek_child_mut(key),
        }
    }

    /// Inserts a child under `key`, which must be absent. Saturated nodes
    /// grow into the next flavor first; the replacement mapping is fully
    /// built before it is swapped in.
    pub(crate) fn add_child(&mut self, key: u8, node: Self) {
        if self.is_full() {
            self.grow();
        }
        match &mut self.content {
            Content::Leaf(_) => unreachable!("cannot add children to a leaf"),
            Content::Inner4(m) => m.add_child(key, node),
            Content::Inner16(m) => m.add_child(key, node),
            Content::Inner48(m) => m.add_child(key, node),
            Content::Inner256(m) => m.add_child(key, node),
        }
    }

    /// Removes the child under `key`, shrinking or collapsing afterwards if
    /// the node dropped below its flavor's minimum.
    pub(crate) fn delete_child(&mut self, key: u8) -> Option<Self> {
        let deleted = match &mut self.content {
            Content::Leaf(_) => None,
            Content::Inner4(m) => m.delete_child(key),
            Content::Inner16(m) => m.delete_child(key),
            Content::Inner48(m) => m.delete_child(key),
            Content::Inner256(m) => m.delete_child(key),
        };
        if deleted.is_some() {
            self.shrink_if_underfull();
        }
        deleted
    }

    fn grow(&mut self) {
        match &mut self.content {
            Content::Inner4(m) => {
                self.content = Content::Inner16(SortedMapping::resized_from(m));
            }
            Content::Inner16(m) => {
                self.content = Content::Inner48(Box::new(IndexedMapping::from_sorted(m)));
            }
            Content::Inner48(m) => {
                self.content = Content::Inner256(DirectMapping::from_indexed(&mut **m));
            }
            Content::Inner256(_) => unreachable!("a 256-way node cannot grow"),
            Content::Leaf(_) => unreachable!("cannot grow a leaf"),
        }
    }

    fn shrink_if_underfull(&mut self) {
        match &mut self.content {
            Content::Inner4(m) if m.num_children() == 1 => {
                // The node no longer discriminates anything; fold it into its
                // last child. The child re-absorbs the discriminator byte and
                // this node's prefix in front of its own.
                let (key, child) = m.take_last_child();
                self.prefix = child.prefix.shift_left_byte(key).shift_left(&self.prefix);
                self.content = child.content;
            }
            Content::Inner16(m) if m.num_children() < NodeKind::Inner16.min_children() => {
                self.content = Content::Inner4(SortedMapping::resized_from(m));
            }
            Content::Inner48(m) if m.num_children() < NodeKind::Inner48.min_children() => {
                let mut sorted = SortedMapping::new();
                m.move_into(&mut sorted);
                self.content = Content::Inner16(sorted);
            }
            Content::Inner256(m) if m.num_children() < NodeKind::Inner256.min_children() => {
                self.content = Content::Inner48(Box::new(IndexedMapping::from_direct(m)));
            }
            _ => {}
        }
    }

    /// First child at or after `start`, as (position, discriminator byte,
    /// child). For the sorted flavors `start` is a slot index; for Inner48
    /// and Inner256 it is a key byte. Any `start` past the last position is
    /// "no more children", uniformly across flavors.
    pub(crate) fn leftmost_child(&self, start: usize) -> Option<(usize, u8, &Self)> {
        match &self.content {
            Content::Leaf(_) => None,
            Content::Inner4(m) => {
                (start < m.num_children()).then(|| (start, m.key_at(start), m.child_at(start)))
            }
            Content::Inner16(m) => {
                (start < m.num_children()).then(|| (start, m.key_at(start), m.child_at(start)))
            }
            Content::Inner48(m) => m.next_occupied(start).map(|(b, n)| (b as usize, b, n)),
            Content::Inner256(m) => m.next_occupied(start).map(|(b, n)| (b as usize, b, n)),
        }
    }

    /// Last child strictly before position `before`; the mirror image of
    /// `leftmost_child`.
    pub(crate) fn rightmost_child(&self, before: usize) -> Option<(usize, u8, &Self)> {
        match &self.content {
            Content::Leaf(_) => None,
            Content::Inner4(m) => {
                let bound = before.min(m.num_children());
                (bound > 0).then(|| (bound - 1, m.key_at(bound - 1), m.child_at(bound - 1)))
            }
            Content::Inner16(m) => {
                let bound = before.min(m.num_children());
                (bound > 0).then(|| (bound - 1, m.key_at(bound - 1), m.child_at(bound - 1)))
            }
            Content::Inner48(m) => m.prev_occupied(before).map(|(b, n)| (b as usize, b, n)),
            Content::Inner256(m) => m.prev_occupied(before).map(|(b, n)| (b as usize, b, n)),
        }
    }

    /// First child whose discriminator byte is >= `key`: the entry point for
    /// ordered seeks.
    pub(crate) fn lower_bound_child(&self, key: u8) -> Option<(usize, u8, &Self)> {
        match &self.content {
            Content::Leaf(_) => None,
            Content::Inner4(m) => self.leftmost_child(m.lower_bound(key)),
            Content::Inner16(m) => self.leftmost_child(m.lower_bound(key)),
            Content::Inner48(_) | Content::Inner256(_) => self.leftmost_child(key as usize),
        }
    }

    /// Visits children in ascending discriminator order.
    pub(crate) fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(u8, &'a Self)) {
        let mut pos = 0;
        while let Some((p, byte, child)) = self.leftmost_child(pos) {
            f(byte, child);
            pos = p + 1;
        }
    }

    pub(crate) fn check_mapping_invariants(&self) {
        match &self.content {
            Content::Leaf(_) => {}
            Content::Inner4(m) => m.check_invariants(),
            Content::Inner16(m) => m.check_invariants(),
            Content::Inner48(m) => m.check_invariants(),
            Content::Inner256(m) => m.check_invariants(),
        }
    }
}
