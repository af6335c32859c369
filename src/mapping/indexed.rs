use std::mem::MaybeUninit;

use crate::mapping::NodeMapping;
use crate::mapping::direct::DirectMapping;
use crate::mapping::sorted::SortedMapping;
use crate::utils::slot_array::SlotArray;

/// Marks a byte with no child in the index table.
pub const EMPTY: u8 = 0xFF;

/// Maps all 256 key bytes through an index table into a small set of child
/// slots: `child_indices[b]` is either EMPTY or the slot in `children`
/// holding the child for byte `b`. Slots carry no ordering of their own; new
/// children take the first free slot, and ordered walks go through the table.
pub struct IndexedMapping<N, const WIDTH: usize> {
    pub(crate) child_indices: [u8; 256],
    pub(crate) children: SlotArray<N, WIDTH, 1>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for IndexedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> IndexedMapping<N, WIDTH> {
    pub fn new() -> Self {
        Self {
            child_indices: [EMPTY; 256],
            children: SlotArray::new(),
            num_children: 0,
        }
    }

    /// Takes every entry of a saturated sorted mapping, in index (= key)
    /// order.
    pub(crate) fn from_sorted<const KM_WIDTH: usize>(
        src: &mut SortedMapping<N, KM_WIDTH>,
    ) -> Self {
        let mut im = Self::new();
        let len = src.num_children as usize;
        for i in 0..len {
            let stolen = std::mem::replace(&mut src.children[i], MaybeUninit::uninit());
            im.add_child(src.keys[i], unsafe { stolen.assume_init() });
        }
        src.keys[..len].fill(0);
        src.num_children = 0;
        im
    }

    /// Takes every remaining child of a direct mapping that has shrunk to at
    /// most WIDTH children, walking bytes in ascending order.
    pub(crate) fn from_direct(src: &mut DirectMapping<N>) -> Self {
        debug_assert!(src.num_children() <= WIDTH);
        let mut im = Self::new();
        let mut byte = 0;
        while let Some(b) = src.children.next_occupied(byte) {
            let child = src.children.erase(b).unwrap();
            im.add_child(b as u8, child);
            byte = b + 1;
        }
        src.num_children = 0;
        im
    }

    /// Moves every child into another mapping, in ascending key-byte order.
    /// The ascending walk is what lets a sorted target rebuild its key order
    /// with nothing but appends.
    pub(crate) fn move_into<const NEW_WIDTH: usize, M: NodeMapping<N, NEW_WIDTH>>(
        &mut self,
        target: &mut M,
    ) {
        for byte in 0..256 {
            let slot = self.child_indices[byte];
            if slot == EMPTY {
                continue;
            }
            let child = self.children.erase(slot as usize).unwrap();
            self.child_indices[byte] = EMPTY;
            target.add_child(byte as u8, child);
        }
        self.num_children = 0;
    }

    /// Lowest populated key byte at or after `from`, with its child. `from`
    /// past byte 255 is "no more children".
    pub(crate) fn next_occupied(&self, from: usize) -> Option<(u8, &N)> {
        for byte in from..256 {
            let slot = self.child_indices[byte];
            if slot != EMPTY {
                return Some((byte as u8, self.children.get(slot as usize).unwrap()));
            }
        }
        None
    }

    /// Highest populated key byte strictly below `before`, with its child.
    pub(crate) fn prev_occupied(&self, before: usize) -> Option<(u8, &N)> {
        for byte in (0..before.min(256)).rev() {
            let slot = self.child_indices[byte];
            if slot != EMPTY {
                return Some((byte as u8, self.children.get(slot as usize).unwrap()));
            }
        }
        None
    }

    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.children.count(), self.num_children as usize);
        let mut seen = [false; WIDTH];
        let mut referenced = 0;
        for byte in 0..256 {
            let slot = self.child_indices[byte];
            if slot == EMPTY {
                continue;
            }
            let slot = slot as usize;
            assert!(slot < WIDTH, "table entry for byte {byte} out of range");
            assert!(self.children.check(slot), "table points at an empty slot");
            assert!(!seen[slot], "slot {slot} referenced twice");
            seen[slot] = true;
            referenced += 1;
        }
        assert_eq!(referenced, self.num_children as usize);
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for IndexedMapping<N, WIDTH> {
    fn add_child(&mut self, key: u8, node: N) {
        debug_assert!(self.child_indices[key as usize] == EMPTY);
        let slot = self.children.first_free().expect("indexed mapping is full");
        self.child_indices[key as usize] = slot as u8;
        self.children.set(slot, node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let slot = self.child_indices[key as usize];
        if slot == EMPTY {
            return None;
        }
        self.children.get(slot as usize)
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let slot = self.child_indices[key as usize];
        if slot == EMPTY {
            return None;
        }
        self.children.get_mut(slot as usize)
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let slot = self.child_indices[key as usize];
        if slot == EMPTY {
            return None;
        }
        self.child_indices[key as usize] = EMPTY;
        self.num_children -= 1;
        self.children.erase(slot as usize)
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::indexed::IndexedMapping;

    #[test]
    fn test_fill_seek_delete() {
        let mut m = IndexedMapping::<u8, 48>::new();
        for i in 0..48u8 {
            m.add_child(i * 5, i);
            assert_eq!(m.seek_child(i * 5), Some(&i));
        }
        m.check_invariants();
        for i in 0..48u8 {
            assert_eq!(*m.seek_child(i * 5).unwrap(), i);
        }
        for i in 0..48u8 {
            assert_eq!(m.delete_child(i * 5), Some(i));
        }
        m.check_invariants();
        for i in 0..48u8 {
            assert!(m.seek_child(i * 5).is_none());
        }
    }

    #[test]
    fn test_slot_reuse_after_delete() {
        let mut m = IndexedMapping::<u8, 48>::new();
        for i in 0..48u8 {
            m.add_child(i, i);
        }
        assert_eq!(m.delete_child(10), Some(10));
        // The freed slot must be reusable for a different key byte.
        m.add_child(200, 99);
        m.check_invariants();
        assert_eq!(m.seek_child(200), Some(&99));
        assert_eq!(m.seek_child(10), None);
        assert_eq!(m.num_children(), 48);
    }

    #[test]
    fn test_occupied_scans() {
        let mut m = IndexedMapping::<u8, 48>::new();
        for k in [7u8, 200, 63] {
            m.add_child(k, k);
        }
        assert_eq!(m.next_occupied(0).map(|(b, _)| b), Some(7));
        assert_eq!(m.next_occupied(8).map(|(b, _)| b), Some(63));
        assert_eq!(m.next_occupied(201), None);
        assert_eq!(m.next_occupied(400), None);
        assert_eq!(m.prev_occupied(256).map(|(b, _)| b), Some(200));
        assert_eq!(m.prev_occupied(63).map(|(b, _)| b), Some(7));
        assert_eq!(m.prev_occupied(7), None);
    }
}
