use crate::mapping::NodeMapping;
use crate::mapping::indexed::IndexedMapping;
use crate::utils::slot_array::SlotArray;

/// Maps key bytes straight into a 256-slot child array: the byte is the slot.
pub struct DirectMapping<N> {
    pub(crate) children: SlotArray<N, 256, 4>,
    pub(crate) num_children: u16,
}

impl<N> Default for DirectMapping<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectMapping<N> {
    pub fn new() -> Self {
        Self {
            children: SlotArray::new(),
            num_children: 0,
        }
    }

    /// Takes every entry of a saturated indexed mapping.
    pub(crate) fn from_indexed<const WIDTH: usize>(src: &mut IndexedMapping<N, WIDTH>) -> Self {
        let mut dm = Self::new();
        src.move_into(&mut dm);
        dm
    }

    /// Lowest populated key byte at or after `from`, with its child.
    pub(crate) fn next_occupied(&self, from: usize) -> Option<(u8, &N)> {
        let byte = self.children.next_occupied(from)?;
        Some((byte as u8, self.children.get(byte).unwrap()))
    }

    /// Highest populated key byte strictly below `before`, with its child.
    pub(crate) fn prev_occupied(&self, before: usize) -> Option<(u8, &N)> {
        let byte = self.children.prev_occupied(before)?;
        Some((byte as u8, self.children.get(byte).unwrap()))
    }

    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.children.count(), self.num_children as usize);
    }
}

impl<N> NodeMapping<N, 256> for DirectMapping<N> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        self.children.set(key as usize, node);
        self.num_children += 1;
    }

    #[inline]
    fn seek_child(&self, key: u8) -> Option<&N> {
        self.children.get(key as usize)
    }

    #[inline]
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        self.children.get_mut(key as usize)
    }

    #[inline]
    fn delete_child(&mut self, key: u8) -> Option<N> {
        let child = self.children.erase(key as usize);
        if child.is_some() {
            self.num_children -= 1;
        }
        child
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::direct::DirectMapping;

    #[test]
    fn test_full_range() {
        let mut dm = DirectMapping::<u16>::new();
        for i in 0..=255u8 {
            dm.add_child(i, u16::from(i));
        }
        assert_eq!(dm.num_children(), 256);
        dm.check_invariants();
        for i in 0..=255u8 {
            assert_eq!(dm.seek_child(i), Some(&u16::from(i)));
            assert_eq!(dm.delete_child(i), Some(u16::from(i)));
            assert_eq!(dm.seek_child(i), None);
        }
        assert_eq!(dm.num_children(), 0);
    }

    #[test]
    fn test_scans_preserve_key_order() {
        let mut dm = DirectMapping::<u8>::new();
        for key in [200u8, 3, 250, 17, 128] {
            dm.add_child(key, key);
        }

        let mut keys = Vec::new();
        let mut from = 0;
        while let Some((b, _)) = dm.next_occupied(from) {
            keys.push(b);
            from = usize::from(b) + 1;
        }
        assert_eq!(keys, vec![3, 17, 128, 200, 250]);
        assert_eq!(dm.prev_occupied(256).map(|(b, _)| b), Some(250));
        assert_eq!(dm.prev_occupied(128).map(|(b, _)| b), Some(17));
    }
}
