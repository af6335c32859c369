use std::mem::MaybeUninit;

use crate::mapping::NodeMapping;
use crate::utils::byte_keys::{find_key_index, lower_bound_index};

/// Maps key bytes to children through a pair of parallel arrays kept in
/// strictly ascending key order: `keys[i]` discriminates `children[i]`.
/// Lookups use SIMD equality where available, insertions shift the tail right
/// from the lower-bound position, removals shift it back. Ascending key order
/// makes in-order iteration a plain index walk.
///
/// Retired key slots are zeroed; searches mask everything at or past
/// `num_children`, so the stale bytes are never observed.
pub struct SortedMapping<N, const WIDTH: usize> {
    pub(crate) keys: [u8; WIDTH],
    pub(crate) children: Box<[MaybeUninit<N>; WIDTH]>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for SortedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> SortedMapping<N, WIDTH> {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys: [0; WIDTH],
            children: Box::new([const { MaybeUninit::uninit() }; WIDTH]),
            num_children: 0,
        }
    }

    /// Moves every entry out of `src` in index order. Serves both the grow
    /// direction (into a wider mapping) and the shrink direction (into a
    /// narrower one that the survivors are known to fit).
    pub fn resized_from<const OLD_WIDTH: usize>(src: &mut SortedMapping<N, OLD_WIDTH>) -> Self {
        let len = src.num_children as usize;
        assert!(len <= WIDTH);
        let mut new = Self::new();
        for i in 0..len {
            new.keys[i] = src.keys[i];
            new.children[i] = std::mem::replace(&mut src.children[i], MaybeUninit::uninit());
        }
        new.num_children = src.num_children;
        src.num_children = 0;
        new
    }

    /// Removes and returns the only remaining entry. The caller is collapsing
    /// the node into this child.
    pub fn take_last_child(&mut self) -> (u8, N) {
        assert!(self.num_children == 1);
        let key = self.keys[0];
        let child = std::mem::replace(&mut self.children[0], MaybeUninit::uninit());
        self.keys[0] = 0;
        self.num_children = 0;
        (key, unsafe { child.assume_init() })
    }

    /// Lowest position whose key is >= `key`; `num_children` if none.
    #[inline]
    pub(crate) fn lower_bound(&self, key: u8) -> usize {
        lower_bound_index::<WIDTH>(key, &self.keys, self.num_children as usize)
    }

    #[inline]
    pub(crate) fn key_at(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.num_children as usize);
        self.keys[pos]
    }

    #[inline]
    pub(crate) fn child_at(&self, pos: usize) -> &N {
        debug_assert!(pos < self.num_children as usize);
        unsafe { self.children[pos].assume_init_ref() }
    }

    fn remove_at(&mut self, pos: usize) -> N {
        let len = self.num_children as usize;
        debug_assert!(pos < len);
        let child = std::mem::replace(&mut self.children[pos], MaybeUninit::uninit());
        for i in pos..len - 1 {
            self.keys[i] = self.keys[i + 1];
            self.children[i] = std::mem::replace(&mut self.children[i + 1], MaybeUninit::uninit());
        }
        self.keys[len - 1] = 0;
        self.num_children -= 1;
        unsafe { child.assume_init() }
    }

    pub(crate) fn check_invariants(&self) {
        let len = self.num_children as usize;
        assert!(len <= WIDTH);
        for pair in self.keys[..len].windows(2) {
            assert!(pair[0] < pair[1], "key array not strictly ascending");
        }
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for SortedMapping<N, WIDTH> {
    fn add_child(&mut self, key: u8, node: N) {
        let len = self.num_children as usize;
        assert!(len < WIDTH, "sorted mapping is full");
        let pos = self.lower_bound(key);
        debug_assert!(pos == len || self.keys[pos] != key, "duplicate key byte");
        for i in (pos..len).rev() {
            self.keys[i + 1] = self.keys[i];
            self.children[i + 1] = std::mem::replace(&mut self.children[i], MaybeUninit::uninit());
        }
        self.keys[pos] = key;
        self.children[pos].write(node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let pos = find_key_index::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(unsafe { self.children[pos].assume_init_ref() })
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let pos = find_key_index::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(unsafe { self.children[pos].assume_init_mut() })
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let pos = find_key_index::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        Some(self.remove_at(pos))
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }
}

impl<N, const WIDTH: usize> Drop for SortedMapping<N, WIDTH> {
    fn drop(&mut self) {
        for child in &mut self.children[..self.num_children as usize] {
            unsafe { child.assume_init_drop() }
        }
        self.num_children = 0;
    }
}
