//! Miri tests for mapping layer memory safety.
//!
//! These focus on the slot-storage operations most likely to hide memory
//! safety issues under Miri's strict checking: MaybeUninit reads, shifts in
//! the sorted layout, and children moving between layouts during grow and
//! shrink transitions.
//!
//! Only compiled with SIMD disabled, as Miri cannot execute vector
//! intrinsics.

#![cfg(not(feature = "simd_keys"))]

use ramify::mapping::{
    NodeMapping, direct::DirectMapping, indexed::IndexedMapping, sorted::SortedMapping,
};

#[test]
fn miri_sorted_mapping_shift_ops() {
    let mut m = SortedMapping::<Box<i32>, 16>::new();

    // Inserting in descending order shifts the whole populated region on
    // every add.
    for i in (0..16u8).rev() {
        m.add_child(i, Box::new(i32::from(i)));
    }
    for i in 0..16u8 {
        assert_eq!(**m.seek_child(i).unwrap(), i32::from(i));
    }

    // Mutate through the mapping.
    for i in 0..16u8 {
        **m.seek_child_mut(i).unwrap() *= 2;
    }

    // Remove from the middle so both sides of the array get exercised.
    for i in [8u8, 0, 15, 4, 11] {
        assert_eq!(m.delete_child(i), Some(Box::new(i32::from(i) * 2)));
        assert_eq!(m.seek_child(i), None);
    }
    assert_eq!(m.num_children(), 11);
}

#[test]
fn miri_sorted_mapping_drop_partial() {
    // Dropping a partially filled mapping must drop exactly the populated
    // slots.
    let mut m = SortedMapping::<Box<i32>, 4>::new();
    m.add_child(3, Box::new(3));
    m.add_child(1, Box::new(1));
    drop(m);
}

#[test]
fn miri_indexed_mapping_basic_ops() {
    let mut im = IndexedMapping::<Box<i32>, 48>::new();

    for i in 0..48u8 {
        im.add_child(i.wrapping_mul(5), Box::new(i32::from(i)));
    }
    for i in 0..48u8 {
        assert_eq!(**im.seek_child(i.wrapping_mul(5)).unwrap(), i32::from(i));
    }

    for i in 0..24u8 {
        assert_eq!(
            im.delete_child(i.wrapping_mul(5)),
            Some(Box::new(i32::from(i)))
        );
    }
    assert_eq!(im.num_children(), 24);
    drop(im);
}

#[test]
fn miri_direct_mapping_full_range() {
    let mut dm = DirectMapping::<Box<i32>>::new();

    for i in 0..=255u8 {
        dm.add_child(i, Box::new(i32::from(i)));
        assert_eq!(**dm.seek_child(i).unwrap(), i32::from(i));
    }

    for i in 0..=255u8 {
        **dm.seek_child_mut(i).unwrap() += 1;
    }

    for i in (0..=255u8).step_by(2) {
        assert_eq!(dm.delete_child(i), Some(Box::new(i32::from(i) + 1)));
        assert_eq!(dm.seek_child(i), None);
    }
    assert_eq!(dm.num_children(), 128);
    drop(dm);
}

#[test]
fn miri_tree_transitions_move_children_cleanly() {
    use ramify::{ArrayKey, BitwiseKey, RadixMap};

    // Push one node through every grow transition and back down, with boxed
    // values so any double-drop or leak is visible to Miri.
    let mut map = RadixMap::<ArrayKey<8>, Box<u32>>::new();
    for b in 0..=255u8 {
        map.insert_k(&ArrayKey::new_from_slice(&[b]), Box::new(u32::from(b)));
    }
    for b in 0..=255u8 {
        assert_eq!(**map.get_k(&ArrayKey::new_from_slice(&[b])).unwrap(), u32::from(b));
    }
    for b in 0..=255u8 {
        assert_eq!(
            map.remove_k(&ArrayKey::new_from_slice(&[b])),
            Some(Box::new(u32::from(b)))
        );
    }
    assert!(map.is_empty());
}
