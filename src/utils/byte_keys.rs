//! Search over the sorted key arrays of the narrow node flavors.
//!
//! The 16-wide arrays get SIMD equality and lower-bound scans on x86_64
//! (SSE2) and aarch64 (NEON); the 4-wide arrays get a single-word
//! zero-byte scan. Every accelerated path has a scalar fallback with
//! bit-identical results, selected when the `simd_keys` feature is off or
//! the target has no suitable instructions.

#[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn sse2_find_eq_16(key: u8, keys: &[u8; 16], len: usize) -> Option<usize> {
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    };

    let bit_field = unsafe {
        let needle = _mm_set1_epi8(key as i8);
        let haystack = _mm_loadu_si128(keys.as_ptr() as *const __m128i);
        let matches = _mm_cmpeq_epi8(needle, haystack);
        // AVX512 has _mm_cmpeq_epi8_mask which would go straight to a mask,
        // but that is neither stable nor universally available.
        let mask = (1u32 << len) - 1;
        (_mm_movemask_epi8(matches) as u32) & mask
    };
    if bit_field != 0 {
        return Some(bit_field.trailing_zeros() as usize);
    }
    None
}

#[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
#[inline]
fn sse2_lower_bound_16(key: u8, keys: &[u8; 16], len: usize) -> usize {
    use std::arch::x86_64::{
        __m128i, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_max_epu8, _mm_movemask_epi8, _mm_set1_epi8,
    };

    let bit_field = unsafe {
        let needle = _mm_set1_epi8(key as i8);
        let haystack = _mm_loadu_si128(keys.as_ptr() as *const __m128i);
        // SSE2 has no unsigned byte compare; key <= keys[i] is recovered as
        // max(keys[i], key) == keys[i]. A signed compare would mis-order
        // bytes >= 0x80.
        let le = _mm_cmpeq_epi8(_mm_max_epu8(haystack, needle), haystack);
        let mask = (1u32 << len) - 1;
        (_mm_movemask_epi8(le) as u32) & mask
    };
    if bit_field != 0 {
        bit_field.trailing_zeros() as usize
    } else {
        len
    }
}

#[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
#[inline]
fn neon_find_eq_16(key: u8, keys: &[u8; 16], len: usize) -> Option<usize> {
    use std::arch::aarch64::*;
    unsafe {
        let needle = vdupq_n_u8(key);
        let haystack = vld1q_u8(keys.as_ptr());
        let matches = vceqq_u8(needle, haystack);

        // NEON has no movemask; narrow each 8-bit lane to 4 bits and read the
        // result out as one 64-bit field, 4 bits per lane.
        let narrowed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(matches));
        let bit_field = vget_lane_u64::<0>(vreinterpret_u64_u8(narrowed));

        if bit_field != 0 {
            let idx = (bit_field.trailing_zeros() >> 2) as usize;
            if idx < len {
                return Some(idx);
            }
        }
        None
    }
}

#[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
#[inline]
fn neon_lower_bound_16(key: u8, keys: &[u8; 16], len: usize) -> usize {
    use std::arch::aarch64::*;
    unsafe {
        let needle = vdupq_n_u8(key);
        let haystack = vld1q_u8(keys.as_ptr());
        let le = vcleq_u8(needle, haystack);

        let narrowed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(le));
        let bit_field = vget_lane_u64::<0>(vreinterpret_u64_u8(narrowed));

        if bit_field != 0 {
            let idx = (bit_field.trailing_zeros() >> 2) as usize;
            if idx < len {
                return idx;
            }
        }
        len
    }
}

/// Zero-byte scan over the 4 key bytes viewed as one u32. The first flagged
/// byte is always a true match, so trailing_zeros / 8 is the lowest matching
/// index.
#[cfg(feature = "simd_keys")]
#[inline]
fn word_find_eq_4(key: u8, keys: &[u8; 4], len: usize) -> Option<usize> {
    let word = u32::from_le_bytes(*keys);
    let xored = word ^ (u32::from(key) * 0x0101_0101);
    let found = xored.wrapping_sub(0x0101_0101) & !xored & 0x8080_8080;
    if found == 0 {
        return None;
    }
    let idx = (found.trailing_zeros() >> 3) as usize;
    if idx < len { Some(idx) } else { None }
}

/// Position of `key` within the first `len` entries of a sorted key array,
/// or None. Entries past `len` are stale and never examined.
#[allow(unreachable_code)]
pub fn find_key_index<const WIDTH: usize>(key: u8, keys: &[u8], len: usize) -> Option<usize> {
    debug_assert!(keys.len() == WIDTH && len <= WIDTH);
    if len == 0 {
        return None;
    }

    if WIDTH == 4 {
        #[cfg(feature = "simd_keys")]
        {
            return word_find_eq_4(key, keys.try_into().unwrap(), len);
        }
        return keys[..len].iter().position(|&k| k == key);
    }

    if WIDTH == 16 {
        #[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
        {
            return sse2_find_eq_16(key, keys.try_into().unwrap(), len);
        }

        #[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
        {
            return neon_find_eq_16(key, keys.try_into().unwrap(), len);
        }
    }

    keys[..len].binary_search(&key).ok()
}

/// Index of the first entry >= `key` within the first `len` entries of a
/// sorted key array; `len` if every entry is smaller. This is the insertion
/// point that keeps the array sorted.
#[allow(unreachable_code)]
pub fn lower_bound_index<const WIDTH: usize>(key: u8, keys: &[u8], len: usize) -> usize {
    debug_assert!(keys.len() == WIDTH && len <= WIDTH);

    if WIDTH == 16 {
        #[cfg(all(feature = "simd_keys", target_arch = "x86_64", target_feature = "sse2"))]
        {
            return sse2_lower_bound_16(key, keys.try_into().unwrap(), len);
        }

        #[cfg(all(feature = "simd_keys", target_arch = "aarch64", target_feature = "neon"))]
        {
            return neon_lower_bound_16(key, keys.try_into().unwrap(), len);
        }
    }

    keys[..len].partition_point(|&k| k < key)
}

#[cfg(test)]
mod tests {
    use super::{find_key_index, lower_bound_index};

    #[test]
    fn test_find_4() {
        let keys = [10u8, 20, 30, 0];
        assert_eq!(find_key_index::<4>(10, &keys, 3), Some(0));
        assert_eq!(find_key_index::<4>(30, &keys, 3), Some(2));
        assert_eq!(find_key_index::<4>(40, &keys, 3), None);
        // Stale zero slots past len never match a zero search key.
        assert_eq!(find_key_index::<4>(0, &keys, 3), None);
        assert_eq!(find_key_index::<4>(10, &keys, 0), None);
    }

    #[test]
    fn test_find_16_high_bytes() {
        let mut keys = [0u8; 16];
        let populated = [1u8, 5, 0x7f, 0x80, 0xfe, 0xff];
        keys[..populated.len()].copy_from_slice(&populated);
        for (i, k) in populated.iter().enumerate() {
            assert_eq!(find_key_index::<16>(*k, &keys, populated.len()), Some(i));
        }
        assert_eq!(find_key_index::<16>(0x81, &keys, populated.len()), None);
        assert_eq!(find_key_index::<16>(0, &keys, populated.len()), None);
    }

    #[test]
    fn test_lower_bound_16() {
        let mut keys = [0u8; 16];
        let populated = [2u8, 4, 0x80, 0xfd];
        keys[..populated.len()].copy_from_slice(&populated);
        assert_eq!(lower_bound_index::<16>(1, &keys, 4), 0);
        assert_eq!(lower_bound_index::<16>(2, &keys, 4), 0);
        assert_eq!(lower_bound_index::<16>(3, &keys, 4), 1);
        assert_eq!(lower_bound_index::<16>(5, &keys, 4), 2);
        // Unsigned ordering around the sign bit.
        assert_eq!(lower_bound_index::<16>(0x7f, &keys, 4), 2);
        assert_eq!(lower_bound_index::<16>(0x81, &keys, 4), 3);
        assert_eq!(lower_bound_index::<16>(0xfe, &keys, 4), 4);
        assert_eq!(lower_bound_index::<16>(0xff, &keys, 4), 4);
        assert_eq!(lower_bound_index::<16>(9, &keys, 0), 0);
    }

    #[test]
    fn test_lower_bound_full_16() {
        let keys: [u8; 16] = std::array::from_fn(|i| (i * 16) as u8);
        assert_eq!(lower_bound_index::<16>(0, &keys, 16), 0);
        assert_eq!(lower_bound_index::<16>(0xf1, &keys, 16), 16);
        assert_eq!(lower_bound_index::<16>(0x77, &keys, 16), 8);
    }

    #[test]
    fn test_lower_bound_4() {
        let keys = [5u8, 9, 0, 0];
        assert_eq!(lower_bound_index::<4>(4, &keys, 2), 0);
        assert_eq!(lower_bound_index::<4>(6, &keys, 2), 1);
        assert_eq!(lower_bound_index::<4>(0xff, &keys, 2), 2);
    }
}
