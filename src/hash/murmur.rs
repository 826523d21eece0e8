//! MurmurHash3 x64-128, specialized to the filter's fixed-size input.
//!
//! Every coordinate hashes as exactly one 16-byte block (two little-endian
//! `u64` words), so the streaming buffer of a general implementation is
//! unnecessary: this is the single body round plus the finalizer, with the
//! total length fixed at 16.
//!
//! MurmurHash3's avalanche and 2-way bit independence are what make the
//! hashing trick (`h1 + i*h2`) behave like k independent hash functions.

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^ (k >> 33)
}

/// Hash one 16-byte block `(k1, k2)` starting from the seed state
/// `(seed1, seed2)`.
///
/// `k1` and `k2` are the two little-endian `u64` words of the input; the
/// length folded into the finalizer is the fixed block size of 16 bytes.
#[must_use]
pub(crate) fn hash128_block(seed1: u64, seed2: u64, k1: u64, k2: u64) -> (u64, u64) {
    let mut h1 = seed1;
    let mut h2 = seed2;

    // body: one 128-bit round
    let mut k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(31);
    k1 = k1.wrapping_mul(C2);
    h1 ^= k1;

    h1 = h1.rotate_left(27);
    h1 = h1.wrapping_add(h2);
    h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

    let mut k2 = k2.wrapping_mul(C2);
    k2 = k2.rotate_left(33);
    k2 = k2.wrapping_mul(C1);
    h2 ^= k2;

    h2 = h2.rotate_left(31);
    h2 = h2.wrapping_add(h1);
    h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);

    // finalization, total length = 16 bytes
    h1 ^= 16;
    h2 ^= 16;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    (h1, h2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = hash128_block(1, 2, 3, 4);
        let b = hash128_block(1, 2, 3, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn seed_changes_output() {
        let a = hash128_block(1, 2, 3, 4);
        let b = hash128_block(5, 2, 3, 4);
        let c = hash128_block(1, 6, 3, 4);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn single_bit_flip_avalanches() {
        let (a1, a2) = hash128_block(0, 0, 0, 0);
        let (b1, b2) = hash128_block(0, 0, 1, 0);
        // both words should differ in a substantial number of bits
        assert!((a1 ^ b1).count_ones() > 16);
        assert!((a2 ^ b2).count_ones() > 16);
    }
}
