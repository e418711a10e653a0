//! Pure 32-bit mixing functions used by the probe sequence.

/// MurmurHash2 multiplication constant.
const M: u32 = 0x5bd1_e995;

/// 32-bit golden-ratio constant, 2^32 / φ. For 64-bit hashing the
/// equivalent would be 11400714819323198486; this table indexes with u32.
const PHI: u32 = 0x9e37_79b9;

/// MurmurHash2, 32-bit variant, over raw key bytes.
///
/// Seed 0 produces the initial slot hash; reseeding with the probe attempt
/// number produces the perturbation term used from the second probe onward.
pub(crate) fn murmur2(key: &[u8], seed: u32) -> u32 {
    let mut h = seed ^ key.len() as u32;

    let mut chunks = key.chunks_exact(4);
    for quad in &mut chunks {
        // Pack 4 bytes little-endian, avalanche, fold into the running hash.
        let mut chunk =
            quad[0] as u32 | (quad[1] as u32) << 8 | (quad[2] as u32) << 16 | (quad[3] as u32) << 24;
        chunk = chunk.wrapping_mul(M);
        chunk ^= chunk >> 24;
        chunk = chunk.wrapping_mul(M);

        h = h.wrapping_mul(M);
        h ^= chunk;
    }

    // Trailing 1-3 bytes fold from the highest remaining byte down, with a
    // single multiply once any tail byte has been folded.
    let tail = chunks.remainder();
    if tail.len() == 3 {
        h ^= (tail[2] as u32) << 16;
    }
    if tail.len() >= 2 {
        h ^= (tail[1] as u32) << 8;
    }
    if !tail.is_empty() {
        h ^= tail[0] as u32;
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;
    h
}

/// Rotate-and-XOR bit spreader: XOR-folds shifted copies of `x`, then
/// rotates the top nibble around. Used both to derive the per-length seed
/// and inside the combining fold of [`golden_mult`]'s caller.
#[inline]
pub(crate) fn mix_bits(x: u32) -> u32 {
    (((x ^ (x << 10)) ^ (x >> 8)) << 5) | (x >> 28)
}

/// Multiplicative hash over key bytes: fold each byte into the accumulator
/// with XOR, then multiply by the golden-ratio constant.
#[inline]
pub(crate) fn golden_mult(key: &[u8], seed: u32) -> u32 {
    key.iter()
        .fold(seed, |h, &b| (h ^ b as u32).wrapping_mul(PHI))
}
