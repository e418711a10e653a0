//! Per-instance permutation table seeding the secondary hash.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::hash::{golden_mult, mix_bits};

const TABLE_LEN: usize = 256;

/// A randomly shuffled permutation of `0..=255`, generated once per
/// dictionary instance and read-only thereafter.
///
/// Its only job is to hand the secondary hash a seed that depends on the
/// key's byte length, so keys of different lengths diverge before a single
/// key byte has been mixed in.
pub(crate) struct PermTable {
    table: [u32; TABLE_LEN],
}

impl PermTable {
    /// Fisher-Yates shuffle of `0..=255` from the caller's entropy source.
    pub(crate) fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table: [u32; TABLE_LEN] = core::array::from_fn(|i| i as u32);
        table.shuffle(rng);
        PermTable { table }
    }

    /// Secondary hash: the fixed step multiplier for double-hashed probing.
    ///
    /// The per-length seed runs through [`mix_bits`], then a golden-ratio
    /// multiplicative pass over the key bytes yields `h2`, and a final
    /// shift-and-subtract fold combines `h2` back with every byte.
    pub(crate) fn probe_step(&self, key: &[u8]) -> u32 {
        let seed = mix_bits(self.table[key.len() % TABLE_LEN]);
        let h2 = golden_mult(key, seed);

        key.iter().fold(0u32, |acc, &b| {
            (mix_bits(acc) << 5).wrapping_sub(h2).wrapping_add(b as u32)
        })
    }
}

impl core::fmt::Debug for PermTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PermTable(..)")
    }
}
