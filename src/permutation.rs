use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub const PERMUTATION_SIZE: usize = 256;

/// Shuffled lookup table used to hash lattice coordinates into gradient picks.
///
/// The first 256 entries are a permutation of `0..256`; the second half is a
/// verbatim copy so `p[p[x] + y]` never needs a wraparound check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; PERMUTATION_SIZE * 2],
}

impl PermutationTable {
    pub fn build(seed: u64) -> Self {
        let mut values = [0u8; PERMUTATION_SIZE];
        for (i, value) in values.iter_mut().enumerate() {
            *value = i as u8;
        }

        // Fisher-Yates, walking down from the last slot
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for i in (1..PERMUTATION_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            values.swap(i, j);
        }

        let mut perm = [0u8; PERMUTATION_SIZE * 2];
        perm[..PERMUTATION_SIZE].copy_from_slice(&values);
        perm[PERMUTATION_SIZE..].copy_from_slice(&values);

        tracing::debug!(seed, "built permutation table");
        PermutationTable { perm }
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// Hashes an integer lattice point. Coordinates are wrapped with
    /// [`wrap_cell`] first, so any `i64` is accepted.
    #[inline]
    pub fn hash(&self, cell_x: i64, cell_y: i64) -> u8 {
        let x = wrap_cell(cell_x);
        let y = wrap_cell(cell_y);
        self.perm[self.get(x) + y]
    }

    pub fn values(&self) -> &[u8] {
        &self.perm
    }
}

pub fn build_permutation_table(seed: u64) -> PermutationTable {
    PermutationTable::build(seed)
}

/// Euclidean modulo 256. Negative cells wrap to the top of the range
/// (-1 -> 255), so the noise repeats every 256 cells in both directions.
#[inline]
pub fn wrap_cell(cell: i64) -> usize {
    cell.rem_euclid(PERMUTATION_SIZE as i64) as usize
}
