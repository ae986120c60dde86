//! RNG oracle for dice rolls.
//!
//! Rolls never pull from ambient thread-local randomness. The engine derives
//! a seed for every roll from its configured base seed, a roll counter and the
//! rolling unit, so an encounter replays identically under the same script.

/// Source of pseudo-random numbers keyed by an explicit seed.
///
/// Implementations must be deterministic: the same seed always yields the
/// same value.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let span = max.abs_diff(min) + 1;
        min + (u64::from(self.next_u32(seed)) % span) as i64
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Stateless: every call advances a copy of the given seed by one LCG step
/// and permutes it, so it can be shared freely behind an `Arc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mix the engine seed with per-roll entropy into a single seed.
///
/// * `base` - configured encounter seed
/// * `nonce` - roll sequence number (increments on every roll)
/// * `unit` - raw id of the rolling unit (`u32::MAX` when nobody rolls)
/// * `die` - index of the die inside a multi-die roll
pub fn compute_seed(base: u64, nonce: u64, unit: u32, die: u32) -> u64 {
    let mut hash = base;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(unit).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(die).wrapping_mul(0x85ebca6b);

    // final avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
