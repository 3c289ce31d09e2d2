//! RNG module - small seedable generator for spawns
//!
//! Spawns must be replayable: the same seed and the same move sequence produce
//! the same tiles in the same cells. A plain LCG is plenty for picking one of
//! at most 16 cells and a 1-in-10 value roll.

/// 32-bit linear congruential generator (Numerical Recipes constants)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // Seed 0 is remapped so `new(0)` and `new(1)` replay the same game.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance: `state = state * 1664525 + 1013904223 (mod 2^32)`
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in `[0, max)`.
    ///
    /// Scales by multiply-shift so the result comes from the high bits; the low
    /// bits of a power-of-two LCG cycle with short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Roll a `percent` in 100 chance
    pub fn chance_percent(&mut self, percent: u32) -> bool {
        self.next_range(100) < percent
    }

    /// Current internal state (reseeding with it resumes the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = SimpleRng::new(2048);
        let mut b = SimpleRng::new(2048);
        assert!((0..100).all(|_| a.next_u32() == b.next_u32()));
    }

    #[test]
    fn test_rng_different_seeds() {
        assert_ne!(SimpleRng::new(12345).next_u32(), SimpleRng::new(54321).next_u32());
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        assert_eq!(SimpleRng::new(0), SimpleRng::new(1));
    }

    #[test]
    fn test_next_range_stays_in_bounds_and_covers_values() {
        let mut rng = SimpleRng::new(7);
        let mut seen = [false; 16];
        for _ in 0..2000 {
            let v = rng.next_range(16) as usize;
            assert!(v < 16);
            seen[v] = true;
        }
        assert!(seen.iter().all(|s| *s), "every cell index should be drawn");
    }

    #[test]
    fn test_state_resumes_sequence() {
        let mut rng = SimpleRng::new(99);
        rng.next_u32();
        let mut resumed = SimpleRng::new(rng.state());
        assert_eq!(rng.next_u32(), resumed.next_u32());
    }
}
