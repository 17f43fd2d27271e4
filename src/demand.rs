//! Exogenous customer demand generator.
//!
//! Deterministic, configurable series. Same `(gameId, seed, pattern)` always
//! produces the same sequence, across implementations and platforms. Each
//! week's value is derived independently, via a stable hash, rather than
//! from an evolving RNG, so week `w`'s value never depends on having
//! generated week `w - 1` first.

use crate::types::DemandPattern;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of weeks pre-materialised when a game is created.
pub const MIN_MATERIALISED_WEEKS: u32 = 20;

/// FNV-1a over the bytes of `game_id`, `seed`, and `week`. Stable across
/// platforms and Rust versions (unlike `std::hash::Hash`'s `DefaultHasher`,
/// which makes no such guarantee).
fn stable_hash(game_id: &str, seed: u64, week: u32) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for byte in game_id.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    for byte in seed.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    for byte in week.to_le_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Deterministic demand series for one game. Values for at least
/// [`MIN_MATERIALISED_WEEKS`] are computed at construction; `demand_at`
/// computes any further week on demand (the series is pure, so "extension"
/// is just calling the same function for a larger `w`).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DemandGenerator {
    game_id: String,
    pattern: DemandPattern,
    seed: u64,
    materialised: Vec<u32>,
}

impl DemandGenerator {
    pub fn new(game_id: impl Into<String>, pattern: DemandPattern, seed: Option<u64>) -> Self {
        let game_id = game_id.into();
        let seed = seed.unwrap_or(0);
        let materialised = (0..MIN_MATERIALISED_WEEKS)
            .map(|w| Self::compute(&game_id, pattern, seed, w))
            .collect();
        Self { game_id, pattern, seed, materialised }
    }

    /// Demand for week `w`. Weeks within the pre-materialised window are a
    /// cheap lookup; weeks beyond it are computed the same way, extending
    /// the series transparently.
    pub fn demand_at(&mut self, w: u32) -> u32 {
        if let Some(&d) = self.materialised.get(w as usize) {
            return d;
        }
        while (self.materialised.len() as u32) <= w {
            let next_week = self.materialised.len() as u32;
            self.materialised.push(Self::compute(&self.game_id, self.pattern, self.seed, next_week));
        }
        self.materialised[w as usize]
    }

    fn compute(game_id: &str, pattern: DemandPattern, seed: u64, w: u32) -> u32 {
        match pattern {
            DemandPattern::Constant => 4,
            DemandPattern::Step => {
                if w < 4 {
                    4
                } else {
                    8
                }
            }
            DemandPattern::Random => {
                let hash = stable_hash(game_id, seed, w);
                let mut rng = StdRng::seed_from_u64(hash);
                rng.gen_range(2..=6)
            }
        }
    }
}
