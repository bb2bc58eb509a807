//! Entropy-backed roll source for live servers.

use combat_core::RollOracle;

/// Draws from the thread-local generator via `rand::random`.
///
/// This is what the world server injects; tests use the seeded SplitMix
/// source from `combat-core` so every probability is replayable.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRolls;

impl RollOracle for ThreadRolls {
    fn next_u32(&self) -> u32 {
        rand::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_contract_ranges() {
        let rolls = ThreadRolls;
        for _ in 0..1000 {
            assert!((1..=100).contains(&rolls.d100()));
            let v = rolls.between(10, 12);
            assert!((10..=12).contains(&v));
        }
    }
}
