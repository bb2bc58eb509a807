//! Read-only resolved stats consumed by the resolver.
//!
//! Stat aggregation (equipment + buffs → final numbers) is an external
//! service; the combat core only asks for finished snapshots.

use combat_core::{AttackerSnapshot, DefenderSnapshot};

/// Provider of resolved attack/defense numbers for one entity.
pub trait StatsOracle: Send + Sync {
    fn attack_snapshot(&self) -> AttackerSnapshot;
    fn defense_snapshot(&self) -> DefenderSnapshot;
}

/// Fixed numbers: monsters with static stat blocks, and test doubles.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticStats {
    pub attack: AttackerSnapshot,
    pub defense: DefenderSnapshot,
}

impl StatsOracle for StaticStats {
    fn attack_snapshot(&self) -> AttackerSnapshot {
        self.attack
    }

    fn defense_snapshot(&self) -> DefenderSnapshot {
        self.defense
    }
}
