//! Resolution outcome classifiers.

use super::damage::Damage;

/// Exactly one classifier per resolution.
///
/// `Normal`/`Critical` carry damage; everything else is a reason the
/// attempt produced no effect. Validation failures are values of this
/// enum, never errors; callers inspect and branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AttackVerdict {
    Normal,
    Critical,
    Miss,
    /// Target missing, dead, or otherwise not attackable.
    WrongTarget,
    /// Not enough MP/SP to pay the skill cost.
    NotEnoughResource,
    /// Blocked by an incapacitating status.
    CannotAttack,
}

/// Outcome classifier paired with the resource deltas it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackResult {
    pub verdict: AttackVerdict,
    pub damage: Damage,
}

impl AttackResult {
    pub const MISS: Self = Self {
        verdict: AttackVerdict::Miss,
        damage: Damage::NONE,
    };

    /// A zero-damage result with the given verdict.
    pub fn of(verdict: AttackVerdict) -> Self {
        Self {
            verdict,
            damage: Damage::NONE,
        }
    }

    pub fn normal(damage: Damage) -> Self {
        Self {
            verdict: AttackVerdict::Normal,
            damage,
        }
    }

    pub fn is_miss(&self) -> bool {
        self.verdict == AttackVerdict::Miss
    }
}
