//! Error types surfaced by the combat runtime.
//!
//! Validation failures (dead target, short resources, status locks) are
//! [`combat_core::AttackVerdict`] values and never reach this enum. These
//! errors mean the skill *configuration* is malformed: the current use is
//! aborted and logged, and the caster's state machine stays usable.

use combat_core::{EffectKind, SkillId, TargetKind};

pub type Result<T> = std::result::Result<T, CombatError>;

#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    #[error("skill {skill} has no handling for effect kind {effect}")]
    UnsupportedEffect { skill: SkillId, effect: EffectKind },

    #[error("skill {skill} has no handling for target kind {target}")]
    UnsupportedTarget { skill: SkillId, target: TargetKind },
}
