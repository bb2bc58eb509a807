//! Error types for the deterministic core.
//!
//! Validation failures during combat are *values* ([`crate::AttackVerdict`]),
//! not errors; the types here cover registry misuse, which callers surface
//! to the player instead of retrying.

use crate::skill::SkillId;

/// Failures while mutating a [`crate::SkillBook`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkillBookError {
    #[error("skill {id} level {level} is already known")]
    AlreadyKnown { id: SkillId, level: u8 },

    #[error("not enough skill points: required {required}, available {available}")]
    NotEnoughPoints { required: u16, available: u16 },
}
