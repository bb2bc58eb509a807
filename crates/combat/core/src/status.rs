//! Status-effect classification shared with the buff ledger contract.
//!
//! The full buff engine (duration countdown, stacking) lives outside the
//! combat core; these types are the vocabulary the core uses to ask the
//! ledger questions ("is this entity asleep?") and to describe what a skill
//! leaves behind on its target.

use bitflags::bitflags;

/// The incapacitating state a buff puts its owner into, if any.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StateKind {
    /// No state change; plain stat buff.
    #[default]
    None,
    /// Blocks every attack kind.
    Sleep,
    /// Blocks every attack kind.
    Stun,
    /// Blocks physical and shooting skills.
    Silence,
    /// Blocks magic skills.
    Darkness,
    /// Blocks movement, not skills.
    Immobilize,
    /// Owner is invisible to ordinary targeting.
    Stealth,
    /// Every attack against the owner misses.
    Untouchable,
}

bitflags! {
    /// Attribute flags carried by an active buff.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BuffFlags: u8 {
        /// Removable by Dispel.
        const DEBUFF = 1 << 0;
        /// Cancelled by the death pipeline.
        const CLEAR_AFTER_DEATH = 1 << 1;
        /// Ticks while active (periodic heal / periodic debuff).
        const PERIODIC = 1 << 2;
    }
}
