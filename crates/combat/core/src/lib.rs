//! Deterministic combat domain shared by the world server and offline tools.
//!
//! `combat-core` defines skill descriptors, damage values, outcome
//! classifiers, and the attack resolver as pure APIs: no clocks, no I/O,
//! and randomness only through the injected [`RollOracle`]. The concurrent
//! half of the system (casting timers, effect pipeline, death handling)
//! lives in the `world-runtime` crate and consumes the types re-exported
//! here.

pub mod combat;
pub mod error;
pub mod rng;
pub mod skill;
pub mod status;
pub mod types;

pub use combat::{
    AttackResult, AttackVerdict, AttackerSnapshot, Damage, DefenderSnapshot, Element, resolve,
    resolve_heal,
};
pub use error::SkillBookError;
pub use rng::{RollOracle, SplitMixRolls};
pub use skill::{
    AttackKind, EffectKind, Learned, Skill, SkillBook, SkillId, SkillTemplate, TargetKind,
};
pub use status::{BuffFlags, StateKind};
pub use types::{EntityId, MapId, MapInstanceId, MonsterId, Position};
