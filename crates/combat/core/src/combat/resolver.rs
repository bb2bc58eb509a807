//! Attack resolution.
//!
//! [`resolve`] is the single entry point for hit/miss/critical and damage
//! magnitude. It is a pure function of the two stat snapshots, the skill
//! descriptor, and an injected roll source; callers decide what happens
//! with the result. Misses short-circuit before any magnitude is drawn, so
//! they can never leak side effects.
//!
//! Check order is fixed: evasion first (short-circuits to `Miss`), then the
//! critical check, then the magnitude roll.

use crate::rng::RollOracle;
use crate::skill::{AttackKind, SkillTemplate};

use super::damage::Damage;
use super::element::Element;
use super::result::{AttackResult, AttackVerdict};

/// Critical hits double the mitigated magnitude.
const CRITICAL_MULTIPLIER: u32 = 2;

/// Attacker-side resolved numbers, produced by the stats provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackerSnapshot {
    pub min_attack: u32,
    pub max_attack: u32,
    pub min_magic_attack: u32,
    pub max_magic_attack: u32,
    /// Percent shaved off the defender's evasion.
    pub accuracy: u8,
    /// Independent critical probability in percent.
    pub critical_chance: u8,
    /// Feeds the heal formula.
    pub wisdom: u32,
    pub element: Element,
}

/// Defender-side resolved numbers, produced by the stats provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefenderSnapshot {
    /// Subtracted from physical and shooting magnitudes.
    pub defense: u32,
    /// Subtracted from magic magnitudes.
    pub resistance: u32,
    /// Evade probability in percent, before accuracy reduction.
    pub evasion: u8,
    /// Every attack misses while set.
    pub untouchable: bool,
    pub element: Element,
}

/// Resolve one attack of `skill` against a defender.
///
/// Passive skills never reach the resolver in the normal pipeline (they
/// skip the accuracy roll entirely); if one does, it resolves to a
/// zero-damage `Normal` result.
pub fn resolve(
    skill: &SkillTemplate,
    attacker: &AttackerSnapshot,
    defender: &DefenderSnapshot,
    rolls: &dyn RollOracle,
) -> AttackResult {
    if defender.untouchable {
        return AttackResult::MISS;
    }

    let evade = defender.evasion.saturating_sub(attacker.accuracy);
    if rolls.chance(evade) {
        return AttackResult::MISS;
    }

    let (min, max, mitigation) = match skill.attack {
        AttackKind::Physical | AttackKind::Shooting => {
            (attacker.min_attack, attacker.max_attack, defender.defense)
        }
        AttackKind::Magic => (
            attacker.min_magic_attack,
            attacker.max_magic_attack,
            defender.resistance,
        ),
        AttackKind::Passive => return AttackResult::of(AttackVerdict::Normal),
    };

    let critical = rolls.chance(attacker.critical_chance);

    let added = skill.added_attack as u32;
    let raw = rolls.between(min + added, max + added);
    let raw = raw * attacker.element.attack_percent(defender.element) / 100;

    let mut hp = raw.saturating_sub(mitigation);
    if critical {
        hp *= CRITICAL_MULTIPLIER;
    }

    AttackResult {
        verdict: if critical {
            AttackVerdict::Critical
        } else {
            AttackVerdict::Normal
        },
        damage: Damage::hp(hp),
    }
}

/// Recompute a heal from the caster's wisdom and the skill's heal
/// parameters.
///
/// Heals do not roll accuracy and their deltas are applied as increases, so
/// healing can never trigger the death transition.
pub fn resolve_heal(skill: &SkillTemplate, attacker: &AttackerSnapshot) -> AttackResult {
    let hp = attacker.wisdom * 4 + skill.heal_hp as u32;
    AttackResult::normal(Damage::new(hp, skill.heal_sp as u32, skill.heal_mp as u32))
}
