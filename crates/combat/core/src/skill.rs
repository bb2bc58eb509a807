//! Skill descriptors and the learned-skill registry.
//!
//! A [`SkillTemplate`] is one row of static configuration: everything a
//! (skill id, level) pair does, costs, and targets. A [`Skill`] is that row
//! as known by one owner, stamped with the slot number it occupies in the
//! owner's [`SkillBook`] and the level at which it was acquired. Skills are
//! immutable after construction; only the book itself changes on level-up.

use std::collections::BTreeMap;

use crate::error::SkillBookError;
use crate::status::{BuffFlags, StateKind};

// ============================================================================
// Identity & classification
// ============================================================================

/// Static skill identity shared by every level of the same skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u16);

impl core::fmt::Display for SkillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the target set of a skill use is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetKind {
    /// No explicit target; lands on the caster.
    None,
    /// Always the caster.
    Caster,
    /// The selected enemy, falling back to the caster when none is given.
    SelectedEnemy,
    /// Party members near the caster, or the caster alone without a party.
    PartyMembers,
    /// Enemies around the selected target (spatial query).
    EnemiesNearTarget,
}

/// Attack category, which decides the accuracy roll and the status locks
/// that can block the cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttackKind {
    Physical,
    Shooting,
    Magic,
    /// Never rolls accuracy; pure buffs and auras.
    Passive,
}

/// What a skill does to each resolved target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectKind {
    Buff,
    SubtractingDebuff,
    PeriodicHeal,
    PeriodicDebuff,
    PreventAttack,
    Immobilize,
    RemoveAttribute,
    ElementalAttack,
    ElementalProtection,
    Untouchable,
    Heal,
    Dispel,
    Stealth,
    DirectHit,
    MultiHit,
    PassiveDefence,
    WeaponMastery,
    /// Present in configuration, not yet handled by the pipeline.
    Resurrect,
}

impl EffectKind {
    /// Kinds that land on the target as an entry in its buff ledger.
    pub fn is_buff(self) -> bool {
        matches!(
            self,
            Self::Buff
                | Self::SubtractingDebuff
                | Self::PeriodicHeal
                | Self::PeriodicDebuff
                | Self::PreventAttack
                | Self::Immobilize
                | Self::RemoveAttribute
                | Self::ElementalAttack
                | Self::ElementalProtection
                | Self::Untouchable
        )
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// Static configuration for one (skill id, level) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillTemplate {
    pub id: SkillId,
    pub level: u8,
    pub target: TargetKind,
    pub attack: AttackKind,
    pub effect: EffectKind,

    /// Resource costs, charged once per use.
    pub need_mp: u16,
    pub need_sp: u16,

    /// Cast delay; zero applies instantly.
    pub cast_time_ms: u32,
    /// Range for party-wide and area application.
    pub apply_range: u16,
    /// Times the target set is resolved per use (minimum 1 effective).
    pub multi_attack: u8,

    /// Heal magnitudes, on top of the caster's wisdom contribution.
    pub heal_hp: u16,
    pub heal_mp: u16,
    pub heal_sp: u16,
    /// Flat attack added to the magnitude roll.
    pub added_attack: u16,

    /// Buff payload for buff-category effects.
    pub state: StateKind,
    pub flags: BuffFlags,
    pub duration_secs: u32,

    /// Skill points required to learn this level.
    pub point_cost: u16,
}

impl SkillTemplate {
    /// A neutral direct-hit template; tests and loaders override fields
    /// through struct update syntax.
    pub fn basic(id: SkillId, level: u8) -> Self {
        Self {
            id,
            level,
            target: TargetKind::SelectedEnemy,
            attack: AttackKind::Physical,
            effect: EffectKind::DirectHit,
            need_mp: 0,
            need_sp: 0,
            cast_time_ms: 0,
            apply_range: 0,
            multi_attack: 1,
            heal_hp: 0,
            heal_mp: 0,
            heal_sp: 0,
            added_attack: 0,
            state: StateKind::None,
            flags: BuffFlags::empty(),
            duration_secs: 0,
            point_cost: 0,
        }
    }
}

/// A skill as known by one owner.
///
/// Carries the full descriptor plus the owner-specific stamp: the slot
/// number inside the owner's book and the owner level at acquisition.
#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    pub number: u8,
    pub level_acquired: u16,
    pub template: SkillTemplate,
}

impl Skill {
    pub fn new(template: SkillTemplate, number: u8, level_acquired: u16) -> Self {
        Self {
            number,
            level_acquired,
            template,
        }
    }

    pub fn id(&self) -> SkillId {
        self.template.id
    }

    pub fn level(&self) -> u8 {
        self.template.level
    }
}

impl core::ops::Deref for Skill {
    type Target = SkillTemplate;

    fn deref(&self) -> &SkillTemplate {
        &self.template
    }
}

// ============================================================================
// Learned-skill registry
// ============================================================================

/// Outcome of learning a skill.
#[derive(Clone, Debug, PartialEq)]
pub struct Learned {
    pub skill: Skill,
    /// The lower level of the same skill this learn replaced, if any.
    pub replaced: Option<Skill>,
}

/// Per-owner registry of learned skills, keyed by slot number.
///
/// Learning a higher level of an already-known skill reuses its slot; a
/// brand-new skill takes the next free slot. Skill points are spent on
/// learn and refunded in full by [`SkillBook::reset`].
#[derive(Clone, Debug, Default)]
pub struct SkillBook {
    skills: BTreeMap<u8, Skill>,
    points: u16,
    spent: u16,
}

impl SkillBook {
    pub fn new(points: u16) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Free skill points.
    pub fn points(&self) -> u16 {
        self.points
    }

    /// Grant points (level-up reward).
    pub fn add_points(&mut self, points: u16) {
        self.points = self.points.saturating_add(points);
    }

    pub fn get(&self, number: u8) -> Option<&Skill> {
        self.skills.get(&number)
    }

    pub fn find(&self, id: SkillId) -> Option<&Skill> {
        self.skills.values().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Learn `template`, spending its point cost.
    ///
    /// Replacing a lower level of the same skill id reuses its slot number;
    /// otherwise the skill takes `max(number) + 1` (0 in an empty book).
    pub fn learn(
        &mut self,
        template: &SkillTemplate,
        level_acquired: u16,
    ) -> Result<Learned, SkillBookError> {
        if self
            .skills
            .values()
            .any(|s| s.id() == template.id && s.level() == template.level)
        {
            return Err(SkillBookError::AlreadyKnown {
                id: template.id,
                level: template.level,
            });
        }

        if self.points < template.point_cost {
            return Err(SkillBookError::NotEnoughPoints {
                required: template.point_cost,
                available: self.points,
            });
        }

        let replaced = self
            .skills
            .values()
            .find(|s| s.id() == template.id)
            .cloned();

        let number = match &replaced {
            Some(old) => old.number,
            None => self
                .skills
                .keys()
                .next_back()
                .map(|n| n + 1)
                .unwrap_or(0),
        };

        self.points -= template.point_cost;
        self.spent = self.spent.saturating_add(template.point_cost);

        let skill = Skill::new(template.clone(), number, level_acquired);
        self.skills.insert(number, skill.clone());

        Ok(Learned { skill, replaced })
    }

    /// Forget everything and refund every spent point.
    pub fn reset(&mut self) {
        self.skills.clear();
        self.points = self.points.saturating_add(self.spent);
        self.spent = 0;
    }
}
