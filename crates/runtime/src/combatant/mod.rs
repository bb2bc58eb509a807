//! Capability-composed combat entities.
//!
//! There is no killable base class: anything that can take damage exposes
//! the same component set behind the [`Killable`] trait, and the places
//! where players and monsters genuinely differ (drop generation, quest
//! credit) branch on the [`CombatantKind`] tag instead of a type
//! hierarchy. [`Combatant`] is the standard composition used by the world
//! server; tests are free to implement [`Killable`] directly.

pub mod attribution;
pub mod buffs;
pub mod resources;
pub mod stats;

pub use attribution::DamageLedger;
pub use buffs::{ActiveBuff, BuffHandle, BuffLedger};
pub use resources::{HpDecrease, ResourceKind, ResourcePool};
pub use stats::{StaticStats, StatsOracle};

use std::sync::{Arc, RwLock};

use combat_core::{
    EntityId, Learned, MapId, MapInstanceId, MonsterId, Position, SkillBook, SkillBookError,
    SkillTemplate,
};

use crate::casting::CastingState;
use crate::events::EventBus;

/// Entity category, for the few behaviors that differ by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatantKind {
    Player,
    Monster(MonsterId),
}

impl CombatantKind {
    pub fn is_player(self) -> bool {
        matches!(self, Self::Player)
    }

    pub fn monster_id(self) -> Option<MonsterId> {
        match self {
            Self::Monster(id) => Some(id),
            Self::Player => None,
        }
    }
}

/// Capability set of anything that can take damage and die.
///
/// The effect pipeline only ever sees this trait; components are owned by
/// the entity but mutated by the pipeline acting on a caster's behalf.
pub trait Killable: Send + Sync {
    fn id(&self) -> EntityId;
    fn kind(&self) -> CombatantKind;

    fn map(&self) -> MapId;
    fn instance(&self) -> MapInstanceId;
    fn position(&self) -> Position;
    fn relocate(&self, map: MapId, position: Position);

    fn resources(&self) -> &ResourcePool;
    fn buffs(&self) -> &BuffLedger;
    fn stats(&self) -> &dyn StatsOracle;
    fn attribution(&self) -> &DamageLedger;
    fn casting(&self) -> &CastingState;

    fn is_dead(&self) -> bool {
        self.resources().is_dead()
    }

    /// Record attribution and decrement HP in the contract-mandated order:
    /// the ledger entry lands before the decrement, so the death pipeline
    /// always sees the hit that killed.
    fn take_hp_damage(&self, amount: u32, attacker: Option<EntityId>) -> HpDecrease {
        if let Some(attacker) = attacker {
            self.attribution().record(attacker, amount);
        }
        self.resources().decrease_hp(amount)
    }
}

#[derive(Clone, Copy, Debug)]
struct Location {
    map: MapId,
    instance: MapInstanceId,
    position: Position,
}

/// Standard composition of the combat capabilities.
pub struct Combatant {
    id: EntityId,
    kind: CombatantKind,
    location: RwLock<Location>,
    resources: ResourcePool,
    buffs: BuffLedger,
    stats: Arc<dyn StatsOracle>,
    attribution: DamageLedger,
    casting: CastingState,
    skills: RwLock<SkillBook>,
}

impl Combatant {
    pub fn new(
        id: EntityId,
        kind: CombatantKind,
        stats: Arc<dyn StatsOracle>,
        (max_hp, max_mp, max_sp): (u32, u32, u32),
        events: EventBus,
    ) -> Self {
        Self {
            id,
            kind,
            location: RwLock::new(Location {
                map: MapId(0),
                instance: MapInstanceId(0),
                position: Position::ORIGIN,
            }),
            resources: ResourcePool::new(id, max_hp, max_mp, max_sp, events),
            buffs: BuffLedger::new(),
            stats,
            attribution: DamageLedger::new(),
            casting: CastingState::new(),
            skills: RwLock::new(SkillBook::default()),
        }
    }

    /// Place the entity on a map instance (spawn / transfer).
    pub fn place(&self, map: MapId, instance: MapInstanceId, position: Position) {
        let mut location = self.location.write().expect("location poisoned");
        *location = Location {
            map,
            instance,
            position,
        };
    }

    /// Grant skill points (level-up).
    pub fn add_skill_points(&self, points: u16) {
        self.skills
            .write()
            .expect("skill book poisoned")
            .add_points(points);
    }

    pub fn skill_points(&self) -> u16 {
        self.skills.read().expect("skill book poisoned").points()
    }

    /// Learn a skill into this entity's book.
    pub fn learn_skill(
        &self,
        template: &SkillTemplate,
        level_acquired: u16,
    ) -> Result<Learned, SkillBookError> {
        self.skills
            .write()
            .expect("skill book poisoned")
            .learn(template, level_acquired)
    }

    pub fn known_skill(&self, number: u8) -> Option<combat_core::Skill> {
        self.skills
            .read()
            .expect("skill book poisoned")
            .get(number)
            .cloned()
    }

    /// Forget all skills, refunding their points.
    pub fn reset_skills(&self) {
        self.skills.write().expect("skill book poisoned").reset();
    }
}

impl Killable for Combatant {
    fn id(&self) -> EntityId {
        self.id
    }

    fn kind(&self) -> CombatantKind {
        self.kind
    }

    fn map(&self) -> MapId {
        self.location.read().expect("location poisoned").map
    }

    fn instance(&self) -> MapInstanceId {
        self.location.read().expect("location poisoned").instance
    }

    fn position(&self) -> Position {
        self.location.read().expect("location poisoned").position
    }

    fn relocate(&self, map: MapId, position: Position) {
        let mut location = self.location.write().expect("location poisoned");
        location.map = map;
        location.position = position;
    }

    fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    fn buffs(&self) -> &BuffLedger {
        &self.buffs
    }

    fn stats(&self) -> &dyn StatsOracle {
        self.stats.as_ref()
    }

    fn attribution(&self) -> &DamageLedger {
        &self.attribution
    }

    fn casting(&self) -> &CastingState {
        &self.casting
    }
}
