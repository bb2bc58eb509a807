//! Collaborator contracts consumed by the combat core.
//!
//! Loot tables, party membership, spatial queries, and quest progress are
//! owned by other subsystems; the pipeline reaches them only through these
//! traits. [`WorldServices`] bundles the implementations the same way the
//! world server wires them, and ships permissive defaults for standalone
//! use and tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use combat_core::{EntityId, MapId, MapInstanceId, MonsterId, Position};

use crate::combatant::Killable;
use crate::workers::PersistenceHandle;

/// One item produced by a drop generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemDrop {
    pub item: u32,
    pub count: u16,
}

/// Lookup from entity id to the live entity.
///
/// Kill credit is tracked by id; the death pipeline resolves the id back to
/// an entity to learn its kind and party when distributing loot.
pub trait EntityDirectory: Send + Sync {
    fn get(&self, id: EntityId) -> Option<Arc<dyn Killable>>;
}

/// Party membership and loot distribution.
pub trait PartyRoster: Send + Sync {
    /// Members of `member`'s party currently on `instance`, including
    /// `member` itself. `None` when the entity has no party.
    fn members_on_instance(
        &self,
        member: EntityId,
        instance: MapInstanceId,
    ) -> Option<Vec<Arc<dyn Killable>>>;

    /// Distribute `items` through the killer's party; returns whatever the
    /// party rules did not hand out.
    fn distribute_drop(&self, killer: EntityId, items: Vec<ItemDrop>) -> Vec<ItemDrop>;
}

/// Spatial queries and item placement, owned by the map service.
pub trait WorldMap: Send + Sync {
    /// Enemies of `caster` within `range` of `center` on `instance`.
    fn enemies_near(
        &self,
        caster: EntityId,
        instance: MapInstanceId,
        center: Position,
        range: u16,
    ) -> Vec<Arc<dyn Killable>>;

    /// Put an item on the ground.
    fn place_item(
        &self,
        instance: MapInstanceId,
        position: Position,
        item: ItemDrop,
        owner: Option<EntityId>,
    );

    /// Move an entity to another map (rebirth at a remote respawn point).
    fn transfer(&self, entity: EntityId, map: MapId, position: Position);
}

/// Per-entity-kind loot generation.
pub trait DropGenerator: Send + Sync {
    fn generate_drop(&self, victim: &dyn Killable, killer: Option<EntityId>) -> Vec<ItemDrop>;
}

/// Quest kill-counter updates.
pub trait QuestProgress: Send + Sync {
    fn record_monster_kill(&self, player: EntityId, monster: MonsterId);
}

// ============================================================================
// Default implementations
// ============================================================================

/// Registry of live entities backed by a shared map.
#[derive(Default)]
pub struct InMemoryDirectory {
    entities: RwLock<HashMap<EntityId, Arc<dyn Killable>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: Arc<dyn Killable>) {
        self.entities
            .write()
            .expect("directory poisoned")
            .insert(entity.id(), entity);
    }

    pub fn remove(&self, id: EntityId) -> Option<Arc<dyn Killable>> {
        self.entities.write().expect("directory poisoned").remove(&id)
    }
}

impl EntityDirectory for InMemoryDirectory {
    fn get(&self, id: EntityId) -> Option<Arc<dyn Killable>> {
        self.entities
            .read()
            .expect("directory poisoned")
            .get(&id)
            .cloned()
    }
}

/// No parties anywhere; drops pass through undistributed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoloRoster;

impl PartyRoster for SoloRoster {
    fn members_on_instance(
        &self,
        _member: EntityId,
        _instance: MapInstanceId,
    ) -> Option<Vec<Arc<dyn Killable>>> {
        None
    }

    fn distribute_drop(&self, _killer: EntityId, items: Vec<ItemDrop>) -> Vec<ItemDrop> {
        items
    }
}

/// Map service that knows no enemies and swallows placements.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedMap;

impl WorldMap for DetachedMap {
    fn enemies_near(
        &self,
        _caster: EntityId,
        _instance: MapInstanceId,
        _center: Position,
        _range: u16,
    ) -> Vec<Arc<dyn Killable>> {
        Vec::new()
    }

    fn place_item(
        &self,
        _instance: MapInstanceId,
        _position: Position,
        _item: ItemDrop,
        _owner: Option<EntityId>,
    ) {
    }

    fn transfer(&self, _entity: EntityId, _map: MapId, _position: Position) {}
}

/// Drops nothing, for entities without loot tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDrops;

impl DropGenerator for NoDrops {
    fn generate_drop(&self, _victim: &dyn Killable, _killer: Option<EntityId>) -> Vec<ItemDrop> {
        Vec::new()
    }
}

/// Ignores kill counters (maps without quest content).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoQuests;

impl QuestProgress for NoQuests {
    fn record_monster_kill(&self, _player: EntityId, _monster: MonsterId) {}
}

/// Bundle of collaborator implementations handed to the engine at
/// construction.
#[derive(Clone)]
pub struct WorldServices {
    pub directory: Arc<dyn EntityDirectory>,
    pub parties: Arc<dyn PartyRoster>,
    pub map: Arc<dyn WorldMap>,
    pub drops: Arc<dyn DropGenerator>,
    pub quests: Arc<dyn QuestProgress>,
    pub persistence: PersistenceHandle,
}

impl WorldServices {
    /// Permissive defaults around a shared entity directory.
    pub fn standalone(directory: Arc<InMemoryDirectory>, persistence: PersistenceHandle) -> Self {
        Self {
            directory,
            parties: Arc::new(SoloRoster),
            map: Arc::new(DetachedMap),
            drops: Arc::new(NoDrops),
            quests: Arc::new(NoQuests),
            persistence,
        }
    }
}
