//! Shared harness for the pipeline integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use combat_core::{
    AttackerSnapshot, DefenderSnapshot, EntityId, MapId, MapInstanceId, MonsterId, Position,
    SkillId, SkillTemplate, SplitMixRolls,
};
use world_runtime::{
    Combatant, CombatantKind, CombatEvent, DetachedMap, DropGenerator, EventBus,
    InMemoryDirectory, ItemDrop, Killable, ManualScheduler, NoDrops, NoQuests, PartyRoster,
    PersistError, PersistMutation, PersistenceSink, PersistenceWorker, QuestProgress, SkillEngine,
    SoloRoster, StaticStats, WorldMap, WorldServices,
};

// ============================================================================
// Engine harness
// ============================================================================

/// Collaborator bundle with permissive defaults; tests override the pieces
/// they assert on, then `build()` the engine.
pub struct TestHarness {
    pub bus: EventBus,
    pub scheduler: Arc<ManualScheduler>,
    pub directory: Arc<InMemoryDirectory>,
    pub parties: Arc<dyn PartyRoster>,
    pub map: Arc<dyn WorldMap>,
    pub drops: Arc<dyn DropGenerator>,
    pub quests: Arc<dyn QuestProgress>,
    pub sink: Arc<dyn PersistenceSink>,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        Self {
            bus: EventBus::new(256),
            scheduler: Arc::new(ManualScheduler::new()),
            directory: Arc::new(InMemoryDirectory::new()),
            parties: Arc::new(SoloRoster),
            map: Arc::new(DetachedMap),
            drops: Arc::new(NoDrops),
            quests: Arc::new(NoQuests),
            sink: Arc::new(NullSink),
        }
    }

    pub fn build(&self) -> Arc<SkillEngine> {
        let (persistence, _join) = PersistenceWorker::spawn(self.sink.clone());
        let services = Arc::new(WorldServices {
            directory: self.directory.clone(),
            parties: self.parties.clone(),
            map: self.map.clone(),
            drops: self.drops.clone(),
            quests: self.quests.clone(),
            persistence,
        });
        Arc::new(SkillEngine::new(
            self.bus.clone(),
            Arc::new(SplitMixRolls::seeded(7)),
            self.scheduler.clone(),
            services,
        ))
    }
}

/// Wire test log output through the usual subscriber; repeated calls are
/// no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Let spawned cast timers reach their park point / run to completion.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Drain everything currently buffered on an event receiver.
pub fn drain(rx: &mut broadcast::Receiver<CombatEvent>) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Entities
// ============================================================================

/// Flat attack 20, defense 5: every melee hit lands for 15 without pinning
/// the roll source.
pub fn baseline_stats() -> StaticStats {
    StaticStats {
        attack: AttackerSnapshot {
            min_attack: 20,
            max_attack: 20,
            min_magic_attack: 20,
            max_magic_attack: 20,
            accuracy: 0,
            critical_chance: 0,
            wisdom: 10,
            element: Default::default(),
        },
        defense: DefenderSnapshot {
            defense: 5,
            resistance: 5,
            evasion: 0,
            untouchable: false,
            element: Default::default(),
        },
    }
}

pub fn spawn(harness: &TestHarness, id: u32, kind: CombatantKind) -> Arc<Combatant> {
    spawn_with_stats(harness, id, kind, baseline_stats())
}

pub fn spawn_with_stats(
    harness: &TestHarness,
    id: u32,
    kind: CombatantKind,
    stats: StaticStats,
) -> Arc<Combatant> {
    let combatant = Arc::new(Combatant::new(
        EntityId(id),
        kind,
        Arc::new(stats),
        (100, 50, 30),
        harness.bus.clone(),
    ));
    combatant.place(MapId(1), MapInstanceId(1), Position::new(id as f32, 0.0, 0.0));
    harness.directory.insert(combatant.clone());
    combatant
}

pub fn as_killable(combatant: &Arc<Combatant>) -> Arc<dyn Killable> {
    combatant.clone()
}

// ============================================================================
// Skills
// ============================================================================

pub fn tpl(id: u16) -> SkillTemplate {
    SkillTemplate::basic(SkillId(id), 1)
}

pub fn skill(template: SkillTemplate) -> combat_core::Skill {
    combat_core::Skill::new(template, 0, 1)
}

// ============================================================================
// Recording collaborators
// ============================================================================

/// Persistence sink that swallows everything.
pub struct NullSink;

#[async_trait]
impl PersistenceSink for NullSink {
    async fn persist(&self, _mutation: PersistMutation) -> Result<(), PersistError> {
        Ok(())
    }
}

/// Persistence sink that remembers every mutation.
#[derive(Default)]
pub struct RecordingSink {
    pub seen: Mutex<Vec<PersistMutation>>,
}

#[async_trait]
impl PersistenceSink for RecordingSink {
    async fn persist(&self, mutation: PersistMutation) -> Result<(), PersistError> {
        self.seen.lock().unwrap().push(mutation);
        Ok(())
    }
}

/// Quest tracker that records every kill credit.
#[derive(Default)]
pub struct RecordingQuests {
    pub kills: Mutex<Vec<(EntityId, MonsterId)>>,
}

impl QuestProgress for RecordingQuests {
    fn record_monster_kill(&self, player: EntityId, monster: MonsterId) {
        self.kills.lock().unwrap().push((player, monster));
    }
}

/// Drop generator returning a fixed item list and counting invocations.
pub struct FixedDrops {
    pub items: Vec<ItemDrop>,
    pub calls: AtomicUsize,
}

impl FixedDrops {
    pub fn new(items: Vec<ItemDrop>) -> Self {
        Self {
            items,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DropGenerator for FixedDrops {
    fn generate_drop(&self, _victim: &dyn Killable, _killer: Option<EntityId>) -> Vec<ItemDrop> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.items.clone()
    }
}

/// Map service that records placements and transfers.
#[derive(Default)]
pub struct RecordingMap {
    pub placed: Mutex<Vec<(Position, ItemDrop)>>,
    pub transfers: Mutex<Vec<(EntityId, MapId, Position)>>,
}

impl WorldMap for RecordingMap {
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
        position: Position,
        item: ItemDrop,
        _owner: Option<EntityId>,
    ) {
        self.placed.lock().unwrap().push((position, item));
    }

    fn transfer(&self, entity: EntityId, map: MapId, position: Position) {
        self.transfers.lock().unwrap().push((entity, map, position));
    }
}

/// Roster where everyone listed is in one party. `kept_by_party` items are
/// handed out during distribution; the rest bounce back to the corpse.
pub struct FixedParty {
    pub members: Mutex<Vec<Arc<dyn Killable>>>,
    pub kept_by_party: usize,
}

impl FixedParty {
    pub fn new(members: Vec<Arc<dyn Killable>>, kept_by_party: usize) -> Self {
        Self {
            members: Mutex::new(members),
            kept_by_party,
        }
    }
}

impl PartyRoster for FixedParty {
    fn members_on_instance(
        &self,
        _member: EntityId,
        instance: MapInstanceId,
    ) -> Option<Vec<Arc<dyn Killable>>> {
        Some(
            self.members
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.instance() == instance)
                .cloned()
                .collect(),
        )
    }

    fn distribute_drop(&self, _killer: EntityId, items: Vec<ItemDrop>) -> Vec<ItemDrop> {
        items.into_iter().skip(self.kept_by_party).collect()
    }
}
