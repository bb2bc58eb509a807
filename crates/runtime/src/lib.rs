//! Concurrent combat orchestration for the world server.
//!
//! This crate wires the deterministic `combat-core` into a running world:
//! per-entity casting state driven by single-shot timers, the effect
//! pipeline that fans a skill out over its target set, kill attribution
//! and the death pipeline, and the fire-and-forget persistence queue.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the effect pipeline and validation
//! - [`casting`] is the per-entity cast state machine and timer abstraction
//! - [`combatant`] defines the capability traits and standard components
//! - [`death`] handles kill credit, loot, quests, and rebirth
//! - [`events`] provides the injected broadcast port
//! - [`world`] declares the collaborator contracts this core consumes
//! - [`workers`] keeps background tasks internal to the crate

pub mod casting;
pub mod combatant;
pub mod death;
pub mod engine;
pub mod error;
pub mod events;
pub mod rolls;
pub mod world;
pub mod workers;

pub use casting::{CastScheduler, CastSession, CastingState, ManualScheduler, TokioScheduler};
pub use combatant::{
    ActiveBuff, BuffHandle, BuffLedger, Combatant, CombatantKind, DamageLedger, HpDecrease,
    Killable, ResourceKind, ResourcePool, StaticStats, StatsOracle,
};
pub use death::DeathPipeline;
pub use engine::SkillEngine;
pub use error::{CombatError, Result};
pub use events::{CombatEvent, EventBus};
pub use rolls::ThreadRolls;
pub use world::{
    DetachedMap, DropGenerator, EntityDirectory, InMemoryDirectory, ItemDrop, NoDrops, NoQuests,
    PartyRoster, QuestProgress, SoloRoster, WorldMap, WorldServices,
};
pub use workers::{
    JsonLogSink, PersistError, PersistMutation, PersistenceHandle, PersistenceSink,
    PersistenceWorker,
};
