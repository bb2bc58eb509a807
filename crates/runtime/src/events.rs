//! Combat events broadcast to the (external) network layer.
//!
//! The bus is an injected port: the engine and pipelines receive an
//! [`EventBus`] at construction instead of reaching for a global, so tests
//! subscribe with a plain receiver and assert on what was emitted.

use tokio::sync::broadcast;

use combat_core::{AttackResult, EntityId, SkillId};

use crate::combatant::ResourceKind;

/// Events emitted by the combat core during resolution.
///
/// Consumers subscribe to react to state changes without blocking the
/// resolution path.
#[derive(Debug, Clone)]
pub enum CombatEvent {
    /// An entity started casting; the network layer plays the animation.
    CastStarted {
        caster: EntityId,
        target: Option<EntityId>,
        skill: SkillId,
    },
    /// A skill landed on its originally selected target.
    SkillUsed {
        caster: EntityId,
        target: EntityId,
        skill: SkillId,
        result: AttackResult,
    },
    /// A skill landed on an additional target (area / multi-hit).
    RangeSkillUsed {
        caster: EntityId,
        target: EntityId,
        skill: SkillId,
        result: AttackResult,
    },
    /// An entity died. `killer` is the credited attacker, if any.
    Died {
        entity: EntityId,
        killer: Option<EntityId>,
    },
    /// An entity came back to life at a respawn point.
    Rebirthed { entity: EntityId },
    /// A resource pool maximum changed (stat aggregation).
    MaxResourceChanged {
        entity: EntityId,
        resource: ResourceKind,
        value: u32,
    },
}

/// Cloneable broadcast port for [`CombatEvent`].
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<CombatEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Having no subscribers is normal, not an error.
    pub fn publish(&self, event: CombatEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("combat event dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CombatEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(128)
    }
}
