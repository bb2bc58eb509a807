//! Kill attribution and the death pipeline.
//!
//! The death transition itself fires in the resource pool (the decrement
//! that crosses zero wins the flag race exactly once); whoever observes
//! `crossed_zero` runs [`DeathPipeline::execute`]. Everything here is
//! therefore single-fire per life: one credit decision, one loot pass, one
//! quest update, one buff cleanup.

use std::sync::Arc;

use tracing::{debug, warn};

use combat_core::{MapId, Position};

use crate::combatant::{CombatantKind, Killable};
use crate::events::{CombatEvent, EventBus};
use crate::workers::PersistMutation;
use crate::world::WorldServices;

/// Loot items are fanned out around the corpse by this much per item so
/// drops don't stack exactly.
const DROP_SPREAD: f32 = 1.0;

/// Death and rebirth handling for any killable entity.
pub struct DeathPipeline {
    events: EventBus,
    services: Arc<WorldServices>,
}

impl DeathPipeline {
    pub fn new(events: EventBus, services: Arc<WorldServices>) -> Self {
        Self { events, services }
    }

    /// Run the death pipeline for `victim`.
    ///
    /// Call this only after observing `crossed_zero` from the victim's
    /// resource pool; that is what makes the pipeline single-fire.
    pub fn execute(&self, victim: &Arc<dyn Killable>) {
        // Credit goes to the highest cumulative damage, not the last hit.
        // An empty ledger (environmental death) credits nobody.
        let killer = victim.attribution().credit_and_clear();
        if killer.is_none() {
            warn!(victim = %victim.id(), "death with empty damage ledger; no kill credit");
        }

        // A dying caster's pending cast can never complete.
        victim.casting().cancel();

        self.events.publish(CombatEvent::Died {
            entity: victim.id(),
            killer,
        });

        let killer_entity = killer
            .and_then(|id| self.services.directory.get(id))
            .filter(|k| k.kind().is_player());

        self.drop_loot(victim, killer_entity.as_ref().map(|k| k.id()));
        self.update_quests(victim, killer_entity);

        let cleared = victim.buffs().cancel_where(|b| b.clears_after_death());
        if !cleared.is_empty() {
            debug!(
                victim = %victim.id(),
                count = cleared.len(),
                "buffs cleared on death"
            );
        }
    }

    fn drop_loot(&self, victim: &Arc<dyn Killable>, killer: Option<combat_core::EntityId>) {
        let drops = self.services.drops.generate_drop(victim.as_ref(), killer);
        if drops.is_empty() {
            return;
        }

        // Loot only flows when a player earned the kill.
        let Some(killer) = killer else {
            debug!(victim = %victim.id(), "loot generated without player killer; discarded");
            return;
        };

        let leftovers = match self
            .services
            .parties
            .members_on_instance(killer, victim.instance())
        {
            Some(_) => self.services.parties.distribute_drop(killer, drops),
            None => drops,
        };

        let corpse = victim.position();
        for (index, item) in leftovers.into_iter().enumerate() {
            let position = Position::new(
                corpse.x + index as f32 * DROP_SPREAD,
                corpse.y,
                corpse.z,
            );
            self.services
                .map
                .place_item(victim.instance(), position, item, Some(killer));
        }
    }

    fn update_quests(&self, victim: &Arc<dyn Killable>, killer: Option<Arc<dyn Killable>>) {
        let (CombatantKind::Monster(monster), Some(killer)) = (victim.kind(), killer) else {
            return;
        };

        let members = self
            .services
            .parties
            .members_on_instance(killer.id(), killer.instance())
            .unwrap_or_else(|| vec![killer]);

        for member in members {
            self.services.quests.record_monster_kill(member.id(), monster);
            self.services.persistence.enqueue(PersistMutation::KillCount {
                entity: member.id(),
                monster,
            });
        }
    }

    /// Bring `entity` back at a respawn point.
    ///
    /// Restores full resources, clears the death flag, repositions, and,
    /// when the spawn point is on another map, asks the map service for a
    /// transfer.
    pub fn rebirth(&self, entity: &Arc<dyn Killable>, map: MapId, position: Position) {
        let from_map = entity.map();

        entity.resources().revive();
        entity.relocate(map, position);

        self.events.publish(CombatEvent::Rebirthed {
            entity: entity.id(),
        });

        if map != from_map {
            self.services.map.transfer(entity.id(), map, position);
        }

        let pool = entity.resources();
        self.services.persistence.enqueue(PersistMutation::Resources {
            entity: entity.id(),
            hp: pool.hp(),
            mp: pool.mp(),
            sp: pool.sp(),
        });
    }
}
