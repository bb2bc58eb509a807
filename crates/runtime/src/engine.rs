//! The effect pipeline: validation, casting, targeting, and application.
//!
//! [`SkillEngine`] consumes one "use skill X on target Y" request at a
//! time. Requests with a cast time pass through the per-entity casting
//! state machine first; instant skills go straight to [`SkillEngine::use_skill`].
//! Costs are charged exactly once per use, after validation; a failed
//! attempt never costs anything.
//!
//! All collaborators (event bus, roll source, scheduler, world services)
//! are injected at construction so every branch is testable without a
//! running world server.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, trace, warn};

use combat_core::{
    AttackKind, AttackResult, AttackVerdict, EffectKind, EntityId, RollOracle, Skill, StateKind,
    TargetKind, resolve, resolve_heal,
};

use crate::casting::CastScheduler;
use crate::combatant::Killable;
use crate::death::DeathPipeline;
use crate::error::{CombatError, Result};
use crate::events::{CombatEvent, EventBus};
use crate::world::WorldServices;

/// Status groups that lock out an attack category.
const PHYSICAL_LOCKS: [StateKind; 3] = [StateKind::Sleep, StateKind::Stun, StateKind::Silence];
const MAGIC_LOCKS: [StateKind; 3] = [StateKind::Sleep, StateKind::Stun, StateKind::Darkness];

/// Orchestrates skill use for every entity on a map.
///
/// The engine is shared behind an `Arc`; per-entity state (cast sessions,
/// pools, ledgers) lives on the entities themselves.
pub struct SkillEngine {
    events: EventBus,
    rolls: Arc<dyn RollOracle>,
    scheduler: Arc<dyn CastScheduler>,
    services: Arc<WorldServices>,
    death: DeathPipeline,
}

impl SkillEngine {
    pub fn new(
        events: EventBus,
        rolls: Arc<dyn RollOracle>,
        scheduler: Arc<dyn CastScheduler>,
        services: Arc<WorldServices>,
    ) -> Self {
        let death = DeathPipeline::new(events.clone(), services.clone());
        Self {
            events,
            rolls,
            scheduler,
            services,
            death,
        }
    }

    /// Death and rebirth handling, for callers outside the skill path
    /// (environmental damage, respawn requests).
    pub fn death(&self) -> &DeathPipeline {
        &self.death
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check preconditions without charging anything.
    ///
    /// Runs when a cast starts and again when its timer expires; the
    /// target may have died or fled during the delay.
    pub fn can_use(
        &self,
        caster: &dyn Killable,
        skill: &Skill,
        target: Option<&dyn Killable>,
    ) -> AttackVerdict {
        let needs_target = matches!(
            skill.target,
            TargetKind::SelectedEnemy | TargetKind::EnemiesNearTarget
        );
        if needs_target && !target.is_some_and(|t| !t.is_dead()) {
            return AttackVerdict::WrongTarget;
        }

        if !caster
            .resources()
            .can_afford(skill.need_mp as u32, skill.need_sp as u32)
        {
            return AttackVerdict::NotEnoughResource;
        }

        let locks: &[StateKind] = match skill.attack {
            AttackKind::Physical | AttackKind::Shooting => &PHYSICAL_LOCKS,
            AttackKind::Magic => &MAGIC_LOCKS,
            AttackKind::Passive => &[],
        };
        if caster.buffs().has_any_state(locks) {
            return AttackVerdict::CannotAttack;
        }

        AttackVerdict::Normal
    }

    // ========================================================================
    // Casting
    // ========================================================================

    /// Begin a skill use, honoring the skill's cast time.
    ///
    /// Returns the validation verdict; anything but `Normal` means nothing
    /// happened and nothing was charged. A second call while a cast is
    /// pending replaces the pending session.
    pub fn start_casting(
        self: &Arc<Self>,
        caster: Arc<dyn Killable>,
        skill: Skill,
        target: Option<Arc<dyn Killable>>,
    ) -> AttackVerdict {
        let verdict = self.can_use(caster.as_ref(), &skill, target.as_deref());
        if verdict != AttackVerdict::Normal {
            debug!(caster = %caster.id(), skill = %skill.id(), %verdict, "cast rejected");
            return verdict;
        }

        // Instant skills have no observable casting state.
        if skill.cast_time_ms == 0 {
            if let Err(e) = self.use_skill(&caster, &skill, target.as_ref()) {
                error!(error = %e, caster = %caster.id(), "skill aborted");
            }
            return AttackVerdict::Normal;
        }

        let generation = caster
            .casting()
            .begin(skill.clone(), target.as_ref().map(|t| t.id()));

        self.events.publish(CombatEvent::CastStarted {
            caster: caster.id(),
            target: target.as_ref().map(|t| t.id()),
            skill: skill.id(),
        });

        let engine = Arc::clone(self);
        let duration = Duration::from_millis(skill.cast_time_ms as u64);
        tokio::spawn(async move {
            engine.scheduler.delay(duration).await;
            engine.finish_cast(caster, target, generation);
        });

        AttackVerdict::Normal
    }

    /// Timer expiry. The session is cleared whether or not the skill still
    /// applies; a stale generation (cancelled or replaced cast) is a no-op.
    fn finish_cast(
        &self,
        caster: Arc<dyn Killable>,
        target: Option<Arc<dyn Killable>>,
        generation: u64,
    ) {
        let Some(session) = caster.casting().complete(generation) else {
            trace!(caster = %caster.id(), "stale cast timer ignored");
            return;
        };

        let verdict = self.can_use(caster.as_ref(), &session.skill, target.as_deref());
        if verdict != AttackVerdict::Normal {
            debug!(caster = %caster.id(), %verdict, "cast fizzled on completion");
            return;
        }

        if let Err(e) = self.use_skill(&caster, &session.skill, target.as_ref()) {
            error!(error = %e, caster = %caster.id(), "skill aborted");
        }
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Apply a validated skill use: charge costs once, then run the
    /// multi-hit loop over the resolved target set.
    pub fn use_skill(
        &self,
        caster: &Arc<dyn Killable>,
        skill: &Skill,
        target: Option<&Arc<dyn Killable>>,
    ) -> Result<()> {
        if (skill.need_mp > 0 || skill.need_sp > 0)
            && !caster
                .resources()
                .try_spend(skill.need_mp as u32, skill.need_sp as u32)
        {
            // Validated earlier; a concurrent drain can still win the race.
            warn!(caster = %caster.id(), skill = %skill.id(), "resources drained before use");
            return Ok(());
        }

        let hits = skill.multi_attack.max(1);
        for n in 0..hits {
            for resolved_target in self.resolve_targets(caster, skill, target) {
                if let Err(e) = self.apply_to_target(caster, skill, target, &resolved_target, n) {
                    // Malformed configuration: abort this application, keep
                    // the entity usable.
                    error!(error = %e, caster = %caster.id(), "skill effect aborted");
                }
            }
        }

        Ok(())
    }

    /// Resolve the target set for one hit iteration.
    fn resolve_targets(
        &self,
        caster: &Arc<dyn Killable>,
        skill: &Skill,
        target: Option<&Arc<dyn Killable>>,
    ) -> Vec<Arc<dyn Killable>> {
        match skill.target {
            TargetKind::None | TargetKind::Caster => vec![Arc::clone(caster)],

            TargetKind::SelectedEnemy => {
                vec![target.map(Arc::clone).unwrap_or_else(|| Arc::clone(caster))]
            }

            TargetKind::PartyMembers => {
                match self
                    .services
                    .parties
                    .members_on_instance(caster.id(), caster.instance())
                {
                    Some(members) => {
                        let origin = caster.position();
                        members
                            .into_iter()
                            .filter(|m| {
                                m.position().ground_distance(&origin) < skill.apply_range as f32
                            })
                            .collect()
                    }
                    None => vec![Arc::clone(caster)],
                }
            }

            TargetKind::EnemiesNearTarget => {
                let anchor = target
                    .map(|t| t.position())
                    .unwrap_or_else(|| caster.position());
                self.services.map.enemies_near(
                    caster.id(),
                    caster.instance(),
                    anchor,
                    skill.apply_range,
                )
            }
        }
    }

    /// One (target, iteration) application: accuracy roll, effect dispatch,
    /// damage application, death check.
    fn apply_to_target(
        &self,
        caster: &Arc<dyn Killable>,
        skill: &Skill,
        initial: Option<&Arc<dyn Killable>>,
        target: &Arc<dyn Killable>,
        n: u8,
    ) -> Result<()> {
        let initial_id = initial.map(|t| t.id());

        let result = if skill.attack != AttackKind::Passive {
            let attack = caster.stats().attack_snapshot();
            let mut defense = target.stats().defense_snapshot();
            defense.untouchable =
                defense.untouchable || target.buffs().has_state(StateKind::Untouchable);

            let resolved = resolve(&skill.template, &attack, &defense, self.rolls.as_ref());
            if resolved.is_miss() {
                self.publish_outcome(
                    caster.id(),
                    target.id(),
                    skill,
                    AttackResult::MISS,
                    initial_id == Some(target.id()),
                );
                return Ok(());
            }
            resolved
        } else {
            // Pure buffs bypass the hit/miss roll entirely.
            AttackResult::of(AttackVerdict::Normal)
        };

        let result = self.perform_skill(caster, skill, initial_id, target, result, n)?;

        // Heals applied their increases inside the dispatch; everything
        // else lands here. HP routes through the death-detecting decrement,
        // SP/MP are plain subtractions.
        if skill.effect != EffectKind::Heal {
            if result.damage.hp > 0 {
                let outcome = target.take_hp_damage(result.damage.hp, Some(caster.id()));
                if outcome.crossed_zero {
                    self.death.execute(target);
                }
            }
            if result.damage.sp > 0 {
                target.resources().decrease_sp(result.damage.sp);
            }
            if result.damage.mp > 0 {
                target.resources().decrease_mp(result.damage.mp);
            }
        }

        Ok(())
    }

    /// Effect-kind dispatch. Returns the result that is broadcast and, for
    /// damaging kinds, applied to the target's pool.
    fn perform_skill(
        &self,
        caster: &Arc<dyn Killable>,
        skill: &Skill,
        initial_id: Option<EntityId>,
        target: &Arc<dyn Killable>,
        result: AttackResult,
        n: u8,
    ) -> Result<AttackResult> {
        let result = match skill.effect {
            kind if kind.is_buff() => {
                target.buffs().add_from_skill(skill, Some(caster.id()));
                // An incapacitating application interrupts the target's cast.
                if matches!(skill.state, StateKind::Sleep | StateKind::Stun)
                    && target.casting().cancel().is_some()
                {
                    debug!(target = %target.id(), "cast interrupted by status");
                }
                result
            }

            EffectKind::Heal => {
                let healed = resolve_heal(&skill.template, &caster.stats().attack_snapshot());
                let pool = target.resources();
                pool.increase_hp(healed.damage.hp);
                pool.increase_mp(healed.damage.mp);
                pool.increase_sp(healed.damage.sp);
                healed
            }

            EffectKind::Dispel => {
                let removed = target.buffs().cancel_where(|b| b.is_debuff());
                debug!(target = %target.id(), count = removed.len(), "debuffs dispelled");
                AttackResult::of(AttackVerdict::Normal)
            }

            EffectKind::Stealth => {
                target.buffs().add_from_skill(skill, Some(caster.id()));
                AttackResult::of(AttackVerdict::Normal)
            }

            EffectKind::DirectHit | EffectKind::MultiHit => result,

            // Consumed by stat aggregation, inert in the pipeline.
            EffectKind::PassiveDefence | EffectKind::WeaponMastery => result,

            other => {
                return Err(CombatError::UnsupportedEffect {
                    skill: skill.id(),
                    effect: other,
                });
            }
        };

        let direct =
            (initial_id == Some(target.id()) || target.id() == caster.id()) && n == 0;
        self.publish_outcome(caster.id(), target.id(), skill, result, direct);

        Ok(result)
    }

    fn publish_outcome(
        &self,
        caster: EntityId,
        target: EntityId,
        skill: &Skill,
        result: AttackResult,
        direct: bool,
    ) {
        let event = if direct {
            CombatEvent::SkillUsed {
                caster,
                target,
                skill: skill.id(),
                result,
            }
        } else {
            CombatEvent::RangeSkillUsed {
                caster,
                target,
                skill: skill.id(),
                result,
            }
        };
        self.events.publish(event);
    }
}
