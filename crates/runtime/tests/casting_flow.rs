//! Casting state machine: delayed application, expiry re-validation,
//! replacement, and explicit cancellation.

mod common;

use combat_core::AttackVerdict;
use world_runtime::{CombatEvent, CombatantKind, Killable};

use common::*;

fn slow_hit(id: u16) -> combat_core::Skill {
    skill(combat_core::SkillTemplate {
        cast_time_ms: 500,
        need_mp: 10,
        ..tpl(id)
    })
}

#[tokio::test]
async fn cast_delays_application_until_timer_fires() {
    let harness = TestHarness::new();
    let engine = harness.build();
    let mut rx = harness.bus.subscribe();

    let caster = spawn(&harness, 1, CombatantKind::Player);
    let target = spawn(&harness, 2, CombatantKind::Player);

    let verdict = engine.start_casting(
        as_killable(&caster),
        slow_hit(30),
        Some(as_killable(&target)),
    );
    assert_eq!(verdict, AttackVerdict::Normal);
    settle().await;

    // Casting: announced, but nothing applied and nothing charged yet.
    assert!(caster.casting().is_casting());
    assert_eq!(target.resources().hp(), 100);
    assert_eq!(caster.resources().mp(), 50);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], CombatEvent::CastStarted { .. }));

    harness.scheduler.release_all();
    settle().await;

    // Timer fired: session cleared, cost charged once, damage applied.
    assert!(!caster.casting().is_casting());
    assert_eq!(caster.resources().mp(), 40);
    assert_eq!(target.resources().hp(), 85);
    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], CombatEvent::SkillUsed { .. }));
}

#[tokio::test]
async fn target_death_during_cast_fizzles_cleanly() {
    let harness = TestHarness::new();
    let engine = harness.build();
    let mut rx = harness.bus.subscribe();

    let caster = spawn(&harness, 1, CombatantKind::Player);
    let target = spawn(&harness, 2, CombatantKind::Player);

    engine.start_casting(
        as_killable(&caster),
        slow_hit(31),
        Some(as_killable(&target)),
    );
    settle().await;
    drain(&mut rx);

    // Target dies mid-cast.
    target.take_hp_damage(100, None);

    harness.scheduler.release_all();
    settle().await;

    // Re-validation failed: session cleared, no application, no cost.
    assert!(!caster.casting().is_casting());
    assert_eq!(caster.resources().mp(), 50);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn instant_skills_have_no_observable_casting_state() {
    let harness = TestHarness::new();
    let engine = harness.build();
    let mut rx = harness.bus.subscribe();

    let caster = spawn(&harness, 1, CombatantKind::Player);
    let target = spawn(&harness, 2, CombatantKind::Player);

    engine.start_casting(as_killable(&caster), skill(tpl(32)), Some(as_killable(&target)));

    assert!(!caster.casting().is_casting());
    assert_eq!(target.resources().hp(), 85);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], CombatEvent::SkillUsed { .. }));
}

#[tokio::test]
async fn second_cast_replaces_the_pending_one() {
    let harness = TestHarness::new();
    let engine = harness.build();
    let mut rx = harness.bus.subscribe();

    let caster = spawn(&harness, 1, CombatantKind::Player);
    let target = spawn(&harness, 2, CombatantKind::Player);

    engine.start_casting(
        as_killable(&caster),
        slow_hit(33),
        Some(as_killable(&target)),
    );
    settle().await;
    engine.start_casting(
        as_killable(&caster),
        slow_hit(34),
        Some(as_killable(&target)),
    );
    settle().await;

    harness.scheduler.release_all();
    settle().await;

    // Only the replacement applied: one charge, one hit.
    assert_eq!(caster.resources().mp(), 40);
    assert_eq!(target.resources().hp(), 85);

    let used: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            CombatEvent::SkillUsed { skill, .. } => Some(skill),
            _ => None,
        })
        .collect();
    assert_eq!(used, vec![combat_core::SkillId(34)]);
}

#[tokio::test]
async fn cancelled_cast_never_completes() {
    let harness = TestHarness::new();
    let engine = harness.build();
    let mut rx = harness.bus.subscribe();

    let caster = spawn(&harness, 1, CombatantKind::Player);
    let target = spawn(&harness, 2, CombatantKind::Player);

    engine.start_casting(
        as_killable(&caster),
        slow_hit(35),
        Some(as_killable(&target)),
    );
    settle().await;
    drain(&mut rx);

    // Disconnect path: explicit cancellation.
    assert!(caster.casting().cancel().is_some());

    harness.scheduler.release_all();
    settle().await;

    assert!(!caster.casting().is_casting());
    assert_eq!(target.resources().hp(), 100);
    assert_eq!(caster.resources().mp(), 50);
    assert!(drain(&mut rx).is_empty());
}
