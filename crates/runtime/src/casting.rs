//! Per-entity casting state.
//!
//! Idle → Casting → Idle, driven by a single-shot timer the engine spawns
//! through an injected [`CastScheduler`]. Sessions carry a generation
//! number: cancellation and replacement bump it, so a timer that fires for
//! a stale session finds nothing to complete and dies silently instead of
//! racing the new cast.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use combat_core::{EntityId, Skill};

/// Timer source for cast delays.
///
/// Production uses [`TokioScheduler`]; tests inject [`ManualScheduler`] and
/// release pending delays explicitly, so cast expiry is deterministic
/// without real time passing.
#[async_trait]
pub trait CastScheduler: Send + Sync {
    async fn delay(&self, duration: Duration);
}

/// Wall-clock delays via `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

#[async_trait]
impl CastScheduler for TokioScheduler {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Hand-stepped delays for tests: every `delay` call parks until
/// [`ManualScheduler::release_all`] is invoked.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    notify: Notify,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake every currently parked delay.
    pub fn release_all(&self) {
        self.notify.notify_waiters();
    }
}

#[async_trait]
impl CastScheduler for ManualScheduler {
    async fn delay(&self, _duration: Duration) {
        self.notify.notified().await;
    }
}

/// The skill an entity is currently casting.
#[derive(Clone, Debug)]
pub struct CastSession {
    pub skill: Skill,
    pub target: Option<EntityId>,
    generation: u64,
}

/// Casting state machine for one entity. At most one live session.
///
/// Policy for a second `begin` while a session is pending: the old session
/// is cancelled and replaced.
#[derive(Debug, Default)]
pub struct CastingState {
    session: Mutex<Option<CastSession>>,
    generation: AtomicU64,
}

impl CastingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_casting(&self) -> bool {
        self.session.lock().expect("cast session poisoned").is_some()
    }

    /// Record a new session, replacing any pending one. Returns the
    /// generation the timer must present to [`CastingState::complete`].
    pub fn begin(&self, skill: Skill, target: Option<EntityId>) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let mut session = self.session.lock().expect("cast session poisoned");
        if session.is_some() {
            tracing::debug!(generation, "pending cast replaced");
        }
        *session = Some(CastSession {
            skill,
            target,
            generation,
        });
        generation
    }

    /// Take the session if `generation` still matches. A stale timer (the
    /// session was cancelled or replaced meanwhile) gets `None`.
    pub fn complete(&self, generation: u64) -> Option<CastSession> {
        let mut session = self.session.lock().expect("cast session poisoned");
        match session.as_ref() {
            Some(current) if current.generation == generation => session.take(),
            _ => None,
        }
    }

    /// Explicit cancellation (stun, disconnect). Bumps the generation so an
    /// in-flight timer cannot complete the cancelled session.
    pub fn cancel(&self) -> Option<CastSession> {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.session.lock().expect("cast session poisoned").take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{SkillId, SkillTemplate};

    fn skill() -> Skill {
        Skill::new(SkillTemplate::basic(SkillId(1), 1), 0, 1)
    }

    #[test]
    fn complete_with_matching_generation() {
        let casting = CastingState::new();
        let generation = casting.begin(skill(), Some(EntityId(2)));
        assert!(casting.is_casting());

        let session = casting.complete(generation).unwrap();
        assert_eq!(session.target, Some(EntityId(2)));
        assert!(!casting.is_casting());
    }

    #[test]
    fn cancel_invalidates_pending_timer() {
        let casting = CastingState::new();
        let generation = casting.begin(skill(), None);

        assert!(casting.cancel().is_some());
        assert!(casting.complete(generation).is_none());
    }

    #[test]
    fn replacement_invalidates_older_generation() {
        let casting = CastingState::new();
        let first = casting.begin(skill(), None);
        let second = casting.begin(skill(), Some(EntityId(3)));

        assert!(casting.complete(first).is_none());
        let session = casting.complete(second).unwrap();
        assert_eq!(session.target, Some(EntityId(3)));
    }
}
