//! Concurrent active-buff ledger.
//!
//! The combat core only registers, cancels, and queries buffs; duration
//! countdown and stacking live in the (external) status-effect engine.
//! Iteration clones a snapshot, so readers never observe a buff
//! mid-removal.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use combat_core::{BuffFlags, EntityId, Skill, SkillId, StateKind};

/// Opaque handle identifying one ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuffHandle(u64);

/// One active effect on an entity.
#[derive(Clone, Debug)]
pub struct ActiveBuff {
    pub handle: BuffHandle,
    pub skill: SkillId,
    pub skill_level: u8,
    pub state: StateKind,
    pub flags: BuffFlags,
    /// Who applied it; None for environment effects.
    pub source: Option<EntityId>,
    pub duration_secs: u32,
}

impl ActiveBuff {
    pub fn is_debuff(&self) -> bool {
        self.flags.contains(BuffFlags::DEBUFF)
    }

    pub fn clears_after_death(&self) -> bool {
        self.flags.contains(BuffFlags::CLEAR_AFTER_DEATH)
    }
}

/// Per-entity collection of active effects.
#[derive(Debug, Default)]
pub struct BuffLedger {
    inner: RwLock<Vec<ActiveBuff>>,
    next_handle: AtomicU64,
}

impl BuffLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `skill` as an active buff applied by `source`.
    pub fn add_from_skill(&self, skill: &Skill, source: Option<EntityId>) -> BuffHandle {
        let handle = BuffHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let buff = ActiveBuff {
            handle,
            skill: skill.id(),
            skill_level: skill.level(),
            state: skill.state,
            flags: skill.flags,
            source,
            duration_secs: skill.duration_secs,
        };
        self.inner.write().expect("buff ledger poisoned").push(buff);
        handle
    }

    /// Cancel one buff by handle.
    pub fn cancel(&self, handle: BuffHandle) -> Option<ActiveBuff> {
        let mut buffs = self.inner.write().expect("buff ledger poisoned");
        let index = buffs.iter().position(|b| b.handle == handle)?;
        Some(buffs.remove(index))
    }

    /// Cancel every buff matching `predicate`, returning the removed
    /// entries in application order.
    pub fn cancel_where(&self, predicate: impl Fn(&ActiveBuff) -> bool) -> Vec<ActiveBuff> {
        let mut buffs = self.inner.write().expect("buff ledger poisoned");
        let mut removed = Vec::new();
        let mut index = 0;
        while index < buffs.len() {
            if predicate(&buffs[index]) {
                removed.push(buffs.remove(index));
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Clone of the active set.
    pub fn snapshot(&self) -> Vec<ActiveBuff> {
        self.inner.read().expect("buff ledger poisoned").clone()
    }

    pub fn any(&self, predicate: impl Fn(&ActiveBuff) -> bool) -> bool {
        self.inner
            .read()
            .expect("buff ledger poisoned")
            .iter()
            .any(|b| predicate(b))
    }

    pub fn has_state(&self, state: StateKind) -> bool {
        self.any(|b| b.state == state)
    }

    /// True when any of `states` is active; the casting validator asks this
    /// for the status-lock groups.
    pub fn has_any_state(&self, states: &[StateKind]) -> bool {
        self.any(|b| states.contains(&b.state))
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("buff ledger poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
