//! Damage & resource pool with atomic death-crossing detection.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use combat_core::EntityId;

use crate::events::{CombatEvent, EventBus};

/// Which pool a maximum-changed notification refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Hp,
    Mp,
    Sp,
}

#[derive(Clone, Copy, Debug)]
struct PoolState {
    hp: u32,
    mp: u32,
    sp: u32,
    max_hp: u32,
    max_mp: u32,
    max_sp: u32,
}

/// Outcome of one HP decrement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HpDecrease {
    pub remaining: u32,
    /// True exactly once per life: this decrement took HP to zero and won
    /// the death-flag race. The caller that observes it runs the death
    /// pipeline.
    pub crossed_zero: bool,
}

/// Current/max HP, MP, SP for one entity.
///
/// All mutation goes through a single mutex so concurrent attackers see a
/// consistent pool, and the zero-cross check is atomic with the decrement:
/// two killing blows can both bring HP to zero, but only one observes
/// `crossed_zero`.
#[derive(Debug)]
pub struct ResourcePool {
    owner: EntityId,
    state: Mutex<PoolState>,
    dead: AtomicBool,
    events: EventBus,
}

impl ResourcePool {
    /// A full pool for a freshly spawned entity.
    pub fn new(owner: EntityId, max_hp: u32, max_mp: u32, max_sp: u32, events: EventBus) -> Self {
        Self {
            owner,
            state: Mutex::new(PoolState {
                hp: max_hp,
                mp: max_mp,
                sp: max_sp,
                max_hp,
                max_mp,
                max_sp,
            }),
            dead: AtomicBool::new(false),
            events,
        }
    }

    pub fn hp(&self) -> u32 {
        self.state.lock().expect("resource pool poisoned").hp
    }

    pub fn mp(&self) -> u32 {
        self.state.lock().expect("resource pool poisoned").mp
    }

    pub fn sp(&self) -> u32 {
        self.state.lock().expect("resource pool poisoned").sp
    }

    pub fn max_hp(&self) -> u32 {
        self.state.lock().expect("resource pool poisoned").max_hp
    }

    pub fn max_mp(&self) -> u32 {
        self.state.lock().expect("resource pool poisoned").max_mp
    }

    pub fn max_sp(&self) -> u32 {
        self.state.lock().expect("resource pool poisoned").max_sp
    }

    pub fn is_dead(&self) -> bool {
        self.dead.load(Ordering::Acquire)
    }

    /// Validation-time affordability check; deducts nothing.
    pub fn can_afford(&self, mp: u32, sp: u32) -> bool {
        let state = self.state.lock().expect("resource pool poisoned");
        state.mp >= mp && state.sp >= sp
    }

    /// Charge a skill cost. Both pools are checked and deducted under one
    /// lock; returns false (and deducts nothing) when either is short.
    pub fn try_spend(&self, mp: u32, sp: u32) -> bool {
        let mut state = self.state.lock().expect("resource pool poisoned");
        if state.mp < mp || state.sp < sp {
            return false;
        }
        state.mp -= mp;
        state.sp -= sp;
        true
    }

    /// Death-detecting HP decrement.
    pub fn decrease_hp(&self, amount: u32) -> HpDecrease {
        let mut state = self.state.lock().expect("resource pool poisoned");
        let before = state.hp;
        state.hp = state.hp.saturating_sub(amount);

        let crossed_zero =
            before > 0 && state.hp == 0 && !self.dead.swap(true, Ordering::AcqRel);

        HpDecrease {
            remaining: state.hp,
            crossed_zero,
        }
    }

    /// Plain SP subtraction; no death side effect.
    pub fn decrease_sp(&self, amount: u32) {
        let mut state = self.state.lock().expect("resource pool poisoned");
        state.sp = state.sp.saturating_sub(amount);
    }

    /// Plain MP subtraction; no death side effect.
    pub fn decrease_mp(&self, amount: u32) {
        let mut state = self.state.lock().expect("resource pool poisoned");
        state.mp = state.mp.saturating_sub(amount);
    }

    pub fn increase_hp(&self, amount: u32) {
        let mut state = self.state.lock().expect("resource pool poisoned");
        state.hp = (state.hp + amount).min(state.max_hp);
    }

    pub fn increase_mp(&self, amount: u32) {
        let mut state = self.state.lock().expect("resource pool poisoned");
        state.mp = (state.mp + amount).min(state.max_mp);
    }

    pub fn increase_sp(&self, amount: u32) {
        let mut state = self.state.lock().expect("resource pool poisoned");
        state.sp = (state.sp + amount).min(state.max_sp);
    }

    /// Refill every pool and clear the death flag (rebirth).
    pub fn revive(&self) {
        let mut state = self.state.lock().expect("resource pool poisoned");
        state.hp = state.max_hp;
        state.mp = state.max_mp;
        state.sp = state.max_sp;
        self.dead.store(false, Ordering::Release);
    }

    /// Update one pool maximum (stat aggregation), clamping the current
    /// value and notifying subscribers.
    pub fn set_max(&self, resource: ResourceKind, value: u32) {
        {
            let mut state = self.state.lock().expect("resource pool poisoned");
            match resource {
                ResourceKind::Hp => {
                    state.max_hp = value;
                    state.hp = state.hp.min(value);
                }
                ResourceKind::Mp => {
                    state.max_mp = value;
                    state.mp = state.mp.min(value);
                }
                ResourceKind::Sp => {
                    state.max_sp = value;
                    state.sp = state.sp.min(value);
                }
            }
        }
        self.events.publish(CombatEvent::MaxResourceChanged {
            entity: self.owner,
            resource,
            value,
        });
    }
}
