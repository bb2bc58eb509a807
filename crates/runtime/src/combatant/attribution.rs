//! Kill attribution: cumulative damage per attacker.

use std::collections::HashMap;
use std::sync::Mutex;

use combat_core::EntityId;

/// Concurrent map from attacker id to cumulative damage dealt to the
/// owning entity.
///
/// Totals only grow while the owner is alive; the death pipeline picks the
/// top contributor and clears the map in one critical section. Ties
/// resolve to the lowest entity id so credit is deterministic.
#[derive(Debug, Default)]
pub struct DamageLedger {
    totals: Mutex<HashMap<EntityId, u64>>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one hit's magnitude to `attacker`'s running total.
    pub fn record(&self, attacker: EntityId, amount: u32) {
        if amount == 0 {
            return;
        }
        let mut totals = self.totals.lock().expect("damage ledger poisoned");
        *totals.entry(attacker).or_insert(0) += amount as u64;
    }

    pub fn total(&self, attacker: EntityId) -> u64 {
        self.totals
            .lock()
            .expect("damage ledger poisoned")
            .get(&attacker)
            .copied()
            .unwrap_or(0)
    }

    /// Attacker with the highest cumulative damage.
    pub fn top_contributor(&self) -> Option<(EntityId, u64)> {
        let totals = self.totals.lock().expect("damage ledger poisoned");
        Self::pick_top(&totals)
    }

    /// Pick the credited killer and clear the ledger atomically.
    pub fn credit_and_clear(&self) -> Option<EntityId> {
        let mut totals = self.totals.lock().expect("damage ledger poisoned");
        let top = Self::pick_top(&totals).map(|(id, _)| id);
        totals.clear();
        top
    }

    pub fn clear(&self) {
        self.totals.lock().expect("damage ledger poisoned").clear();
    }

    pub fn is_empty(&self) -> bool {
        self.totals.lock().expect("damage ledger poisoned").is_empty()
    }

    fn pick_top(totals: &HashMap<EntityId, u64>) -> Option<(EntityId, u64)> {
        totals
            .iter()
            .max_by(|(a_id, a_dmg), (b_id, b_dmg)| {
                a_dmg.cmp(b_dmg).then_with(|| b_id.cmp(a_id))
            })
            .map(|(id, dmg)| (*id, *dmg))
    }
}
