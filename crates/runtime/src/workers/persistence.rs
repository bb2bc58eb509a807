//! Fire-and-forget write queue for durable state mutations.
//!
//! The combat core's in-memory state is the source of truth; the database
//! is eventually consistent. Resolution paths enqueue mutations and move
//! on; nothing in combat ever waits on a write. A background worker
//! drains the queue into an injected [`PersistenceSink`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use combat_core::{EntityId, MonsterId, SkillId};

/// One durable mutation, keyed by entity id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PersistMutation {
    /// Resource pool snapshot (rebirth, periodic saves).
    Resources {
        entity: EntityId,
        hp: u32,
        mp: u32,
        sp: u32,
    },
    /// A skill entered the entity's book.
    SkillLearned {
        entity: EntityId,
        skill: SkillId,
        level: u8,
        number: u8,
    },
    /// Free skill points changed.
    SkillPoints { entity: EntityId, points: u16 },
    /// Quest kill counter increment.
    KillCount { entity: EntityId, monster: MonsterId },
}

/// Sink failure surfaced to the worker log.
#[derive(Debug, thiserror::Error)]
#[error("persistence sink failure: {0}")]
pub struct PersistError(pub String);

/// Destination for drained mutations (database adapter in production).
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn persist(&self, mutation: PersistMutation) -> Result<(), PersistError>;
}

/// Serializes each mutation as one JSON line into the log.
///
/// Default sink for standalone runs; the world server swaps in its
/// database adapter.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLogSink;

#[async_trait]
impl PersistenceSink for JsonLogSink {
    async fn persist(&self, mutation: PersistMutation) -> Result<(), PersistError> {
        let line = serde_json::to_string(&mutation).map_err(|e| PersistError(e.to_string()))?;
        debug!(target: "persistence", %line, "mutation persisted");
        Ok(())
    }
}

/// Cloneable enqueue side of the write queue.
#[derive(Clone, Debug)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<PersistMutation>,
}

impl PersistenceHandle {
    /// Enqueue without waiting. A closed queue (worker shut down) drops the
    /// mutation with a warning; gameplay state is unaffected.
    pub fn enqueue(&self, mutation: PersistMutation) {
        if self.tx.send(mutation).is_err() {
            warn!("persistence worker gone; dropping mutation");
        }
    }
}

/// Background task draining the mutation queue into the sink.
pub struct PersistenceWorker {
    rx: mpsc::UnboundedReceiver<PersistMutation>,
    sink: Arc<dyn PersistenceSink>,
}

impl PersistenceWorker {
    /// Spawn the worker; the returned handle is what resolution paths hold.
    pub fn spawn(sink: Arc<dyn PersistenceSink>) -> (PersistenceHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self { rx, sink };
        let join = tokio::spawn(worker.run());
        (PersistenceHandle { tx }, join)
    }

    async fn run(mut self) {
        while let Some(mutation) = self.rx.recv().await {
            if let Err(e) = self.sink.persist(mutation).await {
                error!(error = %e, "failed to persist mutation");
            }
        }
        debug!("persistence queue closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        seen: Mutex<Vec<PersistMutation>>,
        notify: tokio::sync::Notify,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                notify: tokio::sync::Notify::new(),
            })
        }
    }

    #[async_trait]
    impl PersistenceSink for RecordingSink {
        async fn persist(&self, mutation: PersistMutation) -> Result<(), PersistError> {
            self.seen.lock().unwrap().push(mutation);
            self.notify.notify_one();
            Ok(())
        }
    }

    #[tokio::test]
    async fn mutations_reach_the_sink_in_order() {
        let sink = RecordingSink::new();
        let (handle, join) = PersistenceWorker::spawn(sink.clone());

        handle.enqueue(PersistMutation::SkillPoints {
            entity: EntityId(1),
            points: 4,
        });
        handle.enqueue(PersistMutation::KillCount {
            entity: EntityId(1),
            monster: MonsterId(30),
        });

        sink.notify.notified().await;
        drop(handle);
        join.await.unwrap();

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            PersistMutation::SkillPoints {
                entity: EntityId(1),
                points: 4
            }
        );
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_does_not_panic() {
        let sink = RecordingSink::new();
        let (handle, join) = PersistenceWorker::spawn(sink);

        let extra = handle.clone();
        drop(handle);
        join.abort();
        let _ = join.await;

        extra.enqueue(PersistMutation::SkillPoints {
            entity: EntityId(2),
            points: 1,
        });
    }

    #[tokio::test]
    async fn json_sink_serializes_every_variant() {
        let sink = JsonLogSink;
        for mutation in [
            PersistMutation::Resources {
                entity: EntityId(1),
                hp: 10,
                mp: 20,
                sp: 30,
            },
            PersistMutation::SkillLearned {
                entity: EntityId(1),
                skill: SkillId(5),
                level: 2,
                number: 0,
            },
            PersistMutation::SkillPoints {
                entity: EntityId(1),
                points: 3,
            },
            PersistMutation::KillCount {
                entity: EntityId(1),
                monster: MonsterId(9),
            },
        ] {
            sink.persist(mutation).await.unwrap();
        }
    }
}
