//! Background tasks kept internal to the crate.

mod persistence;

pub use persistence::{
    JsonLogSink, PersistError, PersistMutation, PersistenceHandle, PersistenceSink,
    PersistenceWorker,
};
