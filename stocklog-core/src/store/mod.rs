//! Persistence layer: durable key-value storage, per-key change
//! notifications, and reactive in-memory mirrors.

mod bus;
mod cell;
mod kv;

pub use bus::{ChangeBus, ChangeMessage};
pub use cell::{CellState, SyncedValue};
pub use kv::{KvStore, StoreError, SCHEMA_VERSION};
