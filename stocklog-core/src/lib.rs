//! Stocklog Core Library
//!
//! Models, durable key-value persistence and cross-instance synchronization
//! for the stocklog inventory tracker.

pub mod inventory;
pub mod models;
pub mod store;

pub use inventory::{
    export_filename, Inventory, InventoryError, Snapshot, ITEMS_KEY, MOVEMENTS_KEY, SETTINGS_KEY,
};
pub use models::{AppSettings, Item, Movement, MovementType, Theme};
pub use store::{CellState, ChangeBus, ChangeMessage, KvStore, StoreError, SyncedValue};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
