//! Domain operations over the synced collections.
//!
//! [`Inventory`] owns one synced cell per storage key and is the only
//! mutation entry point presentation code is given. Each operation is
//! logically atomic from the caller's perspective, but operations that touch
//! both the items and movements collections issue two independent writes
//! (items first); a movement-write failure after a successful item write is
//! surfaced to the caller rather than rolled back.

mod snapshot;

pub use snapshot::{export_filename, Snapshot};

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AppSettings, Item, Movement, MovementType};
use crate::store::{CellState, ChangeBus, KvStore, StoreError, SyncedValue};

/// Storage key of the items collection.
pub const ITEMS_KEY: &str = "items";
/// Storage key of the movements collection.
pub const MOVEMENTS_KEY: &str = "movements";
/// Storage key of the settings record.
pub const SETTINGS_KEY: &str = "settings";

/// Errors produced by domain operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("no item with id {0}")]
    UnknownItem(Uuid),

    #[error("cannot remove {requested} from '{name}': only {available} in stock")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("stock adjustments require a positive quantity")]
    ZeroQuantity,

    #[error("invalid import format: {0}")]
    InvalidImportFormat(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The synced inventory state: items, movements and settings.
pub struct Inventory {
    items: SyncedValue<Vec<Item>>,
    movements: SyncedValue<Vec<Movement>>,
    settings: SyncedValue<AppSettings>,
}

impl Inventory {
    /// Opens all three cells. A cell that fails to load makes the whole open
    /// fail: without the persisted state nothing else is usable.
    pub async fn open(store: &KvStore, bus: &Arc<ChangeBus>) -> Result<Self, InventoryError> {
        let items = SyncedValue::open(store.clone(), bus.clone(), ITEMS_KEY, Vec::new()).await;
        let movements =
            SyncedValue::open(store.clone(), bus.clone(), MOVEMENTS_KEY, Vec::new()).await;
        let settings =
            SyncedValue::open(store.clone(), bus.clone(), SETTINGS_KEY, AppSettings::default())
                .await;

        for state in [items.state(), movements.state(), settings.state()] {
            if let CellState::Failed(reason) = state {
                return Err(InventoryError::Store(StoreError::Unavailable(
                    reason.clone(),
                )));
            }
        }

        Ok(Self {
            items,
            movements,
            settings,
        })
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[Item] {
        self.items.value()
    }

    /// Movements in insertion order; display order is computed by callers.
    pub fn movements(&self) -> &[Movement] {
        self.movements.value()
    }

    pub fn settings(&self) -> &AppSettings {
        self.settings.value()
    }

    pub fn find_item(&self, id: Uuid) -> Option<&Item> {
        self.items.value().iter().find(|item| item.id == id)
    }

    /// Saves an item: replaces it in place when the id already exists
    /// (position preserved), appends it otherwise. A newly created item with
    /// positive quantity also records a synthetic entry movement dated at the
    /// item's creation time.
    ///
    /// Returns `true` when the item was created, `false` when updated.
    pub async fn save_item(&mut self, item: Item) -> Result<bool, InventoryError> {
        let position = self.items.value().iter().position(|i| i.id == item.id);

        match position {
            Some(index) => {
                let mut next = self.items.value().to_vec();
                next[index] = item;
                self.items.set(next).await?;
                Ok(false)
            }
            None => {
                let initial_entry = (item.quantity > 0).then(|| {
                    Movement::new(item.id, MovementType::Entry, item.quantity)
                        .with_timestamp(item.created_at)
                });

                let mut next = self.items.value().to_vec();
                next.push(item);
                self.items.set(next).await?;

                // The item is durable at this point; a failure below leaves
                // it in place without its entry movement.
                if let Some(movement) = initial_entry {
                    let mut movements = self.movements.value().to_vec();
                    movements.push(movement);
                    self.movements.set(movements).await?;
                }

                Ok(true)
            }
        }
    }

    /// Deletes an item and cascades to every movement referencing it.
    /// Movements of other items are untouched. Returns the removed item.
    pub async fn delete_item(&mut self, id: Uuid) -> Result<Item, InventoryError> {
        let index = self
            .items
            .value()
            .iter()
            .position(|item| item.id == id)
            .ok_or(InventoryError::UnknownItem(id))?;

        let mut next = self.items.value().to_vec();
        let removed = next.remove(index);
        self.items.set(next).await?;

        let remaining: Vec<Movement> = self
            .movements
            .value()
            .iter()
            .filter(|movement| movement.item_id != id)
            .cloned()
            .collect();
        self.movements.set(remaining).await?;

        tracing::debug!(item = %removed.name, "deleted item and its movements");

        Ok(removed)
    }

    /// Adjusts an item's stock and records the movement. An exit that would
    /// drive the quantity negative fails with `InsufficientStock` and writes
    /// nothing. Returns the new quantity.
    pub async fn adjust_stock(
        &mut self,
        id: Uuid,
        quantity: u32,
        kind: MovementType,
    ) -> Result<u32, InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }

        let index = self
            .items
            .value()
            .iter()
            .position(|item| item.id == id)
            .ok_or(InventoryError::UnknownItem(id))?;

        let current = &self.items.value()[index];
        let new_quantity = match kind {
            MovementType::Entry => current.quantity.saturating_add(quantity),
            MovementType::Exit => {
                current
                    .quantity
                    .checked_sub(quantity)
                    .ok_or_else(|| InventoryError::InsufficientStock {
                        name: current.name.clone(),
                        requested: quantity,
                        available: current.quantity,
                    })?
            }
        };

        let mut next = self.items.value().to_vec();
        next[index].quantity = new_quantity;
        self.items.set(next).await?;

        let mut movements = self.movements.value().to_vec();
        movements.push(Movement::new(id, kind, quantity));
        self.movements.set(movements).await?;

        Ok(new_quantity)
    }

    pub async fn update_settings(&mut self, settings: AppSettings) -> Result<(), InventoryError> {
        self.settings.set(settings).await?;
        Ok(())
    }

    /// Produces a snapshot of all three collections. Pure read.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.items.value().clone(),
            self.movements.value().clone(),
            self.settings.value().clone(),
        )
    }

    /// Wholesale-replaces all three collections from a snapshot, items then
    /// movements then settings. Validation happens when the snapshot is
    /// parsed ([`Snapshot::from_json`]); callers confirm with the user before
    /// invoking this.
    pub async fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<(), InventoryError> {
        let Snapshot {
            items,
            movements,
            settings,
            ..
        } = snapshot;

        tracing::info!(
            items = items.len(),
            movements = movements.len(),
            "importing snapshot"
        );

        self.items.set(items).await?;
        self.movements.set(movements).await?;
        self.settings.set(settings).await?;

        Ok(())
    }

    /// Drains pending change notifications on all three cells, adopting
    /// values written by other handles of the same store. Returns how many
    /// values were adopted.
    pub fn refresh(&mut self) -> usize {
        self.items.apply_broadcasts()
            + self.movements.apply_broadcasts()
            + self.settings.apply_broadcasts()
    }
}
