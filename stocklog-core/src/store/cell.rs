//! Reactive, eventually consistent mirrors of stored values.
//!
//! A [`SyncedValue`] gives its owner an in-memory copy of one stored key:
//! loaded once on open, written through on every change, and kept fresh by
//! draining change notifications published by other handles of the same key.
//!
//! Within one owner, updates are serialized by awaiting each call before
//! issuing the next; there is no write queue or lock. Two updates issued
//! without awaiting each other race, and the last `put` wins. That is an
//! accepted limitation of the design, not an invariant.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;

use super::bus::{ChangeBus, ChangeMessage};
use super::kv::{KvStore, StoreError};

/// Lifecycle of a synced value.
///
/// `Failed` is terminal for the instance: the in-memory value stays at the
/// construction default, mutations are refused, and reopening the cell is the
/// documented recovery path.
#[derive(Clone, Debug, PartialEq)]
pub enum CellState {
    Loading,
    Ready,
    Failed(String),
}

impl CellState {
    pub fn is_ready(&self) -> bool {
        matches!(self, CellState::Ready)
    }

    /// The load failure message, if the cell failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            CellState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// In-memory mirror of one stored key, synchronized with other handles of
/// the same key through the [`ChangeBus`].
///
/// One cell per key per owner, shared by reference; multiple independent
/// cells for the same key in one owner are only coordinated through the bus.
pub struct SyncedValue<T> {
    key: String,
    id: Uuid,
    store: KvStore,
    bus: Arc<ChangeBus>,
    rx: broadcast::Receiver<ChangeMessage>,
    value: T,
    state: CellState,
}

impl<T> SyncedValue<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
{
    /// Opens the cell: adopts the stored value for `key`, or persists and
    /// adopts `default` when the key has never been written.
    ///
    /// A load failure is recorded in the cell state rather than returned, so
    /// callers can surface the `{value, loading, error}` triple.
    pub async fn open(
        store: KvStore,
        bus: Arc<ChangeBus>,
        key: impl Into<String>,
        default: T,
    ) -> Self {
        let key = key.into();
        let rx = bus.subscribe(&key);
        let mut cell = Self {
            key,
            id: Uuid::new_v4(),
            store,
            bus,
            rx,
            value: default,
            state: CellState::Loading,
        };

        cell.state = match cell.load().await {
            Ok(()) => CellState::Ready,
            Err(e) => {
                tracing::warn!(key = %cell.key, error = %e, "synced value failed to load");
                CellState::Failed(e.to_string())
            }
        };

        cell
    }

    async fn load(&mut self) -> Result<(), StoreError> {
        match self.store.get::<T>(&self.key).await? {
            Some(stored) => self.value = stored,
            None => self.store.put(&self.key, &self.value).await?,
        }
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Current in-memory value. Never blocks; before a successful load this
    /// is the construction default.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Replaces the value with `next`.
    pub async fn set(&mut self, next: T) -> Result<(), StoreError> {
        self.write(next).await
    }

    /// Replaces the value with a pure function of the previous value.
    pub async fn update<F>(&mut self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.write(next).await
    }

    /// Persists `next`, then adopts it in memory and notifies other handles.
    /// On a failed write the in-memory value is left unchanged; nothing was
    /// applied, so there is nothing to roll back.
    async fn write(&mut self, next: T) -> Result<(), StoreError> {
        if let CellState::Failed(reason) = &self.state {
            return Err(StoreError::Unavailable(format!(
                "synced value '{}' failed to load: {}",
                self.key, reason
            )));
        }

        let json = serde_json::to_value(&next).map_err(|e| {
            StoreError::Write(self.key.clone(), format!("value does not serialize: {}", e))
        })?;

        self.store.put_value(&self.key, &json).await?;

        self.value = next;
        self.bus.publish(&self.key, json, self.id);

        Ok(())
    }

    /// Drains pending change notifications, adopting each foreign value that
    /// differs structurally from the current one. Returns how many values
    /// were adopted.
    ///
    /// Lagged or undecodable notifications are logged and skipped:
    /// notifications are a freshness hint, [`reload`](Self::reload) against
    /// the store recovers missed ones.
    pub fn apply_broadcasts(&mut self) -> usize {
        let mut adopted = 0;

        loop {
            match self.rx.try_recv() {
                Ok(message) => {
                    if message.origin == self.id {
                        continue;
                    }
                    match serde_json::from_value::<T>(message.value) {
                        Ok(incoming) => {
                            if incoming != self.value {
                                self.value = incoming;
                                adopted += 1;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                key = %self.key,
                                error = %e,
                                "ignoring undecodable change notification"
                            );
                        }
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(key = %self.key, skipped, "change notifications lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        adopted
    }

    /// Re-reads the durable value, replacing the in-memory mirror. The store
    /// is the source of truth whenever notifications may have been missed.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        if let Some(stored) = self.store.get::<T>(&self.key).await? {
            self.value = stored;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (KvStore, Arc<ChangeBus>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = KvStore::open(temp_dir.path().join("test.db")).await.unwrap();
        (store, Arc::new(ChangeBus::new()), temp_dir)
    }

    #[tokio::test]
    async fn test_open_absent_key_persists_default() {
        let (store, bus, _temp) = test_store().await;

        let cell = SyncedValue::open(store.clone(), bus, "count", 7u32).await;

        assert!(cell.is_ready());
        assert_eq!(*cell.value(), 7);

        let stored: Option<u32> = store.get("count").await.unwrap();
        assert_eq!(stored, Some(7));
    }

    #[tokio::test]
    async fn test_open_adopts_stored_value_over_default() {
        let (store, bus, _temp) = test_store().await;
        store.put("count", &42u32).await.unwrap();

        let cell = SyncedValue::open(store, bus, "count", 0u32).await;

        assert_eq!(*cell.value(), 42);
    }

    #[tokio::test]
    async fn test_set_persists_and_adopts() {
        let (store, bus, _temp) = test_store().await;
        let mut cell = SyncedValue::open(store.clone(), bus, "count", 0u32).await;

        cell.set(5).await.unwrap();

        assert_eq!(*cell.value(), 5);
        let stored: Option<u32> = store.get("count").await.unwrap();
        assert_eq!(stored, Some(5));
    }

    #[tokio::test]
    async fn test_update_applies_function_of_previous_value() {
        let (store, bus, _temp) = test_store().await;
        let mut cell = SyncedValue::open(store, bus, "count", 10u32).await;

        cell.update(|prev| prev + 5).await.unwrap();

        assert_eq!(*cell.value(), 15);
    }

    #[tokio::test]
    async fn test_two_handles_converge_through_broadcasts() {
        let (store, bus, _temp) = test_store().await;

        let mut a = SyncedValue::open(store.clone(), bus.clone(), "items", Vec::<u32>::new()).await;
        let mut b = SyncedValue::open(store, bus, "items", Vec::<u32>::new()).await;

        a.set(vec![1, 2, 3]).await.unwrap();
        assert_ne!(a.value(), b.value());

        let adopted = b.apply_broadcasts();
        assert_eq!(adopted, 1);
        assert_eq!(a.value(), b.value());
    }

    #[tokio::test]
    async fn test_own_notifications_are_skipped() {
        let (store, bus, _temp) = test_store().await;
        let mut cell = SyncedValue::open(store, bus, "count", 0u32).await;

        cell.set(1).await.unwrap();
        cell.set(2).await.unwrap();

        // Draining must not regress the value to a stale self-notification.
        assert_eq!(cell.apply_broadcasts(), 0);
        assert_eq!(*cell.value(), 2);
    }

    #[tokio::test]
    async fn test_equal_broadcast_value_is_not_adopted() {
        let (store, bus, _temp) = test_store().await;

        let mut a = SyncedValue::open(store.clone(), bus.clone(), "count", 0u32).await;
        let mut b = SyncedValue::open(store, bus, "count", 0u32).await;

        a.set(3).await.unwrap();
        b.set(3).await.unwrap();

        // b already holds 3; a's notification must not count as an adoption.
        assert_eq!(b.apply_broadcasts(), 0);
        assert_eq!(*b.value(), 3);
    }

    #[tokio::test]
    async fn test_load_failure_is_terminal_and_refuses_writes() {
        let (store, bus, _temp) = test_store().await;
        store.put("count", &"corrupt".to_string()).await.unwrap();

        let mut cell = SyncedValue::open(store, bus, "count", 0u32).await;

        assert!(!cell.is_ready());
        assert!(cell.state().error().is_some());
        assert_eq!(*cell.value(), 0);

        let result = cell.set(1).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_reload_reads_store_as_source_of_truth() {
        let (store, bus, _temp) = test_store().await;
        let mut cell = SyncedValue::open(store.clone(), bus, "count", 0u32).await;

        // A foreign write the cell never saw a notification for.
        store.put("count", &99u32).await.unwrap();
        assert_eq!(*cell.value(), 0);

        cell.reload().await.unwrap();
        assert_eq!(*cell.value(), 99);
    }
}
