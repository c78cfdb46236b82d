use crate::domain::repository::{ShoppingListRepository, ShoppingRepository};
use crate::domain::shopping::{
    CHECKED_ITEMS, CheckedItem, Fields, ItemUpdate, ShoppingListEntry, ShoppingTrip,
};
use anyhow::{Result, bail};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Trips keyed by ObjectId, so iteration order is insertion order.
#[derive(Clone)]
pub struct InMemoryShoppingRepository {
    storage: Arc<RwLock<BTreeMap<ObjectId, ShoppingTrip>>>,
}

impl InMemoryShoppingRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for InMemoryShoppingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShoppingRepository for InMemoryShoppingRepository {
    async fn list_trips(&self) -> Result<Vec<ShoppingTrip>> {
        let storage = self.storage.read().await;
        Ok(storage.values().rev().cloned().collect())
    }

    async fn find_trip(&self, id: &ObjectId) -> Result<Option<ShoppingTrip>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    #[instrument(skip(self, fields))]
    async fn insert_trip(&self, fields: Fields) -> Result<String> {
        let id = ObjectId::new();
        self.storage
            .write()
            .await
            .insert(id, ShoppingTrip::new(id.to_hex(), fields));
        debug!(trip_id = %id, "Trip saved to memory storage");
        Ok(id.to_hex())
    }

    async fn delete_trip(&self, id: &ObjectId) -> Result<u64> {
        let removed = self.storage.write().await.remove(id);
        Ok(u64::from(removed.is_some()))
    }

    async fn push_item(&self, trip_id: &ObjectId, item: CheckedItem) -> Result<bool> {
        let mut storage = self.storage.write().await;
        let Some(trip) = storage.get_mut(trip_id) else {
            return Ok(false);
        };
        if !trip.push_item(item) {
            bail!("The field '{}' must be an array", CHECKED_ITEMS);
        }
        Ok(true)
    }

    async fn set_item(
        &self,
        trip_id: &ObjectId,
        item_id: &str,
        update: &ItemUpdate,
    ) -> Result<bool> {
        let mut storage = self.storage.write().await;
        match storage
            .get_mut(trip_id)
            .and_then(|trip| trip.item_mut(item_id))
        {
            Some(item) => {
                update.apply(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_item(&self, trip_id: &ObjectId, item_id: &str) -> Result<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage
            .get_mut(trip_id)
            .is_some_and(|trip| trip.remove_item(item_id)))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryShoppingListRepository {
    entries: Arc<RwLock<Vec<ShoppingListEntry>>>,
}

impl InMemoryShoppingListRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ShoppingListEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl ShoppingListRepository for InMemoryShoppingListRepository {
    async fn list_entries(&self) -> Result<Vec<ShoppingListEntry>> {
        Ok(self.entries.read().await.clone())
    }
}
