use crate::domain::error::DomainError;
use crate::domain::repository::{ShoppingListRepository, ShoppingRepository};
use crate::domain::shopping::{CheckedItem, Fields, ItemUpdate, ShoppingListEntry, ShoppingTrip};
use anyhow::Result;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct ShoppingService {
    trips: Arc<dyn ShoppingRepository>,
    shopping_list: Arc<dyn ShoppingListRepository>,
}

/// Path identifiers must be 24-character hex ObjectIds.
pub fn parse_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw)
        .map_err(|_| DomainError::Validation(format!("Invalid identifier: {}", raw)).into())
}

impl ShoppingService {
    pub fn new(
        trips: Arc<dyn ShoppingRepository>,
        shopping_list: Arc<dyn ShoppingListRepository>,
    ) -> Self {
        Self {
            trips,
            shopping_list,
        }
    }

    pub async fn shopping_list(&self) -> Result<Vec<ShoppingListEntry>> {
        self.shopping_list.list_entries().await
    }

    pub async fn list_trips(&self) -> Result<Vec<ShoppingTrip>> {
        self.trips.list_trips().await
    }

    #[instrument(skip(self))]
    pub async fn get_trip(&self, trip_id: &str) -> Result<ShoppingTrip> {
        let id = parse_id(trip_id)?;
        self.trips
            .find_trip(&id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Document not found".to_string()).into())
    }

    #[instrument(skip(self, fields))]
    pub async fn create_trip(&self, fields: Fields) -> Result<String> {
        let id = self.trips.insert_trip(fields).await?;
        info!(trip_id = %id, "Shopping trip created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn delete_trip(&self, trip_id: &str) -> Result<u64> {
        let id = parse_id(trip_id)?;
        let deleted = self.trips.delete_trip(&id).await?;
        info!(deleted, "Shopping trip delete finished");
        Ok(deleted)
    }

    /// Stamps the item with a fresh id and appends it to the trip.
    #[instrument(skip(self, body))]
    pub async fn add_item(&self, trip_id: &str, body: Fields) -> Result<CheckedItem> {
        let id = parse_id(trip_id)?;
        let item = CheckedItem::with_id(body, ObjectId::new().to_hex());

        if !self.trips.push_item(&id, item.clone()).await? {
            warn!("Push matched no trip");
            return Err(
                DomainError::NotFound("Document not found or item not added".to_string()).into(),
            );
        }
        debug!(item_id = ?item.id(), "Item appended");
        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, trip_id: &str, item_id: &str) -> Result<CheckedItem> {
        let trip = self.get_trip(trip_id).await?;
        trip.item(item_id)
            .ok_or_else(|| DomainError::NotFound("Item not found".to_string()).into())
    }

    #[instrument(skip(self, update))]
    pub async fn update_item(&self, trip_id: &str, item_id: &str, update: ItemUpdate) -> Result<()> {
        let id = parse_id(trip_id)?;
        if !self.trips.set_item(&id, item_id, &update).await? {
            return Err(DomainError::NotFound("Document or item not found".to_string()).into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, trip_id: &str, item_id: &str) -> Result<()> {
        let id = parse_id(trip_id)?;
        if !self.trips.pull_item(&id, item_id).await? {
            return Err(DomainError::NotFound("Item not found".to_string()).into());
        }
        Ok(())
    }
}
