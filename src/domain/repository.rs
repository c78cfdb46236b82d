use crate::domain::shopping::{CheckedItem, Fields, ItemUpdate, ShoppingListEntry, ShoppingTrip};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user and returns the generated id as hex.
    async fn insert_user(&self, user: User) -> Result<String>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Every nested item mutation is a single atomic update of the parent trip.
#[async_trait]
pub trait ShoppingRepository: Send + Sync {
    /// Newest first.
    async fn list_trips(&self) -> Result<Vec<ShoppingTrip>>;
    async fn find_trip(&self, id: &ObjectId) -> Result<Option<ShoppingTrip>>;
    async fn insert_trip(&self, fields: Fields) -> Result<String>;
    /// Returns the number of deleted trips.
    async fn delete_trip(&self, id: &ObjectId) -> Result<u64>;
    /// Returns whether the trip was modified.
    async fn push_item(&self, trip_id: &ObjectId, item: CheckedItem) -> Result<bool>;
    /// Returns whether a trip holding the item matched.
    async fn set_item(&self, trip_id: &ObjectId, item_id: &str, update: &ItemUpdate)
    -> Result<bool>;
    /// Returns whether anything was removed.
    async fn pull_item(&self, trip_id: &ObjectId, item_id: &str) -> Result<bool>;
}

#[async_trait]
pub trait ShoppingListRepository: Send + Sync {
    async fn list_entries(&self) -> Result<Vec<ShoppingListEntry>>;
}
