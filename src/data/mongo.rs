//! MongoDB-backed repositories.
//!
//! Documents are converted to JSON with every `ObjectId` rendered as its
//! 24-character hex string, so clients never see extended-JSON `$oid` wrappers.

use crate::domain::repository::{ShoppingListRepository, ShoppingRepository, UserRepository};
use crate::domain::shopping::{CheckedItem, Fields, ItemUpdate, ShoppingListEntry, ShoppingTrip};
use crate::domain::user::User;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc, oid::ObjectId, to_bson, to_document};
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, trace};

pub const USERS: &str = "users";
pub const SHOPPING: &str = "shopping";
pub const SHOPPING_LIST: &str = "shoppingList";

/// Connects and pings the deployment once so bad credentials fail at start-up.
#[instrument(skip(uri))]
pub async fn connect(uri: &str, db_name: &str) -> Result<Database> {
    let client = Client::with_uri_str(uri)
        .await
        .context("Failed to create MongoDB client")?;
    let database = client.database(db_name);
    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("Failed to ping MongoDB deployment")?;
    info!(database = db_name, "Pinged MongoDB deployment");
    Ok(database)
}

fn hex_ids(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::Document(document) => Bson::Document(
            document
                .into_iter()
                .map(|(key, value)| (key, hex_ids(value)))
                .collect(),
        ),
        Bson::Array(values) => Bson::Array(values.into_iter().map(hex_ids).collect()),
        other => other,
    }
}

/// Converts a stored document into its client-facing JSON form.
pub fn document_to_json(document: Document) -> serde_json::Value {
    hex_ids(Bson::Document(document)).into_relaxed_extjson()
}

fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    serde_json::from_value(document_to_json(document)).context("Unexpected document shape")
}

fn inserted_hex(inserted_id: &Bson) -> Result<String> {
    inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .ok_or_else(|| anyhow!("Inserted id is not an ObjectId: {}", inserted_id))
}

async fn find_all<T: DeserializeOwned>(
    collection: &Collection<Document>,
    sort: Option<Document>,
) -> Result<Vec<T>> {
    let documents: Vec<Document> = match sort {
        Some(sort) => collection.find(doc! {}).sort(sort).await?,
        None => collection.find(doc! {}).await?,
    }
    .try_collect()
    .await?;
    trace!(count = documents.len(), "Fetched documents");
    documents.into_iter().map(from_document).collect()
}

#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<Document>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self), fields(email = %user.email))]
    async fn insert_user(&self, mut user: User) -> Result<String> {
        user.id = None;
        let result = self.collection.insert_one(to_document(&user)?).await?;
        let id = inserted_hex(&result.inserted_id)?;
        debug!(user_id = %id, "User inserted");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.collection
            .find_one(doc! { "email": email })
            .await?
            .map(from_document)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>> {
        find_all(&self.collection, None).await
    }
}

#[derive(Clone)]
pub struct MongoShoppingRepository {
    collection: Collection<Document>,
}

impl MongoShoppingRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(SHOPPING),
        }
    }
}

#[async_trait]
impl ShoppingRepository for MongoShoppingRepository {
    #[instrument(skip(self))]
    async fn list_trips(&self) -> Result<Vec<ShoppingTrip>> {
        find_all(&self.collection, Some(doc! { "_id": -1 })).await
    }

    #[instrument(skip(self))]
    async fn find_trip(&self, id: &ObjectId) -> Result<Option<ShoppingTrip>> {
        self.collection
            .find_one(doc! { "_id": *id })
            .await?
            .map(from_document)
            .transpose()
    }

    #[instrument(skip(self, fields))]
    async fn insert_trip(&self, mut fields: Fields) -> Result<String> {
        fields.remove("_id");
        let result = self.collection.insert_one(to_document(&fields)?).await?;
        inserted_hex(&result.inserted_id)
    }

    #[instrument(skip(self))]
    async fn delete_trip(&self, id: &ObjectId) -> Result<u64> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count)
    }

    #[instrument(skip(self, item))]
    async fn push_item(&self, trip_id: &ObjectId, item: CheckedItem) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *trip_id },
                doc! { "$push": { "checkedItems": to_bson(&item)? } },
            )
            .await?;
        debug!(modified = result.modified_count, "Pushed checked item");
        Ok(result.modified_count > 0)
    }

    #[instrument(skip(self, update))]
    async fn set_item(
        &self,
        trip_id: &ObjectId,
        item_id: &str,
        update: &ItemUpdate,
    ) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *trip_id, "checkedItems._id": item_id },
                doc! {
                    "$set": {
                        "checkedItems.$.name": to_bson(&update.name)?,
                        "checkedItems.$.quantity": to_bson(&update.quantity)?,
                        "checkedItems.$.unit": to_bson(&update.unit)?,
                    }
                },
            )
            .await?;
        debug!(matched = result.matched_count, "Updated checked item");
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn pull_item(&self, trip_id: &ObjectId, item_id: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *trip_id },
                doc! { "$pull": { "checkedItems": { "_id": item_id } } },
            )
            .await?;
        debug!(modified = result.modified_count, "Pulled checked item");
        Ok(result.modified_count > 0)
    }
}

#[derive(Clone)]
pub struct MongoShoppingListRepository {
    collection: Collection<Document>,
}

impl MongoShoppingListRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(SHOPPING_LIST),
        }
    }
}

#[async_trait]
impl ShoppingListRepository for MongoShoppingListRepository {
    #[instrument(skip(self))]
    async fn list_entries(&self) -> Result<Vec<ShoppingListEntry>> {
        find_all(&self.collection, None).await
    }
}
