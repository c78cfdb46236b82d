use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<BTreeMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self), fields(email = %user.email))]
    async fn insert_user(&self, mut user: User) -> Result<String> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        let id = ObjectId::new();
        user.id = Some(id.to_hex());
        storage.insert(id, user);
        debug!(user_id = %id, "User saved to memory storage");
        Ok(id.to_hex())
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => {
                debug!(user_id = ?u.id, email = %u.email, "User found in storage");
            }
            None => {
                trace!(email = email, "User not found in storage");
            }
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>> {
        let storage = self.storage.read().await;
        Ok(storage.values().cloned().collect())
    }
}
