//! In-memory user store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("user with id {0} not found")]
    NotFound(u64),
    #[error("user with email {0} already exists")]
    EmailTaken(String),
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<BTreeMap<u64, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two sample users, ids 1 and 2.
    pub fn seeded() -> Self {
        let users = [
            User::new(1, "John Doe", "john@example.com"),
            User::new(2, "Jane Smith", "jane@example.com"),
        ];
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub async fn get(&self, id: u64) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    /// Assigns the next free id; emails are unique.
    pub async fn create(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken(user.email));
        }
        user.id = users.keys().next_back().map_or(1, |last| last + 1);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn update(&self, id: u64, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if users.values().any(|u| u.id != id && u.email == user.email) {
            return Err(StoreError::EmailTaken(user.email));
        }
        user.id = id;
        users.insert(id, user.clone());
        Ok(user)
    }

    pub async fn delete(&self, id: u64) -> Result<User, StoreError> {
        self.users
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::NotFound(id))
    }
}
