//! In-memory user directory
//!
//! Users live in a sharded concurrent map keyed by their id. Ids are random
//! UUIDs assigned on creation and never change afterwards; updates merge the
//! supplied fields over the stored record.

pub mod validation;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::core::{Error, Result};

pub use validation::{LoginForm, UserForm};

/// A directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// New display name
    pub name: Option<String>,
    /// New email
    pub email: Option<String>,
}

/// Users the directory starts with when seeding is enabled
const SEED_USERS: [(&str, &str); 2] = [("John", "john@email.com"), ("Jane", "jane@email.com")];

/// Concurrent in-memory user store
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: DashMap<String, User>,
}

impl UserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding the demo users
    pub fn seeded() -> Self {
        let directory = Self::new();
        for (name, email) in SEED_USERS {
            directory.create(name, email);
        }
        directory
    }

    /// Store a new user under a fresh id
    pub fn create(&self, name: impl Into<String>, email: impl Into<String>) -> User {
        let id = loop {
            let id = Uuid::new_v4().to_string();
            if !self.users.contains_key(&id) {
                break id;
            }
        };
        let user = User {
            id,
            name: name.into(),
            email: email.into(),
        };

        self.users.insert(user.id.clone(), user.clone());
        info!(id = %user.id, name = %user.name, "user created");
        user
    }

    /// Merge `update` into the stored user
    pub fn update(&self, id: &str, update: UserUpdate) -> Result<User> {
        let mut entry = self
            .users
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("user {}", id)))?;

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(email) = update.email {
            entry.email = email;
        }

        let user = entry.clone();
        drop(entry);
        info!(id = %user.id, "user updated");
        Ok(user)
    }

    /// Look up a user by id
    pub fn get(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a user; returns whether anything was removed
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.users.remove(id).is_some();
        if removed {
            info!(id = %id, "user deleted");
        }
        removed
    }

    /// Snapshot of every user, in no particular order
    pub fn list(&self) -> Vec<User> {
        self.users.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of stored users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True when the directory holds no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
