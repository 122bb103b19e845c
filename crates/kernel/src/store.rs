//! Storage abstraction the seed steps run against.
//!
//! A store is bound to one target database at construction time. The
//! administrative login happens through [`SeedStore::authenticate`], which must
//! succeed before any other operation is accepted.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::settings::Credentials;

/// Role granted to the application user on the target database.
pub const READ_WRITE_ROLE: &str = "readWrite";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store operation attempted before authenticating")]
    NotAuthenticated,

    #[error("authentication failed for user '{username}'")]
    AuthenticationFailed { username: String },

    #[error("user '{username}' already exists")]
    UserExists { username: String },

    #[error("collection '{collection}' already exists")]
    CollectionExists { collection: String },

    #[error("{operation} failed")]
    Backend {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    pub fn backend(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            operation,
            source: source.into(),
        }
    }
}

/// Operations the seeder needs from a document database.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Log in as the administrative user against the administrative database.
    async fn authenticate(&self, admin: &Credentials) -> Result<(), StoreError>;

    /// Create a user scoped to the target database.
    async fn create_user(&self, user: &Credentials, roles: &[&str]) -> Result<(), StoreError>;

    async fn create_collection(&self, collection: &str) -> Result<(), StoreError>;

    async fn insert_one(&self, collection: &str, document: Value) -> Result<(), StoreError>;

    /// Roles held by `username` on the target database, or `None` if the user does not exist.
    async fn user_roles(&self, username: &str) -> Result<Option<Vec<String>>, StoreError>;

    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// Every document of `collection` in insertion order.
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}

#[derive(Default)]
struct MemoryState {
    authenticated: bool,
    users: BTreeMap<String, Vec<String>>,
    collections: BTreeMap<String, Vec<Value>>,
    next_id: u64,
}

/// In-process store that mirrors how MongoDB treats the seed operations.
///
/// Duplicate users and explicit re-creation of a collection fail; inserting
/// into a missing collection creates it; duplicate documents are accepted.
pub struct MemoryStore {
    admin: Credentials,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store that accepts `admin` as its administrative login.
    pub fn new(admin: Credentials) -> Self {
        Self {
            admin,
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn authenticated(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.state();
        if state.authenticated {
            Ok(state)
        } else {
            Err(StoreError::NotAuthenticated)
        }
    }
}

#[async_trait]
impl SeedStore for MemoryStore {
    async fn authenticate(&self, admin: &Credentials) -> Result<(), StoreError> {
        if *admin != self.admin {
            return Err(StoreError::AuthenticationFailed {
                username: admin.username.clone(),
            });
        }
        self.state().authenticated = true;
        Ok(())
    }

    async fn create_user(&self, user: &Credentials, roles: &[&str]) -> Result<(), StoreError> {
        let mut state = self.authenticated()?;
        if state.users.contains_key(&user.username) {
            return Err(StoreError::UserExists {
                username: user.username.clone(),
            });
        }
        state.users.insert(
            user.username.clone(),
            roles.iter().map(|role| role.to_string()).collect(),
        );
        Ok(())
    }

    async fn create_collection(&self, collection: &str) -> Result<(), StoreError> {
        let mut state = self.authenticated()?;
        if state.collections.contains_key(collection) {
            return Err(StoreError::CollectionExists {
                collection: collection.to_string(),
            });
        }
        state.collections.insert(collection.to_string(), Vec::new());
        Ok(())
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<(), StoreError> {
        let mut state = self.authenticated()?;
        let mut document = match document {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::backend(
                    "insert_one",
                    format!("expected a JSON object, got {other}"),
                ))
            }
        };

        if !document.contains_key("_id") {
            state.next_id += 1;
            document.insert("_id".to_string(), Value::from(format!("{:024x}", state.next_id)));
        }

        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Value::Object(document));
        Ok(())
    }

    async fn user_roles(&self, username: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.authenticated()?.users.get(username).cloned())
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.authenticated()?.collections.keys().cloned().collect())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .authenticated()?
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}
