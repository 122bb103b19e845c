//! MongoDB implementation of the seed store.

use std::sync::OnceLock;

use async_trait::async_trait;
use bookstore_kernel::settings::{Credentials, DatabaseSettings};
use bookstore_kernel::store::{SeedStore, StoreError};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Database};
use serde_json::Value;

const APP_NAME: &str = "bookstore-seed";

/// Server error codes the seeder distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerFailure {
    AuthenticationFailed,
    NamespaceExists,
    UserExists,
}

impl ServerFailure {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            18 => Some(Self::AuthenticationFailed),
            48 => Some(Self::NamespaceExists),
            51003 => Some(Self::UserExists),
            _ => None,
        }
    }
}

/// Map a driver error onto the store taxonomy. `subject` names the user or
/// collection the operation was acting on.
fn classify(operation: &'static str, subject: &str, err: MongoError) -> StoreError {
    let failure = match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => Some(ServerFailure::AuthenticationFailed),
        ErrorKind::Command(command) => ServerFailure::from_code(command.code),
        _ => None,
    };

    match failure {
        Some(ServerFailure::AuthenticationFailed) => StoreError::AuthenticationFailed {
            username: subject.to_string(),
        },
        Some(ServerFailure::UserExists) => StoreError::UserExists {
            username: subject.to_string(),
        },
        Some(ServerFailure::NamespaceExists) => StoreError::CollectionExists {
            collection: subject.to_string(),
        },
        None => StoreError::backend(operation, err),
    }
}

/// Seed store backed by a MongoDB deployment.
///
/// The client is built by [`SeedStore::authenticate`], since the driver
/// authenticates as part of establishing a connection.
pub struct MongoStore {
    settings: DatabaseSettings,
    client: OnceLock<Client>,
}

impl MongoStore {
    pub fn new(settings: &DatabaseSettings) -> Self {
        Self {
            settings: settings.clone(),
            client: OnceLock::new(),
        }
    }

    fn database(&self) -> Result<Database, StoreError> {
        self.client
            .get()
            .map(|client| client.database(&self.settings.name))
            .ok_or(StoreError::NotAuthenticated)
    }
}

#[async_trait]
impl SeedStore for MongoStore {
    async fn authenticate(&self, admin: &Credentials) -> Result<(), StoreError> {
        let mut options = ClientOptions::parse(&self.settings.uri)
            .await
            .map_err(|err| StoreError::backend("parse connection string", err))?;

        let mut credential = Credential::default();
        credential.username = Some(admin.username.clone());
        credential.password = Some(admin.password.clone());
        credential.source = Some(self.settings.admin_source.clone());
        options.credential = Some(credential);
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options)
            .map_err(|err| StoreError::backend("build client", err))?;

        // Creating the client does not connect; ping forces the handshake and login.
        client
            .database(&self.settings.admin_source)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| classify("authenticate", &admin.username, err))?;

        tracing::debug!(
            target: "bookstore-db",
            source = %self.settings.admin_source,
            "mongodb handshake complete"
        );

        if self.client.set(client).is_err() {
            tracing::debug!(target: "bookstore-db", "store already authenticated; keeping first client");
        }
        Ok(())
    }

    async fn create_user(&self, user: &Credentials, roles: &[&str]) -> Result<(), StoreError> {
        let roles: Vec<Bson> = roles.iter().map(|role| Bson::from(*role)).collect();

        self.database()?
            .run_command(doc! {
                "createUser": user.username.as_str(),
                "pwd": user.password.as_str(),
                "roles": roles,
            })
            .await
            .map_err(|err| classify("create_user", &user.username, err))?;
        Ok(())
    }

    async fn create_collection(&self, collection: &str) -> Result<(), StoreError> {
        self.database()?
            .create_collection(collection)
            .await
            .map_err(|err| classify("create_collection", collection, err))
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<(), StoreError> {
        let document = bson::to_document(&document)
            .map_err(|err| StoreError::backend("encode document", err))?;

        self.database()?
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(|err| classify("insert_one", collection, err))?;
        Ok(())
    }

    async fn user_roles(&self, username: &str) -> Result<Option<Vec<String>>, StoreError> {
        let reply = self
            .database()?
            .run_command(doc! { "usersInfo": username })
            .await
            .map_err(|err| classify("users_info", username, err))?;

        roles_from_users_info(&reply, &self.settings.name)
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.database()?
            .list_collection_names()
            .await
            .map_err(|err| StoreError::backend("list_collection_names", err))
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let cursor = self
            .database()?
            .collection::<Document>(collection)
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(|err| StoreError::backend("find", err))?;

        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|err| StoreError::backend("find", err))?;

        Ok(documents
            .into_iter()
            .map(|document| Bson::Document(document).into_relaxed_extjson())
            .collect())
    }
}

/// Extract the roles granted on `database` from a `usersInfo` reply.
fn roles_from_users_info(reply: &Document, database: &str) -> Result<Option<Vec<String>>, StoreError> {
    let users = reply
        .get_array("users")
        .map_err(|err| StoreError::backend("users_info", err))?;

    let Some(user) = users.first().and_then(Bson::as_document) else {
        return Ok(None);
    };

    let roles = user
        .get_array("roles")
        .map_err(|err| StoreError::backend("users_info", err))?
        .iter()
        .filter_map(Bson::as_document)
        .filter(|role| role.get_str("db").map_or(true, |db| db == database))
        .filter_map(|role| role.get_str("role").ok().map(str::to_string))
        .collect();

    Ok(Some(roles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_server_codes_are_classified() {
        assert_eq!(
            ServerFailure::from_code(18),
            Some(ServerFailure::AuthenticationFailed)
        );
        assert_eq!(ServerFailure::from_code(48), Some(ServerFailure::NamespaceExists));
        assert_eq!(ServerFailure::from_code(51003), Some(ServerFailure::UserExists));
        assert_eq!(ServerFailure::from_code(11000), None);
    }

    #[test]
    fn roles_are_read_for_target_database_only() {
        let reply = doc! {
            "users": [{
                "user": "mongo",
                "db": "bookstore",
                "roles": [
                    { "role": "readWrite", "db": "bookstore" },
                    { "role": "read", "db": "reporting" },
                ],
            }],
            "ok": 1,
        };

        let roles = roles_from_users_info(&reply, "bookstore").unwrap();
        assert_eq!(roles, Some(vec!["readWrite".to_string()]));
    }

    #[test]
    fn missing_user_yields_none() {
        let reply = doc! { "users": [], "ok": 1 };
        assert_eq!(roles_from_users_info(&reply, "bookstore").unwrap(), None);
    }

    #[tokio::test]
    async fn operations_before_authenticate_are_rejected() {
        let store = MongoStore::new(&DatabaseSettings::default());
        let err = store.create_collection("books").await.unwrap_err();
        assert!(matches!(err, StoreError::NotAuthenticated));
    }
}
