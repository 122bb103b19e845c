//! Bookstore seed library
//!
//! Builds the seed plan (administrative login, application user, `books`
//! collection, sample records) and runs or verifies it against a store.

pub mod modules;

use anyhow::{anyhow, ensure, Context};
use bookstore_kernel::settings::{SeedCredentials, Settings};
use bookstore_kernel::store::READ_WRITE_ROLE;
use bookstore_kernel::{SeedCtx, SeedPlan, SeedReport, SeedStore};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

pub use modules::books::{seed_books, Book};

/// Build the full plan: core steps followed by every project module
pub fn build_plan() -> SeedPlan {
    let mut plan = SeedPlan::with_core_steps();
    modules::register_all(&mut plan);
    plan
}

/// Run the seed plan once against `store`.
pub async fn run(
    settings: &Settings,
    credentials: &SeedCredentials,
    store: &dyn SeedStore,
) -> anyhow::Result<SeedReport> {
    let run_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "seed_run",
        %run_id,
        database = %settings.database.name,
        collection = %settings.database.collection
    );

    async {
        let ctx = SeedCtx {
            settings,
            credentials,
            store,
        };

        let report = build_plan().run(&ctx).await?;
        tracing::info!(steps = ?report.completed, "seed run complete");
        Ok::<_, anyhow::Error>(report)
    }
    .instrument(span)
    .await
}

/// Summary of a store that holds exactly the seeded state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub user: String,
    pub roles: Vec<String>,
    pub collection: String,
    pub documents: usize,
}

/// Check that `store` holds the state a successful run leaves behind.
pub async fn verify(
    settings: &Settings,
    credentials: &SeedCredentials,
    store: &dyn SeedStore,
) -> anyhow::Result<Verification> {
    let database = &settings.database;
    let user = &credentials.app.username;

    store
        .authenticate(&credentials.admin)
        .await
        .with_context(|| "failed to authenticate for verification")?;

    let roles = store
        .user_roles(user)
        .await
        .with_context(|| format!("failed to look up user '{user}'"))?
        .ok_or_else(|| anyhow!("application user '{user}' does not exist in '{}'", database.name))?;
    ensure!(
        roles.iter().any(|role| role == READ_WRITE_ROLE),
        "application user '{user}' lacks the {READ_WRITE_ROLE} role (has {roles:?})"
    );

    let collections = store
        .collection_names()
        .await
        .with_context(|| "failed to list collections")?;
    ensure!(
        collections.iter().any(|name| *name == database.collection),
        "collection '{}' does not exist in '{}'",
        database.collection,
        database.name
    );

    let stored = store
        .find_all(&database.collection)
        .await
        .with_context(|| format!("failed to read collection '{}'", database.collection))?;
    let expected = seed_books();
    ensure!(
        stored.len() == expected.len(),
        "collection '{}' holds {} documents, expected {}",
        database.collection,
        stored.len(),
        expected.len()
    );

    for (index, (document, want)) in stored.into_iter().zip(&expected).enumerate() {
        let got: Book = serde_json::from_value(document)
            .with_context(|| format!("document {index} is not a book record"))?;
        ensure!(
            got == *want,
            "document {index} differs from seed record '{}': found '{}'",
            want.title,
            got.title
        );
    }

    Ok(Verification {
        user: user.clone(),
        roles,
        collection: database.collection.clone(),
        documents: expected.len(),
    })
}
