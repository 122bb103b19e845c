pub mod models;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use bookstore_kernel::{SeedCtx, SeedPlan, Step};

pub use models::{seed_books, Book};

/// Creates the books collection in the target database.
pub struct CreateBooksCollection;

#[async_trait]
impl Step for CreateBooksCollection {
    fn name(&self) -> &'static str {
        "books.create_collection"
    }

    async fn apply(&self, ctx: &SeedCtx<'_>) -> anyhow::Result<()> {
        let collection = &ctx.settings.database.collection;
        ctx.store.create_collection(collection).await?;

        tracing::info!(step = self.name(), %collection, "collection created");
        Ok(())
    }
}

/// Inserts the seed records one at a time, in order.
pub struct InsertSeedBooks;

#[async_trait]
impl Step for InsertSeedBooks {
    fn name(&self) -> &'static str {
        "books.insert_seed"
    }

    async fn apply(&self, ctx: &SeedCtx<'_>) -> anyhow::Result<()> {
        let collection = &ctx.settings.database.collection;

        for book in seed_books() {
            let document = serde_json::to_value(&book)
                .with_context(|| format!("failed to encode book '{}'", book.title))?;

            ctx.store
                .insert_one(collection, document)
                .await
                .with_context(|| format!("failed to insert book '{}'", book.title))?;

            tracing::info!(step = self.name(), %collection, title = %book.title, "book inserted");
        }

        Ok(())
    }
}

/// Register the books steps with the plan
pub fn register(plan: &mut SeedPlan) {
    plan.register_custom(Arc::new(CreateBooksCollection));
    plan.register_custom(Arc::new(InsertSeedBooks));
}
