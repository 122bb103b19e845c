use anyhow::Context;
use bookstore_db::MongoStore;
use bookstore_kernel::settings::{SeedCredentials, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load seed settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    let credentials =
        SeedCredentials::from_env().with_context(|| "failed to read seed credentials")?;

    tracing::info!(
        database = %settings.database.name,
        "bookstore seed starting"
    );

    let store = MongoStore::new(&settings.database);
    bookstore_seed::run(&settings, &credentials, &store).await?;

    tracing::info!("bookstore seed complete");
    Ok(())
}
