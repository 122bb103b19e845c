use anyhow::Context;
use bookstore_db::MongoStore;
use bookstore_kernel::settings::{SeedCredentials, Settings};
use bookstore_kernel::{MemoryStore, SeedStore};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Seed and inspect the bookstore database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the application user and the books collection, then insert the sample records
    Run {
        /// Run against an in-memory store and print the resulting documents
        #[arg(long)]
        dry_run: bool,
    },
    /// Check that the database holds exactly the seeded state
    Verify,
    /// Print the sample records without touching any database
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load seed settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Show => {
            let books = bookstore_seed::seed_books();
            println!("{}", serde_json::to_string_pretty(&books)?);
        }
        Command::Run { dry_run } => {
            let credentials =
                SeedCredentials::from_env().with_context(|| "failed to read seed credentials")?;

            if dry_run {
                let store = MemoryStore::new(credentials.admin.clone());
                let report = bookstore_seed::run(&settings, &credentials, &store).await?;
                let documents = store.find_all(&settings.database.collection).await?;

                let output = json!({
                    "steps": report.completed,
                    "collection": settings.database.collection,
                    "documents": documents,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let store = MongoStore::new(&settings.database);
                let report = bookstore_seed::run(&settings, &credentials, &store).await?;
                tracing::info!(steps = ?report.completed, "database seeded");
            }
        }
        Command::Verify => {
            let credentials =
                SeedCredentials::from_env().with_context(|| "failed to read seed credentials")?;
            let store = MongoStore::new(&settings.database);

            let verification = bookstore_seed::verify(&settings, &credentials, &store)
                .await
                .with_context(|| format!("database '{}' is not seeded", settings.database.name))?;
            println!("{}", serde_json::to_string_pretty(&verification)?);
        }
    }

    Ok(())
}
