use async_trait::async_trait;

use crate::settings::{SeedCredentials, Settings};
use crate::store::{SeedStore, READ_WRITE_ROLE};

/// Context provided to every step of a seed run
pub struct SeedCtx<'a> {
    pub settings: &'a Settings,
    pub credentials: &'a SeedCredentials,
    pub store: &'a dyn SeedStore,
}

/// A single unit of work in a seed run
#[async_trait]
pub trait Step: Sync + Send {
    /// Unique name for this step
    fn name(&self) -> &'static str;

    /// Apply the step against the store in `ctx`
    async fn apply(&self, ctx: &SeedCtx<'_>) -> anyhow::Result<()>;
}

/// Logs in as the administrative user.
pub struct Authenticate;

#[async_trait]
impl Step for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn apply(&self, ctx: &SeedCtx<'_>) -> anyhow::Result<()> {
        let admin = &ctx.credentials.admin;
        ctx.store.authenticate(admin).await?;

        tracing::info!(
            step = self.name(),
            user = %admin.username,
            source = %ctx.settings.database.admin_source,
            "authenticated administrative user"
        );
        Ok(())
    }
}

/// Creates the application user with read/write access to the target database.
pub struct CreateAppUser;

#[async_trait]
impl Step for CreateAppUser {
    fn name(&self) -> &'static str {
        "create_user"
    }

    async fn apply(&self, ctx: &SeedCtx<'_>) -> anyhow::Result<()> {
        let app = &ctx.credentials.app;
        ctx.store.create_user(app, &[READ_WRITE_ROLE]).await?;

        tracing::info!(
            step = self.name(),
            user = %app.username,
            database = %ctx.settings.database.name,
            role = READ_WRITE_ROLE,
            "created application user"
        );
        Ok(())
    }
}
