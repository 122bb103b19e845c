pub mod plan;
pub mod settings;
pub mod step;
pub mod store;

pub use plan::{SeedPlan, SeedReport};
pub use step::{SeedCtx, Step};
pub use store::{MemoryStore, SeedStore, StoreError};
