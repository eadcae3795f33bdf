//! Database connection pool and embedded migrations.
//!
//! Runtime queries go through a diesel_async bb8 pool; migrations run on a
//! blocking `PgConnection` because `MigrationHarness` is synchronous.

mod migrations;
mod pool;

pub use migrations::{MIGRATIONS, pending_migrations, revert_migrations, run_pending_migrations};
pub use pool::{AsyncDbPool, establish_async_connection_pool};
