//! Schema migrations

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use tracing::info;

/// The `migrations/` directory in this crate's source tree
///
/// Only valid on the machine that built the binary. Deployed binaries should
/// ship the directory and point `DATABASE_MIGRATIONS_DIR` at it.
pub fn default_migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

/// The configured migrations directory, or [`default_migrations_dir`] when unset
pub fn migrations_dir(configured: Option<&Path>) -> PathBuf {
    configured.map_or_else(default_migrations_dir, Path::to_path_buf)
}

/// Apply all pending migrations found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), MigrateError> {
    let migrator = Migrator::new(dir).await?;
    info!(
        dir = %dir.display(),
        migrations = migrator.iter().count(),
        "Applying database migrations"
    );
    migrator.run(pool).await
}
