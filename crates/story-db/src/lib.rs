//! # story-db
//!
//! Counter store implementations of the repository traits in `story-core`.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repositories (one transaction per engagement operation)
//! - [`MemoryStore`], an in-process store with the same semantics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use story_db::pool::{create_pool, migrations_dir, run_migrations, DatabaseConfig};
//! use story_db::repositories::PgBookmarkRepository;
//! use story_core::traits::BookmarkRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool, &migrations_dir(None)).await?;
//!     let bookmarks = PgBookmarkRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{
    create_pool, default_migrations_dir, migrations_dir, run_migrations, DatabaseConfig, PgPool,
};
pub use repositories::{
    PgBookmarkRepository, PgCommentRepository, PgItemRepository, PgReactionRepository,
    PgReadProgressRepository,
};
