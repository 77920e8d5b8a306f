//! Entity to model mappers
//!
//! This module provides conversions between domain entities (story-core) and database models.
//! - `From<Model> for Entity` / `TryFrom` where a column holds an enum string
//! - `*Insert` structs: Prepare entity data for database operations

mod bookmark;
mod comment;
mod item;
mod reaction;
mod read_progress;

pub use reaction::ReactionInsert;
pub use read_progress::ReadProgressWrite;
