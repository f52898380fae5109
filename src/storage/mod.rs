//! Storage layer for collected games, teams and statistics
//!
//! This module wraps the SQLite database, organized into:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `queries`: Idempotent upserts and the read queries the verifier uses

pub mod models;
pub mod queries;
pub mod schema;

#[cfg(test)]
mod tests;

pub use models::*;
pub use queries::DuplicateFixture;
pub use schema::GameDatabase;
