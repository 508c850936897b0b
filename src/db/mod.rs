//! Database module: content store, row models and the write-path helpers.
//!
//! Layout:
//! - `store.rs`: the [`Store`] handle and schema bootstrap
//! - `repos/`: one repository per entity
//! - `patch.rs` / `merge.rs`: partial fields and upsert planning
//! - `sql.rs`: dynamic INSERT / UPDATE / upsert builders
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)

pub mod merge;
pub mod models;
pub mod outcome;
pub mod patch;
pub mod repos;
pub mod schema;
pub mod sql;
pub mod store;

pub use outcome::WriteOutcome;
pub use patch::{FieldBag, Patch, SqlValue};
pub use schema::SQLITE_INIT;
pub use store::{SqlitePool, Store};
