//! Database module: models and schema for the local project mirror.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite)
//! - `store.rs`: CRUD operations against the pool
//! - `patch.rs`: partial-update payloads

pub mod models;
pub mod patch;
pub mod schema;
pub mod store;

pub use models::{DbNamespace, DbProject};
pub use patch::ProjectPatch;
pub use schema::SQLITE_INIT;
pub use store::{ListFilter, ProjectStore, Upserted};
