//! Storage layer
//!
//! SQLite schema management, the uploaded-file store, and the typed
//! error taxonomy shared by all store operations.

pub mod error;
pub mod files;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use files::FileStore;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
