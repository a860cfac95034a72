//! Noteshare Core Library
//!
//! This crate provides the core functionality for noteshare, a shared
//! catalog of uploaded study notes: accounts, uploads with metadata,
//! download counters, per-user ratings with recomputed aggregates, and
//! filtered/sorted catalog queries.
//!
//! # Architecture
//!
//! - **SQLite**: source of truth for users, notes, and ratings
//! - **File store**: uploaded payloads on disk, referenced from the
//!   catalog but only touched through [`storage::FileStore`]
//!
//! All mutating operations take an explicit [`models::Caller`] and run
//! as single transactions.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! let user = store.register("alice", "secret", "alice@example.com")?;
//! let caller = Caller::from(&user);
//!
//! let note = store.upload_note(&caller, &draft, "calculus.pdf", &bytes)?;
//!
//! // Query the catalog
//! let views = store.search("calculus", ALL_CATEGORIES, SortMode::Rating)?;
//! ```
//!
//! # Modules
//!
//! - `store`: unified store interface (main entry point)
//! - `models`: data structures for users, notes, and ratings
//! - `search`: catalog query construction (filters, sort orders)
//! - `storage`: SQLite schema, file store, error taxonomy
//! - `config`: application configuration

pub mod config;
pub mod models;
pub mod search;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{
    normalize_tags, Caller, Note, NoteDraft, NoteView, Rating, Role, StoredFile, User,
};
pub use search::{build_catalog_query, CatalogQuery, SortMode, ALL_CATEGORIES};
pub use storage::{FileStore, StoreError, StoreResult};
pub use store::Store;
