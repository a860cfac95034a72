//! Error types for store operations
//!
//! Domain failures (duplicate username, missing note, authorization)
//! are typed so the presentation layer can translate them into
//! user-visible messages; database and file errors carry context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Registration conflict on the unique username
    #[error("Username '{username}' is already taken")]
    DuplicateUsername { username: String },

    /// Credentials did not match a stored account
    #[error("Invalid username or password")]
    AuthenticationFailed,

    /// A mutating operation was attempted without a signed-in user
    #[error("You must be signed in to do that")]
    Unauthenticated,

    /// Reference to a note that does not exist
    #[error("Note {id} does not exist")]
    NoteNotFound { id: i64 },

    /// Caller is neither the uploader nor an administrator
    #[error("Only the uploader or an administrator may delete this note")]
    Forbidden,

    /// Failed to read an uploaded file
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to persist an uploaded file
    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to delete an uploaded file
    #[error("Failed to delete '{path}': {source}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Tag list (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Whether this error should be shown to the user as a plain
    /// message rather than propagated as an internal failure
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateUsername { .. }
                | StoreError::AuthenticationFailed
                | StoreError::Unauthenticated
                | StoreError::NoteNotFound { .. }
                | StoreError::Forbidden
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
