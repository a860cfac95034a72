//! Unified store for the shared note catalog
//!
//! The `Store` coordinates the three relations (users, notes, ratings)
//! and the uploaded-file store behind a single interface:
//!
//! - credentials: [`Store::register`], [`Store::authenticate`]
//! - catalog: [`Store::upload_note`], [`Store::record_download`],
//!   [`Store::delete_note`], [`Store::categories`]
//! - ratings: [`Store::rate`]
//! - queries: [`Store::search`]
//!
//! Every mutating operation takes an explicit [`Caller`] and runs as a
//! single transaction; the denormalized rating aggregates on a note are
//! recomputed from the ratings table inside the same transaction as the
//! rating upsert.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Caller, Note, NoteDraft, NoteView, Rating, Role, StoredFile, User};
use crate::search::{build_catalog_query, NoteViewRow, SortMode, ALL_CATEGORIES};
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::{FileStore, StoreError, StoreResult};

/// Unified interface over the catalog database and the file store
pub struct Store {
    conn: Connection,
    files: FileStore,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config)?)
    }

    /// Open the store with a specific configuration
    ///
    /// Creates the database and initializes the schema on first run.
    pub fn open_with_config(config: Config) -> StoreResult<Self> {
        let db_path = config.sqlite_path();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        let files = FileStore::new(config.upload_dir());

        Ok(Self {
            conn,
            files,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The uploaded-file store
    pub fn files(&self) -> &FileStore {
        &self.files
    }

    // ==================== Credentials ====================

    /// Register a new account with the default student role
    ///
    /// Only a one-way digest of the password is stored.
    pub fn register(&mut self, username: &str, password: &str, email: &str) -> StoreResult<User> {
        let digest = password_digest(password);

        let result = self.conn.execute(
            "INSERT INTO users (username, password_digest, email, role) VALUES (?, ?, ?, ?)",
            params![username, digest, email, Role::Student.as_str()],
        );

        match result {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                info!(user_id = id, username, "registered account");
                Ok(User {
                    id,
                    username: username.to_string(),
                    password_digest: digest,
                    email: email.to_string(),
                    role: Role::Student,
                })
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateUsername {
                    username: username.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up an account by username and verify the password digest
    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<User> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, password_digest, email, role FROM users WHERE username = ?",
                [username],
                row_to_user,
            )
            .optional()?;

        match user {
            Some(user) if user.password_digest == password_digest(password) => Ok(user),
            _ => Err(StoreError::AuthenticationFailed),
        }
    }

    // ==================== Catalog ====================

    /// Insert a catalog entry for an already-persisted payload
    ///
    /// Tags are normalized on the way in: whitespace trimmed, empty
    /// entries dropped, order preserved.
    pub fn add_note(
        &mut self,
        caller: &Caller,
        draft: &NoteDraft,
        stored: StoredFile,
    ) -> StoreResult<Note> {
        let tags: Vec<String> = draft
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let tags_json = serde_json::to_string(&tags)?;

        // Truncate to millisecond precision to match what round-trips
        // through the database.
        let now = Utc::now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        self.conn.execute(
            "INSERT INTO notes (title, category, subject, description, uploader_id, upload_date, \
             downloads, tags, file_path, file_name, file_size, rating_sum, rating_count) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, 0, 0)",
            params![
                draft.title,
                draft.category,
                draft.subject,
                draft.description,
                caller.id,
                now.timestamp_millis(),
                tags_json,
                stored.path.to_string_lossy().into_owned(),
                stored.file_name,
                stored.file_size,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(note_id = id, uploader = caller.id, "added note");

        Ok(Note {
            id,
            title: draft.title.clone(),
            category: draft.category.clone(),
            subject: draft.subject.clone(),
            description: draft.description.clone(),
            uploader_id: caller.id,
            upload_date: now,
            downloads: 0,
            tags,
            file: stored,
            rating_sum: 0,
            rating_count: 0,
        })
    }

    /// Persist uploaded bytes, then insert the catalog entry
    ///
    /// If the insert fails the just-written file is removed again, so a
    /// payload never exists without its record.
    pub fn upload_note(
        &mut self,
        caller: &Caller,
        draft: &NoteDraft,
        file_name: &str,
        bytes: &[u8],
    ) -> StoreResult<Note> {
        let stored = self.files.store(file_name, bytes)?;

        match self.add_note(caller, draft, stored.clone()) {
            Ok(note) => Ok(note),
            Err(e) => {
                let _ = self.files.remove(&stored);
                Err(e)
            }
        }
    }

    /// Increment the download counter and return the payload reference
    ///
    /// Each call increments the counter by exactly one.
    pub fn record_download(&mut self, caller: &Caller, note_id: i64) -> StoreResult<StoredFile> {
        let tx = self.conn.transaction()?;

        let stored = tx
            .query_row(
                "SELECT file_path, file_name, file_size FROM notes WHERE id = ?",
                [note_id],
                |row| {
                    Ok(StoredFile {
                        path: PathBuf::from(row.get::<_, String>(0)?),
                        file_name: row.get(1)?,
                        file_size: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(StoreError::NoteNotFound { id: note_id })?;

        tx.execute(
            "UPDATE notes SET downloads = downloads + 1 WHERE id = ?",
            [note_id],
        )?;
        tx.commit()?;

        debug!(note_id, user_id = caller.id, "recorded download");
        Ok(stored)
    }

    /// Delete a note, its ratings, and its backing file
    ///
    /// Allowed for the uploader and for administrators. The backing
    /// file is removed first; the records stay untouched if that fails.
    pub fn delete_note(&mut self, caller: &Caller, note_id: i64) -> StoreResult<()> {
        let row = self
            .conn
            .query_row(
                "SELECT uploader_id, file_path, file_name, file_size FROM notes WHERE id = ?",
                [note_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let (uploader_id, file_path, file_name, file_size) =
            row.ok_or(StoreError::NoteNotFound { id: note_id })?;

        if caller.id != uploader_id && !caller.is_admin() {
            return Err(StoreError::Forbidden);
        }

        let stored = StoredFile {
            path: PathBuf::from(file_path),
            file_name,
            file_size,
        };
        self.files.remove(&stored)?;

        // Ratings first, so no ledger entry outlives its note
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM ratings WHERE note_id = ?", [note_id])?;
        tx.execute("DELETE FROM notes WHERE id = ?", [note_id])?;
        tx.commit()?;

        info!(note_id, user_id = caller.id, "deleted note");
        Ok(())
    }

    /// Distinct categories, sorted, prefixed with the "All" sentinel
    pub fn categories(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM notes ORDER BY category")?;

        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for category in stmt.query_map([], |row| row.get::<_, String>(0))? {
            categories.push(category?);
        }
        Ok(categories)
    }

    /// Get a note by id
    pub fn get_note(&self, note_id: i64) -> StoreResult<Option<Note>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, category, subject, description, uploader_id, upload_date, \
                 downloads, tags, file_path, file_name, file_size, rating_sum, rating_count \
                 FROM notes WHERE id = ?",
                [note_id],
                row_to_note_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_note()?)),
            None => Ok(None),
        }
    }

    // ==================== Ratings ====================

    /// Upsert the caller's rating for a note and recompute aggregates
    ///
    /// At most one rating exists per (note, user) pair; re-rating
    /// replaces the previous value and review. The note's rating_sum
    /// and rating_count are recomputed from the ratings table in the
    /// same transaction, not adjusted incrementally.
    pub fn rate(
        &mut self,
        caller: &Caller,
        note_id: i64,
        rating: i64,
        review: Option<&str>,
    ) -> StoreResult<()> {
        let tx = self.conn.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM notes WHERE id = ?", [note_id], |_| Ok(()))
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::NoteNotFound { id: note_id });
        }

        tx.execute(
            "INSERT INTO ratings (note_id, user_id, rating, review) VALUES (?, ?, ?, ?) \
             ON CONFLICT(note_id, user_id) DO UPDATE SET \
             rating = excluded.rating, review = excluded.review",
            params![note_id, caller.id, rating, review],
        )?;

        tx.execute(
            "UPDATE notes SET \
             rating_sum = (SELECT COALESCE(SUM(rating), 0) FROM ratings WHERE note_id = ?1), \
             rating_count = (SELECT COUNT(*) FROM ratings WHERE note_id = ?1) \
             WHERE id = ?1",
            [note_id],
        )?;

        tx.commit()?;

        debug!(note_id, user_id = caller.id, rating, "recorded rating");
        Ok(())
    }

    /// All rating entries for a note, review text included
    pub fn ratings_for(&self, note_id: i64) -> StoreResult<Vec<Rating>> {
        let mut stmt = self.conn.prepare(
            "SELECT note_id, user_id, rating, review FROM ratings WHERE note_id = ? \
             ORDER BY user_id",
        )?;

        let ratings = stmt
            .query_map([note_id], |row| {
                Ok(Rating {
                    note_id: row.get(0)?,
                    user_id: row.get(1)?,
                    rating: row.get(2)?,
                    review: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ratings)
    }

    // ==================== Queries ====================

    /// Search the catalog
    ///
    /// See [`crate::search`] for the filter and ordering semantics.
    pub fn search(
        &self,
        query: &str,
        category: &str,
        sort: SortMode,
    ) -> StoreResult<Vec<NoteView>> {
        let catalog = build_catalog_query(query, category, sort);

        let mut stmt = self.conn.prepare(&catalog.sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(catalog.params.iter()), |row| {
            Ok(NoteViewRow {
                id: row.get(0)?,
                title: row.get(1)?,
                category: row.get(2)?,
                subject: row.get(3)?,
                description: row.get(4)?,
                upload_date: row.get(5)?,
                downloads: row.get(6)?,
                tags_json: row.get(7)?,
                file_name: row.get(8)?,
                file_size: row.get(9)?,
                rating_count: row.get(10)?,
                uploader: row.get(11)?,
                average_rating: row.get(12)?,
            })
        })?;

        let mut views = Vec::new();
        for row in rows {
            views.push(row?.into_view()?);
        }
        Ok(views)
    }

    // ==================== Demo data ====================

    /// Seed the demo admin account and one demo note
    ///
    /// Only runs against an empty user table; returns whether anything
    /// was seeded.
    pub fn seed_demo(&mut self) -> StoreResult<bool> {
        let users: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if users > 0 {
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO users (username, password_digest, email, role) VALUES (?, ?, ?, ?)",
            params![
                "admin",
                password_digest("admin123"),
                "admin@noteshare.local",
                Role::Admin.as_str()
            ],
        )?;
        let admin = Caller {
            id: self.conn.last_insert_rowid(),
            role: Role::Admin,
        };

        let draft = NoteDraft {
            title: "Python Programming".to_string(),
            category: "Computer Science".to_string(),
            subject: "Programming".to_string(),
            description: Some("Complete beginner guide".to_string()),
            tags: vec![
                "python".to_string(),
                "programming".to_string(),
                "basics".to_string(),
            ],
        };
        self.upload_note(&admin, &draft, "demo.pdf", b"Noteshare demo file")?;

        info!("seeded demo account and note");
        Ok(true)
    }
}

/// One-way password digest (SHA-256, hex encoded)
fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_digest: row.get(2)?,
        email: row.get(3)?,
        role: Role::parse(&role).unwrap_or_default(),
    })
}

// Raw notes row before tag decoding
struct NoteRow {
    id: i64,
    title: String,
    category: String,
    subject: String,
    description: Option<String>,
    uploader_id: i64,
    upload_date: i64,
    downloads: i64,
    tags_json: String,
    file_path: String,
    file_name: String,
    file_size: i64,
    rating_sum: i64,
    rating_count: i64,
}

impl NoteRow {
    fn into_note(self) -> serde_json::Result<Note> {
        let tags: Vec<String> = serde_json::from_str(&self.tags_json)?;
        Ok(Note {
            id: self.id,
            title: self.title,
            category: self.category,
            subject: self.subject,
            description: self.description,
            uploader_id: self.uploader_id,
            upload_date: DateTime::from_timestamp_millis(self.upload_date)
                .unwrap_or_else(Utc::now),
            downloads: self.downloads,
            tags,
            file: StoredFile {
                path: PathBuf::from(self.file_path),
                file_name: self.file_name,
                file_size: self.file_size,
            },
            rating_sum: self.rating_sum,
            rating_count: self.rating_count,
        })
    }
}

fn row_to_note_row(row: &rusqlite::Row) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        subject: row.get(3)?,
        description: row.get(4)?,
        uploader_id: row.get(5)?,
        upload_date: row.get(6)?,
        downloads: row.get(7)?,
        tags_json: row.get(8)?,
        file_path: row.get(9)?,
        file_name: row.get(10)?,
        file_size: row.get(11)?,
        rating_sum: row.get(12)?,
        rating_count: row.get(13)?,
    })
}
