//! SQLite schema for the note catalog
//!
//! Three relations: users (credentials), notes (catalog entries with
//! denormalized rating aggregates), ratings (one row per note/user pair).

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Accounts table
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password_digest TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'student'
        );

        -- Note catalog
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            subject TEXT NOT NULL,
            description TEXT,
            uploader_id INTEGER NOT NULL,
            upload_date INTEGER NOT NULL,
            downloads INTEGER NOT NULL DEFAULT 0,
            tags TEXT NOT NULL,
            file_path TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            -- Aggregates of the ratings table, recomputed on every
            -- rating mutation
            rating_sum INTEGER NOT NULL DEFAULT 0,
            rating_count INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (uploader_id) REFERENCES users(id)
        );

        -- Rating ledger: at most one row per (note, user) pair
        CREATE TABLE IF NOT EXISTS ratings (
            note_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            rating INTEGER NOT NULL,
            review TEXT,
            PRIMARY KEY (note_id, user_id),
            FOREIGN KEY (note_id) REFERENCES notes(id),
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        -- Indexes for common query patterns

        -- Category filter
        CREATE INDEX IF NOT EXISTS idx_notes_category ON notes(category);

        -- Sort orders
        CREATE INDEX IF NOT EXISTS idx_notes_upload_date ON notes(upload_date);
        CREATE INDEX IF NOT EXISTS idx_notes_downloads ON notes(downloads);

        -- Aggregate recompute and cascade deletion
        CREATE INDEX IF NOT EXISTS idx_ratings_note_id ON ratings(note_id);
        "#,
    )?;

    // Set schema version
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    // Check if schema_info table exists
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        // Verify tables exist
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"notes".to_string()));
        assert!(tables.contains(&"ratings".to_string()));
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        // Before init, needs init
        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        // After init, has version and doesn't need init
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_notes_category".to_string()));
        assert!(indexes.contains(&"idx_notes_upload_date".to_string()));
        assert!(indexes.contains(&"idx_ratings_note_id".to_string()));
    }

    #[test]
    fn test_username_uniqueness_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (username, password_digest, email) VALUES ('bob', 'x', 'b@x')",
            [],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO users (username, password_digest, email) VALUES ('bob', 'y', 'b@y')",
            [],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_one_rating_per_note_user_pair() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO ratings (note_id, user_id, rating) VALUES (1, 1, 5)",
            [],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO ratings (note_id, user_id, rating) VALUES (1, 1, 3)",
            [],
        );
        assert!(duplicate.is_err());
    }
}
