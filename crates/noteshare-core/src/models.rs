//! Data models for noteshare
//!
//! Defines the core data structures: User, Note, Rating, and the joined
//! NoteView returned by catalog queries.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role, controls delete authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role for new registrations
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// The string form persisted in the users table
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Parse a persisted role string
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Unique username
    pub username: String,
    /// One-way SHA-256 digest of the password (hex), never the plaintext
    pub password_digest: String,
    pub email: String,
    pub role: Role,
}

/// The authenticated identity behind a mutating operation
///
/// Every mutating store operation takes an explicit caller instead of
/// reading shared session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// A stable reference to a persisted upload payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFile {
    /// Location on disk
    pub path: PathBuf,
    /// The name the file was uploaded under
    pub file_name: String,
    /// Payload size in bytes
    pub file_size: i64,
}

/// Caller-supplied fields for a new note
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub category: String,
    pub subject: String,
    pub description: Option<String>,
    /// Ordered tags; normalized again on insert
    pub tags: Vec<String>,
}

/// A catalog entry pairing upload metadata with engagement counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub subject: String,
    pub description: Option<String>,
    pub uploader_id: i64,
    /// Set at creation, immutable afterwards
    pub upload_date: DateTime<Utc>,
    pub downloads: i64,
    pub tags: Vec<String>,
    /// Reference to the stored payload
    pub file: StoredFile,
    /// Denormalized aggregate of the ratings table, recomputed on every
    /// rating mutation
    pub rating_sum: i64,
    pub rating_count: i64,
}

impl Note {
    /// Average rating, 0.0 when the note has no ratings yet
    pub fn average_rating(&self) -> f64 {
        if self.rating_count > 0 {
            self.rating_sum as f64 / self.rating_count as f64
        } else {
            0.0
        }
    }
}

/// One user's rating of one note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub note_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub review: Option<String>,
}

/// A catalog row joined with its uploader, as returned by search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteView {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub subject: String,
    pub description: Option<String>,
    /// Username of the uploading account
    pub uploader: String,
    pub upload_date: DateTime<Utc>,
    pub downloads: i64,
    pub tags: Vec<String>,
    pub file_name: String,
    pub file_size: i64,
    /// rating_sum / rating_count, 0.0 for unrated notes
    pub average_rating: f64,
    pub rating_count: i64,
}

/// Split a comma-separated tag string into an ordered tag list
///
/// Whitespace is trimmed from each entry and empty entries are dropped.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_default_is_student() {
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_caller_from_user() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_digest: "digest".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Admin,
        };
        let caller = Caller::from(&user);
        assert_eq!(caller.id, 7);
        assert!(caller.is_admin());
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(
            normalize_tags(" python, basics ,,  , programming"),
            vec!["python", "basics", "programming"]
        );
        assert!(normalize_tags("").is_empty());
        assert!(normalize_tags(" , ,").is_empty());
    }

    #[test]
    fn test_normalize_tags_preserves_order() {
        assert_eq!(normalize_tags("z,a,m"), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_average_rating() {
        let mut note = sample_note();
        assert_eq!(note.average_rating(), 0.0);

        note.rating_sum = 9;
        note.rating_count = 2;
        assert_eq!(note.average_rating(), 4.5);
    }

    #[test]
    fn test_note_serialization() {
        let note = sample_note();
        let json = serde_json::to_string(&note).unwrap();
        let deserialized: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(note, deserialized);
    }

    fn sample_note() -> Note {
        Note {
            id: 1,
            title: "Intro to Rust".to_string(),
            category: "Computer Science".to_string(),
            subject: "Programming".to_string(),
            description: None,
            uploader_id: 1,
            upload_date: Utc::now(),
            downloads: 0,
            tags: vec!["rust".to_string()],
            file: StoredFile {
                path: PathBuf::from("/tmp/notes/1_intro.pdf"),
                file_name: "intro.pdf".to_string(),
                file_size: 1234,
            },
            rating_sum: 0,
            rating_count: 0,
        }
    }
}
