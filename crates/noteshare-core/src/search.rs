//! Search and ranking over the note catalog
//!
//! Stateless construction of the catalog query: filter predicates for
//! free-text and category, plus the order clause for the requested
//! sort mode. Execution lives in [`crate::store::Store::search`].
//!
//! Text matching is case-insensitive substring matching (SQLite `LIKE`)
//! against the title, the subject, and the serialized tag text. The
//! category filter is an exact match unless the "All" sentinel is
//! passed.

use crate::models::NoteView;

/// Synthetic category meaning "no category restriction"
pub const ALL_CATEGORIES: &str = "All";

/// Catalog sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest uploads first
    #[default]
    Recent,
    /// Most-downloaded first
    Popular,
    /// Highest average rating first, downloads as tie-break
    Rating,
}

impl SortMode {
    /// Parse a sort mode string; unrecognized values fall back to
    /// [`SortMode::Recent`]
    pub fn parse(s: &str) -> SortMode {
        match s {
            "popular" => SortMode::Popular,
            "rating" => SortMode::Rating,
            _ => SortMode::Recent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recent => "recent",
            SortMode::Popular => "popular",
            SortMode::Rating => "rating",
        }
    }

    /// The ORDER BY clause for this mode
    ///
    /// Every clause ends on the note id so that ties order
    /// deterministically: insertion order, except `recent` where newer
    /// ids come first.
    fn order_clause(&self) -> &'static str {
        match self {
            SortMode::Recent => "n.upload_date DESC, n.id DESC",
            SortMode::Popular => "n.downloads DESC, n.id ASC",
            SortMode::Rating => "average_rating DESC, n.downloads DESC, n.id ASC",
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully built catalog query: SQL text plus bound parameters
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// Build the filtered, sorted catalog query
///
/// Joins notes with their uploader and derives the average rating in
/// SQL (`0` for unrated notes, so there is never a division fault).
pub fn build_catalog_query(query: &str, category: &str, sort: SortMode) -> CatalogQuery {
    let mut sql = String::from(
        "SELECT n.id, n.title, n.category, n.subject, n.description, \
         n.upload_date, n.downloads, n.tags, n.file_name, n.file_size, \
         n.rating_count, u.username, \
         CASE WHEN n.rating_count > 0 \
              THEN CAST(n.rating_sum AS REAL) / n.rating_count \
              ELSE 0 END AS average_rating \
         FROM notes n JOIN users u ON n.uploader_id = u.id",
    );

    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if !query.is_empty() {
        clauses.push("(n.title LIKE ? OR n.subject LIKE ? OR n.tags LIKE ?)");
        let pattern = format!("%{}%", query);
        params.push(pattern.clone());
        params.push(pattern.clone());
        params.push(pattern);
    }

    if category != ALL_CATEGORIES {
        clauses.push("n.category = ?");
        params.push(category.to_string());
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    sql.push_str(" ORDER BY ");
    sql.push_str(sort.order_clause());

    CatalogQuery { sql, params }
}

/// Row shape produced by the catalog query, before tag decoding
///
/// Tags come back as their serialized text; [`crate::store::Store`]
/// decodes them into the final [`NoteView`].
pub(crate) struct NoteViewRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub subject: String,
    pub description: Option<String>,
    pub upload_date: i64,
    pub downloads: i64,
    pub tags_json: String,
    pub file_name: String,
    pub file_size: i64,
    pub rating_count: i64,
    pub uploader: String,
    pub average_rating: f64,
}

impl NoteViewRow {
    pub(crate) fn into_view(self) -> serde_json::Result<NoteView> {
        let tags: Vec<String> = serde_json::from_str(&self.tags_json)?;
        Ok(NoteView {
            id: self.id,
            title: self.title,
            category: self.category,
            subject: self.subject,
            description: self.description,
            uploader: self.uploader,
            upload_date: chrono::DateTime::from_timestamp_millis(self.upload_date)
                .unwrap_or_else(chrono::Utc::now),
            downloads: self.downloads,
            tags,
            file_name: self.file_name,
            file_size: self.file_size,
            average_rating: self.average_rating,
            rating_count: self.rating_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!(SortMode::parse("recent"), SortMode::Recent);
        assert_eq!(SortMode::parse("popular"), SortMode::Popular);
        assert_eq!(SortMode::parse("rating"), SortMode::Rating);
    }

    #[test]
    fn test_unknown_sort_mode_falls_back_to_recent() {
        assert_eq!(SortMode::parse("newest"), SortMode::Recent);
        assert_eq!(SortMode::parse(""), SortMode::Recent);
        assert_eq!(SortMode::parse("RATING"), SortMode::Recent);
    }

    #[test]
    fn test_empty_query_all_categories_has_no_filter() {
        let q = build_catalog_query("", ALL_CATEGORIES, SortMode::Recent);
        assert!(!q.sql.contains("WHERE"));
        assert!(q.params.is_empty());
        assert!(q.sql.ends_with("n.upload_date DESC, n.id DESC"));
    }

    #[test]
    fn test_text_query_binds_pattern_three_times() {
        let q = build_catalog_query("python", ALL_CATEGORIES, SortMode::Recent);
        assert!(q.sql.contains("n.title LIKE ?"));
        assert!(q.sql.contains("n.subject LIKE ?"));
        assert!(q.sql.contains("n.tags LIKE ?"));
        assert_eq!(q.params, vec!["%python%", "%python%", "%python%"]);
    }

    #[test]
    fn test_category_filter_is_exact_match() {
        let q = build_catalog_query("", "Mathematics", SortMode::Recent);
        assert!(q.sql.contains("n.category = ?"));
        assert_eq!(q.params, vec!["Mathematics"]);
    }

    #[test]
    fn test_combined_filters_joined_with_and() {
        let q = build_catalog_query("calculus", "Mathematics", SortMode::Popular);
        assert!(q.sql.contains(" AND "));
        assert_eq!(q.params.len(), 4);
        assert_eq!(q.params[3], "Mathematics");
    }

    #[test]
    fn test_order_clauses() {
        let recent = build_catalog_query("", ALL_CATEGORIES, SortMode::Recent);
        assert!(recent.sql.contains("ORDER BY n.upload_date DESC"));

        let popular = build_catalog_query("", ALL_CATEGORIES, SortMode::Popular);
        assert!(popular.sql.contains("ORDER BY n.downloads DESC"));

        let rating = build_catalog_query("", ALL_CATEGORIES, SortMode::Rating);
        assert!(rating
            .sql
            .contains("ORDER BY average_rating DESC, n.downloads DESC"));
    }

    #[test]
    fn test_average_rating_never_divides_by_zero() {
        let q = build_catalog_query("", ALL_CATEGORIES, SortMode::Rating);
        assert!(q.sql.contains("CASE WHEN n.rating_count > 0"));
        assert!(q.sql.contains("ELSE 0 END"));
    }
}
