//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use noteshare_core::{Note, NoteView, Rating};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a success message (suppressed in quiet and JSON modes)
    pub fn success(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", message);
        }
    }

    /// Print the catalog listing
    pub fn print_note_views(&self, views: &[NoteView]) {
        match self.format {
            OutputFormat::Human => {
                if views.is_empty() {
                    println!("No notes found.");
                    return;
                }
                for view in views {
                    let rating = if view.rating_count > 0 {
                        format!("{:.1} ({})", view.average_rating, view.rating_count)
                    } else {
                        "unrated".to_string()
                    };
                    println!(
                        "{:>4} | {} | {} | {} | {} | {} downloads",
                        view.id,
                        truncate(&view.title, 32),
                        truncate(&view.category, 18),
                        view.uploader,
                        rating,
                        view.downloads
                    );
                }
                println!("\n{} note(s)", views.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(views).unwrap());
            }
            OutputFormat::Quiet => {
                for view in views {
                    println!("{}", view.id);
                }
            }
        }
    }

    /// Print a single note with its ratings
    pub fn print_note(&self, note: &Note, ratings: &[Rating]) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", note.id);
                println!("Title:       {}", note.title);
                println!("Category:    {}", note.category);
                println!("Subject:     {}", note.subject);
                if let Some(ref desc) = note.description {
                    println!("Description: {}", desc);
                }
                if !note.tags.is_empty() {
                    println!("Tags:        {}", note.tags.join(", "));
                }
                println!("File:        {} ({} bytes)", note.file.file_name, note.file.file_size);
                println!("Uploaded:    {}", note.upload_date.format("%Y-%m-%d %H:%M"));
                println!("Downloads:   {}", note.downloads);

                if note.rating_count > 0 {
                    println!(
                        "Rating:      {:.1} from {} rating(s)",
                        note.average_rating(),
                        note.rating_count
                    );
                } else {
                    println!("Rating:      unrated");
                }

                if !ratings.is_empty() {
                    println!();
                    println!("── Ratings ({}) ──", ratings.len());
                    for rating in ratings {
                        match &rating.review {
                            Some(review) => println!(
                                "user {}: {} - {}",
                                rating.user_id,
                                rating.rating,
                                truncate_line(review, 60)
                            ),
                            None => println!("user {}: {}", rating.user_id, rating.rating),
                        }
                    }
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "note": note,
                        "ratings": ratings,
                    }))
                    .unwrap()
                );
            }
            OutputFormat::Quiet => {
                println!("{}", note.id);
            }
        }
    }

    /// Print the category list
    pub fn print_categories(&self, categories: &[String]) {
        match self.format {
            OutputFormat::Human => {
                for category in categories {
                    println!("{}", category);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(categories).unwrap());
            }
            OutputFormat::Quiet => {
                for category in categories {
                    println!("{}", category);
                }
            }
        }
    }
}

/// Truncate a string to a maximum width, padding to align columns
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        format!("{:<width$}", s, width = max)
    }
}

/// Truncate a string to a single line of at most `max` characters
fn truncate_line(s: &str, max: usize) -> String {
    let line = s.replace('\n', " ");
    if line.chars().count() > max {
        let truncated: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        // Quiet wins over JSON
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short     ");
        assert_eq!(truncate("a very long title here", 10), "a very ...");
    }

    #[test]
    fn test_truncate_line_flattens_newlines() {
        assert_eq!(truncate_line("two\nlines", 20), "two lines");
    }
}
