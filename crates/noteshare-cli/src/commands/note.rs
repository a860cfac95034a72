//! Catalog command handlers
//!
//! Upload, search, show, download, and delete notes.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use noteshare_core::{normalize_tags, Caller, NoteDraft, SortMode, Store, StoreError};

use crate::output::Output;

/// Upload a file with its catalog metadata
#[allow(clippy::too_many_arguments)]
pub fn upload(
    store: &mut Store,
    caller: &Caller,
    file: PathBuf,
    title: String,
    category: String,
    subject: String,
    description: Option<String>,
    tags: &str,
    output: &Output,
) -> Result<()> {
    let bytes = fs::read(&file).with_context(|| format!("Failed to read {:?}", file))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {:?}", file))?;

    let draft = NoteDraft {
        title,
        category,
        subject,
        description,
        tags: normalize_tags(tags),
    };

    let note = store.upload_note(caller, &draft, &file_name, &bytes)?;

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({ "id": note.id, "title": note.title })
        );
    } else if output.is_quiet() {
        println!("{}", note.id);
    } else {
        output.success(&format!("Uploaded note {} ({})", note.id, note.title));
    }

    Ok(())
}

/// Search the catalog and print the results
pub fn search(
    store: &Store,
    query: &str,
    category: &str,
    sort: &str,
    output: &Output,
) -> Result<()> {
    let views = store.search(query, category, SortMode::parse(sort))?;
    output.print_note_views(&views);
    Ok(())
}

/// Show one note with its ratings
pub fn show(store: &Store, id: i64, output: &Output) -> Result<()> {
    let note = store
        .get_note(id)?
        .ok_or(StoreError::NoteNotFound { id })?;
    let ratings = store.ratings_for(id)?;

    output.print_note(&note, &ratings);
    Ok(())
}

/// Download a note's file to a local path
pub fn download(
    store: &mut Store,
    caller: &Caller,
    id: i64,
    out: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let stored = store.record_download(caller, id)?;
    let bytes = store.files().read(&stored)?;

    let target = out.unwrap_or_else(|| PathBuf::from(&stored.file_name));
    fs::write(&target, &bytes).with_context(|| format!("Failed to write {:?}", target))?;

    if output.is_quiet() {
        println!("{}", target.display());
    } else if output.is_json() {
        println!(
            "{}",
            serde_json::json!({ "id": id, "path": target.display().to_string() })
        );
    } else {
        output.success(&format!(
            "Downloaded {} to {}",
            stored.file_name,
            target.display()
        ));
    }

    Ok(())
}

/// Delete a note (uploader or admin only)
pub fn delete(store: &mut Store, caller: &Caller, id: i64, output: &Output) -> Result<()> {
    store.delete_note(caller, id)?;
    output.success(&format!("Deleted note {}", id));
    Ok(())
}

/// List catalog categories
pub fn categories(store: &Store, output: &Output) -> Result<()> {
    let categories = store.categories()?;
    output.print_categories(&categories);
    Ok(())
}
