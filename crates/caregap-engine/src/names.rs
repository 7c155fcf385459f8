//! Patient name parsing.
//!
//! Three input shapes produce the same lower-cased `"first last"` match
//! key: combined "Last, First" columns, separate first/last columns, and
//! PDF filenames. Matching is exact string equality after case folding;
//! there is deliberately no fuzzy matching.

use std::path::Path;

/// Split a combined `"Last, First Middle"` value into (first, last).
///
/// Only the segment between the first and second comma supplies the given
/// name, so a suffix like `", Jr"` is discarded along with anything after
/// the first given-name token. A value with no comma is treated as a bare
/// last name.
pub fn split_full_name(raw: &str) -> (String, String) {
    match raw.split_once(',') {
        Some((last, rest)) => {
            let given = rest.split(',').next().unwrap_or("");
            let first = given.split_whitespace().next().unwrap_or("");
            (first.to_string(), last.trim().to_string())
        }
        None => (String::new(), raw.trim().to_string()),
    }
}

/// Strip path components and a trailing `.pdf` from an uploaded filename.
pub fn pdf_stem(filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    let lower = name.to_lowercase();
    if lower.ends_with(".pdf") {
        name[..name.len() - 4].to_string()
    } else {
        name.to_string()
    }
}

/// Derive a display name from a PDF filename stem.
///
/// The first token is the given name; the surname is the first later token
/// that does not look like a middle initial (length <= 2 and either a
/// single character or ending in a period). With fewer than two tokens the
/// whole stem is the name.
pub fn name_from_stem(stem: &str) -> String {
    let parts: Vec<&str> = stem.split_whitespace().collect();
    if parts.len() < 2 {
        return stem.to_string();
    }
    let first = parts[0];
    let last = parts[1..]
        .iter()
        .find(|part| !is_middle_initial(part))
        .copied()
        .unwrap_or(parts[1]);
    format!("{first} {last}")
}

fn is_middle_initial(part: &str) -> bool {
    part.len() <= 2 && (part.len() == 1 || part.ends_with('.'))
}

/// Compose the lower-cased match key used across all name sources.
pub fn name_key(first: &str, last: &str) -> String {
    format!("{first} {last}").to_lowercase()
}
