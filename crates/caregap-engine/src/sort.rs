//! The PDF sort engine.
//!
//! Classifies a batch of patient PDFs against the master roster and packs
//! them into a per-insurer folder structure inside a zip archive. PDF bytes
//! are opaque; only filenames are interpreted.
//!
//! Two classification strategies exist because the operating conditions
//! differ: `ByName` for small, trusted batches (exact roster-name lookup,
//! any read failure is fatal), and `ByMemberId` for large or noisy batches
//! (substring match on an ID token, bounded-size batches, unreadable files
//! skipped and counted instead of failing the run).

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use caregap_ingest::{PdfSource, UploadedFile, read_table};
use caregap_model::Table;

use crate::archive::ArchiveBuilder;
use crate::columns::resolve_column;
use crate::error::{EngineError, Result};
use crate::names::{name_from_stem, name_key, pdf_stem};

/// Capacity cap: batches beyond this are rejected before any processing.
pub const DEFAULT_MAX_FILES: usize = 200;
/// Batch size for the hardened strategy; payloads are released per batch.
pub const DEFAULT_BATCH_SIZE: usize = 25;

const UNSORTED_FOLDER: &str = "Unsorted";
const UNMATCHED_FOLDER: &str = "Unmatched";
const SUMMARY_FILE: &str = "Sorting_Summary.txt";
const FOLDER_NAME_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortStrategy {
    /// Match roster names derived from PDF filenames; folder per insurer.
    #[default]
    ByName,
    /// Match a member-ID token against any roster cell; folder per
    /// insurance/care-gap pair.
    ByMemberId,
}

#[derive(Debug, Clone, Copy)]
pub struct SortOptions {
    pub strategy: SortStrategy,
    pub max_files: usize,
    pub batch_size: usize,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            strategy: SortStrategy::default(),
            max_files: DEFAULT_MAX_FILES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Archive bytes plus classification counts.
#[derive(Debug)]
pub struct SortOutcome {
    pub archive: Vec<u8>,
    pub summary: SortSummary,
}

#[derive(Debug, Default)]
pub struct SortSummary {
    /// Destination folders actually created, sorted.
    pub folders: BTreeSet<String>,
    /// PDFs placed into the archive.
    pub sorted: usize,
    /// PDFs skipped because they could not be read (ByMemberId only).
    pub skipped: usize,
}

/// Sort a batch of PDFs against the master roster.
pub fn sort_pdfs(
    master: &UploadedFile,
    pdfs: &[Box<dyn PdfSource>],
    options: &SortOptions,
) -> Result<SortOutcome> {
    if pdfs.len() > options.max_files {
        return Err(EngineError::TooManyFiles {
            count: pdfs.len(),
            limit: options.max_files,
        });
    }
    let roster = read_table(master)?;
    match options.strategy {
        SortStrategy::ByName => sort_by_name(&roster, pdfs),
        SortStrategy::ByMemberId => sort_by_member_id(&roster, pdfs, options.batch_size),
    }
}

fn sort_by_name(roster: &Table, pdfs: &[Box<dyn PdfSource>]) -> Result<SortOutcome> {
    let first_col = require_column(roster, "First Name")?;
    let last_col = require_column(roster, "Last Name")?;
    let insurance_col = require_column(roster, "Insurance")?;

    // Name key -> insurance. First non-empty value wins; a later empty
    // never overwrites, a later non-empty fills a previously empty slot.
    let mut insurance_by_name: HashMap<String, String> = HashMap::new();
    for row_idx in 0..roster.rows.len() {
        let key = name_key(
            roster.cell(row_idx, first_col),
            roster.cell(row_idx, last_col),
        );
        let insurance = roster.cell(row_idx, insurance_col).to_string();
        insurance_by_name
            .entry(key)
            .and_modify(|existing| {
                if existing.is_empty() && !insurance.is_empty() {
                    *existing = insurance.clone();
                }
            })
            .or_insert(insurance);
    }

    let mut builder = ArchiveBuilder::new();
    let mut summary = SortSummary::default();
    for pdf in pdfs {
        let stem = pdf_stem(pdf.filename());
        let name = name_from_stem(&stem).to_lowercase();
        let folder = match insurance_by_name.get(&name) {
            Some(insurance) => insurer_folder(insurance),
            None => UNSORTED_FOLDER.to_string(),
        };
        let bytes = pdf.read().map_err(|err| EngineError::PdfUnreadable {
            name: pdf.filename().to_string(),
            detail: err.to_string(),
        })?;
        let entry_name = entry_filename(pdf.filename());
        builder.add_file(&format!("{folder}/{entry_name}"), &bytes)?;
        summary.folders.insert(folder);
        summary.sorted += 1;
    }

    builder.add_file(SUMMARY_FILE, render_summary(&summary).as_bytes())?;
    info!(
        folders = summary.folders.len(),
        sorted = summary.sorted,
        "pdf sort complete"
    );
    Ok(SortOutcome {
        archive: builder.finish()?,
        summary,
    })
}

fn sort_by_member_id(
    roster: &Table,
    pdfs: &[Box<dyn PdfSource>],
    batch_size: usize,
) -> Result<SortOutcome> {
    let insurance_col = resolve_column(&roster.headers, Some("Insurance"));
    let gap_col = resolve_column(&roster.headers, Some("Care Gap"));

    let mut builder = ArchiveBuilder::new();
    let mut summary = SortSummary::default();
    let batch_size = batch_size.max(1);
    for (batch_idx, batch) in pdfs.chunks(batch_size).enumerate() {
        for pdf in batch {
            // Per-item leniency: a file we cannot read is skipped, not fatal.
            let bytes = match pdf.read() {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(file = %pdf.filename(), error = %err, "skipping unreadable pdf");
                    summary.skipped += 1;
                    continue;
                }
            };
            let stem = pdf_stem(pdf.filename());
            let token = stem.split('_').next().unwrap_or(&stem).trim().to_lowercase();
            let folder = match find_row_containing(roster, &token) {
                Some(row_idx) => {
                    let insurance = insurance_col
                        .map(|col| roster.cell(row_idx, col))
                        .unwrap_or("");
                    let gap = gap_col.map(|col| roster.cell(row_idx, col)).unwrap_or("");
                    destination_folder(insurance, gap)
                }
                None => UNMATCHED_FOLDER.to_string(),
            };
            let entry_name = entry_filename(pdf.filename());
            builder.add_file(&format!("{folder}/{entry_name}"), &bytes)?;
            summary.folders.insert(folder);
            summary.sorted += 1;
            // `bytes` drops here; only one payload is alive at a time.
        }
        debug!(
            batch = batch_idx + 1,
            sorted = summary.sorted,
            skipped = summary.skipped,
            "batch flushed"
        );
    }
    info!(
        folders = summary.folders.len(),
        sorted = summary.sorted,
        skipped = summary.skipped,
        "pdf sort complete"
    );
    Ok(SortOutcome {
        archive: builder.finish()?,
        summary,
    })
}

/// Case-insensitive substring scan over every roster cell; first matching
/// row wins. An empty token matches nothing.
fn find_row_containing(roster: &Table, token: &str) -> Option<usize> {
    if token.is_empty() {
        return None;
    }
    roster.rows.iter().position(|row| {
        row.iter()
            .any(|cell| cell.to_lowercase().contains(token))
    })
}

fn require_column(roster: &Table, name: &str) -> Result<usize> {
    resolve_column(&roster.headers, Some(name)).ok_or_else(|| {
        EngineError::Input(format!("master roster is missing a '{name}' column"))
    })
}

/// Folder for a matched insurer: first whitespace token, capped length.
fn insurer_folder(insurance: &str) -> String {
    let token = insurance.split_whitespace().next().unwrap_or("");
    let folder: String = token.chars().take(FOLDER_NAME_LEN).collect();
    if folder.is_empty() {
        UNSORTED_FOLDER.to_string()
    } else {
        folder
    }
}

/// Folder for a member-ID match: `{Insurance}_{CareGap}` stripped down to
/// filesystem-safe characters.
fn destination_folder(insurance: &str, gap: &str) -> String {
    let raw = format!("{insurance}_{gap}");
    let folder: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let folder = folder.trim().to_string();
    if folder.trim_matches('_').trim().is_empty() {
        UNMATCHED_FOLDER.to_string()
    } else {
        folder
    }
}

fn entry_filename(filename: &str) -> String {
    std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename)
        .to_string()
}

fn render_summary(summary: &SortSummary) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "Number of folders created: {}\n",
        summary.folders.len()
    ));
    text.push_str(&format!("Total PDFs sorted: {}\n", summary.sorted));
    text.push_str("\nFolders:\n");
    for folder in &summary.folders {
        text.push_str(&format!("  - {folder}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insurer_folder_truncates_first_token() {
        assert_eq!(insurer_folder("BlueCross Premium Plan"), "BlueCross");
        assert_eq!(insurer_folder("UnitedHealthcareGroup Plan"), "UnitedHealth");
        assert_eq!(insurer_folder(""), "Unsorted");
    }

    #[test]
    fn destination_folder_strips_unsafe_characters() {
        assert_eq!(
            destination_folder("Blue/Cross", "A1c > 9%"),
            "BlueCross_A1c  9"
        );
        assert_eq!(destination_folder("", ""), "Unmatched");
    }

    #[test]
    fn summary_text_lists_folders_sorted() {
        let mut summary = SortSummary::default();
        summary.folders.insert("BlueCross".to_string());
        summary.folders.insert("Acme".to_string());
        summary.sorted = 3;
        let text = render_summary(&summary);
        assert!(text.starts_with("Number of folders created: 2\n"));
        assert!(text.contains("Total PDFs sorted: 3\n"));
        let acme = text.find("  - Acme").unwrap();
        let blue = text.find("  - BlueCross").unwrap();
        assert!(acme < blue);
    }
}
