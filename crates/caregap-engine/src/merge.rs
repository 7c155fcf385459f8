//! The sheet merge engine.
//!
//! Reconciles any number of portal care-gap exports against the master
//! roster: resolve each source's columns through its field-mapping config,
//! normalize names, insurance and care-gap labels, truncate member IDs,
//! deduplicate, and append what survives to the roster. The result is a
//! fresh single-sheet workbook; nothing persists between invocations.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use caregap_ingest::{UploadedFile, read_table};
use caregap_model::{
    ConfigSource, DEFAULT_VALUE, FieldMap, MasterRecord, ROSTER_COLUMNS, Table,
    normalize_member_id,
};

use crate::columns::resolve_column;
use crate::error::{EngineError, Result};
use crate::gaps::GapIndex;
use crate::names::split_full_name;
use crate::workbook::table_to_xlsx;

const SHEET_NAME: &str = "Merged Care Gaps";

/// Merged workbook bytes plus the counts a caller needs to judge the run.
#[derive(Debug)]
pub struct MergeOutcome {
    pub workbook: Vec<u8>,
    pub summary: MergeSummary,
}

#[derive(Debug, Default)]
pub struct MergeSummary {
    /// Rows carried over from the uploaded master.
    pub master_rows: usize,
    /// Whether the uploaded master had the canonical columns and was reused.
    pub master_reused: bool,
    pub sources: Vec<SourceSummary>,
    /// Staged rows dropped because their care-gap label is not in the taxonomy.
    pub unmapped_dropped: usize,
    /// Staged rows dropped as duplicates (within staging or against the master).
    pub duplicates_dropped: usize,
    /// Rows actually appended to the roster.
    pub rows_added: usize,
    /// Rows in the merged output.
    pub final_rows: usize,
}

#[derive(Debug)]
pub struct SourceSummary {
    pub filename: String,
    pub config_id: String,
    pub status: SourceStatus,
    /// Rows this source contributed to staging (before normalization).
    pub rows_staged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Staged,
    /// The referenced mapping config does not exist; source skipped.
    ConfigMissing,
    /// Care Gap, Member ID or DOB did not resolve; source skipped.
    RequiredColumnsMissing,
}

/// Merge care-gap sources into the master roster.
///
/// A missing taxonomy is fatal; a missing mapping config skips just that
/// source; an unreadable tabular file fails the whole call.
pub fn merge_sheets(
    master: &UploadedFile,
    sources: &[(UploadedFile, String)],
    store: &dyn ConfigSource,
) -> Result<MergeOutcome> {
    let taxonomy = store
        .gaps_taxonomy()?
        .ok_or(EngineError::TaxonomyMissing)?;
    let gap_index = GapIndex::new(&taxonomy);

    let mut summary = MergeSummary::default();
    let master_records = load_master(master, &mut summary)?;

    let mut staged: Vec<MasterRecord> = Vec::new();
    for (file, config_id) in sources {
        let Some(config) = store.field_mapping(config_id)? else {
            warn!(
                file = %file.filename,
                config_id = %config_id,
                "mapping config not found, skipping source"
            );
            summary.sources.push(SourceSummary {
                filename: file.filename.clone(),
                config_id: config_id.clone(),
                status: SourceStatus::ConfigMissing,
                rows_staged: 0,
            });
            continue;
        };
        let table = read_table(file)?;
        let (status, rows) = stage_source(&table, &config.fields, &file.filename);
        summary.sources.push(SourceSummary {
            filename: file.filename.clone(),
            config_id: config_id.clone(),
            status,
            rows_staged: rows.len(),
        });
        staged.extend(rows);
    }
    let staged_total = staged.len();

    // Normalize care-gap labels against the taxonomy; unmapped rows are
    // dropped, not errored.
    let mut mapped: Vec<MasterRecord> = Vec::with_capacity(staged.len());
    for mut record in staged {
        match gap_index.resolve(&record.care_gap) {
            Some(header) => {
                record.care_gap = header.to_string();
                record.member_id = normalize_member_id(&record.member_id);
                mapped.push(record);
            }
            None => summary.unmapped_dropped += 1,
        }
    }

    let mapped_total = mapped.len();
    let deduped = dedupe_both_keys(mapped);
    debug!(
        staged = staged_total,
        mapped = mapped_total,
        after_dedupe = deduped.len(),
        "staging normalized"
    );

    // Master rows go first so keep-first dedupe preserves them. The master
    // is deduplicated on its own up front: an uploaded master can carry
    // internal duplicates, and counting added rows against the raw length
    // would understate them.
    let master_unique = dedupe_both_keys(master_records);
    let master_count = master_unique.len();
    let mut combined = master_unique;
    combined.extend(deduped);
    let combined = dedupe_both_keys(combined);

    summary.final_rows = combined.len();
    summary.rows_added = combined.len().saturating_sub(master_count);
    summary.duplicates_dropped = mapped_total.saturating_sub(summary.rows_added);
    info!(
        master_rows = summary.master_rows,
        rows_added = summary.rows_added,
        final_rows = summary.final_rows,
        unmapped_dropped = summary.unmapped_dropped,
        "merge complete"
    );

    let mut table = Table::new(ROSTER_COLUMNS.iter().map(|c| (*c).to_string()).collect());
    for record in &combined {
        table.push_row(record.values().iter().map(|v| (*v).to_string()).collect());
    }
    let workbook = table_to_xlsx(&table, SHEET_NAME)?;
    Ok(MergeOutcome { workbook, summary })
}

/// Load the uploaded master, reusing it only when every canonical column is
/// present verbatim; anything else starts an empty roster.
fn load_master(master: &UploadedFile, summary: &mut MergeSummary) -> Result<Vec<MasterRecord>> {
    let table = read_table(master)?;
    let has_canonical = ROSTER_COLUMNS
        .iter()
        .all(|column| table.headers.iter().any(|header| header == column));
    if !has_canonical {
        warn!(
            file = %master.filename,
            "master file lacks the canonical columns, starting fresh"
        );
        return Ok(Vec::new());
    }
    let indices: Vec<usize> = ROSTER_COLUMNS
        .iter()
        .map(|column| {
            table
                .headers
                .iter()
                .position(|header| header == column)
                .unwrap_or(usize::MAX)
        })
        .collect();
    let mut records = Vec::with_capacity(table.rows.len());
    for row_idx in 0..table.rows.len() {
        let value = |pos: usize| table.cell(row_idx, indices[pos]).to_string();
        records.push(MasterRecord {
            first_name: value(0),
            last_name: value(1),
            member_id: value(2),
            care_gap: value(3),
            dob: value(4),
            insurance: value(5),
            provider: value(6),
            notes: value(7),
        });
    }
    summary.master_rows = records.len();
    summary.master_reused = true;
    Ok(records)
}

/// Map one source table through its field mapping into staged records.
fn stage_source(
    table: &Table,
    fields: &FieldMap,
    filename: &str,
) -> (SourceStatus, Vec<MasterRecord>) {
    let headers = &table.headers;
    let first_col = resolve_column(headers, fields.first_name.as_deref());
    let last_col = resolve_column(headers, fields.last_name.as_deref());
    let name_col = resolve_column(headers, fields.full_name.as_deref());
    let id_col = resolve_column(headers, fields.member_id.as_deref());
    let gap_col = resolve_column(headers, fields.care_gap.as_deref());
    let dob_col = resolve_column(headers, fields.dob.as_deref());
    let insurance_col = resolve_column(headers, fields.insurance.as_deref());
    let provider_col = resolve_column(headers, fields.provider.as_deref());
    let notes_col = resolve_column(headers, fields.notes.as_deref());

    let (Some(gap_col), Some(id_col), Some(dob_col)) = (gap_col, id_col, dob_col) else {
        warn!(
            file = %filename,
            "Care Gap, Member ID or DOB column did not resolve, skipping source"
        );
        return (SourceStatus::RequiredColumnsMissing, Vec::new());
    };

    // When the config says the sheet has no insurance column, the mapping's
    // Insurance entry is a literal value applied to every row.
    let insurance_literal = if fields.insurance_is_literal() {
        Some(fields.insurance.clone().unwrap_or_default())
    } else {
        None
    };

    let mut records = Vec::with_capacity(table.rows.len());
    for row_idx in 0..table.rows.len() {
        let cell = |col: usize| table.cell(row_idx, col).to_string();
        // Full Name takes precedence over split first/last columns.
        let (first_name, last_name) = match name_col {
            Some(col) => split_full_name(table.cell(row_idx, col)),
            None => (
                first_col.map(cell).unwrap_or_default(),
                last_col.map(cell).unwrap_or_default(),
            ),
        };
        let insurance = match &insurance_literal {
            Some(literal) => literal.clone(),
            None => insurance_col
                .map(cell)
                .unwrap_or_else(|| DEFAULT_VALUE.to_string()),
        };
        records.push(MasterRecord {
            first_name,
            last_name,
            member_id: cell(id_col),
            care_gap: cell(gap_col),
            dob: cell(dob_col),
            insurance,
            provider: provider_col
                .map(cell)
                .unwrap_or_else(|| DEFAULT_VALUE.to_string()),
            notes: notes_col
                .map(cell)
                .unwrap_or_else(|| DEFAULT_VALUE.to_string()),
        });
    }
    (SourceStatus::Staged, records)
}

/// Drop duplicates with both identity keys, sequentially, keeping the first
/// occurrence in input order.
fn dedupe_both_keys(records: Vec<MasterRecord>) -> Vec<MasterRecord> {
    let by_member = dedupe_by(records, MasterRecord::member_key);
    dedupe_by(by_member, MasterRecord::dob_key)
}

fn dedupe_by<K: Ord>(
    records: Vec<MasterRecord>,
    key: impl Fn(&MasterRecord) -> K,
) -> Vec<MasterRecord> {
    let mut seen = BTreeSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(key(record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: &str, member_id: &str, dob: &str) -> MasterRecord {
        MasterRecord {
            first_name: first.to_string(),
            last_name: "Smith".to_string(),
            member_id: member_id.to_string(),
            care_gap: "Diabetes".to_string(),
            dob: dob.to_string(),
            insurance: "Acme".to_string(),
            provider: DEFAULT_VALUE.to_string(),
            notes: DEFAULT_VALUE.to_string(),
        }
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let rows = vec![
            record("John", "123456", "1960-01-01"),
            record("John", "123456", "1999-09-09"),
        ];
        let deduped = dedupe_both_keys(rows);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].dob, "1960-01-01");
    }

    #[test]
    fn dedupe_applies_the_dob_key_too() {
        // Different member IDs, same DOB: the second pass catches it.
        let rows = vec![
            record("John", "111111", "1960-01-01"),
            record("John", "222222", "1960-01-01"),
        ];
        let deduped = dedupe_both_keys(rows);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].member_id, "111111");
    }

    #[test]
    fn distinct_records_survive_both_passes() {
        let rows = vec![
            record("John", "111111", "1960-01-01"),
            record("Jane", "222222", "1970-02-02"),
        ];
        assert_eq!(dedupe_both_keys(rows).len(), 2);
    }
}
