//! Tabular ingest from uploaded byte buffers.
//!
//! Uploads arrive as raw bytes plus a filename; the extension decides the
//! parser (`.csv` → the csv crate, anything else → calamine's auto-detected
//! spreadsheet reader). The first non-empty row is the header row; portal
//! exports always carry one.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use csv::ReaderBuilder;
use thiserror::Error;
use tracing::debug;

use caregap_model::Table;

use crate::files::UploadedFile;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unreadable tabular file '{name}': {detail}")]
    Tabular { name: String, detail: String },
    #[error("file '{name}' contains no worksheets")]
    EmptyWorkbook { name: String },
}

/// Read an uploaded CSV or spreadsheet into a string table.
pub fn read_table(file: &UploadedFile) -> Result<Table, IngestError> {
    let table = if file.is_csv() {
        read_csv(file)?
    } else {
        read_workbook(file)?
    };
    debug!(
        file = %file.filename,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "tabular file ingested"
    );
    Ok(table)
}

fn read_csv(file: &UploadedFile) -> Result<Table, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file.bytes.as_slice());
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| IngestError::Tabular {
            name: file.filename.clone(),
            detail: err.to_string(),
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    Ok(table_from_rows(raw_rows))
}

fn read_workbook(file: &UploadedFile) -> Result<Table, IngestError> {
    let cursor = Cursor::new(file.bytes.as_slice());
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|err| IngestError::Tabular {
        name: file.filename.clone(),
        detail: err.to_string(),
    })?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyWorkbook {
            name: file.filename.clone(),
        })?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| IngestError::Tabular {
            name: file.filename.clone(),
            detail: err.to_string(),
        })?;
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for cells in range.rows() {
        let row: Vec<String> = cells.iter().map(cell_to_string).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    Ok(table_from_rows(raw_rows))
}

fn table_from_rows(mut raw_rows: Vec<Vec<String>>) -> Table {
    if raw_rows.is_empty() {
        return Table::default();
    }
    let headers = raw_rows.remove(0);
    let mut table = Table::new(headers);
    for record in raw_rows {
        let mut row = Vec::with_capacity(table.headers.len());
        for idx in 0..table.headers.len() {
            row.push(record.get(idx).cloned().unwrap_or_default());
        }
        table.push_row(row);
    }
    table
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Render a spreadsheet cell the way it reads: whole numbers without a
/// trailing `.0` (member IDs come back as floats otherwise), dates in ISO
/// form, everything else via its text value.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => normalize_cell(value),
        Data::Float(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => {
                if datetime.time() == chrono_midnight() {
                    datetime.format("%Y-%m-%d").to_string()
                } else {
                    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            None => value.as_f64().to_string(),
        },
        Data::DateTimeIso(value) | Data::DurationIso(value) => normalize_cell(value),
        Data::Error(_) => String::new(),
    }
}

fn chrono_midnight() -> chrono::NaiveTime {
    chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default()
}
