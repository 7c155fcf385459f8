//! Spreadsheet serialization.

use rust_xlsxwriter::Workbook;

use caregap_model::Table;

use crate::error::{EngineError, Result};

/// Serialize a table to a single-sheet xlsx byte buffer.
pub fn table_to_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|err| EngineError::Output(err.to_string()))?;
    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header)
            .map_err(|err| EngineError::Output(err.to_string()))?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32 + 1, col as u16, value)
                .map_err(|err| EngineError::Output(err.to_string()))?;
        }
    }
    workbook
        .save_to_buffer()
        .map_err(|err| EngineError::Output(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use caregap_ingest::{UploadedFile, read_table};

    #[test]
    fn round_trips_through_the_reader() {
        let mut table = Table::new(vec!["First Name".to_string(), "Member ID".to_string()]);
        table.push_row(vec!["Jane".to_string(), "123456".to_string()]);
        let bytes = table_to_xlsx(&table, "Merged Care Gaps").expect("serialize");

        let read = read_table(&UploadedFile::new("out.xlsx", bytes)).expect("read back");
        assert_eq!(read.headers, table.headers);
        assert_eq!(read.rows, table.rows);
    }
}
