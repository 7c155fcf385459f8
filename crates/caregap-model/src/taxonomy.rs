use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::table::Table;

/// The canonical care-gap vocabulary: one column per canonical header, rows
/// holding the free-text labels source sheets use for that gap.
///
/// A single record exists at a time; replacing it fully overwrites the
/// previous vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapsTaxonomy {
    /// Canonical headers, in declared order. Order matters: when a label
    /// appears under more than one header, the earlier column wins.
    pub columns: Vec<String>,
    /// Synonym rows keyed by canonical header. Rows are sparse; a header
    /// with fewer synonyms simply stops appearing.
    pub rows: Vec<BTreeMap<String, String>>,
}

impl GapsTaxonomy {
    /// Build a taxonomy from an uploaded table: headers become canonical
    /// gap names, cells become accepted synonyms. Blank cells are dropped.
    pub fn from_table(table: &Table) -> Self {
        let columns: Vec<String> = table
            .headers
            .iter()
            .map(|header| header.trim().to_string())
            .filter(|header| !header.is_empty())
            .collect();
        let mut rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let mut labels = BTreeMap::new();
            for (idx, header) in table.headers.iter().enumerate() {
                let header = header.trim();
                if header.is_empty() {
                    continue;
                }
                let value = row.get(idx).map(|cell| cell.trim()).unwrap_or("");
                if !value.is_empty() {
                    labels.insert(header.to_string(), value.to_string());
                }
            }
            if !labels.is_empty() {
                rows.push(labels);
            }
        }
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
