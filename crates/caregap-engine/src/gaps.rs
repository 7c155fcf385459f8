//! Care-gap label normalization against the taxonomy.
//!
//! The taxonomy is a small reference table: canonical headers over rows of
//! accepted free-text synonyms. Rather than re-scanning every cell per
//! label, the index inverts the table once per invocation. Insertion is
//! column-major with first-insert-wins, so a label listed under two headers
//! resolves to the earlier column.

use std::collections::HashMap;

use caregap_model::GapsTaxonomy;

/// Reverse index from upper-cased synonym to canonical header.
#[derive(Debug, Clone)]
pub struct GapIndex {
    by_label: HashMap<String, String>,
}

impl GapIndex {
    pub fn new(taxonomy: &GapsTaxonomy) -> Self {
        let mut by_label = HashMap::new();
        for column in &taxonomy.columns {
            for row in &taxonomy.rows {
                let Some(label) = row.get(column) else {
                    continue;
                };
                let key = label.trim().to_uppercase();
                if key.is_empty() {
                    continue;
                }
                by_label.entry(key).or_insert_with(|| column.clone());
            }
        }
        Self { by_label }
    }

    /// Canonical header for a free-text label, `None` when unmapped.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.by_label
            .get(&label.trim().to_uppercase())
            .map(String::as_str)
    }
}
