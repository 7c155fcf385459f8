//! File-system store for configuration records.
//!
//! Field-mapping configs are stored one JSON document per file under
//! `mappings/{ID}.json`; the gaps taxonomy is the singleton `taxonomy.json`
//! beside them. IDs are derived from the record name (uppercased,
//! non-alphanumerics collapsed to `_`) so filenames stay portable.
//!
//! The engines consume this store read-only through
//! `caregap_model::ConfigSource`; the CRUD surface below is what the
//! operator CLI drives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use caregap_model::{ConfigSource, FieldMappingConfig, GapsTaxonomy, StoreError};

const MAPPINGS_DIR: &str = "mappings";
const TAXONOMY_FILE: &str = "taxonomy.json";

/// Directory-backed configuration store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: PathBuf,
}

/// A mapping record plus the ID it is stored under.
#[derive(Debug, Clone)]
pub struct StoredMapping {
    pub id: String,
    pub config: FieldMappingConfig,
}

impl ConfigStore {
    /// Open (creating if needed) a store rooted at `base_dir`.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join(MAPPINGS_DIR))
            .map_err(|err| unavailable(&base_dir, &err))?;
        Ok(Self { base_dir })
    }

    /// Save a field-mapping config under the given ID (or one derived from
    /// its name). Returns the ID the record is stored under.
    pub fn save_mapping(
        &self,
        config: &FieldMappingConfig,
        id: Option<&str>,
    ) -> Result<String, StoreError> {
        let id = match id {
            Some(explicit) => normalize_id(explicit),
            None => normalize_id(&config.name),
        };
        if id.is_empty() {
            return Err(StoreError::Corrupt(
                "mapping config has no usable name for an ID".to_string(),
            ));
        }
        let path = self.mapping_path(&id);
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        fs::write(&path, json).map_err(|err| unavailable(&path, &err))?;
        debug!(id = %id, path = %path.display(), "mapping config saved");
        Ok(id)
    }

    /// List all stored mappings, sorted by ID.
    pub fn list_mappings(&self) -> Result<Vec<StoredMapping>, StoreError> {
        let dir = self.base_dir.join(MAPPINGS_DIR);
        let mut mappings = Vec::new();
        let entries = fs::read_dir(&dir).map_err(|err| unavailable(&dir, &err))?;
        for entry in entries {
            let entry = entry.map_err(|err| unavailable(&dir, &err))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(id) = name.strip_suffix(".json") else {
                continue;
            };
            let config = read_json::<FieldMappingConfig>(&path)?;
            mappings.push(StoredMapping {
                id: id.to_string(),
                config,
            });
        }
        mappings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(mappings)
    }

    /// Delete a mapping; returns whether a record existed.
    pub fn delete_mapping(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.mapping_path(&normalize_id(id));
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|err| unavailable(&path, &err))?;
        Ok(true)
    }

    /// Replace the singleton gaps taxonomy.
    pub fn replace_taxonomy(&self, taxonomy: &GapsTaxonomy) -> Result<(), StoreError> {
        let path = self.taxonomy_path();
        let json = serde_json::to_string_pretty(taxonomy)
            .map_err(|err| StoreError::Corrupt(err.to_string()))?;
        fs::write(&path, json).map_err(|err| unavailable(&path, &err))?;
        debug!(
            columns = taxonomy.columns.len(),
            rows = taxonomy.rows.len(),
            "gaps taxonomy replaced"
        );
        Ok(())
    }

    fn mapping_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(MAPPINGS_DIR).join(format!("{id}.json"))
    }

    fn taxonomy_path(&self) -> PathBuf {
        self.base_dir.join(TAXONOMY_FILE)
    }
}

impl ConfigSource for ConfigStore {
    fn field_mapping(&self, id: &str) -> Result<Option<FieldMappingConfig>, StoreError> {
        let path = self.mapping_path(&normalize_id(id));
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    fn gaps_taxonomy(&self) -> Result<Option<GapsTaxonomy>, StoreError> {
        let path = self.taxonomy_path();
        if !path.exists() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path).map_err(|err| unavailable(path, &err))?;
    serde_json::from_str(&contents)
        .map_err(|err| StoreError::Corrupt(format!("{}: {err}", path.display())))
}

fn unavailable(path: &Path, err: &io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}

/// Normalize a record name or ID for use as a filename.
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
