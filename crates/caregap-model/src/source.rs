use thiserror::Error;

use crate::mapping::FieldMappingConfig;
use crate::taxonomy::GapsTaxonomy;

/// Failures from the configuration store, split so callers can tell "the
/// system is down" from "your data is wrong".
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store itself could not be reached or read.
    #[error("configuration store unavailable: {0}")]
    Unavailable(String),
    /// A stored record exists but cannot be parsed.
    #[error("corrupt configuration record: {0}")]
    Corrupt(String),
}

/// Read-only view of the configuration store consumed by the engines.
///
/// Records are fetched fresh on every call; engines never cache across
/// invocations, so a merge always sees the current configuration.
pub trait ConfigSource {
    /// Field-mapping config by ID, `None` when no such record exists.
    fn field_mapping(&self, id: &str) -> Result<Option<FieldMappingConfig>, StoreError>;

    /// The singleton gaps taxonomy, `None` when none has been uploaded.
    fn gaps_taxonomy(&self) -> Result<Option<GapsTaxonomy>, StoreError>;
}
