pub mod mapping;
pub mod record;
pub mod source;
pub mod table;
pub mod taxonomy;

pub use mapping::{FieldMap, FieldMappingConfig, InsuranceProvided};
pub use record::{
    DEFAULT_VALUE, DedupeKey, MEMBER_ID_LEN, MasterRecord, ROSTER_COLUMNS, normalize_member_id,
};
pub use source::{ConfigSource, StoreError};
pub use table::Table;
pub use taxonomy::GapsTaxonomy;
