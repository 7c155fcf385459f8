pub mod repository;

pub use repository::{ConfigStore, StoredMapping, normalize_id};
