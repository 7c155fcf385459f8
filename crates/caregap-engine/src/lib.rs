pub mod archive;
pub mod columns;
pub mod error;
pub mod gaps;
pub mod merge;
pub mod names;
pub mod sort;
pub mod workbook;

pub use archive::ArchiveBuilder;
pub use columns::resolve_column;
pub use error::{EngineError, Result};
pub use gaps::GapIndex;
pub use merge::{MergeOutcome, MergeSummary, SourceStatus, SourceSummary, merge_sheets};
pub use names::{name_from_stem, name_key, pdf_stem, split_full_name};
pub use sort::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_FILES, SortOptions, SortOutcome, SortStrategy, SortSummary,
    sort_pdfs,
};
pub use workbook::table_to_xlsx;
