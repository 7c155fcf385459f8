pub mod files;
pub mod table_reader;

pub use files::{DiskPdf, MemoryPdf, PdfSource, UploadedFile};
pub use table_reader::{IngestError, read_table};
