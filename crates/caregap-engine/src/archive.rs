//! In-memory zip assembly for the sorted-PDF download.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{EngineError, Result};

/// Builds a deflate-compressed archive in memory, one entry at a time.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add one entry under the given archive path.
    pub fn add_file(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(path, options)
            .map_err(|err| EngineError::Output(format!("{path}: {err}")))?;
        self.writer
            .write_all(bytes)
            .map_err(|err| EngineError::Output(format!("{path}: {err}")))?;
        Ok(())
    }

    /// Finalize the archive and hand back its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .writer
            .finish()
            .map_err(|err| EngineError::Output(err.to_string()))?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
