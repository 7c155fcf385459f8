//! Uploaded-file abstractions.
//!
//! Tabular uploads are small and held in memory as `UploadedFile`. PDF
//! batches can run to hundreds of files, so they come in behind the
//! `PdfSource` trait: the disk-backed implementation re-reads from its path
//! on every `read`, which is what lets the sort engine keep only one batch
//! of payloads alive at a time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An upload held fully in memory: a filename plus its raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Load an upload from disk, keeping only the final path component as
    /// the filename.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let filename = file_name(path);
        let bytes = fs::read(path)?;
        Ok(Self { filename, bytes })
    }

    pub fn is_csv(&self) -> bool {
        self.filename.to_lowercase().ends_with(".csv")
    }
}

/// A PDF identified by filename whose payload is fetched on demand.
pub trait PdfSource {
    fn filename(&self) -> &str;
    fn read(&self) -> io::Result<Vec<u8>>;
}

/// PDF payload already in memory (uploads handed over by a caller).
#[derive(Debug, Clone)]
pub struct MemoryPdf {
    filename: String,
    bytes: Vec<u8>,
}

impl MemoryPdf {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

impl PdfSource for MemoryPdf {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// PDF read from disk at classification time.
#[derive(Debug, Clone)]
pub struct DiskPdf {
    filename: String,
    path: PathBuf,
}

impl DiskPdf {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            filename: file_name(&path),
            path,
        }
    }
}

impl PdfSource for DiskPdf {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
