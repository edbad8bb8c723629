use crate::Result;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Accumulates normalized images into an in-memory ZIP, assigning each SKU a
/// collision-free `<sku>-<n>.jpg` name.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
            names: HashSet::new(),
        }
    }

    /// Writes the entry under the first free `<sku>-<n>.jpg` (n starting at
    /// 1) and returns the chosen name. Repeated SKUs append the next number;
    /// names are never reused within one archive.
    pub fn add_entry(&mut self, sku: &str, bytes: &[u8]) -> Result<String> {
        let mut counter = 1_usize;
        let mut filename = format!("{sku}-{counter}.jpg");
        while self.names.contains(&filename) {
            counter += 1;
            filename = format!("{sku}-{counter}.jpg");
        }

        self.writer.start_file(&filename, self.options)?;
        self.writer.write_all(bytes)?;
        self.names.insert(filename.clone());
        Ok(filename)
    }

    pub fn entry_count(&self) -> usize {
        self.names.len()
    }

    /// Finishes the ZIP and returns the complete archive bytes.
    pub fn finalize(mut self) -> Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
