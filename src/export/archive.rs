//! ZIP archive building

use std::fs::File;
use std::io::{Cursor, Write};

use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use super::{ExportError, ResolvedFile};

/// Archive entry produced in memory, such as an exported table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub entry_name: String,
    pub contents: Vec<u8>,
}

/// Write the generated entries, then every resolved file, into an in-memory ZIP archive
pub fn build_archive(
    generated: &[GeneratedFile],
    files: &[ResolvedFile],
) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    for entry in generated {
        zip.start_file(entry.entry_name.as_str(), options)?;
        zip.write_all(&entry.contents)?;
    }

    for file in files {
        zip.start_file(file.entry_name.as_str(), options)?;
        let mut source = File::open(&file.path)?;
        std::io::copy(&mut source, &mut zip)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
