//! Export items listed by the file-path procedure
//!
//! Each row is a comma-separated list of `<source>,<type>` pairs, e.g.
//! `static_information.tbl_breachlocations,shape1,static_information_geodata.infrastructuur_dijkringen,shape`.
//! The type decides whether the source is a database table or a path under the
//! data directory.

use super::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// A (PostGIS) table, exported from the database
    Table,
    /// A file or directory relative to the data directory
    File,
}

impl ExportKind {
    /// `shape`, `shape1`, ... are tables; raster and plain file types live on disk
    fn parse(token: &str) -> Option<Self> {
        let token = token.to_ascii_lowercase();
        if token.starts_with("shape") {
            return Some(Self::Table);
        }
        match token.as_str() {
            "file" | "tif" | "tiff" | "geotiff" | "raster" => Some(Self::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
    pub source: String,
    pub kind: ExportKind,
}

/// Parse procedure rows into export items, in row order
///
/// Blank tokens are ignored. A source without a type or with an unknown type
/// fails the export.
pub fn parse_rows(rows: &[String]) -> Result<Vec<ExportItem>, ExportError> {
    let mut items = Vec::new();
    for row in rows {
        let tokens: Vec<&str> = row
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let pairs = tokens.chunks_exact(2);
        if let [dangling] = pairs.remainder() {
            return Err(ExportError::MalformedRow(format!(
                "'{dangling}' has no export type"
            )));
        }

        for pair in pairs {
            let [source, kind] = pair else { continue };
            let kind = ExportKind::parse(kind).ok_or_else(|| ExportError::UnknownKind {
                name: (*source).to_string(),
                kind: (*kind).to_string(),
            })?;
            items.push(ExportItem {
                source: (*source).to_string(),
                kind,
            });
        }
    }
    Ok(items)
}

/// Check a `schema.table` (or bare `table`) name
///
/// Only ASCII letters, digits and `_` are accepted in each part.
pub fn validate_table(source: &str) -> Result<(), ExportError> {
    let parts: Vec<&str> = source.split('.').collect();
    let valid = (1..=2).contains(&parts.len())
        && parts.iter().all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(ExportError::UnsafeTable(source.to_string()))
    }
}

/// Archive entry holding the exported table
pub fn table_entry_name(source: &str) -> String {
    format!("{source}.geojson")
}
