//! Data layer export module
//!
//! Turns a list of map layer names into a ZIP archive of the data the database
//! associates with them. Tables are exported from the database; file paths are
//! resolved relative to the configured data directory.

pub mod archive;
pub mod items;
pub mod resolve;

use thiserror::Error;

pub use archive::{build_archive, GeneratedFile};
pub use items::{parse_rows, table_entry_name, validate_table, ExportItem, ExportKind};
pub use resolve::{resolve_files, ResolvedFile};

/// Archive name used when the client does not provide one
pub const DEFAULT_ARCHIVE_NAME: &str = "DownloadLIWO";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Security issue: layer name not valid: {0}")]
    UnsafeLayer(String),

    #[error("Security issue: data path not valid: {0}")]
    UnsafePath(String),

    #[error("Security issue: table name not valid: {0}")]
    UnsafeTable(String),

    #[error("Malformed file path row: {0}")]
    MalformedRow(String),

    #[error("Unsupported export type '{kind}' for '{name}'")]
    UnknownKind { name: String, kind: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Split a comma-separated layer list and reject traversal attempts
///
/// Blank entries are dropped. A layer containing `..` or starting with `/`
/// fails the whole request.
pub fn validate_layers(layers: &str) -> Result<Vec<&str>, ExportError> {
    let mut valid = Vec::new();
    for layer in layers.split(',').map(str::trim) {
        if layer.contains("..") || layer.starts_with('/') {
            return Err(ExportError::UnsafeLayer(layer.to_string()));
        }
        if !layer.is_empty() {
            valid.push(layer);
        }
    }
    Ok(valid)
}

/// Build the attachment file name (`<name>.zip`) from the requested name
///
/// The result is plain ASCII so it fits a `Content-Disposition` header.
pub fn attachment_name(name: Option<&str>) -> String {
    let cleaned: String = name
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '/' | '\\'))
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        format!("{DEFAULT_ARCHIVE_NAME}.zip")
    } else {
        format!("{cleaned}.zip")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_layers() {
        let layers =
            validate_layers("scenario_18734,gebiedsindeling_doorbraaklocaties_buitendijks").unwrap();
        assert_eq!(
            layers,
            vec!["scenario_18734", "gebiedsindeling_doorbraaklocaties_buitendijks"]
        );
    }

    #[test]
    fn test_validate_layers_drops_blanks() {
        assert_eq!(validate_layers(" a , ,b,").unwrap(), vec!["a", "b"]);
        assert!(validate_layers("").unwrap().is_empty());
    }

    #[test]
    fn test_validate_layers_rejects_traversal() {
        assert!(matches!(
            validate_layers("scenario_1,../etc/passwd"),
            Err(ExportError::UnsafeLayer(l)) if l == "../etc/passwd"
        ));
        assert!(matches!(
            validate_layers("/etc/passwd"),
            Err(ExportError::UnsafeLayer(_))
        ));
        assert!(matches!(
            validate_layers("a..b"),
            Err(ExportError::UnsafeLayer(_))
        ));
    }

    #[test]
    fn test_attachment_name() {
        assert_eq!(attachment_name(Some("test")), "test.zip");
        assert_eq!(attachment_name(Some("  dijkring 14 ")), "dijkring 14.zip");
        assert_eq!(attachment_name(Some("   ")), "DownloadLIWO.zip");
        assert_eq!(attachment_name(None), "DownloadLIWO.zip");
        assert_eq!(attachment_name(Some("a\"b/c\\d\r\n")), "abcd.zip");
        assert_eq!(attachment_name(Some("\"/\"")), "DownloadLIWO.zip");
        assert_eq!(attachment_name(Some("overstroming√")), "overstroming_.zip");
    }
}
