use super::NewDocument;
use crate::error::DocsignError;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const PDF_MIME: &str = "application/pdf";

/// File types accepted for document upload.
pub const ACCEPTED_UPLOAD_TYPES: &[&str] = &[PDF_MIME];

/// Whether the file's type (derived from its extension) may be uploaded.
pub fn validate_file_type(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first_raw()
        .is_some_and(|mime| ACCEPTED_UPLOAD_TYPES.contains(&mime))
}

/// Last path segment, or the input itself when there is none.
pub fn extract_file_name(file_path: &str) -> String {
    match file_path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => file_path.to_string(),
    }
}

/// Human-readable size, e.g. `1.5 KB`. Trailing zeroes are dropped.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const SIZES: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let k = 1024f64;
    let b = bytes as f64;
    let i = ((b.ln() / k.ln()).floor() as usize).min(SIZES.len() - 1);
    let value = b / k.powi(i as i32);
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZES[i])
}

/// Files selected for upload, split into accepted and rejected by type.
#[derive(Debug, Default)]
pub struct UploadSelection {
    pub accepted: Vec<PathBuf>,
    pub rejected: Vec<PathBuf>,
}

impl UploadSelection {
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut selection = UploadSelection::default();
        for path in paths {
            let path = path.into();
            if validate_file_type(&path) {
                selection.accepted.push(path);
            } else {
                warn!("rejecting {}: only PDF files are supported", path.display());
                selection.rejected.push(path);
            }
        }
        selection
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Builds the creation request for a local file: the file name becomes the
/// title and a `file://` URL the content locator.
pub fn new_document_for_path(path: &Path) -> Result<NewDocument, DocsignError> {
    if !validate_file_type(path) {
        return Err(DocsignError::ValidationError(format!(
            "'{}' is not a PDF. Only PDF files are supported.",
            path.display()
        )));
    }
    let display = path.to_string_lossy();
    let title = extract_file_name(&display);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let url = url::Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| display.to_string());
    Ok(NewDocument::new(title, url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_only() {
        assert!(validate_file_type(Path::new("contract.pdf")));
        assert!(validate_file_type(Path::new("CONTRACT.PDF")));
        assert!(!validate_file_type(Path::new("photo.png")));
        assert!(!validate_file_type(Path::new("noextension")));
    }

    #[test]
    fn test_extract_file_name() {
        assert_eq!(extract_file_name("/tmp/uploads/Contract.pdf"), "Contract.pdf");
        assert_eq!(extract_file_name("Contract.pdf"), "Contract.pdf");
        assert_eq!(extract_file_name("dir/"), "dir/");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn test_selection_partitions_by_type() {
        let selection = UploadSelection::from_paths(["a.pdf", "b.docx", "c.pdf"]);
        assert_eq!(selection.accepted.len(), 2);
        assert_eq!(selection.rejected, vec![PathBuf::from("b.docx")]);
    }

    #[test]
    fn test_new_document_for_path() {
        let new_doc = new_document_for_path(Path::new("/srv/files/Lease.pdf")).unwrap();
        assert_eq!(new_doc.title, "Lease.pdf");
        assert_eq!(new_doc.url, "file:///srv/files/Lease.pdf");
        assert!(new_document_for_path(Path::new("/srv/files/Lease.txt")).is_err());
    }
}
