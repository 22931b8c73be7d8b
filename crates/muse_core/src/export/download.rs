//! Saving exported documents to disk.
//!
//! File names and MIME types are supplied by the caller, nothing is inferred
//! from the content.

use super::ExportError;
use std::path::{Path, PathBuf};

pub const MARKDOWN_MIME: &str = "text/markdown";
pub const HTML_MIME: &str = "text/html";
pub const PDF_MIME: &str = "application/pdf";

/// A document written by [`save_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    pub path: PathBuf,
    pub mime: String,
    pub size: usize,
}

fn validate_file_name(file_name: &str) -> Result<(), ExportError> {
    let invalid = file_name.trim().is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0']);

    if invalid {
        Err(ExportError::InvalidFileName(file_name.to_string()))
    } else {
        Ok(())
    }
}

/// Writes `contents` to `dir/file_name`, creating `dir` if needed.
///
/// An existing file with the same name is overwritten.
pub async fn save_document(
    dir: &Path,
    file_name: &str,
    contents: impl AsRef<[u8]>,
    mime: &str,
) -> Result<SavedDocument, ExportError> {
    validate_file_name(file_name)?;

    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(file_name);
    let contents = contents.as_ref();
    tokio::fs::write(&path, contents).await?;

    tracing::debug!(path = %path.display(), mime, size = contents.len(), "Saved document");

    Ok(SavedDocument {
        path,
        mime: mime.to_string(),
        size: contents.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_document() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");

        let saved = save_document(&target, "notes.md", "# Notes\n", MARKDOWN_MIME)
            .await
            .unwrap();

        assert_eq!(saved.path, target.join("notes.md"));
        assert_eq!(saved.mime, "text/markdown");
        assert_eq!(saved.size, 8);
        assert_eq!(std::fs::read_to_string(&saved.path).unwrap(), "# Notes\n");
    }

    #[tokio::test]
    async fn test_caller_supplies_name_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_document(dir.path(), "report.weird", b"<p/>", "text/x-custom")
            .await
            .unwrap();
        assert!(saved.path.ends_with("report.weird"));
        assert_eq!(saved.mime, "text/x-custom");
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["", " ", "..", "../escape.md", "a/b.md"] {
            let result = save_document(dir.path(), name, "x", MARKDOWN_MIME).await;
            assert!(
                matches!(result, Err(ExportError::InvalidFileName(_))),
                "{name:?} should be rejected"
            );
        }
    }
}
