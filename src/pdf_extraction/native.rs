// In-process extraction with lopdf
//
// The document is loaded in place first. If that fails for a reason other
// than a missing file, it is copied to a scratch file and loaded once more.
// The scratch copy is removed as soon as the attempt resolves.
use lopdf::Document;
use std::path::{Path, PathBuf};

use super::{require_text, ExtractError, ExtractionMethod, TextExtractor};
use crate::file_picker::PickedFile;
use crate::types::ErrorKind;

#[derive(Debug, Clone, Default)]
pub struct NativeExtractor {
    scratch_dir: Option<PathBuf>,
}

impl NativeExtractor {
    pub fn new(scratch_dir: Option<PathBuf>) -> Self {
        Self { scratch_dir }
    }
}

impl TextExtractor for NativeExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Native
    }

    async fn extract(&self, file: &PickedFile) -> Result<String, ExtractError> {
        let path = file.local_path();
        let scratch_dir = self.scratch_dir.clone();
        tokio::task::spawn_blocking(move || extract_from_path(&path, scratch_dir.as_deref()))
            .await
            .map_err(|e| ExtractError::new(ErrorKind::Unknown, format!("extraction task failed: {}", e)))?
    }
}

/// Blocking extraction, usable outside the runtime.
pub fn extract_from_path(path: &Path, scratch_dir: Option<&Path>) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::new(
            ErrorKind::FileNotFound,
            format!("{} does not exist", path.display()),
        ));
    }

    let document = match Document::load(path) {
        Ok(document) => document,
        Err(e) if mentions_encryption(&e.to_string()) => {
            return Err(ExtractError::new(ErrorKind::EncryptedDocument, e.to_string()));
        }
        Err(e) => {
            log::warn!("native: direct load of {} failed ({}), retrying from a scratch copy", path.display(), e);
            load_via_scratch_copy(path, scratch_dir)?
        }
    };

    text_from_document(&document)
}

fn load_via_scratch_copy(path: &Path, scratch_dir: Option<&Path>) -> Result<Document, ExtractError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("readerchunks-").suffix(".pdf");
    let scratch = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| ExtractError::from_io(&e))?;

    let loaded = std::fs::copy(path, scratch.path())
        .map_err(|e| ExtractError::from_io(&e))
        .and_then(|bytes| {
            log::debug!("native: copied {} bytes to {}", bytes, scratch.path().display());
            Document::load(scratch.path()).map_err(|e| classify_load_error(&e))
        });

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        log::warn!("native: could not remove scratch copy {}: {}", scratch_path.display(), e);
    }
    loaded
}

fn text_from_document(document: &Document) -> Result<String, ExtractError> {
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    log::debug!("native: {} pages", pages.len());

    let mut text = String::new();
    for page in &pages {
        match document.extract_text(&[*page]) {
            Ok(page_text) => {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&page_text);
            }
            Err(e) => log::debug!("native: page {} has no readable text: {}", page, e),
        }
    }

    if text.trim().is_empty() && document.is_encrypted() {
        return Err(ExtractError::new(
            ErrorKind::EncryptedDocument,
            "document is encrypted",
        ));
    }
    require_text(text)
}

fn classify_load_error(err: &lopdf::Error) -> ExtractError {
    let detail = err.to_string();
    let kind = if mentions_encryption(&detail) {
        ErrorKind::EncryptedDocument
    } else {
        ErrorKind::Unknown
    };
    ExtractError::new(kind, detail)
}

fn mentions_encryption(detail: &str) -> bool {
    let lower = detail.to_ascii_lowercase();
    lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    /// One blank page; with `encrypt` the trailer points at a standard
    /// security handler dictionary.
    fn blank_pdf(path: &Path, encrypt: bool) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        if encrypt {
            let encrypt_id = doc.add_object(dictionary! {
                "Filter" => "Standard",
                "V" => 1,
                "R" => 2,
                "O" => Object::string_literal(vec![0u8; 32]),
                "U" => Object::string_literal(vec![0u8; 32]),
                "P" => -4,
            });
            doc.trailer.set("Encrypt", encrypt_id);
        }
        doc.save(path).unwrap();
    }

    #[test]
    fn missing_file_is_reported() {
        let err = extract_from_path(Path::new("/no/such/dir/book.pdf"), None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotFound);
    }

    #[test]
    fn garbage_is_unknown_and_scratch_is_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let err = extract_from_path(&path, Some(scratch.path())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn encrypted_document_without_text_is_reported_as_encrypted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        blank_pdf(&path, true);

        let err = extract_from_path(&path, Some(dir.path())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EncryptedDocument);
    }

    #[test]
    fn plain_blank_document_has_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        blank_pdf(&path, false);

        let err = extract_from_path(&path, Some(dir.path())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoExtractableText);
    }

    #[test]
    fn encryption_wording_is_detected() {
        assert!(mentions_encryption("Decryption error: bad key"));
        assert!(mentions_encryption("document is ENCRYPTED"));
        assert!(!mentions_encryption("invalid file header"));
    }
}
