//! Source text extraction from uploaded or local files.
//!
//! Only plain text and PDF are accepted. The declared type is resolved
//! before any bytes are parsed, so unsupported uploads never reach a parser.

use crate::pdf::{PdfDocument, PdfError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Extensions accepted as quiz sources
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".txt", ".pdf"];

/// Errors that can occur while turning a file into source text
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type{}. Please upload a .txt or .pdf file.", describe(.0))]
    UnsupportedFileType(Option<String>),

    #[error("Could not read the file. It might be corrupted or in an unsupported format: {0}")]
    UnreadableFile(String),
}

fn describe(declared: &Option<String>) -> String {
    match declared {
        Some(kind) => format!(" '{}'", kind),
        None => String::new(),
    }
}

impl From<PdfError> for ExtractError {
    fn from(e: PdfError) -> Self {
        ExtractError::UnreadableFile(e.to_string())
    }
}

/// Format of an uploaded source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    PlainText,
    Pdf,
}

impl SourceKind {
    /// Resolve a declared mime type and/or file name to a supported kind.
    ///
    /// PDF wins when either the mime type or the extension says PDF; text is
    /// accepted for any `text/*` mime type or a `.txt` name.
    pub fn resolve(mime_type: Option<&str>, file_name: Option<&str>) -> Result<Self, ExtractError> {
        let mime = mime_type
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_lowercase())
            .filter(|m| !m.is_empty());
        let name = file_name.map(|n| n.to_lowercase());

        let has_ext = |ext: &str| name.as_deref().is_some_and(|n| n.ends_with(ext));

        if mime.as_deref() == Some("application/pdf") || has_ext(".pdf") {
            return Ok(SourceKind::Pdf);
        }
        if mime.as_deref().is_some_and(|m| m.starts_with("text/")) || has_ext(".txt") {
            return Ok(SourceKind::PlainText);
        }

        Err(ExtractError::UnsupportedFileType(
            mime.or_else(|| file_name.map(|n| n.to_string())),
        ))
    }

    /// Resolve from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        Self::resolve(None, path.file_name().and_then(|n| n.to_str()))
    }
}

/// Extract text from file bytes of a known kind
pub fn extract(bytes: &[u8], kind: SourceKind) -> Result<String, ExtractError> {
    match kind {
        SourceKind::Pdf => {
            let doc = PdfDocument::from_bytes(bytes)?;
            info!(
                "Extracted PDF {:?} by {:?}: {} pages, ~{} tokens",
                doc.metadata.title.as_deref().unwrap_or("untitled"),
                doc.metadata.author.as_deref().unwrap_or("unknown"),
                doc.page_count(),
                doc.estimate_tokens()
            );
            Ok(doc.full_text())
        }
        SourceKind::PlainText => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| ExtractError::UnreadableFile(format!("invalid UTF-8: {}", e)))?;
            debug!("Read {} bytes of plain text", bytes.len());
            Ok(text.to_string())
        }
    }
}

/// Extract text from an upload, resolving its declared type first
pub fn extract_upload(
    bytes: &[u8],
    mime_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<String, ExtractError> {
    let kind = SourceKind::resolve(mime_type, file_name)?;
    extract(bytes, kind)
}

/// Extract text from a file on disk, using its extension as the declared type
pub fn extract_path(path: &Path) -> Result<String, ExtractError> {
    let kind = SourceKind::from_path(path)?;
    let bytes = std::fs::read(path)
        .map_err(|e| ExtractError::UnreadableFile(format!("{}: {}", path.display(), e)))?;
    extract(&bytes, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::pdf_with_pages;

    #[test]
    fn test_resolve_kinds() {
        assert_eq!(
            SourceKind::resolve(Some("application/pdf"), None).unwrap(),
            SourceKind::Pdf
        );
        assert_eq!(
            SourceKind::resolve(Some("application/octet-stream"), Some("Notes.PDF")).unwrap(),
            SourceKind::Pdf
        );
        assert_eq!(
            SourceKind::resolve(Some("text/plain; charset=utf-8"), None).unwrap(),
            SourceKind::PlainText
        );
        assert_eq!(
            SourceKind::resolve(Some("text/csv"), Some("data.csv")).unwrap(),
            SourceKind::PlainText
        );
        assert_eq!(
            SourceKind::resolve(None, Some("chapter1.txt")).unwrap(),
            SourceKind::PlainText
        );
    }

    #[test]
    fn test_unsupported_type_names_allowed_extensions() {
        let err = SourceKind::resolve(Some("image/png"), Some("diagram.png")).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFileType(_)));
        let msg = err.to_string();
        assert!(msg.contains("image/png"));
        assert!(msg.contains(".txt"));
        assert!(msg.contains(".pdf"));

        assert!(SourceKind::resolve(None, None).is_err());
    }

    #[test]
    fn test_plain_text_verbatim() {
        let text = "Línea uno\n  indented line\n";
        assert_eq!(extract(text.as_bytes(), SourceKind::PlainText).unwrap(), text);
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let result = extract(&[0xff, 0xfe, 0x00, 0x41], SourceKind::PlainText);
        assert!(matches!(result, Err(ExtractError::UnreadableFile(_))));
    }

    #[test]
    fn test_pdf_upload() {
        let bytes = pdf_with_pages(&["Cells", "Tissues"]);
        let text = extract_upload(&bytes, Some("application/pdf"), Some("bio.pdf")).unwrap();
        assert!(text.find("Cells").unwrap() < text.find("Tissues").unwrap());
    }

    #[test]
    fn test_corrupt_pdf_is_unreadable() {
        let result = extract_upload(b"not a pdf at all", Some("application/pdf"), None);
        assert!(matches!(result, Err(ExtractError::UnreadableFile(_))));
    }

    #[test]
    fn test_extract_path() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "The mitochondria is the powerhouse of the cell.").unwrap();
        assert!(extract_path(&txt).unwrap().contains("powerhouse"));

        let pdf = dir.path().join("notes.pdf");
        std::fs::write(&pdf, pdf_with_pages(&["Hello"])).unwrap();
        assert!(extract_path(&pdf).unwrap().contains("Hello"));

        let docx = dir.path().join("notes.docx");
        std::fs::write(&docx, "irrelevant").unwrap();
        assert!(matches!(
            extract_path(&docx),
            Err(ExtractError::UnsupportedFileType(_))
        ));

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            extract_path(&missing),
            Err(ExtractError::UnreadableFile(_))
        ));
    }
}
