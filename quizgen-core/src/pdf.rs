//! PDF text extraction.
//!
//! Reads a PDF held in memory (an upload, or a file read from disk) into
//! per-page text in document order, so it can be used as quiz source material.

use lopdf::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during PDF processing
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("PDF has no pages")]
    EmptyDocument,
}

/// A single page from a PDF document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfPage {
    /// Page number (1-based)
    pub number: u32,
    /// Extracted text
    pub text: String,
}

impl PdfPage {
    /// Check if this page is likely empty or has minimal content
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PDF metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub page_count: u32,
}

/// A PDF document with extracted text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfDocument {
    pub pages: Vec<PdfPage>,
    pub metadata: PdfMetadata,
}

impl PdfDocument {
    /// Parse a PDF document held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(bytes).map_err(|e| PdfError::OpenError(e.to_string()))?;

        // BTreeMap keyed by page number, so iteration is document order
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        if page_numbers.is_empty() {
            return Err(PdfError::EmptyDocument);
        }

        debug!("PDF has {} pages", page_numbers.len());

        let metadata = Self::extract_metadata(&doc, page_numbers.len() as u32);

        let pages = page_numbers
            .into_iter()
            .map(|number| Self::extract_page(&doc, number))
            .collect();

        Ok(PdfDocument { pages, metadata })
    }

    fn extract_metadata(doc: &Document, page_count: u32) -> PdfMetadata {
        let mut metadata = PdfMetadata {
            page_count,
            ..Default::default()
        };

        let info = doc
            .trailer
            .get(b"Info")
            .and_then(|info| info.as_reference())
            .and_then(|id| doc.get_dictionary(id));

        if let Ok(info) = info {
            let field = |key: &[u8]| {
                info.get(key)
                    .and_then(|v| v.as_string())
                    .ok()
                    .map(|s| s.to_string())
            };
            metadata.title = field(b"Title");
            metadata.author = field(b"Author");
        }

        metadata
    }

    /// A page whose content cannot be decoded contributes no text
    fn extract_page(doc: &Document, number: u32) -> PdfPage {
        let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
            warn!("Failed to extract text from PDF page {}: {}", number, e);
            String::new()
        });

        let page = PdfPage { number, text };
        if page.is_empty() {
            debug!("PDF page {} has no extractable text", number);
        }
        page
    }

    /// All text in document order, each page followed by a newline
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        for page in &self.pages {
            text.push_str(&page.text);
            text.push('\n');
        }
        text
    }

    /// Get the number of pages
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Estimate total token count (chars / 4)
    pub fn estimate_tokens(&self) -> u32 {
        let total_chars: usize = self.pages.iter().map(|p| p.text.len()).sum();
        (total_chars / 4) as u32
    }
}

/// Build small single-font PDFs for tests
#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// A PDF with one page per entry of `pages`, each showing that text
    pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
