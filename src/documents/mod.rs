//! Document text extraction
//!
//! Uploaded files are identified by their declared MIME type. Only PDF and
//! DOCX are accepted; anything else is rejected before a parser runs.

pub mod docx;
pub mod pdf;

use std::fmt;

use bytes::Bytes;
use tracing::{debug, info};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolve a declared content type. Parameters such as `charset` are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let parsed: mime::Mime = content_type.trim().parse().ok()?;
        let essence = parsed.essence_str().to_ascii_lowercase();

        if essence == PDF_MIME {
            Some(DocumentKind::Pdf)
        } else if essence == DOCX_MIME {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Docx => write!(f, "docx"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to read PDF: {0}")]
    Pdf(String),

    #[error("failed to read DOCX: {0}")]
    Docx(String),

    #[error("document contains no extractable text")]
    NoText,

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Synchronous extraction; CPU-bound, call from a blocking context.
pub fn extract_text_blocking(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes)?,
        DocumentKind::Docx => docx::extract_docx_text(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}

/// Extract plain text on the blocking thread pool.
pub async fn extract_text(kind: DocumentKind, bytes: Bytes) -> Result<String, ExtractionError> {
    debug!("Extracting {} document ({} bytes)", kind, bytes.len());

    let text = tokio::task::spawn_blocking(move || extract_text_blocking(kind, &bytes))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))??;

    info!("Extracted {} chars from {} document", text.len(), kind);
    Ok(text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;

    use docx_rust::document::Paragraph;
    use docx_rust::Docx;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// A minimal PDF with one line of Courier text per page.
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

        let mut kids = Vec::with_capacity(pages.len());
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
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
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::default();
        for text in paragraphs {
            docx.document.push(Paragraph::default().push_text(*text));
        }
        docx.write(Cursor::new(Vec::new())).unwrap().into_inner()
    }
}
