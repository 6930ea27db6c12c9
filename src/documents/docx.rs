use std::io::Cursor;

use docx_rust::document::BodyContent;
use docx_rust::DocxFile;
use tracing::debug;

use super::ExtractionError;

/// Extract the top-level body paragraphs, joined by newlines in document order.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let file =
        DocxFile::from_reader(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let docx = file.parse().map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .body
        .content
        .iter()
        .filter_map(|content| match content {
            BodyContent::Paragraph(paragraph) => Some(paragraph.text()),
            _ => None,
        })
        .collect();

    debug!("DOCX parsed with {} paragraphs", paragraphs.len());
    Ok(paragraphs.join("\n"))
}
