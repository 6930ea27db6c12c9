use lopdf::Document;
use tracing::debug;

use super::ExtractionError;

/// Extract text page by page, in page order, one page per line block.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    debug!("PDF loaded with {} pages", pages.len());

    let mut text = Vec::with_capacity(pages.len());
    // get_pages is a BTreeMap keyed by page number, so iteration is in page order
    for (page_num, _page_id) in pages {
        let content = doc
            .extract_text(&[page_num])
            .map_err(|e| ExtractionError::Pdf(format!("page {}: {}", page_num, e)))?;
        text.push(content.trim_end().to_string());
    }

    Ok(text.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::fixtures::pdf_with_pages;

    #[test]
    fn test_single_page() {
        let bytes = pdf_with_pages(&["Hello world"]);
        let text = extract_pdf_text(&bytes).unwrap();
        assert_eq!(text.trim(), "Hello world");
    }

    #[test]
    fn test_pages_concatenated_in_order() {
        let bytes = pdf_with_pages(&["First page", "Second page", "Third page"]);
        let text = extract_pdf_text(&bytes).unwrap();

        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["First page", "Second page", "Third page"]);
    }

    #[test]
    fn test_corrupt_pdf_is_pdf_error() {
        let err = extract_pdf_text(b"%PDF-1.5\nthis is not really a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }
}
