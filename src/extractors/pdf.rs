// src/extractors/pdf.rs
//! Text-layer strategies: they only see text a PDF producer embedded, so a
//! scanned filing comes back blank and the chain moves on to OCR.

use crate::extractors::ExtractionStrategy;
use crate::utils::error::ExtractError;
use lopdf::Document;

/// Reads the embedded text layer page by page with `lopdf`.
pub struct LopdfTextLayer;

impl ExtractionStrategy for LopdfTextLayer {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractError> {
        let doc = Document::load_mem(pdf).map_err(|e| ExtractError::Backend {
            tier: self.name(),
            message: format!("failed to load PDF: {}", e),
        })?;

        let pages = doc.get_pages();
        tracing::debug!("lopdf loaded {} pages", pages.len());

        let mut text = String::new();
        for page_number in pages.keys() {
            // A broken page should not hide the text of the others.
            match doc.extract_text(&[*page_number]) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => tracing::debug!("lopdf skipped page {}: {}", page_number, e),
            }
        }

        Ok(text)
    }
}

/// Alternate parser: `pdf-extract` walks content streams with its own font handling.
pub struct PdfExtractText;

impl ExtractionStrategy for PdfExtractText {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(pdf).map_err(|e| ExtractError::Backend {
            tier: self.name(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_pdfs {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn single_page(operations: Vec<Operation>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
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

    /// One page with `text` in its text layer.
    pub fn with_text(text: &str) -> Vec<u8> {
        single_page(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ])
    }

    /// One page that only paints a rectangle, like a scan without a text layer.
    pub fn without_text() -> Vec<u8> {
        single_page(vec![
            Operation::new("re", vec![72.into(), 72.into(), 451.into(), 698.into()]),
            Operation::new("f", vec![]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lopdf_reads_text_layer() {
        let pdf = test_pdfs::with_text("Aktiva celkem 5678000");
        let text = LopdfTextLayer.extract(&pdf).unwrap();
        assert!(text.contains("Aktiva celkem 5678000"), "unexpected text: {:?}", text);
    }

    #[test]
    fn test_lopdf_blank_for_page_without_text() {
        let text = LopdfTextLayer.extract(&test_pdfs::without_text()).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_backend_errors() {
        let err = LopdfTextLayer.extract(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Backend { tier: "lopdf", .. }));
    }
}
