// src/extractors/chain.rs
use crate::extractors::{LopdfTextLayer, PdfExtractText, TesseractOcr};
use crate::utils::config::OcrSettings;
use crate::utils::error::ExtractError;
use std::panic::{self, AssertUnwindSafe};

/// One way of turning PDF bytes into text.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Extracts all text from the document. Blank output is not an error here;
    /// the chain decides what counts as success.
    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractError>;
}

/// Text produced by the first strategy that succeeded.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub tier: &'static str,
    pub text: String,
}

/// Ordered list of strategies, tried until one yields non-blank text.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ExtractorChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Embedded text layer, then the alternate parser, then OCR.
    pub fn standard(ocr: &OcrSettings) -> Self {
        Self::new(vec![
            Box::new(LopdfTextLayer),
            Box::new(PdfExtractText),
            Box::new(TesseractOcr::new(ocr)),
        ])
    }

    pub fn tiers(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn extract(&self, pdf: &[u8]) -> Result<ExtractedText, ExtractError> {
        let mut failures = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let tier = strategy.name();
            tracing::info!("Extracting text with {}", tier);

            match run_guarded(strategy.as_ref(), pdf) {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!("{} extracted {} bytes of text", tier, text.len());
                    return Ok(ExtractedText { tier, text });
                }
                Ok(_) => {
                    let err = ExtractError::Empty(tier);
                    tracing::warn!("{}", err);
                    failures.push(err.to_string());
                }
                Err(err) => {
                    tracing::warn!("{}", err);
                    failures.push(err.to_string());
                }
            }
        }

        tracing::error!("PDF text extraction failed using all methods.");
        Err(ExtractError::AllTiersFailed(failures))
    }
}

// PDF libraries may panic on malformed input rather than returning errors.
fn run_guarded(strategy: &dyn ExtractionStrategy, pdf: &[u8]) -> Result<String, ExtractError> {
    panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(pdf))).unwrap_or_else(|_| {
        Err(ExtractError::Backend {
            tier: strategy.name(),
            message: "parser panicked (malformed document)".to_string(),
        })
    })
}


#[cfg(test)]
mod tests {
    use super::fakes::{Behaviour, FakeStrategy};
    use super::*;
    use crate::extractors::pdf::test_pdfs;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_first_tier_with_text_wins() {
        let (first, first_calls) = FakeStrategy::new("first", Behaviour::Text("Tržby 100"));
        let (second, second_calls) = FakeStrategy::new("second", Behaviour::Text("other"));
        let (third, third_calls) = FakeStrategy::new("third", Behaviour::Text("ocr"));
        let chain = ExtractorChain::new(vec![Box::new(first), Box::new(second), Box::new(third)]);

        let result = chain.extract(b"%PDF").unwrap();

        assert_eq!(result.tier, "first");
        assert_eq!(result.text, "Tržby 100");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_and_blank_output_fall_through_in_order() {
        let (first, first_calls) = FakeStrategy::new("first", Behaviour::Blank);
        let (second, second_calls) = FakeStrategy::new("second", Behaviour::Panic);
        let (third, third_calls) = FakeStrategy::new("third", Behaviour::Text("from ocr"));
        let chain = ExtractorChain::new(vec![Box::new(first), Box::new(second), Box::new(third)]);

        let result = chain.extract(b"%PDF").unwrap();

        assert_eq!(result.tier, "third");
        assert_eq!(result.text, "from ocr");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_tiers_failing_reports_each() {
        let (first, _) = FakeStrategy::new("first", Behaviour::Fail);
        let (second, _) = FakeStrategy::new("second", Behaviour::Blank);
        let chain = ExtractorChain::new(vec![Box::new(first), Box::new(second)]);

        match chain.extract(b"%PDF") {
            Err(ExtractError::AllTiersFailed(failures)) => {
                assert_eq!(failures, vec!["first failed: broken", "second produced no text"]);
            }
            other => panic!("expected AllTiersFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_standard_chain_order() {
        let ocr = OcrSettings {
            language: "eng".to_string(),
            dpi: 300,
            pdftoppm: "pdftoppm".to_string(),
            tesseract: "tesseract".to_string(),
        };
        assert_eq!(
            ExtractorChain::standard(&ocr).tiers(),
            vec!["lopdf", "pdf-extract", "tesseract"]
        );
    }

    #[test]
    fn test_text_layer_pdf_never_reaches_fallbacks() {
        let pdf = test_pdfs::with_text("Vykaz zisku a ztraty 2567000");
        let (alternate, alternate_calls) = FakeStrategy::new("alternate", Behaviour::Text("x"));
        let (ocr, ocr_calls) = FakeStrategy::new("ocr", Behaviour::Text("x"));
        let chain = ExtractorChain::new(vec![
            Box::new(LopdfTextLayer),
            Box::new(alternate),
            Box::new(ocr),
        ]);

        let result = chain.extract(&pdf).unwrap();

        assert_eq!(result.tier, "lopdf");
        assert!(result.text.contains("2567000"), "unexpected text: {:?}", result.text);
        assert_eq!(alternate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_image_only_pdf_falls_back_to_ocr() {
        let pdf = test_pdfs::without_text();
        let (ocr, ocr_calls) =
            FakeStrategy::new("ocr", Behaviour::Text("Vysledek hospodareni 2567000"));
        let chain = ExtractorChain::new(vec![
            Box::new(LopdfTextLayer),
            Box::new(PdfExtractText),
            Box::new(ocr),
        ]);

        let result = chain.extract(&pdf).unwrap();

        assert_eq!(result.tier, "ocr");
        assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
    }
}
