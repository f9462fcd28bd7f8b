pub mod chain;
pub mod ocr;
pub mod pdf;

// Re-export key extraction types for convenience
pub use chain::{ExtractionStrategy, ExtractorChain};
pub use ocr::TesseractOcr;
pub use pdf::{LopdfTextLayer, PdfExtractText};
