// src/extractors/ocr.rs
//! OCR fallback for scanned filings.
//!
//! Pages are rendered with `pdftoppm` (poppler-utils) and read with
//! `tesseract`; both are looked up on `PATH` unless configured otherwise.

use crate::extractors::ExtractionStrategy;
use crate::utils::config::OcrSettings;
use crate::utils::error::ExtractError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const TIER: &str = "tesseract";

/// Renders every page to an image and runs OCR over each one.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    language: String,
    dpi: u32,
    pdftoppm: String,
    tesseract: String,
}

impl TesseractOcr {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            language: settings.language.clone(),
            dpi: settings.dpi,
            pdftoppm: settings.pdftoppm.clone(),
            tesseract: settings.tesseract.clone(),
        }
    }

    fn render_args(&self, pdf_path: &Path, output_prefix: &Path) -> Vec<String> {
        vec![
            "-png".to_string(),
            "-r".to_string(),
            self.dpi.to_string(),
            pdf_path.display().to_string(),
            output_prefix.display().to_string(),
        ]
    }

    fn ocr_args(&self, image_path: &Path) -> Vec<String> {
        vec![
            image_path.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ]
    }

    /// Renders pages into `dir`, returning the images in page order.
    fn render_pages(&self, pdf_path: &Path, dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
        let output = Command::new(&self.pdftoppm)
            .args(self.render_args(pdf_path, &dir.join("page")))
            .output()
            .map_err(|e| backend(format!("failed to run {}: {}", self.pdftoppm, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(backend(format!("pdftoppm failed: {}", stderr.trim())));
        }

        // pdftoppm zero-pads page numbers, so name order is page order.
        let mut images: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(backend("pdftoppm produced no images".to_string()));
        }
        Ok(images)
    }

    fn recognize(&self, image_path: &Path, page: usize) -> Result<String, ExtractError> {
        let output = Command::new(&self.tesseract)
            .args(self.ocr_args(image_path))
            .output()
            .map_err(|e| {
                backend(format!("failed to run {} on page {}: {}", self.tesseract, page, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(backend(format!("tesseract failed on page {}: {}", page, stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ExtractionStrategy for TesseractOcr {
    fn name(&self) -> &'static str {
        TIER
    }

    fn extract(&self, pdf: &[u8]) -> Result<String, ExtractError> {
        // Removed with everything in it when dropped.
        let scratch = tempfile::tempdir()?;
        let pdf_path = scratch.path().join("filing.pdf");
        fs::write(&pdf_path, pdf)?;

        let images = self.render_pages(&pdf_path, scratch.path())?;
        tracing::info!(
            "Rendered {} pages at {} dpi, running OCR (lang={})",
            images.len(),
            self.dpi,
            self.language
        );

        let mut text = String::new();
        for (i, image) in images.iter().enumerate() {
            text.push_str(&self.recognize(image, i + 1)?);
        }

        Ok(text)
    }
}

fn backend(message: String) -> ExtractError {
    ExtractError::Backend { tier: TIER, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(language: &str, dpi: u32, pdftoppm: &str) -> OcrSettings {
        OcrSettings {
            language: language.to_string(),
            dpi,
            pdftoppm: pdftoppm.to_string(),
            tesseract: "/nonexistent/tesseract".to_string(),
        }
    }

    #[test]
    fn test_command_arguments() {
        let ocr = TesseractOcr::new(&settings("ces+eng", 200, "pdftoppm"));

        let render = ocr.render_args(Path::new("/tmp/x/filing.pdf"), Path::new("/tmp/x/page"));
        assert_eq!(render, vec!["-png", "-r", "200", "/tmp/x/filing.pdf", "/tmp/x/page"]);

        let recognize = ocr.ocr_args(Path::new("/tmp/x/page-01.png"));
        assert_eq!(recognize, vec!["/tmp/x/page-01.png", "stdout", "-l", "ces+eng"]);
    }

    #[test]
    fn test_missing_renderer_is_backend_error() {
        let ocr = TesseractOcr::new(&settings("eng", 300, "/nonexistent/pdftoppm"));

        let err = ocr.extract(b"%PDF-1.4").unwrap_err();
        match err {
            ExtractError::Backend { tier, message } => {
                assert_eq!(tier, "tesseract");
                assert!(message.contains("/nonexistent/pdftoppm"), "message: {}", message);
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    // Renders ten pages named like pdftoppm does: <prefix>-01.png .. <prefix>-10.png
    #[cfg(unix)]
    const FAKE_PDFTOPPM: &str =
        r#"for i in 10 03 01 07 02 09 04 06 08 05; do printf png > "$5-$i.png"; done"#;

    #[cfg(unix)]
    #[test]
    fn test_pages_are_concatenated_in_page_order() {
        let tools = tempfile::tempdir().unwrap();
        let ocr = TesseractOcr::new(&OcrSettings {
            language: "ces".to_string(),
            dpi: 300,
            pdftoppm: script(tools.path(), "pdftoppm", FAKE_PDFTOPPM),
            tesseract: script(tools.path(), "tesseract", r#"basename "$1""#),
        });

        let text = ocr.extract(b"%PDF-1.4").unwrap();

        let expected: String = (1..=10).map(|i| format!("page-{:02}.png\n", i)).collect();
        assert_eq!(text, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_tesseract_exit_status_fails_the_tier() {
        let tools = tempfile::tempdir().unwrap();
        let ocr = TesseractOcr::new(&OcrSettings {
            language: "ces".to_string(),
            dpi: 300,
            pdftoppm: script(tools.path(), "pdftoppm", FAKE_PDFTOPPM),
            tesseract: script(
                tools.path(),
                "tesseract",
                r#"echo "Failed loading language 'ces'" >&2; exit 1"#,
            ),
        });

        match ocr.extract(b"%PDF-1.4") {
            Err(ExtractError::Backend { tier, message }) => {
                assert_eq!(tier, "tesseract");
                assert!(message.contains("page 1"), "message: {}", message);
                assert!(message.contains("Failed loading language 'ces'"), "message: {}", message);
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }
}
