// src/utils/config.rs
use crate::utils::error::AppError;
use crate::Args;
use reqwest::Url;

pub const DEFAULT_REGISTRY_URL: &str = "https://or.justice.cz";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_OCR_LANG: &str = "eng";
pub const DEFAULT_OCR_DPI: u32 = 300;

// The registry serves plain HTML to browsers; a browser-like agent avoids the bot page.
const REGISTRY_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) or_ebitda/0.1";

/// Settings for the language model endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub language: String,
    pub dpi: u32,
    pub pdftoppm: String,
    pub tesseract: String,
}

/// Validated run configuration, built once from CLI arguments and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub registry_url: Url,
    pub user_agent: String,
    pub llm: LlmSettings,
    pub ocr: OcrSettings,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self, AppError> {
        let mut registry_url = Url::parse(&args.registry_url).map_err(|e| {
            AppError::Config(format!("Invalid registry URL '{}': {}", args.registry_url, e))
        })?;
        // Relative joins drop the last path segment unless it ends with '/'.
        if !registry_url.path().ends_with('/') {
            let path = format!("{}/", registry_url.path());
            registry_url.set_path(&path);
        }

        let api_key = args
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?
            .to_string();

        if args.ocr_dpi == 0 {
            return Err(AppError::Config("OCR DPI must be greater than zero".to_string()));
        }

        Ok(Self {
            registry_url,
            user_agent: REGISTRY_USER_AGENT.to_string(),
            llm: LlmSettings {
                api_key,
                base_url: args.openai_base_url.trim_end_matches('/').to_string(),
                model: args.model.clone(),
            },
            ocr: OcrSettings {
                language: args.ocr_lang.clone(),
                dpi: args.ocr_dpi,
                pdftoppm: args.pdftoppm.clone(),
                tesseract: args.tesseract.clone(),
            },
        })
    }
}
