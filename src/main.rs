// src/main.rs
mod analysis;
mod extractors;
mod pipeline;
mod registry;
mod utils;

use clap::Parser;
use pipeline::Pipeline;
use utils::config::{
    Settings, DEFAULT_MODEL, DEFAULT_OCR_DPI, DEFAULT_OCR_LANG, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_REGISTRY_URL,
};
use utils::AppError;

/// Computes a Czech company's EBITDA from its latest annual financial statement
/// in the public registry's collection of filings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Company name as registered (prefix match, active companies only)
    pub company_name: String,

    /// API key for the chat completion endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Model used to extract the EBITDA inputs
    #[arg(long, env = "OR_EBITDA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Base URL of the company registry
    #[arg(long, env = "OR_REGISTRY_URL", default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Tesseract language(s) for scanned filings, e.g. "ces+eng"
    #[arg(long, env = "OR_OCR_LANG", default_value = DEFAULT_OCR_LANG)]
    pub ocr_lang: String,

    /// Rendering resolution for OCR
    #[arg(long, env = "OR_OCR_DPI", default_value_t = DEFAULT_OCR_DPI)]
    pub ocr_dpi: u32,

    /// pdftoppm executable (poppler-utils) used to render pages for OCR
    #[arg(long, env = "OR_PDFTOPPM", default_value = "pdftoppm")]
    pub pdftoppm: String,

    /// tesseract executable
    #[arg(long, env = "OR_TESSERACT", default_value = "tesseract")]
    pub tesseract: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load .env before clap reads env fallbacks
    let _ = dotenvy::dotenv();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 3. Parse CLI Arguments; a wrong argument count prints usage and exits
    let args = Args::parse();
    tracing::info!("Starting EBITDA extraction for '{}'", args.company_name);

    let settings = Settings::from_args(&args)?;

    // 4. The pipeline owns the HTTP session; it is released when `pipeline` drops.
    let pipeline = Pipeline::from_settings(&settings)?;

    match pipeline.run(&args.company_name).await {
        Ok(report) => {
            tracing::info!("Collection of filings: {}", report.collection_url);
            tracing::info!(
                "Filing {} ({}) read with {}",
                report.filing_url,
                report.download_url,
                report.extraction_tier
            );
            println!("{}", report.expression);
            println!("{}", report.ebitda);
        }
        Err(err) => {
            tracing::error!("{}", err);
            println!("{}", err);
        }
    }

    Ok(())
}
