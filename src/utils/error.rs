// src/utils/error.rs
use thiserror::Error;

// Errors for the three scraping stages and the document download
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 500 Internal Server Error

    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),

    #[error("Expected markup not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{tier} failed: {message}")]
    Backend { tier: &'static str, message: String },

    #[error("{0} produced no text")]
    Empty(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF text extraction failed using all methods: {}", .0.join("; "))]
    AllTiersFailed(Vec<String>),

    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Model request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("No arithmetic expression found in model output")]
    NoExpression,

    #[error("Malformed expression: {0}")]
    Malformed(String),

    #[error("Expression result does not fit in a 64-bit integer")]
    Overflow,
}

// One variant per stage; the pipeline stops at the first of these
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Company page not found: {0}")]
    CompanyPageNotFound(#[source] RegistryError),

    #[error("Collection page not found: {0}")]
    FilingNotFound(#[source] RegistryError),

    #[error("PDF URL not found: {0}")]
    DocumentNotFound(#[source] RegistryError),

    #[error("PDF download failed: {0}")]
    DownloadFailed(#[source] RegistryError),

    #[error("Financial data extraction failed: {0}")]
    ExtractionFailed(#[source] ExtractError),

    #[error("Financial data extraction failed: {0}")]
    AnalysisFailed(#[source] AnalysisError),

    #[error("EBITDA calculation failed: {source} (model output: '{expression}')")]
    CalculationFailed {
        expression: String,
        #[source]
        source: AnalysisError,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry session could not be created: {0}")]
    Session(#[from] RegistryError),
}
