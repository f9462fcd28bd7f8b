// src/pipeline.rs
use crate::analysis::{evaluate_ebitda, OpenAiClient};
use crate::extractors::ExtractorChain;
use crate::registry::client::RegistryClient;
use crate::utils::config::Settings;
use crate::utils::error::{ExtractError, PipelineError, RegistryError};
use reqwest::Url;
use std::sync::Arc;

/// Everything a successful run found along the way.
#[derive(Debug, Clone)]
pub struct Report {
    pub collection_url: Url,
    pub filing_url: Url,
    pub download_url: Url,
    pub extraction_tier: &'static str,
    pub expression: String,
    pub ebitda: i64,
}

/// The four stages, run strictly in order. Owns the HTTP session for the run.
pub struct Pipeline {
    registry: RegistryClient,
    llm: OpenAiClient,
    extractors: Arc<ExtractorChain>,
}

impl Pipeline {
    pub fn new(registry: RegistryClient, llm: OpenAiClient, extractors: ExtractorChain) -> Self {
        Self {
            registry,
            llm,
            extractors: Arc::new(extractors),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, RegistryError> {
        let registry = RegistryClient::new(settings.registry_url.clone(), &settings.user_agent)?;
        let extractors = ExtractorChain::standard(&settings.ocr);
        tracing::debug!("Extraction tiers: {:?}", extractors.tiers());

        Ok(Self::new(registry, OpenAiClient::new(&settings.llm), extractors))
    }

    pub async fn run(&self, company_name: &str) -> Result<Report, PipelineError> {
        // 1. Registry Navigator
        let collection_url = self
            .registry
            .find_collection_page(company_name)
            .await
            .map_err(PipelineError::CompanyPageNotFound)?;
        tracing::info!("Collection of filings: {}", collection_url);

        // 2. Filing Locator
        let filing_url = self
            .registry
            .find_filing_page(&collection_url)
            .await
            .map_err(PipelineError::FilingNotFound)?;
        tracing::info!("Annual financial statement: {}", filing_url);

        // 3. Document Resolver
        let download_url = self
            .registry
            .find_download_url(&filing_url)
            .await
            .map_err(PipelineError::DocumentNotFound)?;
        tracing::info!("Digital form: {}", download_url);

        // 4. Extraction & Analysis
        let pdf = self
            .registry
            .download_document(&download_url)
            .await
            .map_err(PipelineError::DownloadFailed)?;

        let extractors = Arc::clone(&self.extractors);
        let extracted = tokio::task::spawn_blocking(move || extractors.extract(&pdf))
            .await
            .map_err(|e| PipelineError::ExtractionFailed(ExtractError::TaskFailed(e.to_string())))?
            .map_err(PipelineError::ExtractionFailed)?;

        let expression = self
            .llm
            .extract_expression(&extracted.text)
            .await
            .map_err(PipelineError::AnalysisFailed)?;
        tracing::info!("Model expression: {}", expression);

        let ebitda = evaluate_ebitda(&expression).map_err(|source| {
            tracing::error!("Error calculating EBITDA: {}", source);
            PipelineError::CalculationFailed {
                expression: expression.clone(),
                source,
            }
        })?;

        Ok(Report {
            collection_url,
            filing_url,
            download_url,
            extraction_tier: extracted.tier,
            expression,
            ebitda,
        })
    }
}
