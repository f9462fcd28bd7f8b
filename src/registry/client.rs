// src/registry/client.rs
use crate::registry::models::{
    DocumentDetailSchema, FilingsTableSchema, SearchResultsSchema, COMPANY_SEARCH,
    DOCUMENT_DETAIL, FILINGS_TABLE, SEARCH_RESULTS,
};
use crate::registry::pages;
use crate::utils::error::RegistryError;
use reqwest::{header, Url};

/// HTTP session against the company registry.
///
/// One client (and so one cookie jar) is shared by every request of a run.
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RegistryClient {
    /// Creates a session with a cookie store and the given User-Agent.
    /// Timeouts are left at the reqwest defaults.
    pub fn new(base_url: Url, user_agent: &str) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Stage 1: company name -> URL of the company's collection of filings.
    pub async fn find_collection_page(&self, company_name: &str) -> Result<Url, RegistryError> {
        let mut search_url = self
            .base_url
            .join(COMPANY_SEARCH.path)
            .map_err(|e| RegistryError::InvalidUrl(e.to_string()))?;
        search_url
            .query_pairs_mut()
            .extend_pairs(COMPANY_SEARCH.pairs(company_name));

        tracing::info!("Searching registry for '{}'", company_name);
        let html = self.fetch_page(&search_url).await.inspect_err(|_| {
            tracing::error!("Search request failed");
        })?;

        let schema: &SearchResultsSchema = &SEARCH_RESULTS;
        let href = pages::find_collection_link(&html, schema).ok_or_else(|| {
            tracing::error!("Company page link not found");
            RegistryError::NotFound(format!("no '{}' link in search results", schema.link_label))
        })?;

        resolve_link(&search_url, &href)
    }

    /// Stage 2: collection page -> detail page of the annual financial statement.
    pub async fn find_filing_page(&self, collection_url: &Url) -> Result<Url, RegistryError> {
        let html = self.fetch_page(collection_url).await.inspect_err(|_| {
            tracing::error!("Company page request failed");
        })?;

        let schema: &FilingsTableSchema = &FILINGS_TABLE;
        let href = pages::find_filing_link(&html, schema).ok_or_else(|| {
            RegistryError::NotFound(format!("no '{}' row in filings table", schema.document_type))
        })?;

        resolve_link(collection_url, &href)
    }

    /// Stage 3: filing detail page -> download URL of the digital form.
    pub async fn find_download_url(&self, detail_url: &Url) -> Result<Url, RegistryError> {
        let html = self.fetch_page(detail_url).await.inspect_err(|_| {
            tracing::error!("Document page request failed");
        })?;

        let schema: &DocumentDetailSchema = &DOCUMENT_DETAIL;
        let href = pages::find_download_link(&html, schema).ok_or_else(|| {
            RegistryError::NotFound(format!("no '{}' row on detail page", schema.row_label))
        })?;

        resolve_link(detail_url, &href)
    }

    /// Downloads the filing's file into memory.
    pub async fn download_document(&self, url: &Url) -> Result<Vec<u8>, RegistryError> {
        tracing::info!("Downloading document from: {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/pdf,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("PDF download failed: HTTP {} for URL: {}", status, url);
            return Err(RegistryError::Http(status));
        }

        let body = response.bytes().await?;
        tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, RegistryError> {
        tracing::info!("Fetching page: {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?; // Propagates reqwest::Error as RegistryError::Network

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(RegistryError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Successfully fetched {} bytes from {}", body.len(), url);

        Ok(body)
    }
}

/// Turns a link found on `page` into an absolute URL.
fn resolve_link(page: &Url, href: &str) -> Result<Url, RegistryError> {
    page.join(href)
        .map_err(|e| RegistryError::InvalidUrl(format!("{}: {}", href, e)))
}
