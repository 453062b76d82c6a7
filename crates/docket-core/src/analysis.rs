//! Client for the Content Understanding analysis service.
//!
//! Submission starts an asynchronous job; the returned operation location is
//! the handle used to poll it. Both calls carry the subscription key header.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2025-05-01-preview";

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const USER_AGENT_HEADER: &str = "x-ms-useragent";
const USER_AGENT_TAG: &str = "docket-ingest";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid operation location: {0}")]
    InvalidOperationLocation(#[from] url::ParseError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Handle to one submitted analysis job.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Resumable job URI from the `Operation-Location` response header, if the
    /// service returned one.
    pub operation_location: Option<String>,
    pub response_body: String,
}

/// External analysis collaborator: job submission and status queries.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Submit a document by resolvable URL, starting an asynchronous job.
    async fn submit(&self, document_url: &str) -> AnalysisResult<Submission>;

    /// Fetch the raw job-status document for a previously submitted job.
    async fn job_status(&self, operation_location: &str) -> AnalysisResult<String>;
}

/// HTTP client for the Content Understanding REST API.
pub struct ContentUnderstandingClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
}

impl ContentUnderstandingClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    fn submit_url(&self) -> String {
        format!(
            "{}?api-version={}&stringEncoding=utf16&enableJailbreakDetection=false",
            self.endpoint, self.api_version
        )
    }

    /// Operation locations sometimes omit the api-version; inject ours then.
    fn status_url(&self, operation_location: &str) -> AnalysisResult<String> {
        let mut url = Url::parse(operation_location)?;

        let has_version = url.query_pairs().any(|(key, _)| key == "api-version");
        if !has_version {
            url.query_pairs_mut()
                .append_pair("api-version", &self.api_version);
        }

        Ok(url.into())
    }
}

#[async_trait]
impl DocumentAnalyzer for ContentUnderstandingClient {
    async fn submit(&self, document_url: &str) -> AnalysisResult<Submission> {
        let response = self
            .client
            .post(self.submit_url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .header(USER_AGENT_HEADER, USER_AGENT_TAG)
            .json(&serde_json::json!({ "url": document_url }))
            .send()
            .await?
            .error_for_status()?;

        let operation_location = response
            .headers()
            .get("Operation-Location")
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        let response_body = response.text().await?;

        Ok(Submission {
            operation_location,
            response_body,
        })
    }

    async fn job_status(&self, operation_location: &str) -> AnalysisResult<String> {
        let response = self
            .client
            .get(self.status_url(operation_location)?)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .header(USER_AGENT_HEADER, USER_AGENT_TAG)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
