//! Externally supplied configuration.

use thiserror::Error;

use crate::analysis::DEFAULT_API_VERSION;
use crate::poll::PollSettings;
use crate::relocate::RelocateSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Connection settings for the analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
}

impl AnalysisConfig {
    /// Read `DOCKET_ANALYSIS_ENDPOINT`, `DOCKET_ANALYSIS_KEY` and the optional
    /// `DOCKET_ANALYSIS_API_VERSION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: require_var("DOCKET_ANALYSIS_ENDPOINT")?,
            api_key: require_var("DOCKET_ANALYSIS_KEY")?,
            api_version: std::env::var("DOCKET_ANALYSIS_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
        })
    }
}

/// Container names and timing budgets for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub source_container: String,
    pub destination_container: String,
    pub poll: PollSettings,
    pub copy: RelocateSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_container: "incoming".to_string(),
            destination_container: "processed".to_string(),
            poll: PollSettings::default(),
            copy: RelocateSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults, with container overrides from `DOCKET_SOURCE_CONTAINER` and
    /// `DOCKET_DESTINATION_CONTAINER`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(container) = std::env::var("DOCKET_SOURCE_CONTAINER") {
            config.source_container = container;
        }
        if let Ok(container) = std::env::var("DOCKET_DESTINATION_CONTAINER") {
            config.destination_container = container;
        }
        config
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}
