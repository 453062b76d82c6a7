//! Per-document working state for one pipeline invocation.

use crate::extract::FieldMap;

/// Pipeline outcome states for one document.
///
/// The failure values and `Relocated` are terminal: once one is recorded the
/// pipeline takes no further transitions for that document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStatus {
    Received,
    MetadataRead,
    Submitted,
    Polling,
    Extracted,
    Relocated,
    BlobMetadataError,
    ContentUnderstandingApiError,
    ContentUnderstandingTimeout,
    ProcessingFailed,
    UnexpectedError,
}

impl DocStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::MetadataRead => "MetadataRead",
            Self::Submitted => "Submitted",
            Self::Polling => "Polling",
            Self::Extracted => "Extracted",
            Self::Relocated => "Relocated",
            Self::BlobMetadataError => "BlobMetadataError",
            Self::ContentUnderstandingApiError => "ContentUnderstandingApiError",
            Self::ContentUnderstandingTimeout => "ContentUnderstandingTimeout",
            Self::ProcessingFailed => "ProcessingFailed",
            Self::UnexpectedError => "UnexpectedError",
        }
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::BlobMetadataError
                | Self::ContentUnderstandingApiError
                | Self::ContentUnderstandingTimeout
                | Self::ProcessingFailed
                | Self::UnexpectedError
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Relocated) || self.is_failure()
    }
}

impl std::fmt::Display for DocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DocumentContext {
    /// Unique key within the source container.
    pub name: String,
    /// Resolvable location handed to the analysis service.
    pub url: String,
    pub message_id: Option<String>,
    pub email_id: Option<String>,
    /// Status string already present on the object's metadata, if any.
    pub prior_status: Option<String>,
    pub status: DocStatus,
    /// Populated wholesale by a successful extraction pass.
    pub fields: FieldMap,
}

impl DocumentContext {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            message_id: None,
            email_id: None,
            prior_status: None,
            status: DocStatus::Received,
            fields: FieldMap::new(),
        }
    }

    /// Record a terminal failure without downgrading one already set.
    pub fn fail(&mut self, status: DocStatus) {
        if !self.status.is_failure() {
            self.status = status;
        }
    }
}
