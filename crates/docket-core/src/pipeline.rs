//! The ingestion pipeline: drives one document from arrival to
//! processed-or-failed.
//!
//! Stages run strictly in sequence. Failures a stage can classify set the
//! context status and end the run; anything else bubbles to a single
//! top-level handler that records `UnexpectedError`, so an invocation never
//! fails outward.

use std::sync::Arc;

use crate::analysis::DocumentAnalyzer;
use crate::config::PipelineConfig;
use crate::context::{DocStatus, DocumentContext};
use crate::extract::extract_fields;
use crate::poll::poll_until_terminal;
use crate::relocate::relocate;
use crate::schema::meta;
use crate::store::{Metadata, ObjectStore};
use crate::Result;

pub struct IngestPipeline {
    store: Arc<dyn ObjectStore>,
    analyzer: Arc<dyn DocumentAnalyzer>,
    config: PipelineConfig,
}

impl IngestPipeline {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        Self {
            store,
            analyzer,
            config: PipelineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Process one document from the source container.
    ///
    /// Never fails outward; the outcome is the returned context's status.
    pub async fn process(&self, name: &str) -> DocumentContext {
        let url = self.store.url(&self.config.source_container, name);
        let mut ctx = DocumentContext::new(name, url);

        if let Err(err) = self.run(&mut ctx).await {
            tracing::error!(name, error = %err, "unexpected error while processing document");
            ctx.fail(DocStatus::UnexpectedError);
        }

        tracing::info!(name, status = %ctx.status, "document finished");
        ctx
    }

    async fn run(&self, ctx: &mut DocumentContext) -> Result<()> {
        let source = self.config.source_container.clone();

        // Existing metadata carries the correlation ids from the mail intake.
        match self.store.metadata(&source, &ctx.name).await {
            Ok(existing) => {
                ctx.message_id = existing.get(meta::MESSAGE_ID).cloned();
                ctx.email_id = existing.get(meta::EMAIL_ID).cloned();
                ctx.prior_status = existing.get(meta::STATUS).cloned();
                ctx.status = DocStatus::MetadataRead;
                tracing::info!(
                    name = %ctx.name,
                    message_id = ctx.message_id.as_deref().unwrap_or(""),
                    email_id = ctx.email_id.as_deref().unwrap_or(""),
                    "read object metadata"
                );
            }
            Err(err) => {
                tracing::error!(name = %ctx.name, error = %err, "failed to read object metadata");
                ctx.fail(DocStatus::BlobMetadataError);
                return Ok(());
            }
        }

        let submission = match self.analyzer.submit(&ctx.url).await {
            Ok(submission) => submission,
            Err(err) => {
                tracing::error!(name = %ctx.name, error = %err, "analysis submission failed");
                ctx.fail(DocStatus::ContentUnderstandingApiError);
                return Ok(());
            }
        };

        let Some(operation_location) = submission
            .operation_location
            .filter(|location| !location.is_empty())
        else {
            tracing::error!(name = %ctx.name, "submission returned no operation location");
            ctx.fail(DocStatus::ContentUnderstandingApiError);
            return Ok(());
        };
        ctx.status = DocStatus::Submitted;
        tracing::info!(name = %ctx.name, operation_location = %operation_location, "analysis job submitted");

        ctx.status = DocStatus::Polling;
        let outcome =
            poll_until_terminal(self.analyzer.as_ref(), &operation_location, &self.config.poll)
                .await;
        if !outcome.is_success() {
            tracing::warn!(name = %ctx.name, "analysis job timed out or failed");
            ctx.fail(DocStatus::ContentUnderstandingTimeout);
            return Ok(());
        }

        // Re-fetch so extraction sees the final result document.
        let final_result = match self.analyzer.job_status(&operation_location).await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(name = %ctx.name, error = %err, "failed to fetch final job result");
                ctx.fail(DocStatus::ContentUnderstandingApiError);
                return Ok(());
            }
        };

        ctx.fields = match extract_fields(&final_result) {
            Ok(fields) => fields,
            Err(err) => {
                tracing::warn!(name = %ctx.name, error = %err, "field extraction failed");
                ctx.fail(DocStatus::ProcessingFailed);
                return Ok(());
            }
        };
        ctx.status = DocStatus::Extracted;

        self.store
            .set_metadata(&source, &ctx.name, self.processed_metadata(ctx))
            .await?;
        tracing::info!(name = %ctx.name, "extracted fields written to object metadata");

        relocate(
            self.store.as_ref(),
            &ctx.name,
            &source,
            &self.config.destination_container,
            &self.config.copy,
        )
        .await?;

        ctx.status = DocStatus::Relocated;
        Ok(())
    }

    /// The one metadata document written on success: correlation ids, the
    /// processed marker, and every schema slot.
    fn processed_metadata(&self, ctx: &DocumentContext) -> Metadata {
        let mut metadata = ctx.fields.clone();
        metadata.insert(
            meta::MESSAGE_ID.to_string(),
            ctx.message_id.clone().unwrap_or_default(),
        );
        metadata.insert(
            meta::EMAIL_ID.to_string(),
            ctx.email_id.clone().unwrap_or_default(),
        );
        metadata.insert(meta::STATUS.to_string(), meta::STATUS_PROCESSED.to_string());
        metadata
    }

    /// Process every document currently in the source container, one at a
    /// time in key order.
    pub async fn process_all(&self) -> Result<BatchOutcome> {
        let names = self.store.list(&self.config.source_container).await?;

        let mut outcome = BatchOutcome::default();
        for name in names {
            let ctx = self.process(&name).await;
            outcome.processed.push(ctx);
        }

        Ok(outcome)
    }
}

/// Tally of one batch run over the source container.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub processed: Vec<DocumentContext>,
}

impl BatchOutcome {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.processed
            .iter()
            .filter(|ctx| ctx.status == DocStatus::Relocated)
            .count()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.processed.len() - self.success_count()
    }
}
