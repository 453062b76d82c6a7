pub mod analysis;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod poll;
pub mod relocate;
pub mod schema;
pub mod store;

pub use analysis::{
    AnalysisError, ContentUnderstandingClient, DocumentAnalyzer, Submission, DEFAULT_API_VERSION,
};
pub use config::{AnalysisConfig, ConfigError, PipelineConfig};
pub use context::{DocStatus, DocumentContext};
pub use error::{Error, Result};
pub use extract::{extract_fields, ExtractError, FieldMap};
pub use pipeline::{BatchOutcome, IngestPipeline};
pub use poll::{poll_until_terminal, PollOutcome, PollSettings};
pub use relocate::{relocate, RelocateError, RelocateSettings};
pub use schema::{FieldKind, FieldSpec, NOTICE_FIELDS};
pub use store::{CopyHandle, CopyState, FsStore, MemoryStore, Metadata, ObjectStore, StoreError};
