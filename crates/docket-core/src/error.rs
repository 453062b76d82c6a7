use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::relocate::RelocateError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Relocate(#[from] RelocateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
