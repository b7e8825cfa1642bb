use crate::model::{PageId, ProjectId};
use thiserror::Error;

/// Failures reported by a [`crate::store::PageStore`] implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream store unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Page {page_id} not found in project {project_id}")]
    PageNotFound {
        project_id: ProjectId,
        page_id: PageId,
    },

    #[error("Store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Whether re-invoking the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::UpstreamUnavailable(_))
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => EngineError::UpstreamUnavailable(msg),
            StoreError::Query(msg) => EngineError::Store(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
