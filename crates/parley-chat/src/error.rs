use thiserror::Error;

/// Failure from the persistence collaborator. Opaque to the pipeline:
/// whatever went wrong in the store is surfaced unchanged, never retried.
#[derive(Debug, Error)]
#[error("message store error: {0}")]
pub struct StoreError(#[from] pub anyhow::Error);

#[derive(Debug, Error)]
pub enum ChatError {
    /// `mark_read` on an id the store does not know.
    #[error("Message not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ChatError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatError::NotFound)
    }
}
