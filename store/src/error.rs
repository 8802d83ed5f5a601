use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("invalid member record: {0}")]
    InvalidMember(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
