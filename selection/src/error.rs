use fungible_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid claim target: {0}")]
    InvalidTarget(String),

    /// A successful claim must always cover its target.
    #[error("negative change: claimed {claimed}, requested {requested}")]
    NegativeChange { claimed: String, requested: String },

    #[error("amount overflow while totalling tokens")]
    Overflow,

    #[error("claim {0} is not open")]
    NotOpen(String),

    #[error("commit record does not spend claimed ref {0}")]
    CommitMismatch(String),
}
