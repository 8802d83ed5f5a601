use fungible_selection::SelectionError;
use fungible_store::StoreError;
use fungible_transactions::{TransactionError, Violation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinalityError {
    #[error("transaction rejected: {0}")]
    Invalid(#[from] TransactionError),

    #[error("counterparty {party} aborted: {reason}")]
    CounterpartyAbort { party: String, reason: String },

    #[error("notary rejected transaction: {0}")]
    NotaryRejected(String),

    #[error("timed out while {stage}")]
    Timeout { stage: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("local commit failed: {0}")]
    Commit(#[from] SelectionError),
}

impl From<Violation> for FinalityError {
    fn from(v: Violation) -> Self {
        Self::Invalid(TransactionError::Violation(v))
    }
}
