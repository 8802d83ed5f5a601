use crate::rules::Violation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction violates the transition rules: {0}")]
    Violation(#[from] Violation),

    #[error("invalid signature by {signer} on transaction {tx_id}")]
    InvalidSignature { tx_id: String, signer: String },

    #[error("transaction id {claimed} does not match its contents ({computed})")]
    IdMismatch { claimed: String, computed: String },

    #[error("input {input} is governed by notary {found}, transaction names {expected}")]
    NotaryMismatch {
        input: String,
        found: String,
        expected: String,
    },

    #[error("encoding error: {0}")]
    Encoding(String),
}
