use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("unknown party: {0}")]
    UnknownParty(String),

    #[error(transparent)]
    Finality(#[from] fungible_finality::FinalityError),

    #[error(transparent)]
    Selection(#[from] fungible_selection::SelectionError),

    #[error(transparent)]
    Transaction(#[from] fungible_transactions::TransactionError),

    #[error("invalid token: {0}")]
    Token(#[from] fungible_token::TokenError),

    #[error("store error: {0}")]
    Store(#[from] fungible_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
