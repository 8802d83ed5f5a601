//! Transactions over fungible tokens and the rules that make them valid.
//!
//! - [`action`]: the three transitions: **Issue**, **Transfer**, **Redeem**
//! - [`rules`]: the stateless transition rule engine every party runs
//! - [`proposal`]: the proposed transaction and its content-derived id
//! - [`signed`]: a proposal plus the signatures collected for it
//! - [`assembler`]: builds a proposal from claimed inputs and desired outputs

pub mod action;
pub mod assembler;
pub mod error;
pub mod proposal;
pub mod rules;
pub mod signed;

pub use action::Action;
pub use assembler::{assemble, AssemblyRequest};
pub use error::TransactionError;
pub use proposal::ProposedTransaction;
pub use rules::{required_signers, validate, Violation};
pub use signed::{SignedTransaction, TransactionSignature};
