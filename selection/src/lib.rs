//! Token selection and claim reservation.
//!
//! The [`ClaimManager`] answers "give me unspent tokens of this asset worth at
//! least N" and reserves the answer so that no concurrent operation of the same
//! party can select any of those outputs until the reservation is committed,
//! released, or its lease runs out.
//!
//! Claim state lives in per-asset shards. Claims over different
//! `(issuer, symbol)` pairs never contend for the same lock.

pub mod claim;
pub mod error;
pub mod guard;
pub mod manager;

pub use claim::{Claim, ClaimCriteria, ClaimId, ClaimOutcome, ClaimState};
pub use error::SelectionError;
pub use guard::ClaimGuard;
pub use manager::{BalanceView, ClaimConfig, ClaimManager};
