//! Finality: turning a proposed transaction into an agreed, notarised fact.
//!
//! The initiator's [`FinalityCoordinator`] signs a proposal, opens a
//! [`Session`] to every counterparty, collects co-signatures, submits the fully
//! signed transaction to the [`Notary`] and, on confirmation, commits the
//! effect to its own vault and tells every participant the outcome. Any
//! failure before notarisation aborts the whole attempt and releases the claim.
//!
//! Counterparties run a [`Responder`], a small state machine per session:
//!
//! ```text
//! AwaitingProposal -> Validating -> Signed | Acknowledged -> Finalized
//!                               \-> Aborted
//! ```

pub mod coordinator;
pub mod error;
pub mod message;
pub mod notary;
pub mod record;
pub mod responder;
pub mod session;

pub use coordinator::{FinalityCoordinator, FinalityRequest, FinalityTimeouts};
pub use error::FinalityError;
pub use message::FinalityMessage;
pub use notary::{Notary, NotaryAttestation, NotaryVerdict};
pub use record::{asset_of, commit_record_for};
pub use responder::{Responder, ResponderContext, ResponderSession, ResponderState};
pub use session::{Session, SessionOpener};
