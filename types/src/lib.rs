//! Fundamental types for the fungible token ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! party identities, fixed-point amounts, transaction hashes, output references,
//! keys, timestamps and protocol constants.

pub mod amount;
pub mod error;
pub mod hash;
pub mod identity;
pub mod keys;
pub mod params;
pub mod state_ref;
pub mod time;

pub use amount::Amount;
pub use error::TypesError;
pub use hash::TxHash;
pub use identity::{IdentityHash, PartyName};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use state_ref::StateRef;
pub use time::{Clock, SystemClock, Timestamp};
