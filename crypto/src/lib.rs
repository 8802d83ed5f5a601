//! Cryptographic primitives for the fungible token ledger.
//!
//! - **Ed25519** for transaction signing and signature verification
//! - **SHA-256** for party identity fingerprints
//! - **Blake2b** for transaction ids

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi, identity_hash, sha256, transaction_id};
pub use keys::{keypair_for_party, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
