//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of a ledger party (clock, vault, member
//! directory, notary, session transport) sits behind a trait. This crate
//! provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! The daemon also uses them to run a whole network inside one process.

pub mod clock;
pub mod directory;
pub mod notary;
pub mod router;
pub mod vault;

pub use clock::NullClock;
pub use directory::MemoryDirectory;
pub use notary::MemoryNotary;
pub use router::LocalRouter;
pub use vault::MemoryVault;
