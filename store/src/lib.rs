//! Storage and directory contracts for the fungible token ledger.
//!
//! Every backend (the in-memory nullables used by tests and the in-process
//! network, or a durable vault) implements these traits. The rest of the
//! workspace depends only on the traits.

pub mod directory;
pub mod error;
pub mod filter;
pub mod unspent;

pub use directory::{Member, MemberDirectory};
pub use error::StoreError;
pub use filter::TokenFilter;
pub use unspent::{sort_oldest_first, CommitRecord, UnspentIndex};
