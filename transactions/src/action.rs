//! Transition kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared intent of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Create a new token out of nothing. Only the issuer may do this.
    Issue,
    /// Move value between owners, conserving the total.
    Transfer,
    /// Destroy value, optionally returning change to the owner.
    Redeem,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Issue => "issue",
            Self::Transfer => "transfer",
            Self::Redeem => "redeem",
        };
        f.write_str(name)
    }
}
