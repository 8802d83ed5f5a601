//! Output references: the spend key of a token.

use crate::hash::TxHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Locates an output: the transaction that created it and its index among
/// that transaction's outputs. Assigned once, at commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub tx: TxHash,
    pub index: u32,
}

impl StateRef {
    pub fn new(tx: TxHash, index: u32) -> Self {
        Self { tx, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx, self.index)
    }
}
