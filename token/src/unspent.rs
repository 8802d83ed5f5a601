//! Committed, unspent outputs.

use crate::token::Token;
use fungible_types::{PartyName, StateRef};
use serde::{Deserialize, Serialize};

/// A committed token together with its spend key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentToken {
    pub state_ref: StateRef,
    pub token: Token,
    /// Notary that arbitrates spends of this output.
    pub notary: PartyName,
    /// Commit order within the holding vault. Lower is older.
    pub sequence: u64,
}
