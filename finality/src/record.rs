//! Per-party view of a finalized transaction.

use fungible_store::CommitRecord;
use fungible_token::{AssetKey, Token};
use fungible_transactions::SignedTransaction;
use fungible_types::IdentityHash;

/// The effect of `stx` on `party`'s vault: every input is spent, and outputs
/// the party owns or issued are recorded.
pub fn commit_record_for(stx: &SignedTransaction, party: &IdentityHash) -> CommitRecord {
    let tx = &stx.tx;
    CommitRecord {
        tx_id: tx.id,
        notary: tx.notary.clone(),
        spent: tx.inputs.clone(),
        produced: tx
            .output_refs()
            .filter(|(_, t)| t.owner() == party || t.issuer() == party)
            .map(|(r, t)| (r, t.clone()))
            .collect(),
    }
}

/// Asset of a transaction, taken from its outputs or, failing that, its inputs.
pub fn asset_of(stx: &SignedTransaction, input_tokens: &[Token]) -> Option<AssetKey> {
    stx.tx
        .outputs
        .first()
        .or_else(|| input_tokens.first())
        .map(Token::asset)
}
