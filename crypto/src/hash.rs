//! Hashing for identities and transactions.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use fungible_types::{IdentityHash, PublicKey, TxHash};
use sha2::Sha256;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Identity fingerprint of a ledger key: SHA-256 over the encoded key.
pub fn identity_hash(key: &PublicKey) -> IdentityHash {
    IdentityHash::new(sha256(key.as_bytes()))
}

/// Transaction id of a serialized transaction body.
pub fn transaction_id(body: &[u8]) -> TxHash {
    TxHash::new(blake2b_256(body))
}
