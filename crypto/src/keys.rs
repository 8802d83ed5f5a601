//! Ed25519 key derivation.

use crate::hash::blake2b_256_multi;
use fungible_types::{KeyPair, PartyName, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Deterministic ledger key for a named party under a network secret.
///
/// Used by in-process networks where every party's key is derived from its
/// name; production deployments provision keys out of band.
pub fn keypair_for_party(network_secret: &[u8], name: &PartyName) -> KeyPair {
    let seed = blake2b_256_multi(&[b"ledger-key", network_secret, name.as_str().as_bytes()]);
    keypair_from_seed(&seed)
}
