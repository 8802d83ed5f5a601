//! Nullable member directory.

use fungible_crypto::keypair_for_party;
use fungible_store::{Member, MemberDirectory, StoreError};
use fungible_types::{IdentityHash, KeyPair, PartyName};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// An in-memory directory whose members' keys derive from a network secret.
///
/// Besides answering lookups it hands out each member's key pair, which only
/// makes sense for networks that live inside one process.
pub struct MemoryDirectory {
    secret: Vec<u8>,
    members: Mutex<HashMap<PartyName, (Member, Arc<KeyPair>)>>,
}

impl MemoryDirectory {
    pub fn new(network_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: network_secret.into(),
            members: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_party(&self, name: &PartyName) -> Result<Member, StoreError> {
        self.add(name, false)
    }

    pub fn add_notary(&self, name: &PartyName) -> Result<Member, StoreError> {
        self.add(name, true)
    }

    /// The member's signing keys.
    pub fn keys(&self, name: &PartyName) -> Option<Arc<KeyPair>> {
        self.members.lock().unwrap().get(name).map(|(_, keys)| keys.clone())
    }

    fn add(&self, name: &PartyName, is_notary: bool) -> Result<Member, StoreError> {
        let mut members = self.members.lock().unwrap();
        if members.contains_key(name) {
            return Err(StoreError::Duplicate(name.to_string()));
        }
        let keys = keypair_for_party(&self.secret, name);
        let member = Member::new(name.clone(), vec![keys.public.clone()], is_notary)?;
        members.insert(name.clone(), (member.clone(), Arc::new(keys)));
        Ok(member)
    }
}

impl MemberDirectory for MemoryDirectory {
    fn lookup(&self, name: &PartyName) -> Result<Option<Member>, StoreError> {
        Ok(self.members.lock().unwrap().get(name).map(|(m, _)| m.clone()))
    }

    fn lookup_identity(&self, identity: &IdentityHash) -> Result<Option<Member>, StoreError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .values()
            .find(|(m, _)| &m.identity == identity)
            .map(|(m, _)| m.clone()))
    }

    fn notaries(&self) -> Result<Vec<PartyName>, StoreError> {
        let mut names: Vec<PartyName> = self
            .members
            .lock()
            .unwrap()
            .values()
            .filter(|(m, _)| m.is_notary)
            .map(|(m, _)| m.name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
