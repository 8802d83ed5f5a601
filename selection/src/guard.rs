//! Release-on-drop ownership of an open claim.

use crate::claim::{Claim, ClaimState};
use crate::error::SelectionError;
use crate::manager::ClaimManager;
use fungible_store::CommitRecord;
use std::sync::Arc;

/// Owns an open claim for the lifetime of a finality attempt.
///
/// Dropping the guard without committing releases the claim, so a flow that
/// fails, times out, or whose future is cancelled mid-way never leaves its
/// refs reserved.
pub struct ClaimGuard {
    manager: Arc<ClaimManager>,
    claim: Claim,
}

impl ClaimGuard {
    pub fn new(manager: Arc<ClaimManager>, claim: Claim) -> Self {
        Self { manager, claim }
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    pub fn commit(mut self, record: &CommitRecord) -> Result<(), SelectionError> {
        self.manager.commit(&mut self.claim, record)
    }

    /// Explicit release. Equivalent to dropping the guard.
    pub fn release(mut self) {
        self.manager.release(&mut self.claim);
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        if self.claim.state == ClaimState::Open {
            self.manager.release(&mut self.claim);
        }
    }
}
