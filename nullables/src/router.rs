//! Nullable transport: in-process session routing.

use async_trait::async_trait;
use fungible_finality::{FinalityError, Session, SessionOpener};
use fungible_types::PartyName;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

const SESSION_CAPACITY: usize = 16;

/// Connects parties living in the same process.
///
/// Each registered party gets a receiver of incoming sessions; opening a
/// session hands the far end to that receiver.
#[derive(Default)]
pub struct LocalRouter {
    inboxes: Mutex<HashMap<PartyName, mpsc::UnboundedSender<Session>>>,
}

impl LocalRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, replacing any earlier registration.
    pub fn register(&self, name: &PartyName) -> mpsc::UnboundedReceiver<Session> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inboxes.lock().unwrap().insert(name.clone(), tx);
        rx
    }

    /// Stop routing to `name`; later opens fail as unreachable.
    pub fn disconnect(&self, name: &PartyName) {
        self.inboxes.lock().unwrap().remove(name);
    }
}

#[async_trait]
impl SessionOpener for LocalRouter {
    async fn open(&self, from: &PartyName, to: &PartyName) -> Result<Session, FinalityError> {
        let inbox = self
            .inboxes
            .lock()
            .unwrap()
            .get(to)
            .cloned()
            .ok_or_else(|| FinalityError::Transport(format!("no route to {to}")))?;
        let (ours, theirs) = Session::pair(from.clone(), to.clone(), SESSION_CAPACITY);
        inbox
            .send(theirs)
            .map_err(|_| FinalityError::Transport(format!("{to} is not accepting sessions")))?;
        Ok(ours)
    }
}
