//! Point-to-point sessions between an initiator and one counterparty.

use crate::error::FinalityError;
use crate::message::FinalityMessage;
use async_trait::async_trait;
use fungible_types::PartyName;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

/// One end of a bidirectional, bincode-framed channel.
pub struct Session {
    peer: PartyName,
    outbound: mpsc::Sender<Vec<u8>>,
    inbound: mpsc::Receiver<Vec<u8>>,
}

impl Session {
    pub fn new(peer: PartyName, outbound: mpsc::Sender<Vec<u8>>, inbound: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            peer,
            outbound,
            inbound,
        }
    }

    /// Two connected ends: the first is held by `a` and talks to `b`.
    pub fn pair(a: PartyName, b: PartyName, capacity: usize) -> (Session, Session) {
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);
        (Session::new(b, a_tx, a_rx), Session::new(a, b_tx, b_rx))
    }

    pub fn peer(&self) -> &PartyName {
        &self.peer
    }

    pub async fn send(&self, message: &FinalityMessage) -> Result<(), FinalityError> {
        let frame = message.encode()?;
        self.outbound
            .send(frame)
            .await
            .map_err(|_| FinalityError::Transport(format!("session to {} closed", self.peer)))
    }

    pub async fn receive(&mut self) -> Result<FinalityMessage, FinalityError> {
        let frame = self
            .inbound
            .recv()
            .await
            .ok_or_else(|| FinalityError::Transport(format!("session to {} closed", self.peer)))?;
        FinalityMessage::decode(&frame)
    }

    /// Receive, giving up at `deadline`.
    pub async fn receive_until(
        &mut self,
        deadline: Instant,
        stage: &str,
    ) -> Result<FinalityMessage, FinalityError> {
        match timeout_at(deadline, self.receive()).await {
            Ok(result) => result,
            Err(_) => Err(FinalityError::Timeout {
                stage: format!("{stage} from {}", self.peer),
            }),
        }
    }
}

/// Opens sessions to named parties.
#[async_trait]
pub trait SessionOpener: Send + Sync {
    async fn open(&self, from: &PartyName, to: &PartyName) -> Result<Session, FinalityError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fungible_types::TxHash;
    use std::time::Duration;

    fn name(s: &str) -> PartyName {
        PartyName::parse(s).unwrap()
    }

    #[tokio::test]
    async fn paired_sessions_exchange_frames() {
        let (mut alice, mut bob) = Session::pair(name("Alice"), name("Bob"), 4);
        assert_eq!(alice.peer(), &name("Bob"));
        assert_eq!(bob.peer(), &name("Alice"));

        let ack = FinalityMessage::Acknowledged { tx_id: TxHash::new([3; 32]) };
        alice.send(&ack).await.unwrap();
        assert_eq!(bob.receive().await.unwrap(), ack);

        bob.send(&FinalityMessage::Abort { reason: "no".into() }).await.unwrap();
        assert!(matches!(alice.receive().await.unwrap(), FinalityMessage::Abort { .. }));
    }

    #[tokio::test]
    async fn dropped_peer_is_a_transport_error() {
        let (mut alice, bob) = Session::pair(name("Alice"), name("Bob"), 4);
        drop(bob);
        assert!(matches!(alice.receive().await, Err(FinalityError::Transport(_))));
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (mut alice, _bob) = Session::pair(name("Alice"), name("Bob"), 4);
        let deadline = Instant::now() + Duration::from_millis(20);
        let err = alice.receive_until(deadline, "awaiting signature").await.unwrap_err();
        assert!(matches!(err, FinalityError::Timeout { .. }));
    }
}
