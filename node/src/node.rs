//! A ledger party: its vault, claim manager, finality coordinator and the
//! responder that serves counterparties.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, Instrument};

use fungible_crypto::identity_hash;
use fungible_finality::{
    FinalityCoordinator, Notary, Responder, ResponderContext, Session, SessionOpener,
};
use fungible_selection::ClaimManager;
use fungible_store::{MemberDirectory, UnspentIndex};
use fungible_types::{Clock, IdentityHash, KeyPair, PartyName};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::tracing_spans::responder_span;

/// Collaborators a node is built from.
pub struct NodeServices {
    pub directory: Arc<dyn MemberDirectory>,
    pub vault: Arc<dyn UnspentIndex>,
    pub sessions: Arc<dyn SessionOpener>,
    pub notary: Arc<dyn Notary>,
    pub clock: Arc<dyn Clock>,
    pub keys: Arc<KeyPair>,
}

pub struct TokenNode {
    pub(crate) name: PartyName,
    pub(crate) identity: IdentityHash,
    pub(crate) config: NodeConfig,
    pub(crate) directory: Arc<dyn MemberDirectory>,
    pub(crate) claims: Arc<ClaimManager>,
    pub(crate) coordinator: FinalityCoordinator,
    pub(crate) clock: Arc<dyn Clock>,
    responder: Arc<Responder>,
    nonce: AtomicU64,
}

impl TokenNode {
    /// Build a node for `name`, whose keys must match its directory entry.
    pub fn new(name: PartyName, config: NodeConfig, services: NodeServices) -> Result<Self, NodeError> {
        config.validate()?;
        let identity = identity_hash(&services.keys.public);
        match services.directory.lookup(&name)? {
            Some(member) if member.identity == identity => {}
            Some(_) => {
                return Err(NodeError::Config(format!(
                    "signing key of {name} does not match its directory entry"
                )))
            }
            None => return Err(NodeError::UnknownParty(name.to_string())),
        }

        let claims = Arc::new(ClaimManager::new(
            services.vault,
            Arc::clone(&services.clock),
            config.claim_config(),
        ));
        let timeouts = config.timeouts();
        let coordinator = FinalityCoordinator::new(
            name.clone(),
            identity,
            Arc::clone(&services.keys),
            Arc::clone(&services.directory),
            services.sessions,
            services.notary,
            Arc::clone(&claims),
            Arc::clone(&services.clock),
            timeouts,
        );
        // A responder waits through the initiator's notary round trip too.
        let responder = Arc::new(Responder::new(
            ResponderContext {
                identity,
                keys: services.keys,
                claims: Arc::clone(&claims),
                clock: Arc::clone(&services.clock),
                directory: Arc::clone(&services.directory),
            },
            timeouts.session + timeouts.notary,
        ));
        // Seed nonces from the clock so a restarted node never reuses one.
        let nonce = AtomicU64::new(services.clock.now().as_secs() << 20);

        info!(node = %name, %identity, "ledger party ready");
        Ok(Self {
            name,
            identity,
            config,
            directory: services.directory,
            claims,
            coordinator,
            clock: services.clock,
            responder,
            nonce,
        })
    }

    pub fn name(&self) -> &PartyName {
        &self.name
    }

    pub fn identity(&self) -> IdentityHash {
        self.identity
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn claims(&self) -> &Arc<ClaimManager> {
        &self.claims
    }

    pub(crate) fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::Relaxed)
    }

    /// Serve every session arriving on `inbox` until shutdown. Each session
    /// runs on its own task.
    pub fn spawn_responder(
        &self,
        mut inbox: mpsc::UnboundedReceiver<Session>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let responder = Arc::clone(&self.responder);
        let name = self.name.clone();
        tokio::spawn(async move {
            loop {
                let session = tokio::select! {
                    biased;
                    _ = shutdown.recv() => {
                        info!(node = %name, "responder loop shutting down");
                        break;
                    }
                    next = inbox.recv() => match next {
                        Some(session) => session,
                        None => {
                            debug!(node = %name, "session inbox closed");
                            break;
                        }
                    },
                };
                let span = responder_span(name.as_str(), session.peer().as_str());
                let responder = Arc::clone(&responder);
                tokio::spawn(
                    async move {
                        responder.serve(session).await;
                    }
                    .instrument(span),
                );
            }
        })
    }
}
