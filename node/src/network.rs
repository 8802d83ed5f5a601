//! A whole network living in one process.
//!
//! Every party gets its own [`TokenNode`] with a private vault. Parties talk
//! through a [`LocalRouter`] and share one [`MemoryNotary`]. Used by the daemon
//! and by the end-to-end tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use fungible_nullables::{LocalRouter, MemoryDirectory, MemoryNotary, MemoryVault};
use fungible_types::{Clock, PartyName};

use crate::config::NetworkConfig;
use crate::error::NodeError;
use crate::node::{NodeServices, TokenNode};
use crate::outcome::{FlowOutcome, OutcomeKind};
use crate::requests::FlowRequest;
use crate::shutdown::ShutdownController;

pub struct LocalNetwork {
    nodes: BTreeMap<PartyName, Arc<TokenNode>>,
    directory: Arc<MemoryDirectory>,
    router: Arc<LocalRouter>,
    notary: Arc<MemoryNotary>,
    shutdown: ShutdownController,
    responders: Vec<JoinHandle<()>>,
}

impl LocalNetwork {
    /// Register every party, build its node and start its responder loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &NetworkConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        let parse = |raw: &str| PartyName::parse(raw).map_err(|e| NodeError::Config(e.to_string()));

        let directory = Arc::new(MemoryDirectory::new(config.network_secret.as_bytes()));
        let router = Arc::new(LocalRouter::new());
        let notary_name = parse(&config.notary)?;
        directory.add_notary(&notary_name)?;
        let notary_keys = directory
            .keys(&notary_name)
            .ok_or_else(|| NodeError::Config(format!("no keys for notary {notary_name}")))?;
        let notary = Arc::new(MemoryNotary::new(notary_name.clone(), notary_keys, Arc::clone(&clock)));

        let shutdown = ShutdownController::new();
        let mut nodes = BTreeMap::new();
        let mut responders = Vec::with_capacity(config.parties.len());

        for raw in &config.parties {
            let name = parse(raw)?;
            directory.add_party(&name)?;
            let keys = directory
                .keys(&name)
                .ok_or_else(|| NodeError::Config(format!("no keys for {name}")))?;
            let services = NodeServices {
                directory: directory.clone(),
                vault: Arc::new(MemoryVault::new()),
                sessions: router.clone(),
                notary: notary.clone(),
                clock: Arc::clone(&clock),
                keys,
            };
            let node = Arc::new(TokenNode::new(name.clone(), config.node.clone(), services)?);
            let inbox = router.register(&name);
            responders.push(node.spawn_responder(inbox, shutdown.subscribe()));
            nodes.insert(name, node);
        }

        info!(parties = nodes.len(), notary = %notary_name, "local network started");
        Ok(Self {
            nodes,
            directory,
            router,
            notary,
            shutdown,
            responders,
        })
    }

    pub fn node(&self, name: &str) -> Option<Arc<TokenNode>> {
        let name = PartyName::parse(name).ok()?;
        self.nodes.get(&name).cloned()
    }

    pub fn parties(&self) -> impl Iterator<Item = &PartyName> {
        self.nodes.keys()
    }

    pub fn directory(&self) -> &Arc<MemoryDirectory> {
        &self.directory
    }

    pub fn router(&self) -> &Arc<LocalRouter> {
        &self.router
    }

    pub fn notary(&self) -> &Arc<MemoryNotary> {
        &self.notary
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Run `request` on the node of the party that must initiate it: the
    /// issuer for issuance, the owner for everything else.
    pub async fn execute(&self, request: FlowRequest) -> FlowOutcome {
        match self.node(request.initiator()) {
            Some(node) => node.execute(request).await,
            None => FlowOutcome::failure(
                OutcomeKind::UnknownParty,
                format!("no node runs {} for {}", request.name(), request.initiator()),
            ),
        }
    }

    /// Stop every responder loop and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.shutdown();
        for handle in self.responders {
            let _ = handle.await;
        }
        info!("local network stopped");
    }
}
