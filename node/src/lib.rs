//! Fungible token ledger party.
//!
//! A node owns one party's view of the ledger and runs its flows:
//! - Issues new tokens (as issuer)
//! - Transfers and redeems tokens it owns, claiming inputs and returning change
//! - Serves counterparties' finality sessions
//! - Answers balance queries from its own vault

pub mod config;
pub mod error;
pub mod flows;
pub mod logging;
pub mod network;
pub mod node;
pub mod outcome;
pub mod requests;
pub mod shutdown;
pub mod tracing_spans;

pub use config::{NetworkConfig, NodeConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use network::LocalNetwork;
pub use node::{NodeServices, TokenNode};
pub use outcome::{FlowOutcome, OutcomeKind};
pub use requests::{
    BalanceRequest, FlowRequest, IssueRequest, Quantity, RedeemRequest, TransferRequest,
};
pub use shutdown::ShutdownController;
