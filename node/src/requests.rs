//! Flow requests as they arrive from callers.

use fungible_types::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::NodeError;

/// A quantity given either as a JSON number or as a decimal string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
}

impl Quantity {
    /// Convert to a strictly positive amount at `scale`.
    pub fn to_amount(&self, scale: u8) -> Result<Amount, NodeError> {
        let text = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        };
        let amount = Amount::parse(&text, scale)
            .map_err(|e| NodeError::Validation(format!("quantity {text}: {e}")))?;
        if amount.is_zero() {
            return Err(NodeError::Validation(format!("quantity {text} must be positive")));
        }
        Ok(amount)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Quantity {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for Quantity {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub issuer: String,
    pub owner: String,
    pub quantity: Quantity,
    pub symbol: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub issuer: String,
    pub owner: String,
    pub new_owner: String,
    pub quantity: Quantity,
    pub symbol: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub issuer: String,
    pub owner: String,
    pub quantity: Quantity,
    pub symbol: String,
    #[serde(default)]
    pub tag: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub issuer: String,
    pub owner: String,
    pub symbol: String,
    /// Count tokens held by in-flight claims too.
    #[serde(default)]
    pub include_pending: bool,
}

/// Any flow request, tagged by its `flow` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "camelCase")]
pub enum FlowRequest {
    Issue(IssueRequest),
    Transfer(TransferRequest),
    Redeem(RedeemRequest),
    Balance(BalanceRequest),
}

impl FlowRequest {
    /// The party whose node must run this request.
    pub fn initiator(&self) -> &str {
        match self {
            Self::Issue(r) => &r.issuer,
            Self::Transfer(r) => &r.owner,
            Self::Redeem(r) => &r.owner,
            Self::Balance(r) => &r.owner,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Issue(_) => "issue",
            Self::Transfer(_) => "transfer",
            Self::Redeem(_) => "redeem",
            Self::Balance(_) => "balance",
        }
    }
}
