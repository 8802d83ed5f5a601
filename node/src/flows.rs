//! Issue, transfer, redeem and balance flows.
//!
//! Each flow resolves the parties it names, checks that this node plays the
//! initiating role, reserves inputs where it spends any, assembles the
//! transaction and hands it to the finality coordinator. Every outcome,
//! including running short of funds, comes back as a [`FlowOutcome`].

use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use fungible_finality::FinalityRequest;
use fungible_selection::{BalanceView, ClaimCriteria, ClaimGuard, ClaimOutcome};
use fungible_store::{Member, TokenFilter};
use fungible_token::{AssetKey, Symbol, Token};
use fungible_transactions::{assemble, Action, AssemblyRequest, ProposedTransaction};
use fungible_types::{Amount, PartyName};

use crate::error::NodeError;
use crate::node::TokenNode;
use crate::outcome::{FlowOutcome, OutcomeKind};
use crate::requests::{BalanceRequest, FlowRequest, IssueRequest, RedeemRequest, TransferRequest};
use crate::tracing_spans::flow_span;

impl TokenNode {
    /// Run any request on this node.
    pub async fn execute(&self, request: FlowRequest) -> FlowOutcome {
        match request {
            FlowRequest::Issue(r) => self.issue(r).await,
            FlowRequest::Transfer(r) => self.transfer(r).await,
            FlowRequest::Redeem(r) => self.redeem(r).await,
            FlowRequest::Balance(r) => self.balance(r),
        }
    }

    /// Create new tokens. Must run at the issuer.
    pub async fn issue(&self, request: IssueRequest) -> FlowOutcome {
        async {
            let result = self.try_issue(request).await;
            self.report("issue", result)
        }
        .instrument(flow_span("issue", self.name.as_str()))
        .await
    }

    /// Move tokens to a new owner. Must run at the current owner.
    pub async fn transfer(&self, request: TransferRequest) -> FlowOutcome {
        async {
            let result = self.try_transfer(request).await;
            self.report("transfer", result)
        }
        .instrument(flow_span("transfer", self.name.as_str()))
        .await
    }

    /// Destroy tokens with the issuer's consent. Must run at the current owner.
    pub async fn redeem(&self, request: RedeemRequest) -> FlowOutcome {
        async {
            let result = self.try_redeem(request).await;
            self.report("redeem", result)
        }
        .instrument(flow_span("redeem", self.name.as_str()))
        .await
    }

    /// Sum of the owner's unspent tokens of one asset, as recorded in this
    /// node's vault.
    pub fn balance(&self, request: BalanceRequest) -> FlowOutcome {
        let _span = flow_span("balance", self.name.as_str()).entered();
        let result = self.try_balance(request);
        self.report("balance", result)
    }

    async fn try_issue(&self, request: IssueRequest) -> Result<FlowOutcome, NodeError> {
        let scale = self.config.token_scale;
        let amount = request.quantity.to_amount(scale)?;
        let symbol = Symbol::new(request.symbol.as_str())?;
        let issuer = self.resolve(&request.issuer)?;
        let owner = self.resolve(&request.owner)?;
        self.ensure_initiator(&issuer, "issue", "issuer")?;
        let notary = self.notary()?;

        let token = Token::new(issuer.identity, owner.identity, amount, symbol.clone(), request.tag, scale)?;
        let tx = self.assemble(Action::Issue, &[], vec![token], notary)?;
        let stx = self
            .coordinator
            .finalize(FinalityRequest {
                tx,
                input_tokens: Vec::new(),
                counterparties: vec![owner.name.clone()],
                claim: None,
            })
            .await?;
        Ok(FlowOutcome::success(
            format!("issued {amount} {symbol} to {}", owner.name),
            stx.tx.id,
        ))
    }

    async fn try_transfer(&self, request: TransferRequest) -> Result<FlowOutcome, NodeError> {
        let scale = self.config.token_scale;
        let amount = request.quantity.to_amount(scale)?;
        let symbol = Symbol::new(request.symbol.as_str())?;
        let issuer = self.resolve(&request.issuer)?;
        let owner = self.resolve(&request.owner)?;
        let new_owner = self.resolve(&request.new_owner)?;
        self.ensure_initiator(&owner, "transfer", "owner")?;
        let notary = self.notary()?;

        let guard = match self.claim(&issuer, &owner, &symbol, &notary, amount, "transfer")? {
            Ok(guard) => guard,
            Err(short) => return Ok(short),
        };

        let mut outputs = vec![Token::new(
            issuer.identity,
            new_owner.identity,
            amount,
            symbol.clone(),
            request.tag.clone(),
            scale,
        )?];
        if let Some(change) = guard.claim().change_for(amount)? {
            outputs.push(Token::new(issuer.identity, owner.identity, change, symbol.clone(), request.tag, scale)?);
        }

        let tx = self.assemble(Action::Transfer, guard.claim().tokens(), outputs, notary)?;
        let input_tokens = guard.claim().tokens().iter().map(|u| u.token.clone()).collect();
        let stx = self
            .coordinator
            .finalize(FinalityRequest {
                tx,
                input_tokens,
                counterparties: vec![issuer.name.clone(), new_owner.name.clone()],
                claim: Some(guard),
            })
            .await?;
        Ok(FlowOutcome::success(
            format!("transferred {amount} {symbol} from {} to {}", owner.name, new_owner.name),
            stx.tx.id,
        ))
    }

    async fn try_redeem(&self, request: RedeemRequest) -> Result<FlowOutcome, NodeError> {
        let scale = self.config.token_scale;
        let amount = request.quantity.to_amount(scale)?;
        let symbol = Symbol::new(request.symbol.as_str())?;
        let issuer = self.resolve(&request.issuer)?;
        let owner = self.resolve(&request.owner)?;
        self.ensure_initiator(&owner, "redeem", "owner")?;
        let notary = self.notary()?;

        let guard = match self.claim(&issuer, &owner, &symbol, &notary, amount, "redeem")? {
            Ok(guard) => guard,
            Err(short) => return Ok(short),
        };

        let outputs = match guard.claim().change_for(amount)? {
            Some(change) => vec![Token::new(issuer.identity, owner.identity, change, symbol.clone(), request.tag, scale)?],
            None => Vec::new(),
        };

        let tx = self.assemble(Action::Redeem, guard.claim().tokens(), outputs, notary)?;
        let input_tokens = guard.claim().tokens().iter().map(|u| u.token.clone()).collect();
        let stx = self
            .coordinator
            .finalize(FinalityRequest {
                tx,
                input_tokens,
                counterparties: vec![issuer.name.clone()],
                claim: Some(guard),
            })
            .await?;
        Ok(FlowOutcome::success(
            format!("redeemed {amount} {symbol} held by {}", owner.name),
            stx.tx.id,
        ))
    }

    fn try_balance(&self, request: BalanceRequest) -> Result<FlowOutcome, NodeError> {
        let symbol = Symbol::new(request.symbol.as_str())?;
        let issuer = self.resolve(&request.issuer)?;
        let owner = self.resolve(&request.owner)?;
        let notary = self.notary()?;
        let filter = TokenFilter::for_asset(AssetKey {
            issuer: issuer.identity,
            symbol: symbol.clone(),
        })
        .owned_by(owner.identity)
        .at_notary(notary);
        let view = if request.include_pending {
            BalanceView::IncludingPending
        } else {
            BalanceView::Spendable
        };
        let amount = self.claims.balance(&filter, view)?;
        Ok(FlowOutcome::balance(owner.name.as_str(), amount, symbol.as_str()))
    }

    /// Reserve `amount` of the owner's tokens. A shortfall comes back as the
    /// ready-made outcome in `Err`.
    fn claim(
        &self,
        issuer: &Member,
        owner: &Member,
        symbol: &Symbol,
        notary: &PartyName,
        amount: Amount,
        label: &str,
    ) -> Result<Result<ClaimGuard, FlowOutcome>, NodeError> {
        let filter = TokenFilter::for_asset(AssetKey {
            issuer: issuer.identity,
            symbol: symbol.clone(),
        })
        .owned_by(owner.identity)
        .at_notary(notary.clone());
        let criteria = ClaimCriteria {
            filter,
            target: amount,
            label: label.to_string(),
        };
        Ok(match self.claims.try_claim(criteria)? {
            ClaimOutcome::Claimed(claim) => Ok(ClaimGuard::new(Arc::clone(&self.claims), claim)),
            ClaimOutcome::InsufficientFunds {
                requested,
                available,
                input_limit_reached,
            } => Err(FlowOutcome::insufficient_funds(
                requested,
                available,
                symbol.as_str(),
                input_limit_reached,
            )),
        })
    }

    fn assemble(
        &self,
        action: Action,
        inputs: &[fungible_token::UnspentToken],
        outputs: Vec<Token>,
        notary: PartyName,
    ) -> Result<ProposedTransaction, NodeError> {
        Ok(assemble(AssemblyRequest {
            action,
            inputs,
            outputs,
            notary,
            initiator: self.identity,
            nonce: self.next_nonce(),
            now: self.clock.now(),
            validity_window_secs: self.config.validity_window_secs,
        })?)
    }

    fn resolve(&self, name: &str) -> Result<Member, NodeError> {
        let party = PartyName::parse(name).map_err(|e| NodeError::Validation(e.to_string()))?;
        self.directory
            .lookup(&party)?
            .ok_or_else(|| NodeError::UnknownParty(party.to_string()))
    }

    /// The network must have exactly one notary.
    fn notary(&self) -> Result<PartyName, NodeError> {
        let mut notaries = self.directory.notaries()?;
        if notaries.len() != 1 {
            warn!(count = notaries.len(), "expected exactly one notary");
            return Err(NodeError::UnknownParty("notary".into()));
        }
        Ok(notaries.remove(0))
    }

    fn ensure_initiator(&self, member: &Member, flow: &str, role: &str) -> Result<(), NodeError> {
        if member.identity != self.identity {
            return Err(NodeError::Validation(format!(
                "{flow} must be initiated by the {role} {}, not {}",
                member.name, self.name
            )));
        }
        Ok(())
    }

    fn report(&self, flow: &str, result: Result<FlowOutcome, NodeError>) -> FlowOutcome {
        let outcome = result.unwrap_or_else(FlowOutcome::from);
        match outcome.kind {
            OutcomeKind::Success => info!(flow, message = %outcome.message, "flow succeeded"),
            OutcomeKind::InternalInvariantViolation => {
                error!(flow, message = %outcome.message, "flow hit an internal invariant violation")
            }
            kind => warn!(flow, %kind, message = %outcome.message, "flow failed"),
        }
        outcome
    }
}
