//! Selection criteria over unspent tokens.

use fungible_token::{AssetKey, UnspentToken};
use fungible_types::{IdentityHash, PartyName};
use serde::{Deserialize, Serialize};

/// Which unspent tokens a query or claim is interested in.
///
/// Issuer and symbol are mandatory: a filter never spans fungibility classes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenFilter {
    pub asset: AssetKey,
    pub owner: Option<IdentityHash>,
    pub notary: Option<PartyName>,
}

impl TokenFilter {
    pub fn for_asset(asset: AssetKey) -> Self {
        Self {
            asset,
            owner: None,
            notary: None,
        }
    }

    pub fn owned_by(mut self, owner: IdentityHash) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn at_notary(mut self, notary: PartyName) -> Self {
        self.notary = Some(notary);
        self
    }

    pub fn matches(&self, unspent: &UnspentToken) -> bool {
        let token = &unspent.token;
        token.issuer() == &self.asset.issuer
            && token.symbol() == &self.asset.symbol
            && self.owner.map_or(true, |o| token.owner() == &o)
            && self.notary.as_ref().map_or(true, |n| &unspent.notary == n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fungible_token::{Symbol, Token};
    use fungible_types::{Amount, StateRef, TxHash};

    fn unspent(issuer: u8, owner: u8, symbol: &str, notary: &str) -> UnspentToken {
        UnspentToken {
            state_ref: StateRef::new(TxHash::new([7; 32]), 0),
            token: Token::new(
                IdentityHash::new([issuer; 32]),
                IdentityHash::new([owner; 32]),
                Amount::new(100, 2),
                Symbol::new(symbol).unwrap(),
                "",
                2,
            )
            .unwrap(),
            notary: PartyName::parse(notary).unwrap(),
            sequence: 0,
        }
    }

    fn usd_of(issuer: u8) -> AssetKey {
        AssetKey {
            issuer: IdentityHash::new([issuer; 32]),
            symbol: Symbol::new("USD").unwrap(),
        }
    }

    #[test]
    fn asset_filter_ignores_owner_and_notary() {
        let filter = TokenFilter::for_asset(usd_of(1));
        assert!(filter.matches(&unspent(1, 2, "USD", "N1")));
        assert!(filter.matches(&unspent(1, 3, "USD", "N2")));
        assert!(!filter.matches(&unspent(1, 2, "EUR", "N1")));
        assert!(!filter.matches(&unspent(9, 2, "USD", "N1")));
    }

    #[test]
    fn owner_and_notary_narrow_the_match() {
        let filter = TokenFilter::for_asset(usd_of(1))
            .owned_by(IdentityHash::new([2; 32]))
            .at_notary(PartyName::parse("N1").unwrap());
        assert!(filter.matches(&unspent(1, 2, "USD", "N1")));
        assert!(!filter.matches(&unspent(1, 3, "USD", "N1")));
        assert!(!filter.matches(&unspent(1, 2, "USD", "N2")));
    }
}
