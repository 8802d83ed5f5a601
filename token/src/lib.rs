//! The fungible token: an immutable unspent transaction output.
//!
//! A [`Token`] carries an amount of some asset, named by its issuer and symbol,
//! held by an owner. Two tokens are interchangeable for selection purposes iff
//! they share issuer and symbol ([`Token::is_fungible_with`]); owner, amount and
//! tag never matter for fungibility.
//!
//! Once committed, a token is tracked as an [`UnspentToken`]: the token plus the
//! [`StateRef`](fungible_types::StateRef) that is its spend key.

pub mod error;
pub mod symbol;
pub mod token;
pub mod unspent;

pub use error::TokenError;
pub use symbol::Symbol;
pub use token::{AssetKey, Token};
pub use unspent::UnspentToken;
