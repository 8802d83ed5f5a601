//! Protocol defaults.
//!
//! Nodes may override these through their configuration; the constants are the
//! values used when nothing is configured.

/// Decimal places carried by token amounts.
pub const DEFAULT_TOKEN_SCALE: u8 = 2;

/// How long a proposed transaction stays eligible for commit (24 hours).
pub const DEFAULT_VALIDITY_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Claim lease. Matches the validity window so a lease never lapses while its
/// transaction could still be notarised.
pub const DEFAULT_CLAIM_LEASE_SECS: u64 = DEFAULT_VALIDITY_WINDOW_SECS;

/// Ceiling on selector retries under contention.
pub const DEFAULT_MAX_CLAIM_RETRIES: u32 = 8;

/// Upper bound on the number of outputs a single claim may consume.
pub const MAX_CLAIM_INPUTS: usize = 500;

/// Longest accepted token symbol.
pub const MAX_SYMBOL_LEN: usize = 16;
