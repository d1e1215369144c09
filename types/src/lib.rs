//! Fundamental types for the quadratic-voting governor.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: accounts, stake units, ratios, chain time, timelock hashes,
//! proposal actions and the protocol parameters.

pub mod action;
pub mod address;
pub mod amount;
pub mod chain;
pub mod hash;
pub mod params;
pub mod ratio;
pub mod serde_u128;
pub mod time;

pub use action::Action;
pub use address::AccountId;
pub use amount::{format_stake, whole_tokens, STAKE_UNIT};
pub use chain::{BlockHeight, ChainTime};
pub use hash::TxHash;
pub use params::{GovernanceParams, RefundSchedule};
pub use ratio::Ratio;
pub use time::Timestamp;

/// Identifier of a parent or child proposal. Assigned from 1 upward.
pub type ProposalId = u64;
