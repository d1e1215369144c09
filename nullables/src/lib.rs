//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the governor (chain clock, stake ledger,
//! timelock) is abstracted behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod chain;
pub mod ledger;
pub mod timelock;

pub use chain::NullChain;
pub use ledger::NullStakeLedger;
pub use timelock::{DispatchedCall, NullTimelock};
