//! Abstract collaborator traits for the quadratic-voting governor.
//!
//! The governor never owns balances or executes actions itself. It talks to
//! a stake ledger (balances, delegated voting power, escrow custody) and a
//! timelock (delayed dispatch of approved actions) through these traits.
//! Production hosts implement them over the real ledger; tests use the
//! in-memory doubles from `qv-nullables`.

pub mod error;
pub mod ledger;
pub mod timelock;

pub use error::{LedgerError, TimelockError};
pub use ledger::StakeLedger;
pub use timelock::Timelock;
