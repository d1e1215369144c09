//! Hierarchical quadratic-voting governor.
//!
//! A proposal is either a single entity or a parent bundling several
//! independently resolvable children ("attributes"). Voters escrow stake;
//! child tallies weigh `sqrt(stake on the child)` while the parent tally
//! weighs `sqrt(total stake in the tree)`, so splitting stake across
//! attributes never buys extra influence over the overall outcome. Escrow is
//! refunded once the governing proposal resolves, scaled by an outcome
//! multiplier.
//!
//! The governor talks to its surroundings through the [`qv_store::StakeLedger`]
//! and [`qv_store::Timelock`] traits.

pub mod config;
pub mod error;
pub mod escrow;
pub mod events;
pub mod governor;
pub mod proposal;
pub mod refund;
pub mod resolution;
pub mod store;
pub mod voting;

pub use config::GovernorConfig;
pub use error::{GovernanceError, RefundIneligibility};
pub use escrow::{EscrowEntry, EscrowRole, Settlement, StakeEscrow};
pub use events::GovernorEvent;
pub use governor::Governor;
pub use proposal::{Proposal, ProposalKind, ProposalRequest, ProposalState, Receipt};
pub use refund::{PlannedSettlement, RefundEngine, RefundSummary};
pub use resolution::ResolutionEngine;
pub use store::{ProposalStore, ReceiptUpdate};
pub use voting::{plan_proposer_stake, plan_vote, plan_withdrawal, EscrowDeposit, VotePlan, WithdrawalPlan};
