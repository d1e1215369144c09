use std::fmt;

use qv_math::MathError;
use qv_store::{LedgerError, TimelockError};
use qv_types::{ProposalId, Timestamp, TxHash};
use thiserror::Error;

use crate::proposal::ProposalState;

/// Why an escrow entry cannot be refunded right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundIneligibility {
    /// The caller holds no escrow on the addressed proposal or tree.
    NoEscrow,
    /// The governing proposal is unresolved or defeated.
    Outcome(ProposalState),
}

impl fmt::Display for RefundIneligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefundIneligibility::NoEscrow => f.write_str("no escrow held"),
            RefundIneligibility::Outcome(state) => write!(f, "governing proposal is {state}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    UnknownProposal(ProposalId),

    #[error("proposer {proposer} is below the proposal threshold: have {have}, need {need}")]
    BelowThreshold {
        proposer: String,
        have: u128,
        need: u128,
    },

    #[error("voter {voter} has insufficient stake: have {available}, need {requested}")]
    InsufficientStake {
        voter: String,
        available: u128,
        requested: u128,
    },

    #[error("voter {voter} has already voted on proposal {proposal_id}")]
    AlreadyVoted { proposal_id: ProposalId, voter: String },

    #[error("vote amount must be non-zero")]
    ZeroVotes,

    #[error("voter {voter} already voted support={existing} in the tree of proposal {parent_id}")]
    ConflictingSupport {
        parent_id: ProposalId,
        voter: String,
        existing: bool,
    },

    #[error("proposal {proposal_id} is not active (state {state})")]
    ProposalNotActive {
        proposal_id: ProposalId,
        state: ProposalState,
    },

    #[error("proposal {proposal_id} is already resolved (state {state})")]
    AlreadyResolved {
        proposal_id: ProposalId,
        state: ProposalState,
    },

    #[error("{account} is not eligible for a refund on proposal {proposal_id}: {reason}")]
    NotEligibleForRefund {
        proposal_id: ProposalId,
        account: String,
        reason: RefundIneligibility,
    },

    #[error("escrow of {account} on proposal {proposal_id} has already been refunded")]
    AlreadyRefunded { proposal_id: ProposalId, account: String },

    #[error("proposal {proposal_id} can only be queued once succeeded (state {state})")]
    NotSucceeded {
        proposal_id: ProposalId,
        state: ProposalState,
    },

    #[error("proposal {proposal_id} can only be executed while queued (state {state})")]
    NotQueued {
        proposal_id: ProposalId,
        state: ProposalState,
    },

    #[error("proposal {proposal_id} is not executable before eta {eta} (now {now})")]
    TimelockNotReady {
        proposal_id: ProposalId,
        eta: Timestamp,
        now: Timestamp,
    },

    #[error("action {key} of proposal {proposal_id} is already queued at eta {eta}")]
    ActionAlreadyQueued {
        proposal_id: ProposalId,
        key: TxHash,
        eta: Timestamp,
    },

    #[error("{caller} is neither the proposer nor the guardian of proposal {proposal_id}")]
    OnlyProposerOrGuardian { proposal_id: ProposalId, caller: String },

    #[error("{caller} is not the guardian")]
    NotGuardian { caller: String },

    #[error("proposal {proposal_id} is a child of {parent_id}; address the parent")]
    NotParentProposal {
        proposal_id: ProposalId,
        parent_id: ProposalId,
    },

    #[error("invalid proposal actions: {0}")]
    InvalidActions(String),

    #[error("stake ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("timelock: {0}")]
    Timelock(#[from] TimelockError),

    #[error("vote arithmetic: {0}")]
    Math(#[from] MathError),

    #[error("configuration error: {0}")]
    Config(String),
}
