//! Two-level quadratic vote weighting.
//!
//! A voter's weight on a child is `sqrt_int` of the raw stake they put on
//! that child. Their weight on the parent is `sqrt_int` of their *total*
//! raw stake anywhere in the tree, recomputed on every vote. Because the
//! square root is concave, summing per-child weights would reward splitting
//! one stake across many attributes; weighing the total instead keeps the
//! parent-level influence of `R` raw stake at `sqrt_int(R)` however it is
//! spread.
//!
//! The planners here only read the store. They return the receipts to write
//! and the escrow to record so the caller can lock stake first and commit
//! afterwards.

use qv_math::{split_even, sqrt_int, MathError};
use qv_types::{AccountId, ProposalId};

use crate::error::{GovernanceError, RefundIneligibility};
use crate::escrow::{EscrowRole, StakeEscrow};
use crate::proposal::ProposalState;
use crate::store::{ProposalStore, ReceiptUpdate};

/// Stake to record in escrow for one proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowDeposit {
    pub proposal_id: ProposalId,
    pub role: EscrowRole,
    pub amount: u128,
}

/// Everything a single vote or proposal writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VotePlan {
    pub receipts: Vec<ReceiptUpdate>,
    pub deposits: Vec<EscrowDeposit>,
}

impl VotePlan {
    /// Quadratic weight the plan assigns at `id`.
    pub fn weight_at(&self, id: ProposalId) -> u128 {
        self.receipts
            .iter()
            .find(|r| r.proposal_id == id)
            .map(|r| r.votes)
            .unwrap_or(0)
    }

    /// Raw stake the plan locks.
    pub fn locked(&self) -> u128 {
        self.deposits.iter().map(|d| d.amount).sum()
    }
}

/// Receipts granted to the proposer for the stake escrowed at creation.
///
/// With children the stake is split evenly across them (remainder to the
/// last child) and the parent receives an aggregate receipt for the whole
/// amount; without children the parent holds everything.
pub fn plan_proposer_stake(
    parent_id: ProposalId,
    child_ids: &[ProposalId],
    stake: u128,
) -> Result<VotePlan, GovernanceError> {
    spread(parent_id, child_ids, true, stake, EscrowRole::Proposer)
}

/// Validate a vote and compute what it writes.
///
/// The caller is responsible for the lifecycle check (`Active`) and for
/// checking the voter's available stake.
pub fn plan_vote(
    store: &ProposalStore,
    voter: &AccountId,
    proposal_id: ProposalId,
    support: bool,
    raw_votes: u128,
) -> Result<VotePlan, GovernanceError> {
    if raw_votes == 0 {
        return Err(GovernanceError::ZeroVotes);
    }
    let proposal = store.require(proposal_id)?;
    if store.has_voted(proposal_id, voter) {
        return Err(GovernanceError::AlreadyVoted {
            proposal_id,
            voter: voter.to_string(),
        });
    }

    let Some(parent_id) = proposal.parent_id else {
        // A child receipt always comes with a parent aggregate receipt, so
        // this only trips on inconsistent restored state.
        for child in &proposal.child_ids {
            if store.has_voted(*child, voter) {
                return Err(GovernanceError::AlreadyVoted {
                    proposal_id: *child,
                    voter: voter.to_string(),
                });
            }
        }
        return spread(proposal_id, &proposal.child_ids, support, raw_votes, EscrowRole::Voter);
    };

    let cumulative = match store.receipt(parent_id, voter) {
        Some(existing) if existing.has_voted => {
            if existing.support != support {
                return Err(GovernanceError::ConflictingSupport {
                    parent_id,
                    voter: voter.to_string(),
                    existing: existing.support,
                });
            }
            existing
                .raw_votes
                .checked_add(raw_votes)
                .ok_or(MathError::Overflow)?
        }
        _ => raw_votes,
    };

    Ok(VotePlan {
        receipts: vec![
            ReceiptUpdate {
                proposal_id,
                support,
                raw_votes,
                votes: sqrt_int(raw_votes),
            },
            ReceiptUpdate {
                proposal_id: parent_id,
                support,
                raw_votes: cumulative,
                votes: sqrt_int(cumulative),
            },
        ],
        deposits: vec![EscrowDeposit {
            proposal_id,
            role: EscrowRole::Voter,
            amount: raw_votes,
        }],
    })
}

/// Stake a voter pulls back out of a proposal that is still open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalPlan {
    /// Receipts to rewrite with what is left of the voter's stake.
    pub receipts: Vec<ReceiptUpdate>,
    /// Escrow entries returned to the voter in full.
    pub released: Vec<EscrowDeposit>,
    pub total: u128,
}

/// Take `voter`'s stake back out of an open vote on `proposal_id`.
///
/// A child id withdraws the voter's stake on that child and lowers their
/// parent aggregate to what is left in the tree. A parent id withdraws
/// everything the voter has in the tree. Receipts stay on record with no
/// weight and `has_voted` cleared, so the voter may vote again. Proposer
/// escrow never moves before resolution.
pub fn plan_withdrawal(
    store: &ProposalStore,
    escrow: &StakeEscrow,
    voter: &AccountId,
    proposal_id: ProposalId,
) -> Result<WithdrawalPlan, GovernanceError> {
    let proposal = store.require(proposal_id)?;
    let root_id = proposal.root_id();
    let scope = if proposal.is_parent() {
        store.tree_ids(proposal_id)?
    } else {
        vec![proposal_id]
    };

    let mut held = escrow.entries_for(voter, &scope).peekable();
    if held.peek().is_none() {
        return Err(GovernanceError::NotEligibleForRefund {
            proposal_id,
            account: voter.to_string(),
            reason: RefundIneligibility::NoEscrow,
        });
    }
    let released: Vec<EscrowDeposit> = held
        .filter(|e| e.role == EscrowRole::Voter && !e.is_settled())
        .map(|e| EscrowDeposit {
            proposal_id: e.proposal_id,
            role: e.role,
            amount: e.amount,
        })
        .collect();
    if released.is_empty() {
        return Err(GovernanceError::NotEligibleForRefund {
            proposal_id,
            account: voter.to_string(),
            reason: RefundIneligibility::Outcome(ProposalState::Active),
        });
    }

    let mut total = 0u128;
    for entry in &released {
        total = total.checked_add(entry.amount).ok_or(MathError::Overflow)?;
    }

    // Zero shares of a split hold no escrow but still carry a receipt.
    let mut receipts = Vec::new();
    for id in scope.iter().filter(|id| **id != root_id) {
        if let Some(receipt) = store.receipt(*id, voter).filter(|r| r.has_voted) {
            receipts.push(ReceiptUpdate {
                proposal_id: *id,
                support: receipt.support,
                raw_votes: 0,
                votes: 0,
            });
        }
    }
    if let Some(aggregate) = store.receipt(root_id, voter).filter(|r| r.has_voted) {
        let remaining = aggregate
            .raw_votes
            .checked_sub(total)
            .ok_or(MathError::Overflow)?;
        receipts.push(ReceiptUpdate {
            proposal_id: root_id,
            support: aggregate.support,
            raw_votes: remaining,
            votes: sqrt_int(remaining),
        });
    }

    Ok(WithdrawalPlan {
        receipts,
        released,
        total,
    })
}

/// Commit `amount` to a parent: split across its children when it has
/// any, with the full amount weighed at the parent.
fn spread(
    parent_id: ProposalId,
    child_ids: &[ProposalId],
    support: bool,
    amount: u128,
    role: EscrowRole,
) -> Result<VotePlan, GovernanceError> {
    let parent = ReceiptUpdate {
        proposal_id: parent_id,
        support,
        raw_votes: amount,
        votes: sqrt_int(amount),
    };
    if child_ids.is_empty() {
        return Ok(VotePlan {
            receipts: vec![parent],
            deposits: vec![EscrowDeposit {
                proposal_id: parent_id,
                role,
                amount,
            }],
        });
    }

    let shares = split_even(amount, child_ids.len())?;
    let mut receipts = Vec::with_capacity(child_ids.len() + 1);
    let mut deposits = Vec::with_capacity(child_ids.len());
    for (child, share) in child_ids.iter().zip(shares) {
        receipts.push(ReceiptUpdate {
            proposal_id: *child,
            support,
            raw_votes: share,
            votes: sqrt_int(share),
        });
        deposits.push(EscrowDeposit {
            proposal_id: *child,
            role,
            amount: share,
        });
    }
    receipts.push(parent);
    Ok(VotePlan { receipts, deposits })
}
