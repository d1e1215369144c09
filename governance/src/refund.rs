//! Outcome-contingent stake settlement.
//!
//! | Governing state                          | Proposer | Voter |
//! |------------------------------------------|----------|-------|
//! | Succeeded / Queued / Executed            | 3/2      | 1/1   |
//! | Expired                                  | 3/2      | 1/1   |
//! | QuorumFailed                             | 3/4      | 1/1   |
//! | Canceled                                 | 3/4      | 1/1   |
//! | Defeated                                 | forfeit  | forfeit |
//!
//! Multipliers come from [`GovernanceParams`]; the table shows the defaults.
//! An unset `expired` ratio follows `succeeded`.
//! Proposer escrow follows the root parent's state, voter escrow follows the
//! state of the proposal it was locked on.

use qv_math::{apply_ratio, MathError};
use qv_types::{AccountId, ChainTime, GovernanceParams, ProposalId, Ratio, RefundSchedule};

use crate::error::{GovernanceError, RefundIneligibility};
use crate::escrow::{EscrowRole, Settlement, StakeEscrow};
use crate::proposal::ProposalState;
use crate::resolution::ResolutionEngine;
use crate::store::ProposalStore;

/// One escrow entry the refund will settle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedSettlement {
    pub proposal_id: ProposalId,
    pub role: EscrowRole,
    pub amount: u128,
    pub settlement: Settlement,
}

/// Result of a successful `refund` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefundSummary {
    pub settled: Vec<PlannedSettlement>,
    /// Entries left unsettled because their governing proposal is not
    /// refundable (forfeit or unresolved).
    pub skipped: Vec<(ProposalId, ProposalState)>,
    pub total_escrowed: u128,
    pub total_payout: u128,
}

pub struct RefundEngine<'a> {
    params: &'a GovernanceParams,
    resolution: ResolutionEngine,
}

impl<'a> RefundEngine<'a> {
    pub fn new(params: &'a GovernanceParams, resolution: ResolutionEngine) -> Self {
        Self { params, resolution }
    }

    fn schedule(&self, role: EscrowRole) -> &RefundSchedule {
        match role {
            EscrowRole::Proposer => &self.params.proposer_refund,
            EscrowRole::Voter => &self.params.voter_refund,
        }
    }

    /// Multiplier for escrow held in `role` under `state`, or `None` when the
    /// stake cannot be released.
    pub fn multiplier(&self, role: EscrowRole, state: ProposalState) -> Option<Ratio> {
        let schedule = self.schedule(role);
        match state {
            ProposalState::Expired => Some(schedule.expired_ratio()),
            s if s.has_succeeded() => Some(schedule.succeeded),
            ProposalState::QuorumFailed => Some(schedule.quorum_failed),
            ProposalState::Canceled => Some(schedule.canceled),
            _ => None,
        }
    }

    /// Work out what `caller` receives for a refund on `proposal_id`.
    ///
    /// A child id covers the caller's entry on that child. A parent id
    /// sweeps every unsettled entry of the caller across the tree. Reads
    /// only; the caller commits with [`settle`].
    pub fn plan(
        &self,
        store: &ProposalStore,
        escrow: &StakeEscrow,
        caller: &AccountId,
        proposal_id: ProposalId,
        now: ChainTime,
    ) -> Result<RefundSummary, GovernanceError> {
        let proposal = store.require(proposal_id)?;
        let ids = if proposal.is_parent() {
            store.tree_ids(proposal_id)?
        } else {
            vec![proposal_id]
        };
        let root = store.require(proposal.root_id())?;
        let root_state = self.resolution.state(root, now);

        let entries: Vec<_> = escrow.entries_for(caller, &ids).collect();
        if entries.is_empty() {
            return Err(GovernanceError::NotEligibleForRefund {
                proposal_id,
                account: caller.to_string(),
                reason: RefundIneligibility::NoEscrow,
            });
        }
        if entries.iter().all(|e| e.is_settled()) {
            return Err(GovernanceError::AlreadyRefunded {
                proposal_id,
                account: caller.to_string(),
            });
        }

        let mut summary = RefundSummary::default();
        for entry in entries.into_iter().filter(|e| !e.is_settled()) {
            let state = match entry.role {
                EscrowRole::Proposer => root_state,
                EscrowRole::Voter => self.resolution.state(store.require(entry.proposal_id)?, now),
            };
            let Some(multiplier) = self.multiplier(entry.role, state) else {
                summary.skipped.push((entry.proposal_id, state));
                continue;
            };
            let payout = apply_ratio(entry.amount, multiplier)?;
            summary.total_escrowed = summary.total_escrowed.saturating_add(entry.amount);
            summary.total_payout = summary
                .total_payout
                .checked_add(payout)
                .ok_or(MathError::Overflow)?;
            summary.settled.push(PlannedSettlement {
                proposal_id: entry.proposal_id,
                role: entry.role,
                amount: entry.amount,
                settlement: Settlement {
                    state,
                    multiplier,
                    payout,
                },
            });
        }

        if summary.settled.is_empty() {
            let state = summary
                .skipped
                .first()
                .map(|(_, state)| *state)
                .unwrap_or(root_state);
            return Err(GovernanceError::NotEligibleForRefund {
                proposal_id,
                account: caller.to_string(),
                reason: RefundIneligibility::Outcome(state),
            });
        }
        Ok(summary)
    }
}

/// Mark every planned entry settled and flag proposer escrow on the store.
pub fn settle(
    store: &mut ProposalStore,
    escrow: &mut StakeEscrow,
    caller: &AccountId,
    summary: &RefundSummary,
) -> Result<(), GovernanceError> {
    for planned in &summary.settled {
        escrow.settle(planned.proposal_id, caller, planned.settlement)?;
        if planned.role == EscrowRole::Proposer {
            store.require_mut(planned.proposal_id)?.refunded = true;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(params: &GovernanceParams) -> RefundEngine<'_> {
        RefundEngine::new(params, ResolutionEngine::new(params.quorum_votes, 0))
    }

    #[test]
    fn default_proposer_multipliers() {
        let params = GovernanceParams::default();
        let engine = engine(&params);
        assert_eq!(
            engine.multiplier(EscrowRole::Proposer, ProposalState::Executed),
            Some(Ratio::THREE_HALVES)
        );
        assert_eq!(
            engine.multiplier(EscrowRole::Proposer, ProposalState::QuorumFailed),
            Some(Ratio::THREE_QUARTERS)
        );
        assert_eq!(
            engine.multiplier(EscrowRole::Proposer, ProposalState::Canceled),
            Some(Ratio::THREE_QUARTERS)
        );
        assert_eq!(engine.multiplier(EscrowRole::Proposer, ProposalState::Defeated), None);
        assert_eq!(engine.multiplier(EscrowRole::Proposer, ProposalState::Active), None);
    }

    #[test]
    fn voters_get_their_stake_back_by_default() {
        let params = GovernanceParams::default();
        let engine = engine(&params);
        assert_eq!(
            engine.multiplier(EscrowRole::Voter, ProposalState::Succeeded),
            Some(Ratio::ONE)
        );
        assert_eq!(
            engine.multiplier(EscrowRole::Voter, ProposalState::QuorumFailed),
            Some(Ratio::ONE)
        );
        assert_eq!(engine.multiplier(EscrowRole::Voter, ProposalState::Defeated), None);
    }

    #[test]
    fn expired_multiplier_is_configurable() {
        let mut params = GovernanceParams::default();
        assert_eq!(
            engine(&params).multiplier(EscrowRole::Proposer, ProposalState::Expired),
            Some(Ratio::THREE_HALVES)
        );

        params.proposer_refund.expired = Some(Ratio::THREE_QUARTERS);
        let engine = engine(&params);
        assert_eq!(
            engine.multiplier(EscrowRole::Proposer, ProposalState::Expired),
            Some(Ratio::THREE_QUARTERS)
        );
        assert_eq!(
            engine.multiplier(EscrowRole::Proposer, ProposalState::Executed),
            Some(Ratio::THREE_HALVES)
        );
    }

    #[test]
    fn voter_policy_is_configurable() {
        let mut params = GovernanceParams::default();
        params.voter_refund.quorum_failed = Ratio::new(1, 2);
        let engine = engine(&params);
        assert_eq!(
            engine.multiplier(EscrowRole::Voter, ProposalState::QuorumFailed),
            Some(Ratio::new(1, 2))
        );
    }
}
