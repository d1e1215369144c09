//! Events emitted by state-mutating governor calls, drained by the host.

use qv_types::{AccountId, ProposalId, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernorEvent {
    ProposalCreated {
        proposal_id: ProposalId,
        proposer: AccountId,
        child_ids: Vec<ProposalId>,
        stake: u128,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: AccountId,
        support: bool,
        raw_votes: u128,
        votes: u128,
    },
    ProposalCanceled {
        proposal_id: ProposalId,
        by: AccountId,
    },
    ProposalQueued {
        proposal_id: ProposalId,
        queued_ids: Vec<ProposalId>,
        eta: Timestamp,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
        executed_ids: Vec<ProposalId>,
    },
    StakeRefunded {
        proposal_id: ProposalId,
        account: AccountId,
        escrowed: u128,
        payout: u128,
    },
    QuorumChanged {
        old: u128,
        new: u128,
    },
    GuardianAbdicated {
        guardian: AccountId,
    },
}
