//! Proposal lifecycle state, derived from tallies, flags and the clock.

use qv_math::{classify_tally, TallyOutcome};
use qv_types::ChainTime;

use crate::proposal::{Proposal, ProposalState};

/// Classifies proposals. Holds the values resolution depends on that are not
/// stored on the proposal itself.
#[derive(Clone, Copy, Debug)]
pub struct ResolutionEngine {
    pub quorum_votes: u128,
    pub grace_period_secs: u64,
}

impl ResolutionEngine {
    pub fn new(quorum_votes: u128, grace_period_secs: u64) -> Self {
        Self {
            quorum_votes,
            grace_period_secs,
        }
    }

    /// State of one entity at `now`, from its own tally only.
    ///
    /// Checked in order: canceled, voting window, tally, then the
    /// queue / execute bookkeeping of an entity that succeeded.
    pub fn state(&self, proposal: &Proposal, now: ChainTime) -> ProposalState {
        if proposal.canceled {
            return ProposalState::Canceled;
        }
        if now.height < proposal.start_block {
            return ProposalState::Pending;
        }
        if now.height <= proposal.end_block {
            return ProposalState::Active;
        }
        match classify_tally(proposal.for_votes, proposal.against_votes, self.quorum_votes) {
            TallyOutcome::Defeated => return ProposalState::Defeated,
            TallyOutcome::QuorumFailed => return ProposalState::QuorumFailed,
            TallyOutcome::Succeeded => {}
        }
        if !proposal.is_queued() {
            ProposalState::Succeeded
        } else if proposal.executed {
            ProposalState::Executed
        } else if proposal.eta.has_expired(self.grace_period_secs, now.timestamp) {
            ProposalState::Expired
        } else {
            ProposalState::Queued
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qv_types::{AccountId, Action, BlockHeight, Timestamp};

    use crate::proposal::ProposalKind;

    const QUORUM: u128 = 632_000_000_000;
    const GRACE: u64 = 14 * 24 * 3600;

    fn proposal(for_votes: u128, against_votes: u128) -> Proposal {
        Proposal {
            id: 1,
            kind: ProposalKind::Parent,
            parent_id: None,
            child_ids: vec![],
            proposer: AccountId::from("alice"),
            action: Action::new("registry", 0, "noop()", vec![]),
            description: "test".into(),
            raw_for_votes: 0,
            raw_against_votes: 0,
            for_votes,
            against_votes,
            start_block: BlockHeight::new(10),
            end_block: BlockHeight::new(20),
            eta: Timestamp::EPOCH,
            canceled: false,
            executed: false,
            refunded: false,
        }
    }

    fn at(height: u64, secs: u64) -> ChainTime {
        ChainTime::new(height, secs)
    }

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(QUORUM, GRACE)
    }

    #[test]
    fn voting_window_is_inclusive() {
        let p = proposal(QUORUM, 0);
        assert_eq!(engine().state(&p, at(9, 0)), ProposalState::Pending);
        assert_eq!(engine().state(&p, at(10, 0)), ProposalState::Active);
        assert_eq!(engine().state(&p, at(20, 0)), ProposalState::Active);
        assert_eq!(engine().state(&p, at(21, 0)), ProposalState::Succeeded);
    }

    #[test]
    fn quorum_boundary() {
        assert_eq!(
            engine().state(&proposal(QUORUM - 1, 0), at(21, 0)),
            ProposalState::QuorumFailed
        );
        assert_eq!(
            engine().state(&proposal(QUORUM, 0), at(21, 0)),
            ProposalState::Succeeded
        );
        assert_eq!(
            engine().state(&proposal(QUORUM * 2, QUORUM * 2), at(21, 0)),
            ProposalState::Defeated
        );
    }

    #[test]
    fn cancel_wins_over_everything() {
        let mut p = proposal(QUORUM, 0);
        p.canceled = true;
        assert_eq!(engine().state(&p, at(5, 0)), ProposalState::Canceled);
        assert_eq!(engine().state(&p, at(50, 0)), ProposalState::Canceled);
    }

    #[test]
    fn queued_then_expired_or_executed() {
        let mut p = proposal(QUORUM, 0);
        p.eta = Timestamp::new(1_000);
        assert_eq!(engine().state(&p, at(21, 999)), ProposalState::Queued);
        assert_eq!(engine().state(&p, at(21, 1_000 + GRACE - 1)), ProposalState::Queued);
        assert_eq!(engine().state(&p, at(21, 1_000 + GRACE)), ProposalState::Expired);

        p.executed = true;
        assert_eq!(engine().state(&p, at(21, 1_000 + GRACE)), ProposalState::Executed);
    }

    #[test]
    fn a_lost_tally_ignores_queue_bookkeeping() {
        let mut p = proposal(1, 0);
        p.eta = Timestamp::new(1_000);
        assert_eq!(engine().state(&p, at(21, 1_000)), ProposalState::QuorumFailed);
    }
}
