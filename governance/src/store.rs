//! Authoritative record of proposals, receipts and running tallies.

use std::collections::{BTreeMap, HashMap};

use qv_math::MathError;
use qv_types::{AccountId, BlockHeight, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalKind, ProposalRequest, Receipt};

/// Replacement receipt for one voter on one proposal level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptUpdate {
    pub proposal_id: ProposalId,
    pub support: bool,
    pub raw_votes: u128,
    pub votes: u128,
}

/// Proposals and receipts. Records are never deleted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    receipts: HashMap<(ProposalId, AccountId), Receipt>,
    last_id: ProposalId,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of proposals ever created, parents and children alike.
    pub fn count(&self) -> u64 {
        self.last_id
    }

    /// Id the next created proposal will receive.
    pub fn next_id(&self) -> ProposalId {
        self.last_id + 1
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn require(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::UnknownProposal(id))
    }

    pub fn require_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(&id)
            .ok_or(GovernanceError::UnknownProposal(id))
    }

    /// The root and its children, root first.
    pub fn tree_ids(&self, id: ProposalId) -> Result<Vec<ProposalId>, GovernanceError> {
        let root = self.require(self.require(id)?.root_id())?;
        let mut ids = Vec::with_capacity(root.child_ids.len() + 1);
        ids.push(root.id);
        ids.extend_from_slice(&root.child_ids);
        Ok(ids)
    }

    /// Create a parent and its children from a validated request.
    /// Returns the parent id; children take the ids that follow it.
    pub fn create_tree(
        &mut self,
        proposer: &AccountId,
        request: ProposalRequest,
        start_block: BlockHeight,
        end_block: BlockHeight,
    ) -> ProposalId {
        let parent_id = self.next_id();
        let child_count = request.attribute_count() as u64;
        let child_ids: Vec<ProposalId> = (1..=child_count).map(|n| parent_id + n).collect();

        let entries = request.actions.into_iter().zip(request.descriptions);
        for (index, (action, description)) in entries.enumerate() {
            let id = parent_id + index as u64;
            let (kind, parent, children) = if index == 0 {
                (ProposalKind::Parent, None, child_ids.clone())
            } else {
                (ProposalKind::Child, Some(parent_id), Vec::new())
            };
            self.proposals.insert(
                id,
                Proposal {
                    id,
                    kind,
                    parent_id: parent,
                    child_ids: children,
                    proposer: proposer.clone(),
                    action,
                    description,
                    raw_for_votes: 0,
                    raw_against_votes: 0,
                    for_votes: 0,
                    against_votes: 0,
                    start_block,
                    end_block,
                    eta: Timestamp::EPOCH,
                    canceled: false,
                    executed: false,
                    refunded: false,
                },
            );
            self.last_id = id;
        }
        parent_id
    }

    pub fn receipt(&self, id: ProposalId, voter: &AccountId) -> Option<&Receipt> {
        self.receipts.get(&(id, voter.clone()))
    }

    pub fn has_voted(&self, id: ProposalId, voter: &AccountId) -> bool {
        self.receipt(id, voter).is_some_and(|r| r.has_voted)
    }

    /// Replace `voter`'s receipts and move the tallies accordingly.
    ///
    /// The previous receipt's contribution is withdrawn from its side of the
    /// tally before the new one is added, so a recomputed parent aggregate
    /// never double counts. Every new tally is computed before anything is
    /// written; an overflow leaves the store untouched.
    pub fn apply_receipts(
        &mut self,
        voter: &AccountId,
        updates: &[ReceiptUpdate],
    ) -> Result<(), GovernanceError> {
        self.replace_receipts(voter, updates, true)
    }

    /// Like [`apply_receipts`](Self::apply_receipts), for stake taken back
    /// out of an open vote. A receipt left with no raw stake is kept on
    /// record but no longer counts as voted.
    pub fn withdraw_receipts(
        &mut self,
        voter: &AccountId,
        updates: &[ReceiptUpdate],
    ) -> Result<(), GovernanceError> {
        self.replace_receipts(voter, updates, false)
    }

    fn replace_receipts(
        &mut self,
        voter: &AccountId,
        updates: &[ReceiptUpdate],
        keep_voted: bool,
    ) -> Result<(), GovernanceError> {
        let mut staged = Vec::with_capacity(updates.len());
        for update in updates {
            let proposal = self.require(update.proposal_id)?;
            let mut tallies = Tallies::of(proposal);
            if let Some(old) = self.receipt(update.proposal_id, voter) {
                if old.has_voted {
                    tallies.withdraw(old.support, old.raw_votes, old.votes)?;
                }
            }
            tallies.add(update.support, update.raw_votes, update.votes)?;
            staged.push((update, tallies));
        }

        for (update, tallies) in staged {
            let proposal = self.require_mut(update.proposal_id)?;
            tallies.write_to(proposal);
            self.receipts.insert(
                (update.proposal_id, voter.clone()),
                Receipt {
                    has_voted: keep_voted || update.raw_votes > 0,
                    support: update.support,
                    raw_votes: update.raw_votes,
                    votes: update.votes,
                },
            );
        }
        Ok(())
    }

    pub fn save_state(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data)
            .map_err(|e| GovernanceError::Config(format!("corrupt proposal snapshot: {e}")))
    }
}

#[derive(Clone, Copy)]
struct Tallies {
    raw_for: u128,
    raw_against: u128,
    for_votes: u128,
    against_votes: u128,
}

impl Tallies {
    fn of(proposal: &Proposal) -> Self {
        Self {
            raw_for: proposal.raw_for_votes,
            raw_against: proposal.raw_against_votes,
            for_votes: proposal.for_votes,
            against_votes: proposal.against_votes,
        }
    }

    fn side(&mut self, support: bool) -> (&mut u128, &mut u128) {
        if support {
            (&mut self.raw_for, &mut self.for_votes)
        } else {
            (&mut self.raw_against, &mut self.against_votes)
        }
    }

    fn add(&mut self, support: bool, raw: u128, votes: u128) -> Result<(), MathError> {
        let (raw_tally, vote_tally) = self.side(support);
        *raw_tally = raw_tally.checked_add(raw).ok_or(MathError::Overflow)?;
        *vote_tally = vote_tally.checked_add(votes).ok_or(MathError::Overflow)?;
        Ok(())
    }

    fn withdraw(&mut self, support: bool, raw: u128, votes: u128) -> Result<(), MathError> {
        let (raw_tally, vote_tally) = self.side(support);
        *raw_tally = raw_tally.checked_sub(raw).ok_or(MathError::Overflow)?;
        *vote_tally = vote_tally.checked_sub(votes).ok_or(MathError::Overflow)?;
        Ok(())
    }

    fn write_to(self, proposal: &mut Proposal) {
        proposal.raw_for_votes = self.raw_for;
        proposal.raw_against_votes = self.raw_against;
        proposal.for_votes = self.for_votes;
        proposal.against_votes = self.against_votes;
    }
}
