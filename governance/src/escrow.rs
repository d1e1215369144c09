//! Stake locked against individual proposals, settled at most once.

use std::collections::BTreeMap;

use qv_types::{AccountId, ProposalId, Ratio};
use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, RefundIneligibility};
use crate::proposal::ProposalState;

/// Who locked the stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowRole {
    Proposer,
    Voter,
}

/// Record of a completed refund.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// State of the governing proposal when the refund was taken.
    pub state: ProposalState,
    pub multiplier: Ratio,
    pub payout: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowEntry {
    pub proposal_id: ProposalId,
    pub account: AccountId,
    pub role: EscrowRole,
    pub amount: u128,
    pub settlement: Option<Settlement>,
}

impl EscrowEntry {
    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }
}

/// Escrow entries keyed by `(proposal, account)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StakeEscrow {
    entries: BTreeMap<(ProposalId, AccountId), EscrowEntry>,
}

impl StakeEscrow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, proposal_id: ProposalId, account: &AccountId) -> Option<&EscrowEntry> {
        self.entries.get(&(proposal_id, account.clone()))
    }

    /// Record freshly locked stake. Zero amounts create no entry.
    ///
    /// An account holds at most one entry per proposal; the receipt checks
    /// upstream guarantee it, so a clash means corrupted bookkeeping.
    pub fn deposit(
        &mut self,
        proposal_id: ProposalId,
        account: &AccountId,
        role: EscrowRole,
        amount: u128,
    ) -> Result<(), GovernanceError> {
        if amount == 0 {
            return Ok(());
        }
        let key = (proposal_id, account.clone());
        if self.entries.contains_key(&key) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id,
                voter: account.to_string(),
            });
        }
        self.entries.insert(
            key,
            EscrowEntry {
                proposal_id,
                account: account.clone(),
                role,
                amount,
                settlement: None,
            },
        );
        Ok(())
    }

    /// Entries of `account` on any of `ids`, in id order.
    pub fn entries_for<'a>(
        &'a self,
        account: &'a AccountId,
        ids: &'a [ProposalId],
    ) -> impl Iterator<Item = &'a EscrowEntry> + 'a {
        ids.iter()
            .filter_map(move |id| self.entries.get(&(*id, account.clone())))
    }

    /// Mark an entry consumed. Settling twice is rejected.
    pub fn settle(
        &mut self,
        proposal_id: ProposalId,
        account: &AccountId,
        settlement: Settlement,
    ) -> Result<(), GovernanceError> {
        let entry = self
            .entries
            .get_mut(&(proposal_id, account.clone()))
            .ok_or(GovernanceError::NotEligibleForRefund {
                proposal_id,
                account: account.to_string(),
                reason: RefundIneligibility::NoEscrow,
            })?;
        if entry.is_settled() {
            return Err(GovernanceError::AlreadyRefunded {
                proposal_id,
                account: account.to_string(),
            });
        }
        entry.settlement = Some(settlement);
        Ok(())
    }

    /// Drop an unsettled entry whose stake went back to its owner before
    /// the proposal resolved. Settled entries stay on record.
    pub fn withdraw(&mut self, proposal_id: ProposalId, account: &AccountId) -> Option<EscrowEntry> {
        let key = (proposal_id, account.clone());
        if self.entries.get(&key)?.is_settled() {
            return None;
        }
        self.entries.remove(&key)
    }

    /// Stake still held against `ids`.
    pub fn outstanding(&self, ids: &[ProposalId]) -> u128 {
        self.entries
            .values()
            .filter(|e| ids.contains(&e.proposal_id) && !e.is_settled())
            .map(|e| e.amount)
            .sum()
    }

    pub fn save_state(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data)
            .map_err(|e| GovernanceError::Config(format!("corrupt escrow snapshot: {e}")))
    }
}
