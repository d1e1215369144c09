//! The governor facade: propose, vote, queue, execute, cancel and refund.
//!
//! Every call validates completely before it touches the stake ledger, and
//! touches the ledger before committing its own bookkeeping, so a rejected
//! call leaves nothing behind. `execute` is the exception in direction: it
//! commits the `executed` flags first and rolls them back if the timelock
//! refuses a dispatch.

use std::collections::HashSet;

use qv_store::{StakeLedger, Timelock};
use qv_types::{AccountId, Action, ChainTime, GovernanceParams, ProposalId, Ratio, Timestamp, TxHash};
use tracing::{debug, info, warn};

use crate::config::GovernorConfig;
use crate::error::{GovernanceError, RefundIneligibility};
use crate::escrow::{EscrowEntry, Settlement, StakeEscrow};
use crate::events::GovernorEvent;
use crate::proposal::{Proposal, ProposalRequest, ProposalState, Receipt};
use crate::refund::{self, PlannedSettlement, RefundEngine, RefundSummary};
use crate::resolution::ResolutionEngine;
use crate::store::ProposalStore;
use crate::voting::{self, VotePlan};

pub struct Governor<L: StakeLedger, T: Timelock> {
    params: GovernanceParams,
    guardian: Option<AccountId>,
    ledger: L,
    timelock: T,
    store: ProposalStore,
    escrow: StakeEscrow,
    pending_events: Vec<GovernorEvent>,
}

impl<L: StakeLedger, T: Timelock> Governor<L, T> {
    pub fn new(config: GovernorConfig, ledger: L, timelock: T) -> Result<Self, GovernanceError> {
        Self::restore(config, ledger, timelock, ProposalStore::new(), StakeEscrow::new())
    }

    /// Resume from persisted proposal and escrow snapshots.
    pub fn restore(
        config: GovernorConfig,
        ledger: L,
        timelock: T,
        store: ProposalStore,
        escrow: StakeEscrow,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;
        Ok(Self {
            params: config.params,
            guardian: config.guardian,
            ledger,
            timelock,
            store,
            escrow,
            pending_events: Vec::new(),
        })
    }

    fn resolution(&self) -> ResolutionEngine {
        ResolutionEngine::new(self.params.quorum_votes, self.timelock.grace_period())
    }

    fn require_parent(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        let proposal = self.store.require(id)?;
        match proposal.parent_id {
            Some(parent_id) => Err(GovernanceError::NotParentProposal {
                proposal_id: id,
                parent_id,
            }),
            None => Ok(proposal),
        }
    }

    /// Stake `account` can commit: its delegated voting power, capped by the
    /// free balance the ledger is able to lock.
    fn lockable_stake(&self, account: &AccountId) -> Result<u128, GovernanceError> {
        let votes = self.ledger.current_votes(account)?;
        let balance = self.ledger.balance_of(account)?;
        Ok(votes.min(balance))
    }

    /// Write a plan whose stake is already locked. On failure the lock is
    /// released again.
    fn commit(&mut self, account: &AccountId, plan: &VotePlan) -> Result<(), GovernanceError> {
        let applied = self
            .store
            .apply_receipts(account, &plan.receipts)
            .and_then(|()| {
                plan.deposits.iter().try_for_each(|d| {
                    self.escrow.deposit(d.proposal_id, account, d.role, d.amount)
                })
            });
        if let Err(e) = applied {
            self.ledger.release(account, plan.locked())?;
            return Err(e);
        }
        Ok(())
    }

    // ── Proposals ──────────────────────────────────────────────────────

    /// Create a proposal tree and escrow the proposer's threshold stake.
    pub fn propose(
        &mut self,
        proposer: &AccountId,
        request: ProposalRequest,
        now: ChainTime,
    ) -> Result<ProposalId, GovernanceError> {
        request.validate(&self.params)?;

        let threshold = self.params.proposal_threshold;
        let have = self.lockable_stake(proposer)?;
        if have < threshold {
            return Err(GovernanceError::BelowThreshold {
                proposer: proposer.to_string(),
                have,
                need: threshold,
            });
        }

        let parent_id = self.store.next_id();
        let child_ids: Vec<ProposalId> = (1..=request.attribute_count() as u64)
            .map(|n| parent_id + n)
            .collect();
        let plan = voting::plan_proposer_stake(parent_id, &child_ids, threshold)?;

        self.ledger.lock(proposer, threshold)?;

        let start = now.height.saturating_add(self.params.voting_delay_blocks);
        let end = start.saturating_add(self.params.voting_period_blocks);
        self.store.create_tree(proposer, request, start, end);
        self.commit(proposer, &plan)?;

        info!(
            proposal_id = parent_id,
            proposer = %proposer,
            children = child_ids.len(),
            start_block = %start,
            end_block = %end,
            "proposal created"
        );
        self.pending_events.push(GovernorEvent::ProposalCreated {
            proposal_id: parent_id,
            proposer: proposer.clone(),
            child_ids,
            stake: threshold,
        });
        Ok(parent_id)
    }

    /// Vote `raw_votes` of stake on a parent (split across its children) or
    /// directly on one child.
    pub fn cast_vote(
        &mut self,
        voter: &AccountId,
        proposal_id: ProposalId,
        support: bool,
        raw_votes: u128,
        now: ChainTime,
    ) -> Result<(), GovernanceError> {
        let state = self.state(proposal_id, now)?;
        if state != ProposalState::Active {
            return Err(GovernanceError::ProposalNotActive { proposal_id, state });
        }

        let plan = voting::plan_vote(&self.store, voter, proposal_id, support, raw_votes)?;

        let available = self.lockable_stake(voter)?;
        if raw_votes > available {
            return Err(GovernanceError::InsufficientStake {
                voter: voter.to_string(),
                available,
                requested: raw_votes,
            });
        }
        self.ledger.lock(voter, raw_votes)?;
        self.commit(voter, &plan)?;

        for update in &plan.receipts {
            debug!(
                proposal_id = update.proposal_id,
                voter = %voter,
                raw_votes = update.raw_votes,
                votes = update.votes,
                "receipt weighted"
            );
        }
        let votes = plan.weight_at(proposal_id);
        info!(proposal_id, voter = %voter, support, raw_votes, votes, "vote cast");
        self.pending_events.push(GovernorEvent::VoteCast {
            proposal_id,
            voter: voter.clone(),
            support,
            raw_votes,
            votes,
        });
        Ok(())
    }

    pub fn state(&self, proposal_id: ProposalId, now: ChainTime) -> Result<ProposalState, GovernanceError> {
        let proposal = self.store.require(proposal_id)?;
        Ok(self.resolution().state(proposal, now))
    }

    /// The voter's receipt, or an empty one if they never voted there.
    pub fn receipt(&self, proposal_id: ProposalId, voter: &AccountId) -> Result<Receipt, GovernanceError> {
        self.store.require(proposal_id)?;
        Ok(self.store.receipt(proposal_id, voter).cloned().unwrap_or_default())
    }

    // ── Timelock ───────────────────────────────────────────────────────

    /// Queue a succeeded parent together with every child that succeeded on
    /// its own tally. Returns the eta.
    pub fn queue(&mut self, proposal_id: ProposalId, now: ChainTime) -> Result<Timestamp, GovernanceError> {
        let resolution = self.resolution();
        let proposal = self.require_parent(proposal_id)?;
        let state = resolution.state(proposal, now);
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::NotSucceeded { proposal_id, state });
        }

        let eta = now.timestamp.saturating_add(self.timelock.delay());
        let mut entities: Vec<(ProposalId, Action)> = vec![(proposal_id, proposal.action.clone())];
        for child_id in &proposal.child_ids {
            let child = self.store.require(*child_id)?;
            if resolution.state(child, now) == ProposalState::Succeeded {
                entities.push((*child_id, child.action.clone()));
            }
        }

        let mut keys = HashSet::new();
        for (id, action) in &entities {
            let key = TxHash::for_action(action, eta);
            if !keys.insert(key) || self.timelock.is_queued(action, eta) {
                return Err(GovernanceError::ActionAlreadyQueued {
                    proposal_id: *id,
                    key,
                    eta,
                });
            }
        }

        for (index, (_, action)) in entities.iter().enumerate() {
            if let Err(e) = self.timelock.queue_transaction(action, eta, now.timestamp) {
                for (id, queued) in &entities[..index] {
                    if let Err(cancel) = self.timelock.cancel_transaction(queued, eta) {
                        warn!(proposal_id, entity = id, error = %cancel, "failed to unqueue action");
                    }
                }
                return Err(e.into());
            }
        }

        let queued_ids: Vec<ProposalId> = entities.iter().map(|(id, _)| *id).collect();
        for id in &queued_ids {
            self.store.require_mut(*id)?.eta = eta;
        }

        info!(proposal_id, queued = queued_ids.len(), eta = %eta, "proposal queued");
        self.pending_events.push(GovernorEvent::ProposalQueued {
            proposal_id,
            queued_ids,
            eta,
        });
        Ok(eta)
    }

    /// Dispatch every queued action of the tree.
    ///
    /// The `executed` flags are set before the first dispatch. If the
    /// timelock rejects a dispatch the flags are cleared again; actions the
    /// timelock already consumed are not dispatched a second time on retry.
    pub fn execute(&mut self, proposal_id: ProposalId, now: ChainTime) -> Result<(), GovernanceError> {
        let proposal = self.require_parent(proposal_id)?;
        let state = self.resolution().state(proposal, now);
        if state != ProposalState::Queued {
            return Err(GovernanceError::NotQueued { proposal_id, state });
        }
        let eta = proposal.eta;
        if now.timestamp < eta {
            return Err(GovernanceError::TimelockNotReady {
                proposal_id,
                eta,
                now: now.timestamp,
            });
        }

        let mut entities = Vec::new();
        for id in self.store.tree_ids(proposal_id)? {
            let entity = self.store.require(id)?;
            if entity.eta == eta && !entity.executed {
                entities.push((id, entity.action.clone()));
            }
        }

        self.set_executed(&entities, true)?;
        for (id, action) in &entities {
            if !self.timelock.is_queued(action, eta) {
                continue;
            }
            if let Err(e) = self.timelock.execute_transaction(action, eta, now.timestamp) {
                warn!(proposal_id, entity = id, error = %e, "dispatch failed, execution rolled back");
                self.set_executed(&entities, false)?;
                return Err(e.into());
            }
        }

        let executed_ids: Vec<ProposalId> = entities.iter().map(|(id, _)| *id).collect();
        info!(proposal_id, executed = executed_ids.len(), "proposal executed");
        self.pending_events.push(GovernorEvent::ProposalExecuted {
            proposal_id,
            executed_ids,
        });
        Ok(())
    }

    fn set_executed(&mut self, entities: &[(ProposalId, Action)], executed: bool) -> Result<(), GovernanceError> {
        for (id, _) in entities {
            self.store.require_mut(*id)?.executed = executed;
        }
        Ok(())
    }

    /// Withdraw an unresolved proposal tree. Proposer or guardian only.
    pub fn cancel(&mut self, caller: &AccountId, proposal_id: ProposalId, now: ChainTime) -> Result<(), GovernanceError> {
        let proposal = self.require_parent(proposal_id)?;
        let state = self.resolution().state(proposal, now);
        if !state.is_unresolved() {
            return Err(GovernanceError::AlreadyResolved { proposal_id, state });
        }
        if &proposal.proposer != caller && self.guardian.as_ref() != Some(caller) {
            warn!(proposal_id, caller = %caller, "cancel rejected");
            return Err(GovernanceError::OnlyProposerOrGuardian {
                proposal_id,
                caller: caller.to_string(),
            });
        }

        for id in self.store.tree_ids(proposal_id)? {
            self.store.require_mut(id)?.canceled = true;
        }
        info!(proposal_id, by = %caller, "proposal canceled");
        self.pending_events.push(GovernorEvent::ProposalCanceled {
            proposal_id,
            by: caller.clone(),
        });
        Ok(())
    }

    // ── Refunds ────────────────────────────────────────────────────────

    /// Release the caller's escrow on `proposal_id` (a child) or across the
    /// whole tree (a parent), scaled by the outcome multiplier.
    ///
    /// While voting is open a voter gets their stake back in full and their
    /// votes are taken out of the tallies; see [`voting::plan_withdrawal`].
    pub fn refund(
        &mut self,
        caller: &AccountId,
        proposal_id: ProposalId,
        now: ChainTime,
    ) -> Result<RefundSummary, GovernanceError> {
        let root_id = self.store.require(proposal_id)?.root_id();
        if self.state(root_id, now)? == ProposalState::Active {
            return self.withdraw(caller, proposal_id);
        }

        let planned = RefundEngine::new(&self.params, self.resolution()).plan(
            &self.store,
            &self.escrow,
            caller,
            proposal_id,
            now,
        );
        let summary = match planned {
            Ok(summary) => summary,
            Err(e) => {
                if let GovernanceError::NotEligibleForRefund {
                    reason: RefundIneligibility::Outcome(ProposalState::Defeated),
                    ..
                } = &e
                {
                    warn!(proposal_id, account = %caller, "refund of forfeited stake rejected");
                }
                return Err(e);
            }
        };

        if summary.total_payout > 0 {
            self.ledger.release(caller, summary.total_payout)?;
        }
        refund::settle(&mut self.store, &mut self.escrow, caller, &summary)?;

        info!(
            proposal_id,
            account = %caller,
            entries = summary.settled.len(),
            escrowed = summary.total_escrowed,
            payout = summary.total_payout,
            "stake refunded"
        );
        self.pending_events.push(GovernorEvent::StakeRefunded {
            proposal_id,
            account: caller.clone(),
            escrowed: summary.total_escrowed,
            payout: summary.total_payout,
        });
        Ok(summary)
    }

    fn withdraw(&mut self, voter: &AccountId, proposal_id: ProposalId) -> Result<RefundSummary, GovernanceError> {
        let plan = voting::plan_withdrawal(&self.store, &self.escrow, voter, proposal_id)?;

        self.ledger.release(voter, plan.total)?;
        self.store.withdraw_receipts(voter, &plan.receipts)?;

        let mut summary = RefundSummary {
            total_escrowed: plan.total,
            total_payout: plan.total,
            ..RefundSummary::default()
        };
        for released in &plan.released {
            self.escrow.withdraw(released.proposal_id, voter);
            summary.settled.push(PlannedSettlement {
                proposal_id: released.proposal_id,
                role: released.role,
                amount: released.amount,
                settlement: Settlement {
                    state: ProposalState::Active,
                    multiplier: Ratio::ONE,
                    payout: released.amount,
                },
            });
        }

        info!(proposal_id, voter = %voter, raw_votes = plan.total, "votes withdrawn");
        self.pending_events.push(GovernorEvent::StakeRefunded {
            proposal_id,
            account: voter.clone(),
            escrowed: plan.total,
            payout: plan.total,
        });
        Ok(summary)
    }

    // ── Guardian ───────────────────────────────────────────────────────

    fn require_guardian(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        if self.guardian.as_ref() == Some(caller) {
            return Ok(());
        }
        warn!(caller = %caller, "guardian-only call rejected");
        Err(GovernanceError::NotGuardian {
            caller: caller.to_string(),
        })
    }

    pub fn set_quorum(&mut self, caller: &AccountId, quorum_votes: u128) -> Result<(), GovernanceError> {
        self.require_guardian(caller)?;
        let old = std::mem::replace(&mut self.params.quorum_votes, quorum_votes);
        info!(old, new = quorum_votes, "quorum changed");
        self.pending_events.push(GovernorEvent::QuorumChanged {
            old,
            new: quorum_votes,
        });
        Ok(())
    }

    /// Give up the guardian role for good.
    pub fn abdicate(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.require_guardian(caller)?;
        self.guardian = None;
        info!(guardian = %caller, "guardian abdicated");
        self.pending_events.push(GovernorEvent::GuardianAbdicated {
            guardian: caller.clone(),
        });
        Ok(())
    }

    // ── Views ──────────────────────────────────────────────────────────

    pub fn proposal(&self, proposal_id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.store.require(proposal_id)
    }

    pub fn actions(&self, proposal_id: ProposalId) -> Result<&Action, GovernanceError> {
        Ok(&self.store.require(proposal_id)?.action)
    }

    pub fn description(&self, proposal_id: ProposalId) -> Result<&str, GovernanceError> {
        Ok(&self.store.require(proposal_id)?.description)
    }

    pub fn children(&self, proposal_id: ProposalId) -> Result<&[ProposalId], GovernanceError> {
        Ok(&self.store.require(proposal_id)?.child_ids)
    }

    pub fn escrow(&self, proposal_id: ProposalId, account: &AccountId) -> Option<&EscrowEntry> {
        self.escrow.entry(proposal_id, account)
    }

    pub fn proposal_count(&self) -> u64 {
        self.store.count()
    }

    pub fn quorum_votes(&self) -> u128 {
        self.params.quorum_votes
    }

    pub fn proposal_threshold(&self) -> u128 {
        self.params.proposal_threshold
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn guardian(&self) -> Option<&AccountId> {
        self.guardian.as_ref()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn timelock(&self) -> &T {
        &self.timelock
    }

    /// Proposal snapshot for persistence, see [`ProposalStore::save_state`].
    pub fn proposal_store(&self) -> &ProposalStore {
        &self.store
    }

    /// Escrow snapshot for persistence, see [`StakeEscrow::save_state`].
    pub fn escrow_book(&self) -> &StakeEscrow {
        &self.escrow
    }

    /// Drain events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GovernorEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
