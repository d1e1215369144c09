//! Protocol parameters of the governor.
//!
//! Every field has a serde default so a partial TOML table is enough to
//! configure a deployment.

use crate::amount::whole_tokens;
use crate::ratio::Ratio;
use serde::{Deserialize, Serialize};

/// Refund multipliers keyed by the outcome governing an escrow entry.
///
/// `Defeated` has no entry: stake escrowed on a defeated proposal is always
/// forfeit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundSchedule {
    /// Applied when the governing proposal succeeded (or was later queued
    /// or executed).
    pub succeeded: Ratio,
    /// Applied when the governing proposal was queued but never executed
    /// within the grace period. Falls back to `succeeded` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired: Option<Ratio>,
    /// Applied when the governing proposal beat opposition but missed quorum.
    pub quorum_failed: Ratio,
    /// Applied when the governing proposal was canceled before resolution.
    pub canceled: Ratio,
}

impl RefundSchedule {
    /// Proposer stake: rewarded on adoption, partially penalised otherwise.
    pub const PROPOSER: Self = Self {
        succeeded: Ratio::THREE_HALVES,
        expired: None,
        quorum_failed: Ratio::THREE_QUARTERS,
        canceled: Ratio::THREE_QUARTERS,
    };

    /// Voter stake: returned in full unless the proposal is defeated.
    pub const VOTER: Self = Self {
        succeeded: Ratio::ONE,
        expired: None,
        quorum_failed: Ratio::ONE,
        canceled: Ratio::ONE,
    };

    /// Multiplier for an expired proposal.
    pub fn expired_ratio(&self) -> Ratio {
        self.expired.unwrap_or(self.succeeded)
    }

    pub fn is_valid(&self) -> bool {
        self.succeeded.is_valid()
            && self.expired_ratio().is_valid()
            && self.quorum_failed.is_valid()
            && self.canceled.is_valid()
    }
}

/// All governor parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Minimum quadratic "for" weight for a proposal to succeed.
    /// Default: 632_000_000_000 ≈ √(400 000 tokens in raw units).
    #[serde(default = "default_quorum_votes", with = "crate::serde_u128")]
    pub quorum_votes: u128,

    /// Delegated raw stake a proposer needs, and escrows, to propose.
    /// Default: 100 000 tokens.
    #[serde(default = "default_proposal_threshold", with = "crate::serde_u128")]
    pub proposal_threshold: u128,

    /// Blocks between `propose` and the opening of the voting window.
    #[serde(default = "default_voting_delay_blocks")]
    pub voting_delay_blocks: u64,

    /// Length of the voting window in blocks (~3 days at 15s blocks).
    #[serde(default = "default_voting_period_blocks")]
    pub voting_period_blocks: u64,

    /// Maximum number of actions in one proposal request.
    #[serde(default = "default_max_operations")]
    pub max_operations: usize,

    /// Maximum number of children (attributes) under one parent.
    #[serde(default = "default_max_attributes")]
    pub max_attributes: usize,

    /// Multipliers applied to the proposer's escrowed stake.
    #[serde(default = "default_proposer_refund")]
    pub proposer_refund: RefundSchedule,

    /// Multipliers applied to a voter's escrowed stake.
    #[serde(default = "default_voter_refund")]
    pub voter_refund: RefundSchedule,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_quorum_votes() -> u128 {
    632_000_000_000
}

fn default_proposal_threshold() -> u128 {
    whole_tokens(100_000)
}

fn default_voting_delay_blocks() -> u64 {
    1
}

fn default_voting_period_blocks() -> u64 {
    17_280
}

fn default_max_operations() -> usize {
    10
}

fn default_max_attributes() -> usize {
    10
}

fn default_proposer_refund() -> RefundSchedule {
    RefundSchedule::PROPOSER
}

fn default_voter_refund() -> RefundSchedule {
    RefundSchedule::VOTER
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            quorum_votes: default_quorum_votes(),
            proposal_threshold: default_proposal_threshold(),
            voting_delay_blocks: default_voting_delay_blocks(),
            voting_period_blocks: default_voting_period_blocks(),
            max_operations: default_max_operations(),
            max_attributes: default_max_attributes(),
            proposer_refund: default_proposer_refund(),
            voter_refund: default_voter_refund(),
        }
    }
}

impl GovernanceParams {
    /// Check internal consistency. Returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if self.proposal_threshold == 0 {
            return Err("proposal_threshold must be non-zero".into());
        }
        if self.voting_period_blocks == 0 {
            return Err("voting_period_blocks must be non-zero".into());
        }
        if self.max_operations == 0 {
            return Err("max_operations must be non-zero".into());
        }
        if self.max_attributes < 2 {
            return Err("max_attributes must allow at least two children".into());
        }
        if !self.proposer_refund.is_valid() || !self.voter_refund.is_valid() {
            return Err("refund ratios must have non-zero denominators".into());
        }
        Ok(())
    }
}
