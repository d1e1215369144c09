//! Proposals, voter receipts and the lifecycle states.

use std::fmt;

use qv_types::{AccountId, Action, BlockHeight, GovernanceParams, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Whether a proposal is a top-level submission or one attribute of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalKind {
    Parent,
    Child,
}

/// Lifecycle state, derived on demand from tallies, flags and the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created, voting window not yet open.
    Pending,
    /// Voting window open.
    Active,
    /// Withdrawn by the proposer or the guardian before resolution.
    Canceled,
    /// `against >= for` once the window closed.
    Defeated,
    /// More for than against, but the for tally missed quorum.
    QuorumFailed,
    /// More for than against and quorum met.
    Succeeded,
    /// Handed to the timelock and waiting for its eta.
    Queued,
    /// Queued but not executed within the timelock's grace period.
    Expired,
    /// Actions dispatched.
    Executed,
}

impl ProposalState {
    /// Whether the entity reached a positive outcome, including everything
    /// that follows `Succeeded` in the lifecycle.
    pub fn has_succeeded(&self) -> bool {
        matches!(
            self,
            ProposalState::Succeeded
                | ProposalState::Queued
                | ProposalState::Executed
                | ProposalState::Expired
        )
    }

    /// Whether votes and cancellation are still possible.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ProposalState::Pending | ProposalState::Active)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalState::Pending => "Pending",
            ProposalState::Active => "Active",
            ProposalState::Canceled => "Canceled",
            ProposalState::Defeated => "Defeated",
            ProposalState::QuorumFailed => "QuorumFailed",
            ProposalState::Succeeded => "Succeeded",
            ProposalState::Queued => "Queued",
            ProposalState::Expired => "Expired",
            ProposalState::Executed => "Executed",
        };
        f.write_str(name)
    }
}

/// A parent or child proposal with its running tallies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub kind: ProposalKind,
    /// Set for children only.
    pub parent_id: Option<ProposalId>,
    /// Fixed at creation. Empty for children and single proposals.
    pub child_ids: Vec<ProposalId>,
    pub proposer: AccountId,
    /// Dispatched through the timelock if this entity is approved.
    pub action: Action,
    pub description: String,
    /// Linear sums of raw stake at this level.
    pub raw_for_votes: u128,
    pub raw_against_votes: u128,
    /// Sums of per-voter quadratic weights at this level.
    pub for_votes: u128,
    pub against_votes: u128,
    pub start_block: BlockHeight,
    pub end_block: BlockHeight,
    /// Earliest execution time. `Timestamp::EPOCH` until queued.
    pub eta: Timestamp,
    pub canceled: bool,
    pub executed: bool,
    /// The proposer's escrow on this entity has been settled.
    pub refunded: bool,
}

impl Proposal {
    pub fn is_parent(&self) -> bool {
        self.kind == ProposalKind::Parent
    }

    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }

    /// The tree root: the parent for a child, the proposal itself otherwise.
    pub fn root_id(&self) -> ProposalId {
        self.parent_id.unwrap_or(self.id)
    }

    pub fn is_queued(&self) -> bool {
        !self.eta.is_epoch()
    }
}

/// One voter's record on one proposal level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: bool,
    /// Raw stake attributed to the voter at this level.
    pub raw_votes: u128,
    /// Quadratic weight attributed to the voter at this level.
    pub votes: u128,
}

/// Flat encoding of a `propose` call.
///
/// Index 0 is the parent entry. A request of length 1 is a single proposal;
/// a request of length `N + 1` with `N >= 2` creates a parent and `N`
/// children from indices `1..=N`.
///
/// A request of length 2 (one attribute) is rejected rather than silently
/// dropping the lone child: a single attribute is expressed as a single
/// proposal carrying that action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub actions: Vec<Action>,
    pub descriptions: Vec<String>,
}

impl ProposalRequest {
    /// A proposal without attributes.
    pub fn single(action: Action, description: impl Into<String>) -> Self {
        Self {
            actions: vec![action],
            descriptions: vec![description.into()],
        }
    }

    /// A parent carrying `parent_action` plus one child per attribute.
    pub fn with_attributes<I, S>(parent_action: Action, parent_description: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (Action, S)>,
        S: Into<String>,
    {
        let mut request = Self::single(parent_action, parent_description);
        for (action, description) in attributes {
            request.actions.push(action);
            request.descriptions.push(description.into());
        }
        request
    }

    /// Number of children the request creates.
    pub fn attribute_count(&self) -> usize {
        self.actions.len().saturating_sub(1)
    }

    /// Check the request shape against the configured limits.
    pub fn validate(&self, params: &GovernanceParams) -> Result<(), GovernanceError> {
        if self.actions.is_empty() {
            return Err(GovernanceError::InvalidActions("no actions supplied".into()));
        }
        if self.actions.len() != self.descriptions.len() {
            return Err(GovernanceError::InvalidActions(format!(
                "{} actions but {} descriptions",
                self.actions.len(),
                self.descriptions.len()
            )));
        }
        if self.actions.len() > params.max_operations {
            return Err(GovernanceError::InvalidActions(format!(
                "{} actions exceed the limit of {}",
                self.actions.len(),
                params.max_operations
            )));
        }
        match self.attribute_count() {
            0 => Ok(()),
            1 => Err(GovernanceError::InvalidActions(
                "a parent needs at least two attributes; submit a single attribute as a single proposal".into(),
            )),
            n if n > params.max_attributes => Err(GovernanceError::InvalidActions(format!(
                "{n} attributes exceed the limit of {}",
                params.max_attributes
            ))),
            _ => Ok(()),
        }
    }
}
