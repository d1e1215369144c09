//! Tally classification against the quorum rule.

use serde::{Deserialize, Serialize};

/// Outcome of a closed voting window, before any queue / execute bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TallyOutcome {
    /// `against >= for`.
    Defeated,
    /// `for > against` but `for < quorum`.
    QuorumFailed,
    /// `for > against` and `for >= quorum`.
    Succeeded,
}

/// Classify a quadratic tally. Opposition is checked first, so a tie or a
/// majority against is `Defeated` regardless of quorum.
pub fn classify_tally(for_votes: u128, against_votes: u128, quorum_votes: u128) -> TallyOutcome {
    if against_votes >= for_votes {
        TallyOutcome::Defeated
    } else if for_votes < quorum_votes {
        TallyOutcome::QuorumFailed
    } else {
        TallyOutcome::Succeeded
    }
}
