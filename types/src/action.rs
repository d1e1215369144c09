//! Proposal actions: the calls handed to the timelock when a proposal passes.

use crate::address::AccountId;
use serde::{Deserialize, Serialize};

/// One call to an external action target (e.g. the token ledger).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Contract / module that receives the call.
    pub target: AccountId,
    /// Native value forwarded with the call.
    pub value: u128,
    /// Function signature, e.g. `issueOnBehalf(address,uint8,uint256)`.
    /// Empty when `calldata` already carries the selector.
    pub signature: String,
    /// Encoded call arguments.
    pub calldata: Vec<u8>,
}

impl Action {
    pub fn new(
        target: impl Into<AccountId>,
        value: u128,
        signature: impl Into<String>,
        calldata: Vec<u8>,
    ) -> Self {
        Self {
            target: target.into(),
            value,
            signature: signature.into(),
            calldata,
        }
    }
}
