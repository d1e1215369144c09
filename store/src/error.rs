use qv_types::{Timestamp, TxHash};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account {account} has insufficient stake: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in stake ledger")]
    Overflow,

    #[error("stake ledger backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelockError {
    #[error("transaction {0} is already queued")]
    AlreadyQueued(TxHash),

    #[error("transaction {0} is not queued")]
    NotQueued(TxHash),

    #[error("eta {eta} must be at least {earliest}")]
    EtaTooEarly { eta: Timestamp, earliest: Timestamp },

    #[error("transaction has not surpassed its time lock: eta {eta}, now {now}")]
    NotReady { eta: Timestamp, now: Timestamp },

    #[error("transaction is stale: eta {eta} plus grace period passed at {now}")]
    Stale { eta: Timestamp, now: Timestamp },

    #[error("timelock refused to queue call to {target}")]
    QueueRefused { target: String },

    #[error("call to {target} reverted: {reason}")]
    ExecutionReverted { target: String, reason: String },
}
