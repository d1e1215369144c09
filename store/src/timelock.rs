//! Timelock trait.

use crate::TimelockError;
use qv_types::{Action, Timestamp, TxHash};

/// Delay mechanism that defers execution of approved actions.
///
/// Transactions are keyed by `(target, value, signature, calldata, eta)`;
/// see [`TxHash::for_action`].
pub trait Timelock {
    /// Minimum seconds between queueing and execution.
    fn delay(&self) -> u64;

    /// Seconds after `eta` during which a queued transaction stays executable.
    fn grace_period(&self) -> u64;

    /// Whether the `(action, eta)` transaction is currently queued.
    fn is_queued(&self, action: &Action, eta: Timestamp) -> bool;

    /// Queue `action` for execution at `eta`.
    fn queue_transaction(
        &self,
        action: &Action,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<TxHash, TimelockError>;

    /// Drop a queued transaction without executing it.
    fn cancel_transaction(&self, action: &Action, eta: Timestamp) -> Result<(), TimelockError>;

    /// Dispatch a queued transaction to its target, returning the call's
    /// return data.
    fn execute_transaction(
        &self,
        action: &Action,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<Vec<u8>, TimelockError>;
}
