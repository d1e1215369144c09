//! Nullable timelock: records queued transactions and dispatched calls.

use qv_store::{Timelock, TimelockError};
use qv_types::{AccountId, Action, Timestamp, TxHash};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A call the timelock handed to its target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchedCall {
    pub action: Action,
    pub eta: Timestamp,
    pub executed_at: Timestamp,
}

/// An in-memory timelock for testing.
///
/// Targets registered with [`NullTimelock::fail_target`] revert every call
/// and targets registered with [`NullTimelock::refuse_queue`] cannot be
/// queued, which lets tests exercise the governor's rollback paths.
pub struct NullTimelock {
    delay: u64,
    grace_period: u64,
    queued: Mutex<HashMap<TxHash, (Action, Timestamp)>>,
    dispatched: Mutex<Vec<DispatchedCall>>,
    failing_targets: Mutex<HashSet<AccountId>>,
    refused_targets: Mutex<HashSet<AccountId>>,
}

impl NullTimelock {
    /// Two-day delay, fourteen-day grace period.
    pub const DEFAULT_DELAY_SECS: u64 = 2 * 24 * 3600;
    pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 14 * 24 * 3600;

    pub fn new(delay: u64, grace_period: u64) -> Self {
        Self {
            delay,
            grace_period,
            queued: Mutex::new(HashMap::new()),
            dispatched: Mutex::new(Vec::new()),
            failing_targets: Mutex::new(HashSet::new()),
            refused_targets: Mutex::new(HashSet::new()),
        }
    }

    /// Make every call to `target` revert.
    pub fn fail_target(&self, target: &AccountId) {
        self.failing_targets.lock().unwrap().insert(target.clone());
    }

    /// Let calls to `target` succeed again.
    pub fn heal_target(&self, target: &AccountId) {
        self.failing_targets.lock().unwrap().remove(target);
    }

    /// Refuse to queue any call to `target`.
    pub fn refuse_queue(&self, target: &AccountId) {
        self.refused_targets.lock().unwrap().insert(target.clone());
    }

    /// Number of transactions currently queued.
    pub fn queued_count(&self) -> usize {
        self.queued.lock().unwrap().len()
    }

    /// Every call dispatched so far, in execution order.
    pub fn dispatched(&self) -> Vec<DispatchedCall> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl Default for NullTimelock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY_SECS, Self::DEFAULT_GRACE_PERIOD_SECS)
    }
}

impl Timelock for NullTimelock {
    fn delay(&self) -> u64 {
        self.delay
    }

    fn grace_period(&self) -> u64 {
        self.grace_period
    }

    fn is_queued(&self, action: &Action, eta: Timestamp) -> bool {
        self.queued
            .lock()
            .unwrap()
            .contains_key(&TxHash::for_action(action, eta))
    }

    fn queue_transaction(
        &self,
        action: &Action,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<TxHash, TimelockError> {
        let earliest = now.saturating_add(self.delay);
        if eta < earliest {
            return Err(TimelockError::EtaTooEarly { eta, earliest });
        }
        if self.refused_targets.lock().unwrap().contains(&action.target) {
            return Err(TimelockError::QueueRefused {
                target: action.target.to_string(),
            });
        }
        let key = TxHash::for_action(action, eta);
        let mut queued = self.queued.lock().unwrap();
        if queued.contains_key(&key) {
            return Err(TimelockError::AlreadyQueued(key));
        }
        queued.insert(key, (action.clone(), eta));
        Ok(key)
    }

    fn cancel_transaction(&self, action: &Action, eta: Timestamp) -> Result<(), TimelockError> {
        let key = TxHash::for_action(action, eta);
        self.queued
            .lock()
            .unwrap()
            .remove(&key)
            .map(|_| ())
            .ok_or(TimelockError::NotQueued(key))
    }

    fn execute_transaction(
        &self,
        action: &Action,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<Vec<u8>, TimelockError> {
        let key = TxHash::for_action(action, eta);
        let mut queued = self.queued.lock().unwrap();
        if !queued.contains_key(&key) {
            return Err(TimelockError::NotQueued(key));
        }
        if now < eta {
            return Err(TimelockError::NotReady { eta, now });
        }
        if eta.has_expired(self.grace_period, now) {
            return Err(TimelockError::Stale { eta, now });
        }
        if self.failing_targets.lock().unwrap().contains(&action.target) {
            return Err(TimelockError::ExecutionReverted {
                target: action.target.to_string(),
                reason: "target rejected call".to_string(),
            });
        }
        queued.remove(&key);
        self.dispatched.lock().unwrap().push(DispatchedCall {
            action: action.clone(),
            eta,
            executed_at: now,
        });
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action() -> Action {
        Action::new("token-ledger", 0, "issue(address,uint256)", vec![0xab])
    }

    #[test]
    fn queue_requires_delay() {
        let timelock = NullTimelock::new(100, 1000);
        let err = timelock
            .queue_transaction(&action(), Timestamp::new(150), Timestamp::new(100))
            .unwrap_err();
        assert_eq!(
            err,
            TimelockError::EtaTooEarly {
                eta: Timestamp::new(150),
                earliest: Timestamp::new(200)
            }
        );
    }

    #[test]
    fn duplicate_queue_rejected() {
        let timelock = NullTimelock::new(0, 1000);
        let eta = Timestamp::new(10);
        timelock.queue_transaction(&action(), eta, Timestamp::new(10)).unwrap();
        assert!(matches!(
            timelock.queue_transaction(&action(), eta, Timestamp::new(10)),
            Err(TimelockError::AlreadyQueued(_))
        ));
    }

    #[test]
    fn execute_window() {
        let timelock = NullTimelock::new(10, 100);
        let eta = Timestamp::new(20);
        timelock.queue_transaction(&action(), eta, Timestamp::new(10)).unwrap();

        assert!(matches!(
            timelock.execute_transaction(&action(), eta, Timestamp::new(19)),
            Err(TimelockError::NotReady { .. })
        ));
        assert!(matches!(
            timelock.execute_transaction(&action(), eta, Timestamp::new(120)),
            Err(TimelockError::Stale { .. })
        ));
        timelock.execute_transaction(&action(), eta, Timestamp::new(20)).unwrap();
        assert_eq!(timelock.dispatched().len(), 1);
        assert!(!timelock.is_queued(&action(), eta));
    }

    #[test]
    fn failing_target_keeps_transaction_queued() {
        let timelock = NullTimelock::new(0, 100);
        let eta = Timestamp::new(5);
        timelock.queue_transaction(&action(), eta, Timestamp::new(5)).unwrap();
        timelock.fail_target(&action().target);
        assert!(matches!(
            timelock.execute_transaction(&action(), eta, Timestamp::new(5)),
            Err(TimelockError::ExecutionReverted { .. })
        ));
        assert!(timelock.is_queued(&action(), eta));

        timelock.heal_target(&action().target);
        timelock.execute_transaction(&action(), eta, Timestamp::new(5)).unwrap();
    }

    #[test]
    fn refused_target_is_never_queued() {
        let timelock = NullTimelock::new(0, 100);
        timelock.refuse_queue(&action().target);
        assert!(matches!(
            timelock.queue_transaction(&action(), Timestamp::new(5), Timestamp::new(5)),
            Err(TimelockError::QueueRefused { .. })
        ));
        assert_eq!(timelock.queued_count(), 0);
    }
}
