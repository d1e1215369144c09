//! Nullable stake ledger: thread-safe in-memory balances for testing.

use qv_store::{LedgerError, StakeLedger};
use qv_types::AccountId;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct LedgerState {
    balances: HashMap<AccountId, u128>,
    /// delegator → delegatee. Accounts without an entry delegate to themselves.
    delegates: HashMap<AccountId, AccountId>,
    /// Stake held by the governor.
    custody: u128,
    /// Stake created to pay refunds that exceeded custody.
    minted: u128,
}

/// An in-memory stake ledger for testing.
///
/// Voting power follows delegation: an account's `current_votes` is the sum
/// of the free balances of every account delegating to it. Escrowed stake sits
/// in a single custody pool; releases beyond the pool are minted.
pub struct NullStakeLedger {
    state: Mutex<LedgerState>,
}

impl NullStakeLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Build a ledger with the given initial balances.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (AccountId, u128)>,
    {
        let ledger = Self::new();
        for (account, amount) in balances {
            ledger.mint(&account, amount);
        }
        ledger
    }

    /// Credit `amount` to `account` out of thin air.
    pub fn mint(&self, account: &AccountId, amount: u128) {
        let mut state = self.state.lock().unwrap();
        *state.balances.entry(account.clone()).or_default() += amount;
    }

    /// Move free stake between accounts.
    pub fn transfer(&self, from: &AccountId, to: &AccountId, amount: u128) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();
        let available = state.balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available,
            });
        }
        state.balances.insert(from.clone(), available - amount);
        *state.balances.entry(to.clone()).or_default() += amount;
        Ok(())
    }

    /// Delegate `from`'s voting power to `to`.
    pub fn delegate(&self, from: &AccountId, to: &AccountId) {
        let mut state = self.state.lock().unwrap();
        if from == to {
            state.delegates.remove(from);
        } else {
            state.delegates.insert(from.clone(), to.clone());
        }
    }

    /// Stake currently held by the governor.
    pub fn custody(&self) -> u128 {
        self.state.lock().unwrap().custody
    }

    /// Stake minted to cover refunds larger than custody.
    pub fn minted(&self) -> u128 {
        self.state.lock().unwrap().minted
    }
}

impl Default for NullStakeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl StakeLedger for NullStakeLedger {
    fn balance_of(&self, account: &AccountId) -> Result<u128, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(account)
            .copied()
            .unwrap_or(0))
    }

    fn current_votes(&self, account: &AccountId) -> Result<u128, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut votes = 0u128;
        for (holder, balance) in &state.balances {
            let delegatee = state.delegates.get(holder).unwrap_or(holder);
            if delegatee == account {
                votes = votes.checked_add(*balance).ok_or(LedgerError::Overflow)?;
            }
        }
        Ok(votes)
    }

    fn lock(&self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut state = self.state.lock().unwrap();
        let available = state.balances.get(account).copied().unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.to_string(),
                needed: amount,
                available,
            });
        }
        state.custody = state.custody.checked_add(amount).ok_or(LedgerError::Overflow)?;
        state.balances.insert(account.clone(), available - amount);
        Ok(())
    }

    fn release(&self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut state = self.state.lock().unwrap();
        let balance = state.balances.get(account).copied().unwrap_or(0);
        let credited = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let from_custody = amount.min(state.custody);
        let shortfall = amount - from_custody;
        state.minted = state.minted.checked_add(shortfall).ok_or(LedgerError::Overflow)?;
        state.custody -= from_custody;
        state.balances.insert(account.clone(), credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountId {
        AccountId::new(name)
    }

    #[test]
    fn votes_follow_delegation() {
        let ledger = NullStakeLedger::with_balances([(acct("a"), 100), (acct("b"), 50)]);
        assert_eq!(ledger.current_votes(&acct("a")).unwrap(), 100);

        ledger.delegate(&acct("b"), &acct("a"));
        assert_eq!(ledger.current_votes(&acct("a")).unwrap(), 150);
        assert_eq!(ledger.current_votes(&acct("b")).unwrap(), 0);

        ledger.delegate(&acct("b"), &acct("b"));
        assert_eq!(ledger.current_votes(&acct("b")).unwrap(), 50);
    }

    #[test]
    fn lock_moves_stake_into_custody() {
        let ledger = NullStakeLedger::with_balances([(acct("a"), 100)]);
        ledger.lock(&acct("a"), 40).unwrap();
        assert_eq!(ledger.balance_of(&acct("a")).unwrap(), 60);
        assert_eq!(ledger.current_votes(&acct("a")).unwrap(), 60);
        assert_eq!(ledger.custody(), 40);
    }

    #[test]
    fn lock_beyond_balance_rejected() {
        let ledger = NullStakeLedger::with_balances([(acct("a"), 10)]);
        let err = ledger.lock(&acct("a"), 11).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { needed: 11, available: 10, .. }));
        assert_eq!(ledger.custody(), 0);
    }

    #[test]
    fn release_beyond_custody_mints() {
        let ledger = NullStakeLedger::with_balances([(acct("a"), 100)]);
        ledger.lock(&acct("a"), 100).unwrap();
        ledger.release(&acct("a"), 150).unwrap();
        assert_eq!(ledger.balance_of(&acct("a")).unwrap(), 150);
        assert_eq!(ledger.custody(), 0);
        assert_eq!(ledger.minted(), 50);
    }

    #[test]
    fn transfer_checks_balance() {
        let ledger = NullStakeLedger::with_balances([(acct("a"), 5)]);
        assert!(ledger.transfer(&acct("a"), &acct("b"), 6).is_err());
        ledger.transfer(&acct("a"), &acct("b"), 5).unwrap();
        assert_eq!(ledger.balance_of(&acct("b")).unwrap(), 5);
    }
}
