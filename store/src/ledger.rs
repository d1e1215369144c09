//! Stake ledger trait.

use crate::LedgerError;
use qv_types::AccountId;

/// Balance-tracking registry that holds governance stake.
///
/// `lock` moves stake from an account into the governor's custody and
/// `release` pays it back out. Stake held in custody no longer counts toward
/// the account's `current_votes`.
pub trait StakeLedger {
    /// Free (unescrowed) stake held by `account`.
    fn balance_of(&self, account: &AccountId) -> Result<u128, LedgerError>;

    /// Voting power currently delegated to `account`.
    fn current_votes(&self, account: &AccountId) -> Result<u128, LedgerError>;

    /// Move `amount` from `account` into governor custody. Only the
    /// account's own free balance can be locked, never power delegated to it.
    fn lock(&self, account: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Pay `amount` from governor custody to `account`. May exceed what the
    /// account locked when a refund multiplier rewards it.
    fn release(&self, account: &AccountId, amount: u128) -> Result<(), LedgerError>;
}
