//! Typed, linearized balance operations over a [`RecordStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::debug;

use crate::economy::errors::EconomyError;
use crate::economy::store::{RecordStore, BALANCE_FIELD};
use crate::types::AccountId;

/// Atomic read/modify/write of the `balance` field of one account.
///
/// Every mutation of a given account runs while holding that account's lock, so
/// the check in [`BalanceStore::take`] and the write that follows are one step.
/// Different accounts never share a lock.
pub struct BalanceStore {
    records: Arc<dyn RecordStore>,
    locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl BalanceStore {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self {
            records,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The record store this view writes through.
    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    fn account_lock(&self, account: &AccountId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(*account)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn with_account<T>(
        &self,
        account: &AccountId,
        op: impl FnOnce(&dyn RecordStore) -> Result<T, EconomyError>,
    ) -> Result<T, EconomyError> {
        let lock = self.account_lock(account);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            op(self.records.as_ref())
        };
        self.release_lock(account, lock);
        result
    }

    /// Drop the table entry once no other caller holds or waits on it.
    fn release_lock(&self, account: &AccountId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = match locks.get(account) {
            // one reference in the table, one here
            Some(current) => Arc::ptr_eq(current, &lock) && Arc::strong_count(&lock) == 2,
            None => false,
        };
        if idle {
            locks.remove(account);
        }
    }

    /// Current balance of `account`.
    pub fn get_balance(&self, account: &AccountId) -> Result<i64, EconomyError> {
        self.records.read(account, BALANCE_FIELD)
    }

    /// Overwrite the balance. Returns the balance it replaced.
    pub fn set_balance(&self, account: &AccountId, value: i64) -> Result<i64, EconomyError> {
        self.with_account(account, |records| {
            let previous = records.read(account, BALANCE_FIELD)?;
            records.write(account, BALANCE_FIELD, value)?;
            debug!(target: "audit", "set {} {} -> {}", account, previous, value);
            Ok(previous)
        })
    }

    /// Credit `amount`. Never fails for sufficiency. Returns the new balance.
    pub fn give(&self, account: &AccountId, amount: i64) -> Result<i64, EconomyError> {
        if amount < 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        self.with_account(account, |records| {
            let balance = records.read(account, BALANCE_FIELD)?;
            let updated = balance
                .checked_add(amount)
                .ok_or(EconomyError::BalanceOverflow(*account))?;
            records.write(account, BALANCE_FIELD, updated)?;
            debug!(target: "audit", "give {} +{} -> {}", account, amount, updated);
            Ok(updated)
        })
    }

    /// Debit `amount` only if the balance covers it. Returns the new balance.
    pub fn take(&self, account: &AccountId, amount: i64) -> Result<i64, EconomyError> {
        if amount < 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        self.with_account(account, |records| {
            let balance = records.read(account, BALANCE_FIELD)?;
            if balance < amount {
                return Err(EconomyError::InsufficientFunds {
                    account: *account,
                    balance,
                    requested: amount,
                });
            }
            let updated = balance - amount;
            records.write(account, BALANCE_FIELD, updated)?;
            debug!(target: "audit", "take {} -{} -> {}", account, amount, updated);
            Ok(updated)
        })
    }
}
