//! Multi-account transfers and admin adjustments on top of [`BalanceStore`].
//!
//! A payment is a two-step saga: debit the payer, then credit the recipient.
//! When the credit fails the payer is refunded and the original error is
//! returned. No lock spans both accounts, so an observer may briefly see the
//! payer debited before the refund lands.

use std::sync::Arc;

use log::{error, info, warn};

use crate::economy::balance::BalanceStore;
use crate::economy::errors::EconomyError;
use crate::types::{AccountId, Player};

/// Receives balance-change alerts for players. Delivery is best-effort.
pub trait NotificationSink: Send + Sync {
    fn notify(
        &self,
        account: &AccountId,
        delta: i64,
        counterparty: Option<&str>,
    ) -> anyhow::Result<()>;
}

/// Sink that only writes the alert to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(
        &self,
        account: &AccountId,
        delta: i64,
        counterparty: Option<&str>,
    ) -> anyhow::Result<()> {
        match counterparty {
            Some(name) => info!("notify {}: {:+} from {}", account, delta, name),
            None => info!("notify {}: {:+}", account, delta),
        }
        Ok(())
    }
}

/// Result of a completed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub payer: AccountId,
    pub recipient: AccountId,
    pub amount: i64,
    pub payer_balance: i64,
    pub recipient_balance: i64,
}

/// A prepared request for money. Nothing is moved until the target runs
/// `follow_up` themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub requester: AccountId,
    pub target: AccountId,
    pub amount: i64,
    pub follow_up: String,
}

pub struct TransactionCoordinator {
    balances: Arc<BalanceStore>,
    notifier: Arc<dyn NotificationSink>,
    starting_balance: i64,
}

impl TransactionCoordinator {
    pub fn new(
        balances: Arc<BalanceStore>,
        notifier: Arc<dyn NotificationSink>,
        starting_balance: i64,
    ) -> Self {
        Self {
            balances,
            notifier,
            starting_balance,
        }
    }

    pub fn balances(&self) -> &Arc<BalanceStore> {
        &self.balances
    }

    pub fn starting_balance(&self) -> i64 {
        self.starting_balance
    }

    fn announce(&self, account: &AccountId, delta: i64, counterparty: Option<&str>) {
        if delta == 0 {
            return;
        }
        if let Err(e) = self.notifier.notify(account, delta, counterparty) {
            warn!("balance notification for {} dropped: {}", account, e);
        }
    }

    pub fn balance(&self, account: &AccountId) -> Result<i64, EconomyError> {
        self.balances.get_balance(account)
    }

    /// Move `amount` from `payer` to `recipient`, refunding the payer if the
    /// credit cannot be applied.
    pub fn pay(
        &self,
        payer: &Player,
        recipient: &Player,
        amount: i64,
    ) -> Result<Transfer, EconomyError> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }

        let payer_balance = self.balances.take(&payer.id, amount)?;

        let recipient_balance = match self.balances.give(&recipient.id, amount) {
            Ok(balance) => balance,
            Err(cause) => return Err(self.refund(payer, amount, cause)),
        };

        info!(target: "audit",
            "pay {} -> {} amount {}",
            payer.id, recipient.id, amount
        );
        self.announce(&recipient.id, amount, Some(&payer.name));
        self.announce(&payer.id, -amount, Some(&recipient.name));

        Ok(Transfer {
            payer: payer.id,
            recipient: recipient.id,
            amount,
            payer_balance,
            recipient_balance,
        })
    }

    /// Compensating credit for a payment whose second leg failed. Returns the
    /// error the caller should surface.
    fn refund(&self, payer: &Player, amount: i64, cause: EconomyError) -> EconomyError {
        match self.balances.give(&payer.id, amount) {
            Ok(restored) => {
                warn!(target: "audit",
                    "payment from {} rolled back ({}); balance restored to {}",
                    payer.id, cause, restored
                );
                cause
            }
            Err(compensation) => {
                error!(target: "audit",
                    "payment from {} of {} failed ({}) and refund failed ({}); payer left debited",
                    payer.id, amount, cause, compensation
                );
                EconomyError::CompensationFailed {
                    payer: payer.id,
                    amount,
                    cause: Box::new(cause),
                    compensation: Box::new(compensation),
                }
            }
        }
    }

    /// Operator credit. Returns the new balance.
    pub fn admin_give(&self, target: &AccountId, amount: i64) -> Result<i64, EconomyError> {
        let balance = self.balances.give(target, amount)?;
        self.announce(target, amount, None);
        Ok(balance)
    }

    /// Operator debit. Returns the new balance.
    pub fn admin_take(&self, target: &AccountId, amount: i64) -> Result<i64, EconomyError> {
        let balance = self.balances.take(target, amount)?;
        self.announce(target, -amount, None);
        Ok(balance)
    }

    /// Operator overwrite. Returns the previous balance.
    pub fn admin_set(&self, target: &AccountId, value: i64) -> Result<i64, EconomyError> {
        let previous = self.balances.set_balance(target, value)?;
        self.announce(target, value.saturating_sub(previous), None);
        Ok(previous)
    }

    /// Overwrite with the configured starting balance, whatever the current value.
    pub fn admin_reset(&self, target: &AccountId) -> Result<i64, EconomyError> {
        self.admin_set(target, self.starting_balance)
    }

    /// Prepare the command `target` would run to pay `requester`.
    pub fn request(
        &self,
        requester: &Player,
        target: &AccountId,
        amount: i64,
    ) -> Result<PaymentRequest, EconomyError> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        if !self.balances.records().contains(target)? {
            return Err(EconomyError::NotFound(*target));
        }
        Ok(PaymentRequest {
            requester: requester.id,
            target: *target,
            amount,
            follow_up: format!("/pay {} {}", amount, requester.name),
        })
    }
}
