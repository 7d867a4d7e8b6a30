//! Player economy: the account ledger and the money operations built on it.
//!
//! Layers, leaves first:
//! - [`store`] - per-account records (sled or in-memory)
//! - [`balance`] - linearized give/take/set on the `balance` field
//! - [`transactions`] - payments with refund on failure, admin adjustments, notifications
//! - [`commands`] - money command handlers producing player-facing replies

pub mod balance;
pub mod commands;
pub mod errors;
pub mod format;
pub mod store;
pub mod transactions;

pub use balance::BalanceStore;
pub use commands::{MoneyCommand, MoneyCommands};
pub use errors::EconomyError;
pub use format::{describe_error, format_money};
pub use store::{
    AccountRecord, MemoryRecordStore, RecordStore, SledRecordStore, SledRecordStoreBuilder,
    BALANCE_FIELD,
};
pub use transactions::{
    LogNotifier, NotificationSink, PaymentRequest, TransactionCoordinator, Transfer,
};
