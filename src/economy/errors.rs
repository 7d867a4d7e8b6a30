use thiserror::Error;

use crate::types::AccountId;

/// Errors that can arise while reading or mutating the account ledger.
#[derive(Debug, Error)]
pub enum EconomyError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No ledger record exists for the account.
    #[error("account not found: {0}")]
    NotFound(AccountId),

    /// The record exists but does not carry the requested field.
    #[error("account {account} has no field '{field}'")]
    MissingField { account: AccountId, field: String },

    /// A take exceeded the account's balance.
    #[error("insufficient funds: {account} holds {balance}, needs {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: i64,
        requested: i64,
    },

    /// Negative (or, for payments, zero) amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// A credit would overflow the balance.
    #[error("balance overflow on account {0}")]
    BalanceOverflow(AccountId),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Permission denied (admin-only command)
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Money commands are switched off in the configuration.
    #[error("the economy is disabled")]
    EconomyDisabled,

    /// The refund after a failed payment credit did not land. The payer is
    /// left debited; this needs operator attention.
    #[error("payment of {amount} from {payer} failed ({cause}) and the refund failed ({compensation})")]
    CompensationFailed {
        payer: AccountId,
        amount: i64,
        cause: Box<EconomyError>,
        compensation: Box<EconomyError>,
    },
}

impl EconomyError {
    /// True for the missing-record condition, looking through a failed compensation.
    pub fn is_not_found(&self) -> bool {
        match self {
            EconomyError::NotFound(_) => true,
            EconomyError::CompensationFailed { cause, .. } => cause.is_not_found(),
            _ => false,
        }
    }
}
