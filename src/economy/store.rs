//! Per-account record storage.
//!
//! The ledger never owns account records; they are created by the join hook and
//! otherwise only read and overwritten field by field. [`RecordStore`] is that
//! contract, [`SledRecordStore`] the durable implementation and
//! [`MemoryRecordStore`] an in-process one for embedding and tests.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::IVec;

use crate::economy::errors::EconomyError;
use crate::types::AccountId;

/// Field name of the balance inside an account record.
pub const BALANCE_FIELD: &str = "balance";

pub const ACCOUNT_SCHEMA_VERSION: u8 = 1;

const TREE_ACCOUNTS: &str = "ledger_accounts";

/// Stored shape of one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub schema_version: u8,
    pub id: AccountId,
    pub name: String,
    pub fields: BTreeMap<String, i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn new(id: AccountId, name: &str, fields: &[(&str, i64)]) -> Self {
        let now = Utc::now();
        Self {
            schema_version: ACCOUNT_SCHEMA_VERSION,
            id,
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|(field, value)| (field.to_string(), *value))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn field(&self, field: &str) -> Result<i64, EconomyError> {
        self.fields
            .get(field)
            .copied()
            .ok_or_else(|| EconomyError::MissingField {
                account: self.id,
                field: field.to_string(),
            })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Key/value view of account records.
///
/// `write` is an unconditional overwrite of one field; atomic read-modify-write
/// sequences are the caller's job (see [`crate::economy::BalanceStore`]).
pub trait RecordStore: Send + Sync {
    /// Read one integer field. `NotFound` when the account has no record.
    fn read(&self, account: &AccountId, field: &str) -> Result<i64, EconomyError>;

    /// Overwrite one integer field. `NotFound` when the account has no record.
    fn write(&self, account: &AccountId, field: &str, value: i64) -> Result<(), EconomyError>;

    /// Create the record if it is absent. Returns `true` when a record was created.
    fn provision(
        &self,
        account: &AccountId,
        name: &str,
        fields: &[(&str, i64)],
    ) -> Result<bool, EconomyError>;

    fn contains(&self, account: &AccountId) -> Result<bool, EconomyError>;
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct SledRecordStoreBuilder {
    path: PathBuf,
}

impl SledRecordStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<SledRecordStore, EconomyError> {
        SledRecordStore::open(self.path)
    }
}

/// Sled-backed account records, one bincode value per account.
pub struct SledRecordStore {
    db: sled::Db,
    accounts: sled::Tree,
}

impl SledRecordStore {
    /// Open (or create) the ledger rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EconomyError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let accounts = db.open_tree(TREE_ACCOUNTS)?;
        Ok(Self { db, accounts })
    }

    fn account_key(account: &AccountId) -> Vec<u8> {
        format!("accounts:{}", account).into_bytes()
    }

    fn serialize(record: &AccountRecord) -> Result<Vec<u8>, EconomyError> {
        Ok(bincode::serialize(record)?)
    }

    fn deserialize(bytes: &IVec) -> Result<AccountRecord, EconomyError> {
        let record: AccountRecord = bincode::deserialize(bytes)?;
        if record.schema_version != ACCOUNT_SCHEMA_VERSION {
            return Err(EconomyError::SchemaMismatch {
                entity: "account",
                expected: ACCOUNT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// Fetch a whole account record.
    pub fn get_account(&self, account: &AccountId) -> Result<AccountRecord, EconomyError> {
        let Some(bytes) = self.accounts.get(Self::account_key(account))? else {
            return Err(EconomyError::NotFound(*account));
        };
        Self::deserialize(&bytes)
    }

    /// List every stored account.
    pub fn list_accounts(&self) -> Result<Vec<AccountRecord>, EconomyError> {
        let mut records = Vec::new();
        for entry in self.accounts.scan_prefix(b"accounts:") {
            let (_, value) = entry?;
            records.push(Self::deserialize(&value)?);
        }
        Ok(records)
    }

    /// Flush outstanding writes to disk.
    pub fn flush(&self) -> Result<(), EconomyError> {
        self.db.flush()?;
        Ok(())
    }
}

impl RecordStore for SledRecordStore {
    fn read(&self, account: &AccountId, field: &str) -> Result<i64, EconomyError> {
        self.get_account(account)?.field(field)
    }

    fn write(&self, account: &AccountId, field: &str, value: i64) -> Result<(), EconomyError> {
        let key = Self::account_key(account);
        // Swap loop so a concurrent provision or write to another field is never clobbered.
        loop {
            let Some(current) = self.accounts.get(&key)? else {
                return Err(EconomyError::NotFound(*account));
            };
            let mut record = Self::deserialize(&current)?;
            record.fields.insert(field.to_string(), value);
            record.touch();
            let bytes = Self::serialize(&record)?;
            if self
                .accounts
                .compare_and_swap(&key, Some(current), Some(bytes))?
                .is_ok()
            {
                self.accounts.flush()?;
                return Ok(());
            }
        }
    }

    fn provision(
        &self,
        account: &AccountId,
        name: &str,
        fields: &[(&str, i64)],
    ) -> Result<bool, EconomyError> {
        let record = AccountRecord::new(*account, name, fields);
        let bytes = Self::serialize(&record)?;
        let created = self
            .accounts
            .compare_and_swap(Self::account_key(account), None as Option<&[u8]>, Some(bytes))?
            .is_ok();
        if created {
            self.accounts.flush()?;
        }
        Ok(created)
    }

    fn contains(&self, account: &AccountId) -> Result<bool, EconomyError> {
        Ok(self.accounts.contains_key(Self::account_key(account))?)
    }
}

/// In-process account records.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<AccountId, AccountRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_account(&self, account: &AccountId) -> Option<AccountRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account)
            .cloned()
    }
}

impl RecordStore for MemoryRecordStore {
    fn read(&self, account: &AccountId, field: &str) -> Result<i64, EconomyError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .get(account)
            .ok_or(EconomyError::NotFound(*account))?
            .field(field)
    }

    fn write(&self, account: &AccountId, field: &str, value: i64) -> Result<(), EconomyError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .get_mut(account)
            .ok_or(EconomyError::NotFound(*account))?;
        record.fields.insert(field.to_string(), value);
        record.touch();
        Ok(())
    }

    fn provision(
        &self,
        account: &AccountId,
        name: &str,
        fields: &[(&str, i64)],
    ) -> Result<bool, EconomyError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(account) {
            return Ok(false);
        }
        records.insert(*account, AccountRecord::new(*account, name, fields));
        Ok(true)
    }

    fn contains(&self, account: &AccountId) -> Result<bool, EconomyError> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(account))
    }
}
