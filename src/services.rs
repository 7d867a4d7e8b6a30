//! Process-wide instances, built once at startup and handed to whoever needs them.

use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::economy::{
    BalanceStore, EconomyError, MoneyCommands, NotificationSink, RecordStore, SledRecordStore,
    TransactionCoordinator,
};
use crate::hooks::ServerHooks;
use crate::shop::{Catalog, SessionRegistry, SignShops, World};

/// Host-provided collaborators.
pub struct Collaborators {
    pub notifier: Arc<dyn NotificationSink>,
    pub catalog: Arc<dyn Catalog>,
    pub world: Arc<dyn World>,
}

pub struct Services {
    pub records: Arc<dyn RecordStore>,
    pub balances: Arc<BalanceStore>,
    pub coordinator: Arc<TransactionCoordinator>,
    pub money: MoneyCommands,
    pub sessions: Arc<SessionRegistry>,
    pub shops: SignShops,
    pub hooks: ServerHooks,
    ledger: Option<Arc<SledRecordStore>>,
}

impl Services {
    /// Open the sled ledger named by `config` and wire everything on top of it.
    pub fn open(config: &Config, collaborators: Collaborators) -> Result<Self, EconomyError> {
        let path = config.storage.ledger_path();
        let ledger = Arc::new(SledRecordStore::open(&path)?);
        info!("ledger opened at {}", path.display());
        let mut services = Self::with_records(config, ledger.clone(), collaborators);
        services.ledger = Some(ledger);
        Ok(services)
    }

    /// Wire the services over an existing record store.
    pub fn with_records(
        config: &Config,
        records: Arc<dyn RecordStore>,
        collaborators: Collaborators,
    ) -> Self {
        let balances = Arc::new(BalanceStore::new(records.clone()));
        let coordinator = Arc::new(TransactionCoordinator::new(
            balances.clone(),
            collaborators.notifier,
            config.economy.starting_balance,
        ));
        let money = MoneyCommands::new(
            coordinator.clone(),
            config.economy.enabled,
            &config.economy.currency_symbol,
        );
        let sessions = Arc::new(SessionRegistry::new());
        let shops = SignShops::new(
            sessions.clone(),
            collaborators.catalog,
            collaborators.world,
            config.shops.clone(),
        );
        let hooks = ServerHooks::new(records.clone(), config.economy.starting_balance);

        Self {
            records,
            balances,
            coordinator,
            money,
            sessions,
            shops,
            hooks,
            ledger: None,
        }
    }

    /// Drop open sign sessions and flush the ledger.
    pub fn shutdown(self) -> Result<(), EconomyError> {
        let open = self.sessions.len();
        if open > 0 {
            info!("discarding {} unfinished sign sessions", open);
        }
        if let Some(ledger) = &self.ledger {
            ledger.flush()?;
        }
        info!("services stopped");
        Ok(())
    }
}
