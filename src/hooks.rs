//! Join-time hooks invoked by the host's event dispatcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::info;

use crate::economy::{EconomyError, RecordStore, BALANCE_FIELD};
use crate::types::Player;

/// Message shown to players refused while ledger maintenance runs.
pub const MAINTENANCE_MESSAGE: &str = "The server is currently updating!";

pub struct ServerHooks {
    records: Arc<dyn RecordStore>,
    starting_balance: i64,
    maintenance: Arc<AtomicUsize>,
}

/// Joins are refused while at least one of these is alive.
pub struct MaintenanceGuard {
    maintenance: Arc<AtomicUsize>,
}

impl Drop for MaintenanceGuard {
    fn drop(&mut self) {
        self.maintenance.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ServerHooks {
    pub fn new(records: Arc<dyn RecordStore>, starting_balance: i64) -> Self {
        Self {
            records,
            starting_balance,
            maintenance: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold joins off until the returned guard is dropped.
    pub fn begin_maintenance(&self) -> MaintenanceGuard {
        self.maintenance.fetch_add(1, Ordering::AcqRel);
        MaintenanceGuard {
            maintenance: Arc::clone(&self.maintenance),
        }
    }

    /// Pre-join check: `false` while maintenance is running.
    pub fn check_join_allowed(&self) -> bool {
        self.maintenance.load(Ordering::Acquire) == 0
    }

    /// Post-connect: make sure the player has a ledger record.
    /// Returns `true` when the record was created by this call.
    pub fn on_player_connected(&self, player: &Player) -> Result<bool, EconomyError> {
        let created = self.records.provision(
            &player.id,
            &player.name,
            &[(BALANCE_FIELD, self.starting_balance)],
        )?;
        if created {
            info!(
                "opened ledger account for {} ({}) with {}",
                player.name, player.id, self.starting_balance
            );
        }
        Ok(created)
    }
}
