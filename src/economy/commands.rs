//! Money command handlers.
//!
//! Argument parsing belongs to the host's command tree; these handlers receive an
//! already-resolved [`MoneyCommand`] plus the invoking player and return the
//! reply line for that player.

use std::sync::Arc;

use log::debug;

use crate::economy::errors::EconomyError;
use crate::economy::format::format_money;
use crate::economy::transactions::TransactionCoordinator;
use crate::types::Player;

/// Money commands by verb
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyCommand {
    Balance,                                  // money
    Pay { amount: i64, target: Player },      // pay <amount> <player>
    Request { amount: i64, target: Player },  // money request <amount> <player>

    // Operator only
    Give { amount: i64, target: Player },     // money give <amount> <player>
    Take { amount: i64, target: Player },     // money take <amount> <player>
    Set { amount: i64, target: Player },      // money set <amount> <player>
    Reset { target: Player },                 // money reset <player>
}

impl MoneyCommand {
    pub fn requires_privilege(&self) -> bool {
        matches!(
            self,
            MoneyCommand::Give { .. }
                | MoneyCommand::Take { .. }
                | MoneyCommand::Set { .. }
                | MoneyCommand::Reset { .. }
        )
    }
}

pub struct MoneyCommands {
    coordinator: Arc<TransactionCoordinator>,
    enabled: bool,
    symbol: String,
}

impl MoneyCommands {
    pub fn new(coordinator: Arc<TransactionCoordinator>, enabled: bool, symbol: &str) -> Self {
        Self {
            coordinator,
            enabled,
            symbol: symbol.to_string(),
        }
    }

    fn money(&self, amount: i64) -> String {
        format_money(amount, &self.symbol)
    }

    /// Run `command` for `actor`. Errors are rendered with
    /// [`crate::economy::describe_error`] by the caller.
    pub fn execute(&self, actor: &Player, command: MoneyCommand) -> Result<String, EconomyError> {
        if !self.enabled {
            return Err(EconomyError::EconomyDisabled);
        }
        if command.requires_privilege() && !actor.privileged {
            return Err(EconomyError::PermissionDenied(format!("{:?}", command)));
        }
        debug!("money command from {}: {:?}", actor.name, command);

        match command {
            MoneyCommand::Balance => {
                let balance = self.coordinator.balance(&actor.id)?;
                Ok(format!("You have {}.", self.money(balance)))
            }
            MoneyCommand::Pay { amount, target } => {
                self.coordinator.pay(actor, &target, amount)?;
                Ok(format!("Sent {} to {}.", self.money(amount), target.name))
            }
            MoneyCommand::Request { amount, target } => {
                let request = self.coordinator.request(actor, &target.id, amount)?;
                debug!("pay request for {}: {}", target.name, request.follow_up);
                Ok(format!("Sent request to {}.", target.name))
            }
            MoneyCommand::Give { amount, target } => {
                self.coordinator.admin_give(&target.id, amount)?;
                Ok(format!("Gave {} to {}.", self.money(amount), target.name))
            }
            MoneyCommand::Take { amount, target } => {
                self.coordinator.admin_take(&target.id, amount)?;
                Ok(format!("Took {} from {}.", self.money(amount), target.name))
            }
            MoneyCommand::Set { amount, target } => {
                self.coordinator.admin_set(&target.id, amount)?;
                Ok(format!("Set money for {} to {}.", target.name, self.money(amount)))
            }
            MoneyCommand::Reset { target } => {
                self.coordinator.admin_reset(&target.id)?;
                Ok(format!(
                    "Set money for {} to {}.",
                    target.name,
                    self.money(self.coordinator.starting_balance())
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::balance::BalanceStore;
    use crate::economy::store::{MemoryRecordStore, RecordStore, BALANCE_FIELD};
    use crate::economy::transactions::LogNotifier;

    fn setup(enabled: bool) -> (MoneyCommands, Player, Player) {
        let records = Arc::new(MemoryRecordStore::new());
        let alice = Player::random("Alice");
        let op = Player::operator(uuid::Uuid::new_v4(), "Op");
        records.provision(&alice.id, "Alice", &[(BALANCE_FIELD, 1500)]).unwrap();
        records.provision(&op.id, "Op", &[(BALANCE_FIELD, 0)]).unwrap();
        let coordinator = Arc::new(TransactionCoordinator::new(
            Arc::new(BalanceStore::new(records)),
            Arc::new(LogNotifier),
            100,
        ));
        (MoneyCommands::new(coordinator, enabled, "$"), alice, op)
    }

    #[test]
    fn balance_and_pay_replies() {
        let (commands, alice, op) = setup(true);
        assert_eq!(
            commands.execute(&alice, MoneyCommand::Balance).unwrap(),
            "You have $1,500."
        );
        let reply = commands
            .execute(&alice, MoneyCommand::Pay { amount: 1200, target: op.clone() })
            .unwrap();
        assert_eq!(reply, "Sent $1,200 to Op.");
        assert_eq!(commands.execute(&op, MoneyCommand::Balance).unwrap(), "You have $1,200.");
    }

    #[test]
    fn admin_commands_need_privilege() {
        let (commands, alice, op) = setup(true);
        let err = commands
            .execute(&alice, MoneyCommand::Give { amount: 5, target: alice.clone() })
            .unwrap_err();
        assert!(matches!(err, EconomyError::PermissionDenied(_)));

        let reply = commands
            .execute(&op, MoneyCommand::Reset { target: alice.clone() })
            .unwrap();
        assert_eq!(reply, "Set money for Alice to $100.");
    }

    #[test]
    fn disabled_economy_rejects_everything() {
        let (commands, alice, _) = setup(false);
        assert!(matches!(
            commands.execute(&alice, MoneyCommand::Balance),
            Err(EconomyError::EconomyDisabled)
        ));
    }
}
