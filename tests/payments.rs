/// Player-to-player payments, refunds and money command replies
mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shopkeep::economy::{
    describe_error, BalanceStore, EconomyError, LogNotifier, MemoryRecordStore, MoneyCommand,
    MoneyCommands, RecordStore, TransactionCoordinator, BALANCE_FIELD,
};
use shopkeep::types::{AccountId, Player};
use uuid::Uuid;

#[test]
fn test_pay_with_insufficient_funds_changes_nothing() {
    let (records, balances) = common::ledger();
    let a = Player::random("A");
    let b = Player::random("B");
    common::open_account(&records, &a, 50);
    common::open_account(&records, &b, 20);
    let coordinator = common::coordinator(balances.clone());

    let err = coordinator.pay(&a, &b, 100).unwrap_err();
    assert!(matches!(
        err,
        EconomyError::InsufficientFunds {
            balance: 50,
            requested: 100,
            ..
        }
    ));
    assert_eq!(balances.get_balance(&a.id).unwrap(), 50);
    assert_eq!(balances.get_balance(&b.id).unwrap(), 20);
}

#[test]
fn test_pay_to_account_without_record_is_refunded() {
    let (records, balances) = common::ledger();
    let a = Player::random("A");
    let b = Player::random("B");
    common::open_account(&records, &a, 150);
    let coordinator = common::coordinator(balances.clone());

    let err = coordinator.pay(&a, &b, 100).unwrap_err();
    assert!(matches!(err, EconomyError::NotFound(id) if id == b.id));
    assert_eq!(balances.get_balance(&a.id).unwrap(), 150);
    assert!(!records.contains(&b.id).unwrap());
}

/// Record store whose payer record disappears right after it is debited.
struct VanishingPayer {
    inner: MemoryRecordStore,
    payer: AccountId,
    gone: AtomicBool,
}

impl VanishingPayer {
    fn is_gone(&self, account: &AccountId) -> bool {
        *account == self.payer && self.gone.load(Ordering::SeqCst)
    }
}

impl RecordStore for VanishingPayer {
    fn read(&self, account: &AccountId, field: &str) -> Result<i64, EconomyError> {
        if self.is_gone(account) {
            return Err(EconomyError::NotFound(*account));
        }
        self.inner.read(account, field)
    }

    fn write(&self, account: &AccountId, field: &str, value: i64) -> Result<(), EconomyError> {
        if self.is_gone(account) {
            return Err(EconomyError::NotFound(*account));
        }
        self.inner.write(account, field, value)?;
        if *account == self.payer {
            self.gone.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn provision(
        &self,
        account: &AccountId,
        name: &str,
        fields: &[(&str, i64)],
    ) -> Result<bool, EconomyError> {
        self.inner.provision(account, name, fields)
    }

    fn contains(&self, account: &AccountId) -> Result<bool, EconomyError> {
        if self.is_gone(account) {
            return Ok(false);
        }
        self.inner.contains(account)
    }
}

#[test]
fn test_failed_refund_is_reported_separately() {
    let a = Player::random("A");
    let b = Player::random("B");
    let records = Arc::new(VanishingPayer {
        inner: MemoryRecordStore::new(),
        payer: a.id,
        gone: AtomicBool::new(false),
    });
    records
        .provision(&a.id, &a.name, &[(BALANCE_FIELD, 150)])
        .unwrap();
    let coordinator = common::coordinator(Arc::new(BalanceStore::new(records.clone())));

    let err = coordinator.pay(&a, &b, 100).unwrap_err();
    match &err {
        EconomyError::CompensationFailed {
            payer,
            amount,
            cause,
            compensation,
        } => {
            assert_eq!(*payer, a.id);
            assert_eq!(*amount, 100);
            assert!(matches!(**cause, EconomyError::NotFound(id) if id == b.id));
            assert!(matches!(**compensation, EconomyError::NotFound(id) if id == a.id));
        }
        other => panic!("expected CompensationFailed, got {other:?}"),
    }
    assert!(describe_error(&err).contains("Something went wrong"));
    assert_eq!(records.inner.read(&a.id, BALANCE_FIELD).unwrap(), 50);
}

#[test]
fn test_successful_pay_moves_money() {
    let (records, balances) = common::ledger();
    let a = Player::random("A");
    let b = Player::random("B");
    common::open_account(&records, &a, 150);
    common::open_account(&records, &b, 5);
    let coordinator = common::coordinator(balances.clone());

    let transfer = coordinator.pay(&a, &b, 100).unwrap();
    assert_eq!(transfer.payer_balance, 50);
    assert_eq!(transfer.recipient_balance, 105);
    assert_eq!(balances.get_balance(&a.id).unwrap(), 50);
    assert_eq!(balances.get_balance(&b.id).unwrap(), 105);
}

#[test]
fn test_opposing_payments_conserve_money() {
    let (records, balances) = common::ledger();
    let a = Player::random("A");
    let b = Player::random("B");
    common::open_account(&records, &a, 500);
    common::open_account(&records, &b, 500);
    let coordinator = Arc::new(common::coordinator(balances.clone()));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let coordinator = coordinator.clone();
            let (from, to) = if i % 2 == 0 {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            std::thread::spawn(move || {
                for _ in 0..20 {
                    let _ = coordinator.pay(&from, &to, 7);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let total = balances.get_balance(&a.id).unwrap() + balances.get_balance(&b.id).unwrap();
    assert_eq!(total, 1_000);
}

#[test]
fn test_money_commands_end_to_end() {
    let (records, balances) = common::ledger();
    let alice = Player::random("Alice");
    let bob = Player::random("Bob");
    let op = Player::operator(Uuid::new_v4(), "Op");
    common::open_account(&records, &alice, 1_500);
    common::open_account(&records, &bob, 0);
    common::open_account(&records, &op, 0);
    let coordinator = Arc::new(TransactionCoordinator::new(
        balances.clone(),
        Arc::new(LogNotifier),
        250,
    ));
    let money = MoneyCommands::new(coordinator, true, "$");

    assert_eq!(
        money.execute(&alice, MoneyCommand::Balance).unwrap(),
        "You have $1,500."
    );
    assert_eq!(
        money
            .execute(
                &alice,
                MoneyCommand::Pay {
                    amount: 500,
                    target: bob.clone()
                }
            )
            .unwrap(),
        "Sent $500 to Bob."
    );
    assert_eq!(balances.get_balance(&bob.id).unwrap(), 500);

    let denied = money
        .execute(
            &alice,
            MoneyCommand::Give {
                amount: 10,
                target: alice.clone(),
            },
        )
        .unwrap_err();
    assert!(matches!(denied, EconomyError::PermissionDenied(_)));

    money
        .execute(&op, MoneyCommand::Reset { target: bob.clone() })
        .unwrap();
    assert_eq!(balances.get_balance(&bob.id).unwrap(), 250);

    let broke = money
        .execute(
            &bob,
            MoneyCommand::Pay {
                amount: 10_000,
                target: alice.clone(),
            },
        )
        .unwrap_err();
    assert!(!describe_error(&broke).is_empty());
}

#[test]
fn test_disabled_economy_refuses_commands() {
    let (records, balances) = common::ledger();
    let alice = Player::random("Alice");
    common::open_account(&records, &alice, 10);
    let money = MoneyCommands::new(Arc::new(common::coordinator(balances)), false, "$");

    let err = money.execute(&alice, MoneyCommand::Balance).unwrap_err();
    assert!(matches!(err, EconomyError::EconomyDisabled));
}

#[test]
fn test_request_prepares_follow_up() {
    let (records, balances) = common::ledger();
    let alice = Player::random("Alice");
    let bob = Player::random("Bob");
    common::open_account(&records, &alice, 0);
    common::open_account(&records, &bob, 0);
    let coordinator = common::coordinator(balances.clone());

    let request = coordinator.request(&alice, &bob.id, 40).unwrap();
    assert_eq!(request.follow_up, "/pay 40 Alice");
    assert_eq!(balances.get_balance(&bob.id).unwrap(), 0);

    let stranger = Uuid::new_v4();
    assert!(coordinator
        .request(&alice, &stranger, 40)
        .unwrap_err()
        .is_not_found());
}
