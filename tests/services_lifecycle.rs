/// Startup wiring over a sled ledger: join hooks, money commands, sign shops, shutdown
mod common;

use std::sync::Arc;

use shopkeep::config::Config;
use shopkeep::economy::{LogNotifier, MoneyCommand, SledRecordStore, BALANCE_FIELD};
use shopkeep::hooks::MAINTENANCE_MESSAGE;
use shopkeep::services::{Collaborators, Services};
use shopkeep::shop::{LocationKey, StaticCatalog};
use shopkeep::types::Player;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = tmp.path().to_str().unwrap().to_string();
    config.economy.starting_balance = 100;
    config.logging.file = None;
    config.logging.audit_file = None;
    config
}

fn collaborators() -> (Collaborators, Arc<common::RecordingWorld>) {
    let world = Arc::new(common::RecordingWorld::default());
    let collaborators = Collaborators {
        notifier: Arc::new(LogNotifier),
        catalog: Arc::new(StaticCatalog::new(common::ITEMS)),
        world: world.clone(),
    };
    (collaborators, world)
}

#[test]
fn test_services_round_trip_through_sled() {
    let tmp = TempDir::new().expect("tempdir");
    let config = test_config(&tmp);
    let alice = Player::random("Alice");
    let bob = Player::random("Bob");

    {
        let (collaborators, world) = collaborators();
        let services = Services::open(&config, collaborators).expect("open services");
        assert!(services.hooks.check_join_allowed());
        assert!(services.hooks.on_player_connected(&alice).unwrap());
        assert!(services.hooks.on_player_connected(&bob).unwrap());
        assert!(!services.hooks.on_player_connected(&alice).unwrap());

        let reply = services
            .money
            .execute(
                &alice,
                MoneyCommand::Pay {
                    amount: 40,
                    target: bob.clone(),
                },
            )
            .unwrap();
        assert_eq!(reply, "Sent $40 to Bob.");

        let session = services.shops.session(LocationKey::new(0, 4, 64, 4));
        session.set_line(0, "SELL");
        session.set_line(1, "$12");
        session.set_line(2, "3 stone");
        assert!(session.commit(&bob, &services.shops));
        assert_eq!(world.placed.lock().unwrap().len(), 1);
        assert!(services.sessions.is_empty());

        services.shutdown().expect("shutdown");
    }

    let ledger = SledRecordStore::open(config.storage.ledger_path()).expect("reopen ledger");
    let accounts = ledger.list_accounts().unwrap();
    assert_eq!(accounts.len(), 2);
    let alice_record = ledger.get_account(&alice.id).unwrap();
    assert_eq!(alice_record.name, "Alice");
    assert_eq!(alice_record.fields.get(BALANCE_FIELD), Some(&60));
    assert_eq!(
        ledger.get_account(&bob.id).unwrap().fields.get(BALANCE_FIELD),
        Some(&140)
    );
}

#[test]
fn test_maintenance_blocks_joins() {
    let tmp = TempDir::new().expect("tempdir");
    let (collaborators, _world) = collaborators();
    let services = Services::open(&test_config(&tmp), collaborators).expect("open services");

    let guard = services.hooks.begin_maintenance();
    assert!(!services.hooks.check_join_allowed());
    assert!(!MAINTENANCE_MESSAGE.is_empty());
    drop(guard);
    assert!(services.hooks.check_join_allowed());
    services.shutdown().unwrap();
}

#[test]
fn test_status_summary_serializes() {
    let tmp = TempDir::new().expect("tempdir");
    let config = test_config(&tmp);
    let (collaborators, _world) = collaborators();
    let services = Services::open(&config, collaborators).expect("open services");
    services
        .hooks
        .on_player_connected(&Player::random("Dana"))
        .unwrap();
    services.shutdown().unwrap();

    let ledger = SledRecordStore::open(config.storage.ledger_path()).unwrap();
    let record = ledger.list_accounts().unwrap().remove(0);
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["name"], "Dana");
    assert_eq!(json["fields"][BALANCE_FIELD], 100);
}
