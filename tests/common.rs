//! Shared fixtures for the integration tests.

use std::sync::{Arc, Mutex};

use shopkeep::config::ShopsConfig;
use shopkeep::economy::{
    BalanceStore, LogNotifier, MemoryRecordStore, RecordStore, TransactionCoordinator,
    BALANCE_FIELD,
};
use shopkeep::shop::{LocationKey, SessionRegistry, ShopSign, SignShops, StaticCatalog, World};
use shopkeep::types::Player;

/// Items the test catalog knows about.
#[allow(dead_code)]
pub const ITEMS: [&str; 4] = [
    "minecraft:stick",
    "minecraft:stone",
    "minecraft:diamond",
    "modpack:gem",
];

/// World that remembers what it was asked to do.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingWorld {
    pub destroyed: Mutex<Vec<(LocationKey, bool)>>,
    pub placed: Mutex<Vec<ShopSign>>,
}

impl World for RecordingWorld {
    fn destroy(&self, location: &LocationKey, drop_contents: bool) -> anyhow::Result<()> {
        self.destroyed
            .lock()
            .unwrap()
            .push((*location, drop_contents));
        Ok(())
    }

    fn place_shop(&self, sign: &ShopSign) -> anyhow::Result<()> {
        self.placed.lock().unwrap().push(sign.clone());
        Ok(())
    }
}

#[allow(dead_code)]
pub fn ledger() -> (Arc<MemoryRecordStore>, Arc<BalanceStore>) {
    let records = Arc::new(MemoryRecordStore::new());
    let balances = Arc::new(BalanceStore::new(records.clone()));
    (records, balances)
}

#[allow(dead_code)]
pub fn open_account(records: &MemoryRecordStore, player: &Player, balance: i64) {
    records
        .provision(&player.id, &player.name, &[(BALANCE_FIELD, balance)])
        .expect("provision");
}

#[allow(dead_code)]
pub fn coordinator(balances: Arc<BalanceStore>) -> TransactionCoordinator {
    TransactionCoordinator::new(balances, Arc::new(LogNotifier), 0)
}

#[allow(dead_code)]
pub fn sign_shops(settings: ShopsConfig) -> (SignShops, Arc<RecordingWorld>) {
    let world = Arc::new(RecordingWorld::default());
    let shops = SignShops::new(
        Arc::new(SessionRegistry::new()),
        Arc::new(StaticCatalog::new(ITEMS)),
        world.clone(),
        settings,
    );
    (shops, world)
}
