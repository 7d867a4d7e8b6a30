//! # Shopkeep - player economy and sign shops for game servers
//!
//! Shopkeep is the server-side core behind a player money system and
//! sign-built shops:
//!
//! - **Ledger**: one integer balance per player account, persisted in sled, with
//!   per-account linearized credit/debit.
//! - **Payments**: player-to-player transfers that refund the payer when the
//!   credit leg fails, plus operator give/take/set/reset.
//! - **Sign shops**: a per-location build session collects the four lines of a
//!   sign, validates them against the sign type on the first line and either
//!   places the shop or breaks the sign.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shopkeep::config::Config;
//! use shopkeep::economy::LogNotifier;
//! use shopkeep::services::{Collaborators, Services};
//! use shopkeep::shop::{LocationKey, LogWorld, StaticCatalog};
//! use shopkeep::types::Player;
//!
//! # fn main() -> anyhow::Result<()> {
//! let services = Services::open(
//!     &Config::default(),
//!     Collaborators {
//!         notifier: Arc::new(LogNotifier),
//!         catalog: Arc::new(StaticCatalog::new(["minecraft:stick"])),
//!         world: Arc::new(LogWorld),
//!     },
//! )?;
//! let alice = Player::random("Alice");
//! services.hooks.on_player_connected(&alice)?;
//!
//! let session = services.shops.session(LocationKey::new(0, 10, 64, 10));
//! session.set_line(0, "BUY");
//! session.set_line(1, "$10");
//! session.set_line(2, "1 stick");
//! session.set_line(3, "Alice");
//! session.commit(&alice, &services.shops);
//! services.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`economy`] - ledger storage, balances, payments and money commands
//! - [`shop`] - sign shop sessions, registry, parsers and sign types
//! - [`hooks`] - pre-join and post-connect hooks
//! - [`services`] - startup wiring of the shared instances
//! - [`config`] - configuration management
//! - [`types`] - account ids and players

pub mod config;
pub mod economy;
pub mod hooks;
pub mod services;
pub mod shop;
pub mod types;
