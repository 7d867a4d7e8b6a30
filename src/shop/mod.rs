//! Sign shops: turning a written sign into a validated shop configuration.
//!
//! A player placing a sign opens a [`ShopSession`] for that block through the
//! [`SessionRegistry`]; each edited line is fed to [`ShopSession::set_line`] and
//! finishing the edit calls [`ShopSession::commit`].

pub mod catalog;
pub mod errors;
pub mod location;
pub mod parse;
pub mod registry;
pub mod session;
pub mod signs;
pub mod world;

use std::sync::Arc;

use chrono::Duration;

use crate::config::ShopsConfig;

pub use catalog::{Catalog, CatalogEntry, StaticCatalog};
pub use errors::ShopError;
pub use location::LocationKey;
pub use parse::{parse_item, parse_owner, parse_price, Owner};
pub use registry::SessionRegistry;
pub use session::{SessionState, ShopSession};
pub use signs::{ShopSign, SignType};
pub use world::{LogWorld, World};

/// Collaborators a sign build needs, wired once at startup.
pub struct SignShops {
    registry: Arc<SessionRegistry>,
    catalog: Arc<dyn Catalog>,
    world: Arc<dyn World>,
    settings: ShopsConfig,
}

impl SignShops {
    pub fn new(
        registry: Arc<SessionRegistry>,
        catalog: Arc<dyn Catalog>,
        world: Arc<dyn World>,
        settings: ShopsConfig,
    ) -> Self {
        Self {
            registry,
            catalog,
            world,
            settings,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn world(&self) -> &dyn World {
        self.world.as_ref()
    }

    pub fn settings(&self) -> &ShopsConfig {
        &self.settings
    }

    /// Session for the sign at `location`, opened on first use.
    pub fn session(&self, location: LocationKey) -> Arc<ShopSession> {
        self.registry
            .get_or_create(location, || ShopSession::new(location))
    }

    /// Apply the configured idle timeout. Zero disables it.
    pub fn evict_idle(&self) -> usize {
        if self.settings.session_ttl_secs == 0 {
            return 0;
        }
        let ttl = Duration::seconds(i64::from(self.settings.session_ttl_secs));
        self.registry.evict_stale(ttl)
    }
}
