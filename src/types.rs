//! Identity types shared by the ledger and the shop builder.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a ledger account (the player's profile UUID).
pub type AccountId = Uuid;

/// Reserved owner id for shops run by the server itself.
pub const SYSTEM_OWNER: AccountId = Uuid::nil();

/// A player acting on the economy or building a sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: AccountId,
    pub name: String,
    /// Operator / creative-mode privileges (admin money commands, server-owned shops).
    #[serde(default)]
    pub privileged: bool,
}

impl Player {
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            privileged: false,
        }
    }

    /// Same player with elevated privileges.
    pub fn operator(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            privileged: true,
            ..Self::new(id, name)
        }
    }

    /// Convenience constructor with a random id, mostly for tests and tooling.
    pub fn random(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), name)
    }
}
