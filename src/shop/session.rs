//! Build session for one shop sign.
//!
//! A session collects the sign's four lines as the player writes them, then
//! `commit` validates them against the sign type named on line 0:
//!
//! ```text
//! Collecting --commit ok--> Committed   (shop placed)
//!            --commit bad-> Aborted     (sign destroyed, or left as a plain sign
//!                                        when line 0 names no enabled type)
//! ```
//!
//! Whatever happens inside `commit`, the session leaves the registry before
//! `commit` returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::shop::errors::ShopError;
use crate::shop::location::LocationKey;
use crate::shop::registry::SessionRegistry;
use crate::shop::signs::{FormatInput, ShopDraft, ShopSign, SignType, LINE_COUNT};
use crate::shop::SignShops;
use crate::types::{AccountId, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Committed,
    Aborted,
}

pub struct ShopSession {
    location: LocationKey,
    lines: [OnceLock<String>; LINE_COUNT],
    draft: Mutex<ShopDraft>,
    state: Mutex<SessionState>,
    commit_started: AtomicBool,
    // Line writers hold it shared; commit holds it exclusively while closing the session.
    line_gate: RwLock<()>,
    shop: OnceLock<ShopSign>,
    created_at: DateTime<Utc>,
}

/// Evicts the session when `commit` exits, including by panic.
struct EvictOnExit<'a> {
    registry: &'a SessionRegistry,
    session: &'a Arc<ShopSession>,
}

impl Drop for EvictOnExit<'_> {
    fn drop(&mut self) {
        self.registry.remove_session(self.session);
    }
}

impl ShopSession {
    pub fn new(location: LocationKey) -> Self {
        Self {
            location,
            lines: Default::default(),
            draft: Mutex::new(ShopDraft::default()),
            state: Mutex::new(SessionState::Collecting),
            commit_started: AtomicBool::new(false),
            line_gate: RwLock::new(()),
            shop: OnceLock::new(),
            created_at: Utc::now(),
        }
    }

    pub fn location(&self) -> LocationKey {
        self.location
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_committing(&self) -> bool {
        self.commit_started.load(Ordering::Acquire)
    }

    /// Store `value` in slot `index` unless something is already there.
    ///
    /// Returns `false` for an occupied slot, an index past the last line, or a
    /// session that has already been committed.
    pub fn set_line(&self, index: usize, value: impl Into<String>) -> bool {
        let _gate = self.line_gate.read().unwrap_or_else(PoisonError::into_inner);
        if self.is_committing() {
            return false;
        }
        let Some(slot) = self.lines.get(index) else {
            debug!("sign at {}: line {} out of range", self.location, index);
            return false;
        };
        slot.set(value.into()).is_ok()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index)?.get().map(String::as_str)
    }

    fn snapshot_lines(&self) -> [Option<String>; LINE_COUNT] {
        self.lines.each_ref().map(|slot| slot.get().cloned())
    }

    fn draft(&self) -> std::sync::MutexGuard<'_, ShopDraft> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn owner_id(&self) -> Option<AccountId> {
        self.draft().owner_id
    }

    pub fn item_id(&self) -> Option<String> {
        self.draft().item_id.clone()
    }

    pub fn stack_size(&self) -> u32 {
        self.draft().stack_size
    }

    pub fn price(&self) -> i64 {
        self.draft().price
    }

    /// The placed shop, once a commit succeeded.
    pub fn shop(&self) -> Option<&ShopSign> {
        self.shop.get()
    }

    fn finish(&self, state: SessionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Validate the collected lines and build the shop.
    ///
    /// Returns `false` when line 0 is not an enabled sign type (the sign stays
    /// a plain sign) or when this session was already committed. Returns `true`
    /// once a build attempt ran, including one whose lines were rejected: in
    /// that case the sign has been destroyed.
    pub fn commit(self: &Arc<Self>, actor: &Player, shops: &SignShops) -> bool {
        {
            let _gate = self.line_gate.write().unwrap_or_else(PoisonError::into_inner);
            if self.commit_started.swap(true, Ordering::AcqRel) {
                return false;
            }
        }
        let _evict = EvictOnExit {
            registry: shops.registry(),
            session: self,
        };

        let sign_type = match self.sign_type(shops) {
            Ok(sign_type) => sign_type,
            Err(reason) => {
                debug!("sign at {} stays a plain sign: {}", self.location, reason);
                self.finish(SessionState::Aborted);
                return false;
            }
        };

        let lines = self.snapshot_lines();
        let input = FormatInput {
            lines: &lines,
            actor,
            catalog: shops.catalog(),
            default_namespace: &shops.settings().default_namespace,
        };

        let formatted = {
            let mut draft = self.draft();
            sign_type
                .format(&mut draft, &input)
                .map(|_| ShopSign::from_draft(self.location, sign_type, draft.clone(), actor))
        };

        match formatted {
            Ok(sign) => match shops.world().place_shop(&sign) {
                Ok(()) => {
                    info!(
                        "{} built {} shop at {} (price {}, item {:?})",
                        actor.name, sign_type, self.location, sign.price, sign.item_id
                    );
                    let _ = self.shop.set(sign);
                    self.finish(SessionState::Committed);
                }
                Err(e) => {
                    warn!("sign at {}: placing shop failed: {}", self.location, e);
                    self.break_sign(shops);
                }
            },
            Err(reason) => {
                info!(
                    "sign at {}: {} shop from {} rejected: {}",
                    self.location, sign_type, actor.name, reason
                );
                self.break_sign(shops);
            }
        }
        true
    }

    /// The enabled sign type named on line 0.
    fn sign_type(&self, shops: &SignShops) -> Result<SignType, ShopError> {
        let tag = self.line(0).unwrap_or_default();
        let sign_type =
            SignType::from_tag(tag).ok_or_else(|| ShopError::UnknownSignType(tag.to_string()))?;
        if !shops.settings().is_enabled(sign_type) {
            return Err(ShopError::DisabledSignType(sign_type.tag().to_string()));
        }
        Ok(sign_type)
    }

    fn break_sign(&self, shops: &SignShops) {
        if let Err(e) = shops.world().destroy(&self.location, true) {
            error!("sign at {}: destroy failed: {}", self.location, e);
        }
        self.finish(SessionState::Aborted);
    }
}

impl std::fmt::Debug for ShopSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSession")
            .field("location", &self.location)
            .field("lines", &self.snapshot_lines())
            .field("state", &self.state())
            .finish()
    }
}
