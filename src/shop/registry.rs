//! At most one build session per sign location.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Duration, Utc};
use log::debug;

use crate::shop::location::LocationKey;
use crate::shop::session::ShopSession;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<LocationKey, Arc<ShopSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing session for `key`, or a new one from `factory`.
    ///
    /// The check and the insert happen under one write lock, so concurrent
    /// callers for the same key all get the same instance and `factory` runs at
    /// most once.
    pub fn get_or_create(
        &self,
        key: LocationKey,
        factory: impl FnOnce() -> ShopSession,
    ) -> Arc<ShopSession> {
        if let Some(session) = self.get(&key) {
            return session;
        }
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(key)
            .or_insert_with(|| {
                debug!("new sign session at {}", key);
                Arc::new(factory())
            })
            .clone()
    }

    pub fn get(&self, key: &LocationKey) -> Option<Arc<ShopSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Evict whatever is registered at `key`. Absent keys are fine.
    pub fn remove(&self, key: &LocationKey) -> Option<Arc<ShopSession>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Evict `session` only if it is still the one registered at its location.
    pub fn remove_session(&self, session: &Arc<ShopSession>) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let key = session.location();
        match sessions.get(&key) {
            Some(current) if Arc::ptr_eq(current, session) => {
                sessions.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Drop sessions that were opened more than `max_age` ago and never committed.
    pub fn evict_stale(&self, max_age: Duration) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| session.is_committing() || session.created_at() > cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("evicted {} idle sign sessions", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
