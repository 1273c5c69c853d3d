//! Shared sign-in state.
//!
//! A `Session` is handed to whichever components need it; clones share the
//! same token slot. Only a successful sign-in writes it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::types::BearerToken;

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<BearerToken>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, if a non-empty one is stored.
    pub fn token(&self) -> Option<BearerToken> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().filter(|t| !t.token.is_empty()).cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Replace the stored token; the last completed write wins.
    pub fn store(&self, token: BearerToken) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token);
    }
}
