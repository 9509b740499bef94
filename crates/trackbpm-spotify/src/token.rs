// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

/// Tokens are treated as expired this long before the provider says they are.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Bearer token issued by the client-credentials grant.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    /// Create a token issued at `issued_at` with a provider lifetime of `expires_in`.
    ///
    /// The usable window ends [`EXPIRY_MARGIN`] early; lifetimes at or below the margin
    /// produce a token that is never reused.
    pub fn issued(value: impl Into<String>, expires_in: Duration, issued_at: Instant) -> Self {
        let usable = expires_in.saturating_sub(EXPIRY_MARGIN);
        Self {
            value: value.into(),
            expires_at: issued_at + usable,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Shared, injectable cache for the provider access token.
///
/// Clones share the same slot. Holding the guard returned by [`TokenStore::lock`]
/// across a refresh makes concurrent callers wait for that refresh instead of
/// starting their own.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    slot: Arc<Mutex<Option<AccessToken>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> TokenGuard<'_> {
        TokenGuard {
            slot: self.slot.lock().await,
        }
    }

    /// Currently cached token value, if it is still usable.
    pub async fn current(&self) -> Option<String> {
        self.lock().await.fresh(Instant::now())
    }

    /// Drop the cached token so the next lookup re-authenticates.
    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }

    /// Drop the cached token only if it is still `rejected`.
    ///
    /// A token stored by a concurrent refresh after `rejected` was handed out is kept.
    /// Returns whether the slot was cleared.
    pub async fn invalidate(&self, rejected: &str) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|token| token.value() == rejected) {
            *slot = None;
            return true;
        }
        false
    }
}

pub(crate) struct TokenGuard<'a> {
    slot: MutexGuard<'a, Option<AccessToken>>,
}

impl TokenGuard<'_> {
    pub fn fresh(&self, now: Instant) -> Option<String> {
        self.slot
            .as_ref()
            .filter(|token| token.is_valid_at(now))
            .map(|token| token.value().to_string())
    }

    pub fn store(&mut self, token: AccessToken) {
        *self.slot = Some(token);
    }
}
