// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agora

use crate::api::ApiClient;
use log::{debug, error, info, warn};

/// Identity source that hands out bearer tokens (the wallet-auth provider).
pub trait TokenProvider {
    /// The provider has finished initialising.
    fn is_ready(&self) -> bool {
        true
    }
    fn is_authenticated(&self) -> bool;
    fn access_token(&self) -> Option<String>;
}

/// Token supplied up front, e.g. from `AGORA_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn is_authenticated(&self) -> bool {
        !self.0.trim().is_empty()
    }

    fn access_token(&self) -> Option<String> {
        let token = self.0.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenProvider for Anonymous {
    fn is_authenticated(&self) -> bool {
        false
    }

    fn access_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Provider not ready or user signed out; the sync flag was reset.
    SignedOut,
    AlreadySynced,
    NoToken,
    Synced,
    Failed,
}

/// Links the signed-in wallet identity to a backend user, once per session.
#[derive(Debug, Default)]
pub struct UserSync {
    synced: bool,
}

impl UserSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Never returns an error: failures are logged and retried on the next call.
    pub fn sync(&mut self, api: &ApiClient, provider: &dyn TokenProvider) -> SyncOutcome {
        if !provider.is_ready() || !provider.is_authenticated() {
            self.synced = false;
            return SyncOutcome::SignedOut;
        }
        if self.synced {
            return SyncOutcome::AlreadySynced;
        }

        let Some(token) = provider.access_token() else {
            debug!("Auth provider returned no access token; skipping user sync");
            return SyncOutcome::NoToken;
        };

        match api.sync_user(&token) {
            Ok(()) => {
                self.synced = true;
                info!("User synced to backend");
                SyncOutcome::Synced
            }
            Err(e) if e.is_retryable() => {
                warn!("User sync failed, will retry — error={}", e);
                SyncOutcome::Failed
            }
            Err(e) => {
                error!("Backend rejected user sync — error={}", e);
                SyncOutcome::Failed
            }
        }
    }
}
