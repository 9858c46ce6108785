use std::sync::Arc;

use time::OffsetDateTime;

use crate::profile::UserProfile;
use crate::vault::SessionVault;

/// Read-only view of the authenticated session.
///
/// The single source of truth consumed by route guards, navigation chrome
/// and API calls. An authenticated session exists if and only if a token is
/// stored, its expiry is strictly in the future, and a user profile is
/// stored — token-only or profile-only states read as "not authenticated".
#[derive(Clone)]
pub struct Session {
    vault: Arc<SessionVault>,
}

impl Session {
    #[must_use]
    pub fn new(vault: Arc<SessionVault>) -> Self {
        Self { vault }
    }

    /// Whether a live session exists. Never panics; any broken or partial
    /// state reads as `false`.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.vault.profile().is_some()
    }

    /// The bearer token, if present and unexpired.
    ///
    /// A token past its expiry instant — or with no parseable expiry at
    /// all — is treated as absent even if still physically stored.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let token = self.vault.token()?;
        let expiry = self.vault.expiry()?;
        (expiry > OffsetDateTime::now_utc()).then_some(token)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.vault.profile()
    }

    /// Tear the session down: token, expiry and profile all go.
    pub fn logout(&self) {
        self.vault.clear_all();
    }
}
