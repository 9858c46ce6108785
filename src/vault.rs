use std::sync::Arc;

use cookie::{Cookie, SameSite};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::profile::UserProfile;
use crate::store::{CookieStore, LocalStore};

/// Cookie holding the bearer token.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie holding the token expiry as an RFC 3339 timestamp. Checked at the
/// application level even when the cookie mechanism has not purged the token
/// cookie yet.
pub const EXPIRY_COOKIE: &str = "token_expiry";
/// Local-storage key holding the serialized user profile.
pub const USER_DATA_KEY: &str = "user_data";

/// Persistence adapter over the two storage substrates.
///
/// Pure reads and writes, no session logic. Substrate failures stop at this
/// layer: writes report `false` or are detected by read-back, reads come
/// back absent.
pub struct SessionVault {
    cookies: Arc<dyn CookieStore>,
    local: Arc<dyn LocalStore>,
    secure_cookies: bool,
}

impl SessionVault {
    #[must_use]
    pub fn new(cookies: Arc<dyn CookieStore>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            cookies,
            local,
            secure_cookies: true,
        }
    }

    /// Toggle the `Secure` attribute on written cookies (off for plain-http
    /// development).
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Write the bearer token and its expiry stamp.
    ///
    /// Storage failures are logged and swallowed; callers that must know the
    /// outcome read the token back.
    pub fn save_token(&self, token: &str, expires_at: OffsetDateTime) {
        let token_cookie = self.session_cookie(TOKEN_COOKIE, token.to_owned(), expires_at);
        if let Err(e) = self.cookies.set(token_cookie) {
            tracing::warn!(error = %e, "token cookie write failed");
        }

        match expires_at.format(&Rfc3339) {
            Ok(stamp) => {
                let expiry_cookie = self.session_cookie(EXPIRY_COOKIE, stamp, expires_at);
                if let Err(e) = self.cookies.set(expiry_cookie) {
                    tracing::warn!(error = %e, "expiry cookie write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "expiry stamp did not format"),
        }
    }

    /// The stored token string, if any. No expiry logic here — that is the
    /// session facade's job.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.cookies.get(TOKEN_COOKIE)
    }

    /// The stored expiry instant. An unparseable stamp reads as absent.
    #[must_use]
    pub fn expiry(&self) -> Option<OffsetDateTime> {
        let stamp = self.cookies.get(EXPIRY_COOKIE)?;
        OffsetDateTime::parse(&stamp, &Rfc3339).ok()
    }

    /// Serialize and store the profile. Returns whether the write completed,
    /// so the credential flows can roll back a half-saved session.
    pub fn save_profile(&self, profile: &UserProfile) -> bool {
        let json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "profile did not serialize");
                return false;
            }
        };
        match self.local.set(USER_DATA_KEY, &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "profile write failed");
                false
            }
        }
    }

    /// The stored profile, normalized on read. An unparseable blob reads as
    /// absent.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        let json = self.local.get(USER_DATA_KEY)?;
        serde_json::from_str(&json).ok()
    }

    /// Remove token, expiry and profile unconditionally.
    pub fn clear_all(&self) {
        self.cookies.remove(TOKEN_COOKIE);
        self.cookies.remove(EXPIRY_COOKIE);
        self.local.remove(USER_DATA_KEY);
    }

    fn session_cookie(
        &self,
        name: &'static str,
        value: String,
        expires_at: OffsetDateTime,
    ) -> Cookie<'static> {
        Cookie::build((name, value))
            .expires(expires_at)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    }
}
