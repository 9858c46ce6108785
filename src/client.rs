//! Credential acquisition.
//!
//! Two ways into a session: direct email/password login against the API, and
//! the federated flow where the browser is sent to the Microsoft identity
//! provider and returns with an encoded payload in the URL fragment. Both
//! end the same way — token and normalized profile persisted through the
//! vault, full replacement, never partial updates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::browser::Navigator;
use crate::config::AuthConfig;
use crate::error::Error;
use crate::profile::{RawUserRecord, UserProfile, normalize};
use crate::types::UserId;
use crate::vault::SessionVault;

/// Window granted to a direct login. The login endpoint supplies no expiry,
/// so the client stamps its own; the federated path trusts the provider's.
const DIRECT_LOGIN_TTL: Duration = Duration::hours(24);

/// Result of a successful direct login. The session is already persisted
/// when this is returned; navigation is the caller's job.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct SessionBundle {
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub user: UserProfile,
}

/// Registration form for `POST /Auth/register`.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct NewRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl NewRegistration {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<RawUserRecord>,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct MicrosoftLoginResponse {
    #[serde(default)]
    redirect_url: Option<String>,
}

/// Payload carried back from the identity provider in the URL fragment.
#[derive(Deserialize)]
struct RedirectPayload {
    #[serde(default)]
    token: Option<TokenGrant>,
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    has_image: Option<bool>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Deserialize)]
struct TokenGrant {
    #[serde(default, rename = "accessToken")]
    access_token: Option<String>,
    #[serde(default, rename = "expiresAt")]
    expires_at: Option<String>,
}

/// Credential acquisition client for the JOOL API.
pub struct AuthClient {
    config: AuthConfig,
    http: reqwest::Client,
    vault: Arc<SessionVault>,
    navigator: Arc<dyn Navigator>,
}

impl AuthClient {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        vault: Arc<SessionVault>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            http,
            vault,
            navigator,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Direct email/password login.
    ///
    /// On success the token (with a client-computed 24-hour expiry) and the
    /// normalized user profile are persisted before the bundle is returned.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure or timeout,
    /// [`Error::AuthenticationFailed`] on a non-2xx response (with the
    /// server's message when one was provided),
    /// [`Error::InvalidServerResponse`] when the body lacks the token or a
    /// usable user record, and [`Error::StorageWrite`] when persistence
    /// fails — in which case nothing is left behind.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionBundle, Error> {
        let response = self
            .http
            .post(self.config.login_url())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response
                .json::<ApiMessage>()
                .await
                .ok()
                .and_then(|m| m.message)
                .unwrap_or_else(|| "login failed, check your credentials".to_owned());
            tracing::warn!(%email, "login rejected");
            return Err(Error::AuthenticationFailed(detail));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|_| Error::InvalidServerResponse("login body is not valid JSON"))?;

        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or(Error::InvalidServerResponse("login response carried no token"))?;
        let raw = body
            .user
            .ok_or(Error::InvalidServerResponse("login response carried no user record"))?;
        let user = normalize(&raw);
        if user.id.is_none() {
            return Err(Error::InvalidServerResponse("user record carried no identifier"));
        }

        let expires_at = OffsetDateTime::now_utc() + DIRECT_LOGIN_TTL;
        self.persist_session(&token, expires_at, &user)?;

        tracing::info!(user = %user.id.as_ref().map_or("", UserId::as_str), "login successful");
        Ok(SessionBundle {
            token,
            expires_at,
            user,
        })
    }

    /// Register a new account. Does not establish a session.
    ///
    /// The server may answer 2xx with an empty (or non-JSON) body; that
    /// surfaces as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure, [`Error::Registration`] with
    /// the server's validation text on a non-2xx response.
    pub async fn register(
        &self,
        registration: &NewRegistration,
    ) -> Result<Option<UserProfile>, Error> {
        let response = self
            .http
            .post(self.config.register_url())
            .json(registration)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            let detail = if detail.trim().is_empty() {
                format!("registration error: {status}")
            } else {
                detail
            };
            return Err(Error::Registration(detail));
        }

        let body = response.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<RawUserRecord>(&body) {
            Ok(raw) => Ok(Some(normalize(&raw))),
            Err(e) => {
                tracing::debug!(error = %e, "registration response was not a user record");
                Ok(None)
            }
        }
    }

    /// Start the federated login: asks the API for the provider redirect URL
    /// and navigates to it. Fire-and-forget from the caller's perspective.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure,
    /// [`Error::InvalidServerResponse`] when the endpoint refuses or the
    /// body carries no redirect URL — for the caller to display.
    pub async fn begin_microsoft_login(&self) -> Result<(), Error> {
        let response = self
            .http
            .get(self.config.microsoft_login_url())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::InvalidServerResponse(
                "microsoft login endpoint refused the request",
            ));
        }

        let body: MicrosoftLoginResponse = response
            .json()
            .await
            .map_err(|_| Error::InvalidServerResponse("microsoft login body is not valid JSON"))?;
        let redirect_url = body
            .redirect_url
            .filter(|u| !u.is_empty())
            .ok_or(Error::InvalidServerResponse(
                "microsoft login response carried no redirect URL",
            ))?;

        tracing::info!("redirecting to identity provider");
        self.navigator.assign(&redirect_url);
        Ok(())
    }

    /// Complete the federated flow after the provider redirects back with an
    /// encoded payload in the URL fragment.
    ///
    /// Safe to call unconditionally on page load: no fragment, or a fragment
    /// that does not decode into the expected payload, resolves to
    /// `Ok(None)` with no session established. Whenever a fragment was
    /// present it is stripped from the visible URL before this returns,
    /// success or not — it carries a bearer token that must not linger in
    /// history.
    ///
    /// # Errors
    ///
    /// [`Error::UnauthorizedDomain`] when the email is outside the
    /// institutional domain (nothing is persisted),
    /// [`Error::StorageWrite`] when persistence fails.
    pub fn process_redirect_fragment(&self) -> Result<Option<UserProfile>, Error> {
        let Some(fragment) = self.navigator.fragment() else {
            return Ok(None);
        };
        let outcome = self.consume_fragment(&fragment);
        self.navigator.strip_fragment();
        outcome
    }

    fn consume_fragment(&self, fragment: &str) -> Result<Option<UserProfile>, Error> {
        let decoded = match urlencoding::decode(fragment) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "fragment is not valid percent-encoding");
                return Ok(None);
            }
        };
        let payload: RedirectPayload = match serde_json::from_str(&decoded) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "fragment did not decode into an auth payload");
                return Ok(None);
            }
        };

        let Some(grant) = payload.token else {
            tracing::warn!("auth payload carried no token object");
            return Ok(None);
        };
        let (Some(token), Some(stamp)) =
            (grant.access_token.filter(|t| !t.is_empty()), grant.expires_at)
        else {
            tracing::warn!("auth payload is missing token fields");
            return Ok(None);
        };
        let Ok(expires_at) = OffsetDateTime::parse(&stamp, &Rfc3339) else {
            tracing::warn!(%stamp, "auth payload expiry is not a valid timestamp");
            return Ok(None);
        };
        if expires_at <= OffsetDateTime::now_utc() {
            tracing::warn!(%stamp, "auth payload arrived already expired");
            return Ok(None);
        }

        // Domain allow-list: the provider authenticates any Microsoft
        // account, not only institutional ones. Runs before any persistence.
        let email = payload.email.clone().unwrap_or_default();
        let domain = self.config.email_domain();
        if !email.to_lowercase().ends_with(&domain.to_lowercase()) {
            tracing::warn!(%email, "federated login rejected: non-institutional address");
            return Err(Error::UnauthorizedDomain {
                email,
                domain: domain.to_owned(),
            });
        }

        let raw = RawUserRecord {
            id: payload.user_id.clone(),
            user_id: payload.user_id,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            is_active: payload.is_active,
            has_image: payload.has_image,
            phone: payload.phone,
            ..RawUserRecord::default()
        };
        let user = normalize(&raw);
        if user.id.is_none() {
            tracing::warn!("auth payload carried no user identifier");
            return Ok(None);
        }

        self.persist_session(&token, expires_at, &user)?;

        tracing::info!(user = %user.id.as_ref().map_or("", UserId::as_str), "federated login successful");
        Ok(Some(user))
    }

    /// Token first, then profile; a failed profile write rolls the token
    /// back so no half-saved session survives.
    fn persist_session(
        &self,
        token: &str,
        expires_at: OffsetDateTime,
        user: &UserProfile,
    ) -> Result<(), Error> {
        self.vault.save_token(token, expires_at);
        if self.vault.token().is_none() {
            return Err(Error::StorageWrite);
        }
        if !self.vault.save_profile(user) {
            self.vault.clear_all();
            return Err(Error::StorageWrite);
        }
        Ok(())
    }
}
