use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_EMAIL_DOMAIN: &str = "@merida.tecnm.mx";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JOOL API endpoints and session policy.
///
/// The required field is a constructor parameter — no runtime "missing field"
/// errors.
///
/// ```rust,ignore
/// use jool_session::AuthConfig;
///
/// let config = AuthConfig::new("https://api.jool.example".parse()?);
/// // Optional overrides via chaining:
/// let config = config.with_email_domain("@campus.example.mx");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AuthConfig {
    pub(crate) base_url: Url,
    pub(crate) email_domain: String,
    pub(crate) login_path: String,
    pub(crate) request_timeout: Duration,
    pub(crate) secure_cookies: bool,
}

impl AuthConfig {
    /// Create a configuration for the API at `base_url`.
    ///
    /// All optional fields use defaults matching the production deployment.
    /// Override with `with_*` methods.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            email_domain: DEFAULT_EMAIL_DOMAIN.into(),
            login_path: DEFAULT_LOGIN_PATH.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            secure_cookies: true,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `JOOL_API_URL`: base URL of the JOOL REST API (must be a valid URL)
    ///
    /// # Optional env vars
    /// - `JOOL_EMAIL_DOMAIN`: institutional email suffix accepted from the
    ///   identity provider
    /// - `JOOL_LOGIN_PATH`: client-side route of the login page
    /// - `JOOL_DEV`: set to `"1"` or `"true"` to disable the `Secure` cookie
    ///   flag for plain-http development
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `JOOL_API_URL` is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let base = std::env::var("JOOL_API_URL")
            .map_err(|_| Error::Config("JOOL_API_URL is required".into()))?;
        let base_url: Url = base
            .parse()
            .map_err(|e| Error::Config(format!("JOOL_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Ok(domain) = std::env::var("JOOL_EMAIL_DOMAIN") {
            config = config.with_email_domain(domain);
        }
        if let Ok(path) = std::env::var("JOOL_LOGIN_PATH") {
            config = config.with_login_path(path);
        }
        let dev = matches!(std::env::var("JOOL_DEV").as_deref(), Ok("1") | Ok("true"));
        if dev {
            config = config.with_secure_cookies(false);
        }

        Ok(config)
    }

    /// Override the institutional email suffix (default `@merida.tecnm.mx`).
    #[must_use]
    pub fn with_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.email_domain = domain.into();
        self
    }

    /// Override the login page route (default `/login`).
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Override the outbound request timeout (default 10 seconds).
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Toggle the `Secure` attribute on session cookies (default on).
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Base URL of the JOOL REST API.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Institutional email suffix required of federated logins.
    #[must_use]
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }

    /// Client-side route of the login page.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Outbound request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether session cookies carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// `POST` target for direct login.
    #[must_use]
    pub fn login_url(&self) -> String {
        self.endpoint("Auth/login")
    }

    /// `POST` target for account registration.
    #[must_use]
    pub fn register_url(&self) -> String {
        self.endpoint("Auth/register")
    }

    /// `GET` target that hands out the identity-provider redirect URL.
    #[must_use]
    pub fn microsoft_login_url(&self) -> String {
        self.endpoint("Auth/login-microsoft")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::new("https://api.jool.example".parse().unwrap())
    }

    #[test]
    fn endpoints_derive_from_base_url() {
        let config = test_config();
        assert_eq!(config.login_url(), "https://api.jool.example/Auth/login");
        assert_eq!(config.register_url(), "https://api.jool.example/Auth/register");
        assert_eq!(
            config.microsoft_login_url(),
            "https://api.jool.example/Auth/login-microsoft"
        );
    }

    #[test]
    fn endpoints_tolerate_trailing_slash() {
        let config = AuthConfig::new("https://api.jool.example/".parse().unwrap());
        assert_eq!(config.login_url(), "https://api.jool.example/Auth/login");
    }

    #[test]
    fn defaults() {
        let config = test_config();
        assert_eq!(config.email_domain(), "@merida.tecnm.mx");
        assert_eq!(config.login_path(), "/login");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.secure_cookies());
    }

    #[test]
    fn overrides_chain() {
        let config = test_config()
            .with_email_domain("@campus.example.mx")
            .with_login_path("/signin")
            .with_secure_cookies(false);

        assert_eq!(config.email_domain(), "@campus.example.mx");
        assert_eq!(config.login_path(), "/signin");
        assert!(!config.secure_cookies());
    }
}
