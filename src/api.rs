use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;

use crate::browser::Navigator;
use crate::config::AuthConfig;
use crate::error::Error;
use crate::session::Session;

/// Authorized HTTP gateway for the resource endpoints (`/Questions`,
/// `/Responses`, `/Hashtags`).
///
/// Attaches the bearer header to every request and applies the global 401
/// policy: any unauthorized response tears the session down and sends the
/// user to the login page before the error reaches the caller. Blunt on
/// purpose — a malformed token and a legitimately expired one both collapse
/// to full teardown.
#[derive(Clone)]
pub struct ApiClient {
    config: AuthConfig,
    http: reqwest::Client,
    session: Session,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: AuthConfig, session: Session, navigator: Arc<dyn Navigator>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            config,
            http,
            session,
            navigator,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Header map for an outbound API call: JSON content type always, plus
    /// `Authorization: Bearer <token>` when a live token exists.
    #[must_use]
    pub fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.session.token()
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// `GET` a resource path relative to the API base.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure, [`Error::Unauthorized`] on a
    /// 401 (after session teardown).
    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        self.execute(self.http.get(self.url(path)).headers(self.auth_headers()))
            .await
    }

    /// `POST` a JSON body to a resource path.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure, [`Error::Unauthorized`] on a
    /// 401 (after session teardown).
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, Error> {
        self.execute(
            self.http
                .post(self.url(path))
                .headers(self.auth_headers())
                .json(body),
        )
        .await
    }

    /// `DELETE` a resource path.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure, [`Error::Unauthorized`] on a
    /// 401 (after session teardown).
    pub async fn delete(&self, path: &str) -> Result<Response, Error> {
        self.execute(self.http.delete(self.url(path)).headers(self.auth_headers()))
            .await
    }

    /// Send a prepared request, applying the 401 policy.
    ///
    /// The teardown side effect runs before the error is returned, so the
    /// caller's error path still executes — and should tolerate the page
    /// already navigating away.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on network failure, [`Error::Unauthorized`] on a
    /// 401.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("API answered 401, tearing the session down");
            self.session.logout();
            self.navigator.assign(self.config.login_path());
            return Err(Error::Unauthorized);
        }
        Ok(response)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url().as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
