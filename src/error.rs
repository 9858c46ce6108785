/// Errors produced by the session subsystem.
///
/// Storage-substrate failures never surface here: the persistence adapter
/// converts them to absent reads and `false` writes (see
/// [`SessionVault`](crate::vault::SessionVault)). Everything from the
/// credential flows upward is `Result`-based and meant to be caught by the
/// page-level caller for display.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Network failure or timeout reaching the API. Recoverable by user
    /// retry; never retried automatically.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The login endpoint rejected the credentials. Carries the
    /// server-provided message when one was available.
    #[error("{0}")]
    AuthenticationFailed(String),

    /// The server answered 2xx but the body was malformed or lacked
    /// required fields.
    #[error("invalid server response: {0}")]
    InvalidServerResponse(&'static str),

    /// The identity provider authenticated the account, but its email is
    /// outside the institutional domain. An intentional policy rejection,
    /// not a bug; surfaced distinctly so the UI can say so.
    #[error("access denied: {email} does not belong to the {domain} domain")]
    UnauthorizedDomain { email: String, domain: String },

    /// The persistence layer could not complete a write; no half-saved
    /// session is left behind.
    #[error("could not save your session, please try again")]
    StorageWrite,

    /// The registration endpoint rejected the submission; carries the
    /// server's validation text verbatim.
    #[error("registration failed: {0}")]
    Registration(String),

    /// An authorized API call came back 401. By the time this reaches the
    /// caller the session has already been torn down and navigation to the
    /// login page issued.
    #[error("session is no longer valid")]
    Unauthorized,

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
