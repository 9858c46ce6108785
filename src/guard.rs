use std::sync::Arc;

use crate::browser::Navigator;
use crate::session::Session;

/// Guard outcome. `Authorized` and `Redirecting` are terminal for the mount;
/// a fresh page mount gets a fresh guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The check has not run yet; render a loading placeholder.
    Checking,
    /// Render the protected content.
    Authorized,
    /// Render nothing; navigation to the login page has been issued.
    Redirecting,
}

/// Render gate for protected pages.
///
/// ```rust,ignore
/// let mut guard = RouteGuard::new(session, navigator, "/login");
/// match guard.resolve() {
///     GuardState::Authorized => render_children(),
///     _ => render_placeholder(),
/// }
/// ```
pub struct RouteGuard {
    session: Session,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    state: GuardState,
}

impl RouteGuard {
    #[must_use]
    pub fn new(
        session: Session,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            navigator,
            login_path: login_path.into(),
            state: GuardState::Checking,
        }
    }

    /// Current state without running the check.
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Run the authentication check once.
    ///
    /// The first call moves `Checking` to a terminal state. The redirect is
    /// a replace navigation, so back cannot land on the guarded page. Later
    /// calls return the terminal state without re-checking or re-navigating.
    pub fn resolve(&mut self) -> GuardState {
        if self.state == GuardState::Checking {
            if self.session.is_authenticated() {
                self.state = GuardState::Authorized;
            } else {
                tracing::debug!("unauthenticated visit to a guarded page");
                self.navigator.replace(&self.login_path);
                self.state = GuardState::Redirecting;
            }
        }
        self.state
    }
}
