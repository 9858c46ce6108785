//! Navigation seam.
//!
//! The session subsystem needs four things from its host page: read the URL
//! fragment, scrub it, and drive push/replace navigations. Browser embedders
//! map these onto `window.location` and `history.replaceState`;
//! [`MemoryNavigator`] serves native embedders and tests.

use parking_lot::Mutex;

/// Host-page location and navigation operations.
pub trait Navigator: Send + Sync + 'static {
    /// Current URL fragment, without the leading `#`. `None` when the URL
    /// carries no fragment.
    fn fragment(&self) -> Option<String>;

    /// Remove the fragment from the visible URL without adding a history
    /// entry. Called after the fragment payload has been consumed — it may
    /// contain a bearer token that must not linger in history.
    fn strip_fragment(&self);

    /// Push navigation.
    fn assign(&self, url: &str);

    /// Replace navigation — back cannot return to the current page.
    fn replace(&self, url: &str);
}

#[derive(Default)]
struct Recorded {
    fragment: Option<String>,
    assigned: Vec<String>,
    replaced: Vec<String>,
}

/// Recording navigator for tests and native embedders.
#[derive(Default)]
pub struct MemoryNavigator {
    state: Mutex<Recorded>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator whose page URL carries the given fragment.
    #[must_use]
    pub fn with_fragment(fragment: impl Into<String>) -> Self {
        let nav = Self::new();
        nav.state.lock().fragment = Some(fragment.into());
        nav
    }

    pub fn set_fragment(&self, fragment: impl Into<String>) {
        self.state.lock().fragment = Some(fragment.into());
    }

    /// URLs passed to [`Navigator::assign`], oldest first.
    #[must_use]
    pub fn assigned(&self) -> Vec<String> {
        self.state.lock().assigned.clone()
    }

    /// URLs passed to [`Navigator::replace`], oldest first.
    #[must_use]
    pub fn replaced(&self) -> Vec<String> {
        self.state.lock().replaced.clone()
    }
}

impl Navigator for MemoryNavigator {
    fn fragment(&self) -> Option<String> {
        self.state.lock().fragment.clone()
    }

    fn strip_fragment(&self) {
        self.state.lock().fragment = None;
    }

    fn assign(&self, url: &str) {
        self.state.lock().assigned.push(url.to_owned());
    }

    fn replace(&self, url: &str) {
        self.state.lock().replaced.push(url.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_lifecycle() {
        let nav = MemoryNavigator::with_fragment("payload");
        assert_eq!(nav.fragment(), Some("payload".to_owned()));

        nav.strip_fragment();
        assert_eq!(nav.fragment(), None);
    }

    #[test]
    fn records_navigations_separately() {
        let nav = MemoryNavigator::new();
        nav.assign("/feed");
        nav.replace("/login");

        assert_eq!(nav.assigned(), vec!["/feed".to_owned()]);
        assert_eq!(nav.replaced(), vec!["/login".to_owned()]);
    }
}
