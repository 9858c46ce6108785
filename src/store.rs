//! Storage substrates.
//!
//! The session state lives in two places a browser provides for free: a
//! cookie store (bearer token + expiry stamp) and a local key-value store
//! (user profile blob). Both are abstracted behind traits so the rest of the
//! crate never reaches into ambient storage directly — embedders inject the
//! real substrates, tests inject the in-memory ones.

use std::collections::HashMap;

use cookie::{Cookie, Expiration};
use parking_lot::Mutex;
use time::OffsetDateTime;

/// Boxed error for storage substrates.
///
/// The persistence adapter converts failures to absent/boolean results, so
/// implementors may use any error type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Cookie substrate.
///
/// Browser embedders back this with `document.cookie`; native embedders and
/// tests use [`MemoryCookieStore`].
pub trait CookieStore: Send + Sync + 'static {
    /// Write a cookie, honoring its attributes (expiration, `Secure`,
    /// `SameSite`, path).
    fn set(&self, cookie: Cookie<'static>) -> Result<(), StoreError>;

    /// Read a cookie value by name. Read failures surface as `None`.
    fn get(&self, name: &str) -> Option<String>;

    /// Delete a cookie by name.
    fn remove(&self, name: &str);
}

/// Local key-value substrate (the browser's `localStorage`).
pub trait LocalStore: Send + Sync + 'static {
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Read failures surface as `None`.
    fn get(&self, key: &str) -> Option<String>;

    fn remove(&self, key: &str);
}

struct StoredCookie {
    value: String,
    expires: Option<OffsetDateTime>,
}

/// In-memory cookie store.
///
/// Mirrors browser behavior closely enough for the session manager: an
/// expired cookie is purged on access, so the application-level expiry stamp
/// can be tested independently of the cookie mechanism's own TTL.
#[derive(Default)]
pub struct MemoryCookieStore {
    jar: Mutex<HashMap<String, StoredCookie>>,
}

impl MemoryCookieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn set(&self, cookie: Cookie<'static>) -> Result<(), StoreError> {
        let expires = match cookie.expires() {
            Some(Expiration::DateTime(at)) => Some(at),
            _ => None,
        };
        self.jar.lock().insert(
            cookie.name().to_owned(),
            StoredCookie {
                value: cookie.value().to_owned(),
                expires,
            },
        );
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        let mut jar = self.jar.lock();
        let expired = jar
            .get(name)
            .is_some_and(|c| c.expires.is_some_and(|at| at <= OffsetDateTime::now_utc()));
        if expired {
            jar.remove(name);
            return None;
        }
        jar.get(name).map(|c| c.value.clone())
    }

    fn remove(&self, name: &str) {
        self.jar.lock().remove(name);
    }
}

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryLocalStore {
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn cookie_roundtrip() {
        let store = MemoryCookieStore::new();
        store
            .set(Cookie::build(("token", "abc")).build())
            .unwrap();
        assert_eq!(store.get("token"), Some("abc".to_owned()));

        store.remove("token");
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn expired_cookie_is_purged_on_access() {
        let store = MemoryCookieStore::new();
        let stale = Cookie::build(("token", "abc"))
            .expires(OffsetDateTime::now_utc() - Duration::minutes(1))
            .build();
        store.set(stale).unwrap();

        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn future_expiry_keeps_cookie_alive() {
        let store = MemoryCookieStore::new();
        let live = Cookie::build(("token", "abc"))
            .expires(OffsetDateTime::now_utc() + Duration::hours(1))
            .build();
        store.set(live).unwrap();

        assert_eq!(store.get("token"), Some("abc".to_owned()));
    }

    #[test]
    fn local_store_roundtrip() {
        let store = MemoryLocalStore::new();
        store.set("user_data", "{}").unwrap();
        assert_eq!(store.get("user_data"), Some("{}".to_owned()));

        store.remove("user_data");
        assert_eq!(store.get("user_data"), None);
    }
}
