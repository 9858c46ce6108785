use derive_more::{Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize};

/// JOOL user identifier (opaque).
///
/// The login API returns it as a JSON number, the federated redirect payload
/// as a string; both deserialize into the same newtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(i64),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => Self(s),
            Wire::Number(n) => Self(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_from_string() {
        let id: UserId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id, UserId::from("42"));
    }

    #[test]
    fn user_id_from_number() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id, UserId::from("42"));
    }

    #[test]
    fn user_id_serializes_as_string() {
        let json = serde_json::to_string(&UserId::from("abc-7")).unwrap();
        assert_eq!(json, "\"abc-7\"");
    }

    #[test]
    fn user_id_display() {
        assert_eq!(UserId::from("user-123").to_string(), "user-123");
    }
}
