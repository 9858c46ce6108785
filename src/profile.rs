//! User-record normalization.
//!
//! The login API and the federated redirect payload historically disagree on
//! field naming for the same record: `user_id`/`first_name`/`is_active` from
//! one producer, `id`/`firstName`/`isActive` from the other. Rather than
//! scattering `field || other_field` fallbacks through consumers, everything
//! funnels through [`normalize`], and the canonical [`UserProfile`] is stored
//! carrying *both* aliases so a consumer reading either convention succeeds.

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// User record as it appears on the wire: every field optional, both naming
/// conventions as separate fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct RawUserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name_camel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active_camel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_image: Option<bool>,
    #[serde(default, rename = "hasImage", skip_serializing_if = "Option::is_none")]
    pub has_image_camel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Canonical user profile.
///
/// Deserializes from either naming convention; serializes with both aliases
/// populated. A profile may come out of [`normalize`] without an identifier —
/// consumers must treat such a record as invalid rather than defaulting one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawUserRecord", into = "RawUserRecord")]
pub struct UserProfile {
    pub id: Option<UserId>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_active: Option<bool>,
    pub has_image: Option<bool>,
    pub phone: Option<String>,
}

/// Reconciles the two wire conventions into the canonical shape.
///
/// First non-empty value wins for the identifier and name fields. Name fields
/// default to empty strings; everything else stays absent when absent in both
/// conventions.
#[must_use]
pub fn normalize(raw: &RawUserRecord) -> UserProfile {
    UserProfile {
        id: non_empty_id(&raw.id).or_else(|| non_empty_id(&raw.user_id)),
        email: raw.email.clone(),
        first_name: non_empty(&raw.first_name)
            .or_else(|| non_empty(&raw.first_name_camel))
            .unwrap_or_default(),
        last_name: non_empty(&raw.last_name)
            .or_else(|| non_empty(&raw.last_name_camel))
            .unwrap_or_default(),
        is_active: raw.is_active.or(raw.is_active_camel),
        has_image: raw.has_image.or(raw.has_image_camel),
        phone: raw.phone.clone(),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn non_empty_id(value: &Option<UserId>) -> Option<UserId> {
    value.as_ref().filter(|id| !id.as_str().is_empty()).cloned()
}

impl From<RawUserRecord> for UserProfile {
    fn from(raw: RawUserRecord) -> Self {
        normalize(&raw)
    }
}

impl From<UserProfile> for RawUserRecord {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            user_id: profile.id,
            email: profile.email,
            first_name: Some(profile.first_name.clone()),
            first_name_camel: Some(profile.first_name),
            last_name: Some(profile.last_name.clone()),
            last_name_camel: Some(profile.last_name),
            is_active: profile.is_active,
            is_active_camel: profile.is_active,
            has_image: profile.has_image,
            has_image_camel: profile.has_image,
            phone: profile.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_record() -> RawUserRecord {
        RawUserRecord {
            user_id: Some(UserId::from("17")),
            email: Some("student@merida.tecnm.mx".into()),
            first_name: Some("Ana".into()),
            last_name: Some("Pech".into()),
            is_active: Some(true),
            ..RawUserRecord::default()
        }
    }

    #[test]
    fn normalize_picks_whichever_convention_is_present() {
        let profile = normalize(&snake_record());
        assert_eq!(profile.id, Some(UserId::from("17")));
        assert_eq!(profile.first_name, "Ana");

        let camel = RawUserRecord {
            id: Some(UserId::from("17")),
            first_name_camel: Some("Ana".into()),
            last_name_camel: Some("Pech".into()),
            ..RawUserRecord::default()
        };
        let profile = normalize(&camel);
        assert_eq!(profile.id, Some(UserId::from("17")));
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "Pech");
    }

    #[test]
    fn normalize_first_non_empty_wins() {
        let raw = RawUserRecord {
            id: Some(UserId::from("")),
            user_id: Some(UserId::from("23")),
            first_name: Some(String::new()),
            first_name_camel: Some("Luis".into()),
            ..RawUserRecord::default()
        };
        let profile = normalize(&raw);
        assert_eq!(profile.id, Some(UserId::from("23")));
        assert_eq!(profile.first_name, "Luis");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize(&snake_record());
        let twice = normalize(&RawUserRecord::from(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_does_not_fabricate_absent_fields() {
        let profile = normalize(&RawUserRecord::default());
        assert_eq!(profile.id, None);
        assert_eq!(profile.email, None);
        assert_eq!(profile.is_active, None);
        assert_eq!(profile.has_image, None);
        assert_eq!(profile.phone, None);
        // name fields are the exception: they default to empty strings
        assert_eq!(profile.first_name, "");
        assert_eq!(profile.last_name, "");
    }

    #[test]
    fn serialized_profile_carries_both_aliases() {
        let profile = normalize(&snake_record());
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["id"], "17");
        assert_eq!(value["user_id"], "17");
        assert_eq!(value["first_name"], "Ana");
        assert_eq!(value["firstName"], "Ana");
        assert_eq!(value["last_name"], "Pech");
        assert_eq!(value["lastName"], "Pech");
        assert_eq!(value["is_active"], true);
        assert_eq!(value["isActive"], true);
    }

    #[test]
    fn absent_flags_stay_absent_in_storage() {
        let profile = normalize(&RawUserRecord {
            user_id: Some(UserId::from("9")),
            ..RawUserRecord::default()
        });
        let value = serde_json::to_value(&profile).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("is_active"));
        assert!(!object.contains_key("isActive"));
        assert!(!object.contains_key("has_image"));
        assert!(!object.contains_key("phone"));
    }

    #[test]
    fn deserializes_from_either_convention() {
        let snake: UserProfile = serde_json::from_str(
            r#"{"user_id": 5, "first_name": "Ana", "is_active": true}"#,
        )
        .unwrap();
        assert_eq!(snake.id, Some(UserId::from("5")));
        assert_eq!(snake.first_name, "Ana");
        assert_eq!(snake.is_active, Some(true));

        let camel: UserProfile =
            serde_json::from_str(r#"{"id": "5", "firstName": "Ana", "isActive": true}"#).unwrap();
        assert_eq!(camel, snake);
    }

    #[test]
    fn numeric_identifier_accepted() {
        let profile: UserProfile = serde_json::from_str(r#"{"user_id": 1024}"#).unwrap();
        assert_eq!(profile.id, Some(UserId::from("1024")));
    }
}
