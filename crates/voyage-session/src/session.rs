//! Session and request data structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The user object as the server sends it.
///
/// Only string values are lifted into the named fields. Everything else the
/// server sends stays in `extra`, so the object round-trips through storage
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub extra: Map<String, Value>,
}

const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";
const EMAIL: &str = "email";
const PHONE: &str = "phone";

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(value)) => Some(value),
        Some(other) => {
            fields.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

impl From<Map<String, Value>> for UserProfile {
    fn from(mut fields: Map<String, Value>) -> Self {
        Self {
            first_name: take_string(&mut fields, FIRST_NAME),
            last_name: take_string(&mut fields, LAST_NAME),
            email: take_string(&mut fields, EMAIL),
            phone: take_string(&mut fields, PHONE),
            extra: fields,
        }
    }
}

impl From<UserProfile> for Map<String, Value> {
    fn from(user: UserProfile) -> Self {
        let mut fields = user.extra;
        for (key, value) in [
            (FIRST_NAME, user.first_name),
            (LAST_NAME, user.last_name),
            (EMAIL, user.email),
            (PHONE, user.phone),
        ] {
            if let Some(value) = value {
                fields.insert(key.to_string(), Value::String(value));
            }
        }
        fields
    }
}

impl UserProfile {
    /// "First Last", falling back to the email address.
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.email.clone().unwrap_or_default()
        } else {
            name
        }
    }
}

/// Who is logged in. Present whenever an access token is held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty() && self.user.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-up form. Fields the server defines beyond these go in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_profile_keeps_server_fields() {
        let raw = json!({
            "firstName": "Ana",
            "lastName": "Lima",
            "email": "ana@example.com",
            "id": 42,
            "role": "traveller",
            "preferences": {"currency": "EUR"}
        });

        let user: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ana"));
        assert_eq!(user.phone, None);
        assert_eq!(user.extra["id"], 42);

        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_user_profile_tolerates_non_string_fields() {
        let raw = json!({
            "firstName": "Ana",
            "email": "ana@example.com",
            "phone": 5551234,
            "lastName": null
        });

        let user: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.email.as_deref(), Some("ana@example.com"));
        assert_eq!(user.phone, None);
        assert_eq!(user.last_name, None);
        assert_eq!(user.extra["phone"], 5551234);
        assert_eq!(user.display_name(), "Ana");

        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_user_profile_rejects_non_object() {
        assert!(serde_json::from_value::<UserProfile>(json!("ana")).is_err());
    }

    #[test]
    fn test_display_name() {
        let mut user = UserProfile {
            email: Some("ana@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "ana@example.com");

        user.first_name = Some("Ana".to_string());
        assert_eq!(user.display_name(), "Ana");

        user.last_name = Some("Lima".to_string());
        assert_eq!(user.display_name(), "Ana Lima");
    }

    #[test]
    fn test_session_requires_user() {
        let mut session = Session {
            access_token: "tok".to_string(),
            refresh_token: None,
            user: None,
        };
        assert!(!session.is_authenticated());

        session.user = Some(UserProfile::default());
        assert!(session.is_authenticated());

        session.access_token.clear();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_profile_update_omits_unset_password() {
        let update = ProfileUpdate {
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            new_password: None,
        };

        let body = serde_json::to_value(&update).unwrap();
        assert!(body.get("newPassword").is_none());
        assert_eq!(body["firstName"], "Ana");
    }
}
