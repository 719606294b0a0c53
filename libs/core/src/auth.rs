use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Credential pair handed out by login and rotated on every refresh.
///
/// Exactly one valid pair exists per session; it is overwritten in place and
/// deleted on logout or when a refresh fails terminally.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: "bearer".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Staff,
    Driver,
    Chef,
    Assistant,
    Cleaner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Driver => "driver",
            Role::Chef => "chef",
            Role::Assistant => "assistant",
            Role::Cleaner => "cleaner",
        }
    }

    /// Owners and managers see the management surfaces of the dashboard.
    pub fn is_management(&self) -> bool {
        matches!(self, Role::Owner | Role::Manager)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Persisted UI theme preference.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_as_snake_case() {
        let json = serde_json::to_string(&Role::Chef).unwrap();
        assert_eq!(json, r#""chef""#);
        let parsed: Role = serde_json::from_str(r#""manager""#).unwrap();
        assert_eq!(parsed, Role::Manager);
    }

    #[test]
    fn token_pair_defaults_to_bearer() {
        let pair = TokenPair::bearer("a", "r");
        assert_eq!(pair.token_type, "bearer");
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_str(
            r#"{
                "id": 7,
                "email": "sam@example.com",
                "full_name": "Sam Staff",
                "role": "staff",
                "is_active": true,
                "created_at": "2026-01-05T09:30:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(user.phone, None);
        assert!(user.is_active);
        assert!(!user.role.is_management());
    }
}
