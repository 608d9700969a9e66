//! Identity-provider lifecycle events delivered to the blocking hooks.
//!
//! Every field is optional on the wire; absent fields deserialize to `None`
//! rather than failing the whole event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which lifecycle step fired the event.
///
/// Accepts both the short form (`beforeCreate`) and the provider's qualified
/// form (`providers/cloud.auth/eventTypes/user.beforeCreate:password`).
/// Anything else is kept verbatim in `Other`; the gate never looks at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Fired before an account is created.
    BeforeCreate,
    /// Fired before an existing account signs in.
    BeforeSignIn,
    Other(String),
}

impl EventType {
    pub fn parse(raw: &str) -> Self {
        let step = raw.rsplit('/').next().unwrap_or(raw);
        let step = step.strip_prefix("user.").unwrap_or(step);
        let step = step.split(':').next().unwrap_or(step);
        match step {
            "beforeCreate" => EventType::BeforeCreate,
            "beforeSignIn" => EventType::BeforeSignIn,
            _ => EventType::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::BeforeCreate => "beforeCreate",
            EventType::BeforeSignIn => "beforeSignIn",
            EventType::Other(raw) => raw,
        }
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of the account the event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub provider_id: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleEvent {
    pub event_id: Option<String>,
    pub event_type: Option<EventType>,
    pub timestamp: Option<DateTime<Utc>>,
    pub data: Option<UserRecord>,
}

impl LifecycleEvent {
    /// Event carrying only a candidate email.
    pub fn for_email(event_type: EventType, email: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type),
            data: Some(UserRecord {
                email: Some(email.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Candidate email, trimmed; `None` when absent or blank.
    pub fn email(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn uid(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.uid.as_deref())
    }
}
