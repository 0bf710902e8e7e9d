use chrono::{DateTime, NaiveDateTime};

use crate::api::{ChatReply, HistoryEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_bot(self) -> bool {
        self == Role::Bot
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "bot" => Ok(Role::Bot),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

/// One entry in the conversation log. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub intent: Option<String>,
    pub matched_keyword: Option<String>,
    /// Backend row id, only known for hydrated history.
    pub id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            intent: None,
            matched_keyword: None,
            id: None,
            created_at: None,
        }
    }

    pub fn bot(
        text: impl Into<String>,
        intent: Option<String>,
        matched_keyword: Option<String>,
    ) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            intent: intent.filter(|s| !s.is_empty()),
            matched_keyword: matched_keyword.filter(|s| !s.is_empty()),
            id: None,
            created_at: None,
        }
    }

    pub fn from_reply(reply: &ChatReply) -> Self {
        Self::bot(
            reply.reply.clone(),
            Some(reply.intent.clone()),
            reply.matched_keyword.clone(),
        )
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_bot(&self) -> bool {
        self.role.is_bot()
    }
}

impl TryFrom<HistoryEntry> for Message {
    type Error = String;

    fn try_from(entry: HistoryEntry) -> Result<Self, Self::Error> {
        let role = Role::try_from(entry.role.as_str())?;
        Ok(Self {
            role,
            text: entry.content,
            intent: entry.intent.filter(|s| !s.is_empty()),
            matched_keyword: None,
            id: entry.id,
            created_at: entry.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// History timestamps come from SQLite `CURRENT_TIMESTAMP` via the backend,
/// usually without an offset; RFC 3339 values are accepted too.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
