use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::impl_tracked;
use crate::enums::{EntityKind, NotificationLevel};

/// An inbox message. A `None` recipient is a global, unaddressed message.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub level: NotificationLevel,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: Option<i64>,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub level: NotificationLevel,
    #[serde(default)]
    pub link: String,
}

impl NewNotification {
    /// An `info` message with no link.
    #[must_use]
    pub fn new(
        recipient_id: Option<i64>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::Info,
            link: String::new(),
        }
    }

    #[must_use]
    pub const fn with_level(mut self, level: NotificationLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl_tracked!(Notification, EntityKind::Notification);
