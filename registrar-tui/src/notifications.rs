//! Notification system for the TUI.

use chrono::{DateTime, Duration, Utc};

/// How long a notification stays in the footer.
pub const NOTIFICATION_TTL_SECS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::seconds(NOTIFICATION_TTL_SECS)
    }
}

/// Most recent notifications first, bounded.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Vec<Notification>,
}

impl NotificationQueue {
    const CAPACITY: usize = 16;

    pub fn push(&mut self, notification: Notification) {
        self.items.insert(0, notification);
        self.items.truncate(Self::CAPACITY);
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.first()
    }

    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.items.retain(|item| !item.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
