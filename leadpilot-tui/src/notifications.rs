//! Toast notifications.

use chrono::{DateTime, Duration, Utc};
use leadpilot_core::ClientError;

/// How long a toast stays on screen.
pub const TOAST_TTL_SECS: i64 = 6;
/// Toasts beyond this count push out the oldest.
pub const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "OK",
        }
    }
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

    pub fn error(err: &ClientError) -> Self {
        Self::new(NotificationLevel::Error, err.to_string())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::seconds(TOAST_TTL_SECS)
    }
}

/// Bounded, self-expiring toast stack.
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    items: Vec<Notification>,
}

impl Toasts {
    pub fn push(&mut self, notification: Notification) {
        self.items.push(notification);
        if self.items.len() > MAX_TOASTS {
            let overflow = self.items.len() - MAX_TOASTS;
            self.items.drain(..overflow);
        }
    }

    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.items.retain(|n| !n.is_expired(now));
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_are_bounded() {
        let mut toasts = Toasts::default();
        for i in 0..(MAX_TOASTS + 3) {
            toasts.push(Notification::new(NotificationLevel::Info, format!("n{i}")));
        }
        assert_eq!(toasts.len(), MAX_TOASTS);
        assert_eq!(
            toasts.latest().map(|n| n.message.as_str()),
            Some(format!("n{}", MAX_TOASTS + 2).as_str())
        );
    }

    #[test]
    fn expired_toasts_are_pruned() {
        let mut toasts = Toasts::default();
        let mut old = Notification::new(NotificationLevel::Success, "saved");
        old.created_at = Utc::now() - Duration::seconds(TOAST_TTL_SECS + 1);
        toasts.push(old);
        toasts.push(Notification::error(&ClientError::http(500, "boom")));
        toasts.prune(Utc::now());
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.latest().map(|n| n.level), Some(NotificationLevel::Error));
    }
}
