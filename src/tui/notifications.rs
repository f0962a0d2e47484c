//! Notification management for TUI
//!
//! Short-lived messages shown on top of the log list. Pushing never blocks
//! and notifications expire on their own.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Types of notifications that can be displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    /// Informational message
    Info { message: String },
    /// Something failed but the session carries on
    Error { message: String },
}

impl NotificationType {
    pub fn info(message: impl Into<String>) -> Self {
        NotificationType::Info {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        NotificationType::Error {
            message: message.into(),
        }
    }

    /// Get a title for this notification type
    pub fn title(&self) -> &str {
        match self {
            NotificationType::Info { .. } => "Info",
            NotificationType::Error { .. } => "Error",
        }
    }

    /// Get the message content
    pub fn message(&self) -> &str {
        match self {
            NotificationType::Info { message } | NotificationType::Error { message } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NotificationType::Error { .. })
    }
}

/// A notification to be displayed
#[derive(Debug, Clone)]
pub struct Notification {
    /// Unique identifier
    pub id: Uuid,
    /// Type and content of notification
    pub notification_type: NotificationType,
    /// When the notification was created
    pub created_at: Instant,
    /// How long before auto-dismiss (None = manual dismiss only)
    pub auto_dismiss: Option<Duration>,
}

impl Notification {
    /// Create a new notification
    pub fn new(notification_type: NotificationType, auto_dismiss: Option<Duration>) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type,
            created_at: Instant::now(),
            auto_dismiss,
        }
    }

    /// Check if this notification should be dismissed
    pub fn should_dismiss(&self) -> bool {
        self.auto_dismiss
            .is_some_and(|duration| self.created_at.elapsed() >= duration)
    }
}

/// Manages a queue of notifications
#[derive(Debug)]
pub struct NotificationManager {
    /// Active notifications
    notifications: VecDeque<Notification>,
    /// Maximum number of visible notifications
    max_visible: usize,
}

impl NotificationManager {
    /// Create a new notification manager
    pub fn new(max_visible: usize) -> Self {
        Self {
            notifications: VecDeque::new(),
            max_visible,
        }
    }

    /// Push a new notification
    pub fn push(&mut self, notification_type: NotificationType, auto_dismiss: Option<Duration>) {
        self.notifications
            .push_back(Notification::new(notification_type, auto_dismiss));

        // Trim excess notifications (oldest first)
        while self.notifications.len() > self.max_visible * 2 {
            self.notifications.pop_front();
        }
    }

    /// Remove expired notifications
    ///
    /// Returns true if anything was removed.
    pub fn tick(&mut self) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.should_dismiss());
        self.notifications.len() != before
    }

    /// Get visible notifications (most recent first, up to max_visible)
    pub fn visible(&self) -> Vec<&Notification> {
        self.notifications
            .iter()
            .rev()
            .take(self.max_visible)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new(3)
    }
}
