//! # Notifications
//!
//! Transient messages for the cashier. Every rejected operation raises one;
//! they expire after a fixed interval or when dismissed.
//!
//! ```text
//!   push(warning, "Product not found: p-999")  ──►  [ n1, n2, n3 ]
//!                                                      │
//!             active(now) drops entries older than TTL ┘
//!             dismiss(id) drops one entry at once
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pathway_core::{CartView, CoreError, NotificationLevel};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Older entries are dropped once this many are showing.
const MAX_VISIBLE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[ts(as = "String")]
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    #[ts(as = "String")]
    pub raised_at: DateTime<Utc>,
}

// =============================================================================
// Display Surface
// =============================================================================

/// Receives the render model and notifications as they happen.
pub trait DisplaySurface: Send + Sync {
    /// Called after every cart mutation with the fresh render model.
    fn cart_changed(&self, view: &CartView);

    /// Called when a notification is raised.
    fn notified(&self, notification: &Notification);
}

/// Display surface that ignores everything (tests, headless use).
pub struct NoOpDisplay;

impl DisplaySurface for NoOpDisplay {
    fn cart_changed(&self, _view: &CartView) {}
    fn notified(&self, _notification: &Notification) {}
}

// =============================================================================
// Notification Center
// =============================================================================

#[derive(Debug)]
pub struct NotificationCenter {
    ttl: chrono::Duration,
    entries: VecDeque<Notification>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        NotificationCenter {
            ttl: chrono::Duration::milliseconds(ttl.as_millis().min(i64::MAX as u128) as i64),
            entries: VecDeque::new(),
        }
    }

    pub fn push(
        &mut self,
        level: NotificationLevel,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            raised_at: now,
        };

        self.entries.push_back(notification.clone());
        while self.entries.len() > MAX_VISIBLE {
            self.entries.pop_front();
        }
        notification
    }

    /// Raises a notification for a failed operation at the error's level.
    pub fn push_error(&mut self, err: &CoreError, now: DateTime<Utc>) -> Notification {
        self.push(err.level(), err.to_string(), now)
    }

    /// Drops expired entries and returns what is still showing, oldest first.
    pub fn active(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        self.prune(now);
        self.entries.iter().cloned().collect()
    }

    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|n| now - n.raised_at < ttl);
    }

    /// Dismisses one notification. Returns false if it had already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
