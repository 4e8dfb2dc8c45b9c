//! Per-user notification history and transient status-bar toasts.

use anyhow::Result;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::db::Database;
use crate::models::{Notification, NotificationKind};

pub(crate) const DEFAULT_CAPACITY: usize = 50;

/// How long a toast stays in the status bar.
pub(crate) const TOAST_TTL: Duration = Duration::from_secs(3);

/// Bounded notification history for one user, oldest first.
///
/// The persisted table is trimmed to the same bound whenever the in-memory
/// queue evicts.
#[derive(Debug)]
pub(crate) struct NotificationCenter {
    user_id: i64,
    capacity: usize,
    items: VecDeque<Notification>,
}

impl NotificationCenter {
    pub(crate) fn new(user_id: i64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            user_id,
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Rebuild the history from the store.
    pub(crate) fn load(db: &Database, user_id: i64, capacity: usize) -> Result<Self> {
        let mut center = Self::new(user_id, capacity);
        let stored = db.get_notifications(user_id, center.capacity)?;
        // Stored rows come back newest first
        for n in stored.into_iter().rev() {
            center.items.push_back(n);
        }
        Ok(center)
    }

    pub(crate) fn user_id(&self) -> i64 {
        self.user_id
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append in memory only. Returns how many of the oldest entries were evicted.
    pub(crate) fn push(&mut self, notification: Notification) -> usize {
        self.items.push_back(notification);
        let mut evicted = 0;
        while self.items.len() > self.capacity {
            self.items.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Persist a new notification and append it to the history.
    pub(crate) fn add_notification(
        &mut self,
        db: &Database,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<()> {
        let mut n = Notification::new(self.user_id, title.into(), message.into(), kind);
        n.id = Some(db.insert_notification(&n)?);
        if self.push(n) > 0 {
            let removed = db.trim_notifications(self.user_id, self.capacity)?;
            tracing::debug!(user_id = self.user_id, removed, "notification history trimmed");
        }
        Ok(())
    }

    /// Returns false if no notification has that id.
    pub(crate) fn mark_read(&mut self, db: &Database, id: i64) -> Result<bool> {
        let Some(n) = self.items.iter_mut().find(|n| n.id == Some(id)) else {
            return Ok(false);
        };
        db.mark_notification_read(id)?;
        n.is_read = true;
        Ok(true)
    }

    pub(crate) fn mark_all_read(&mut self, db: &Database) -> Result<()> {
        db.mark_all_notifications_read(self.user_id)?;
        for n in &mut self.items {
            n.is_read = true;
        }
        Ok(())
    }

    pub(crate) fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Up to `n` entries, newest first.
    pub(crate) fn recent(&self, n: usize) -> impl Iterator<Item = &Notification> {
        self.items.iter().rev().take(n)
    }

    pub(crate) fn clear(&mut self, db: &Database) -> Result<()> {
        db.clear_notifications(self.user_id)?;
        self.items.clear();
        Ok(())
    }
}

/// A one-line message in the status bar that disappears on its own.
#[derive(Debug, Clone)]
pub(crate) struct Toast {
    pub(crate) message: String,
    pub(crate) kind: NotificationKind,
    expires_at: Instant,
}

impl Toast {
    pub(crate) fn new(message: impl Into<String>, kind: NotificationKind, now: Instant) -> Self {
        Self {
            message: message.into(),
            kind,
            expires_at: now + TOAST_TTL,
        }
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests;
