use anyhow::Result;

use super::models::{Notification, NotificationKind};

/// Storage operations for user notifications. Implemented by the user store;
/// delivery is nothing more than a row insert read back on the next fetch.
pub trait NotificationStore: Send + Sync {
    /// Creates a notification for the given user and returns it.
    fn create_notification(
        &self,
        user_id: usize,
        kind: NotificationKind,
        title: String,
        body: Option<String>,
        data: serde_json::Value,
    ) -> Result<Notification>;

    /// Returns the user's notifications, newest first.
    fn get_user_notifications(&self, user_id: usize, unread_only: bool)
        -> Result<Vec<Notification>>;

    /// Returns the number of unread notifications for the user.
    fn count_unread_notifications(&self, user_id: usize) -> Result<usize>;

    /// Marks a notification as read. Idempotent: re-marking keeps the first
    /// read timestamp. Returns Ok(None) if the notification does not exist
    /// or belongs to another user.
    fn mark_notification_read(
        &self,
        user_id: usize,
        notification_id: &str,
    ) -> Result<Option<Notification>>;

    /// Marks all of the user's notifications as read. Returns how many rows
    /// were updated.
    fn mark_all_notifications_read(&self, user_id: usize) -> Result<usize>;

    /// Deletes read notifications created before the cutoff (unix seconds).
    /// Returns the number of rows deleted.
    fn prune_read_notifications(&self, cutoff: i64) -> Result<usize>;
}
