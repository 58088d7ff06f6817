//! Diesel schema for notification persistence.

diesel::table! {
    /// Per-user notification feed records.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient user identifier.
        user_id -> Uuid,
        /// Message text.
        message -> Text,
        /// Whether the recipient has read the notification.
        is_read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
