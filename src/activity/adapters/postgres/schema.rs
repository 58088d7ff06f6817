//! Diesel schema for activity log persistence.

diesel::table! {
    /// Append-only audit entries for successful mutations.
    activity_log (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Acting user identifier.
        user_id -> Uuid,
        /// Action tag (`CREATE_TASK`, `UPDATE_TASK_STATUS`, ...).
        #[max_length = 50]
        action -> Varchar,
        /// Optional entity kind the action operated on.
        #[max_length = 50]
        entity_type -> Nullable<Varchar>,
        /// Optional entity identifier.
        entity_id -> Nullable<Uuid>,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
        /// Optional free-text details.
        details -> Nullable<Text>,
    }
}
