//! Diesel schema for task instance persistence.

diesel::table! {
    /// Scheduled, assigned task occurrences.
    task_instances (id) {
        /// Task identifier.
        id -> Uuid,
        /// Originating template identifier.
        template_id -> Uuid,
        /// Optional title override.
        #[max_length = 255]
        title -> Nullable<Varchar>,
        /// Optional description override.
        description -> Nullable<Text>,
        /// Scheduled time.
        scheduled_for -> Timestamptz,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Message of the most recent problem report, if any.
        problem_message -> Nullable<Text>,
        /// Severity of the most recent problem report, if any.
        #[max_length = 50]
        problem_severity -> Nullable<Varchar>,
        /// Optional resolution note.
        resolution_note -> Nullable<Text>,
        /// Optional completion photo reference.
        #[max_length = 255]
        completion_photo -> Nullable<Varchar>,
        /// Optional rating (1–5).
        rating -> Nullable<SmallInt>,
        /// Optional review note.
        review_note -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Creator (coordinator) identifier.
        created_by -> Uuid,
        /// Assignee (caregiver) identifier.
        assigned_to -> Uuid,
    }
}
