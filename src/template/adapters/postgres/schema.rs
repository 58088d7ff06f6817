//! Diesel schema for template persistence.

diesel::table! {
    /// Reusable task definitions owned by coordinators.
    task_templates (id) {
        /// Template identifier.
        id -> Uuid,
        /// Template title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Optional default time-of-day in `HH:MM` form.
        #[max_length = 5]
        default_time -> Nullable<Varchar>,
        /// Owning coordinator identifier.
        created_by -> Uuid,
        /// Whether the template is active.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
