//! Diesel schema for directory user records.

diesel::table! {
    /// Directory users with their fixed role.
    app_users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        full_name -> Varchar,
        /// Role: `coordinator` or `caregiver`.
        #[max_length = 50]
        role -> Varchar,
        /// Whether the account is active.
        is_active -> Bool,
    }
}
