//! Diesel row models for directory persistence.

use super::schema::app_users;
use diesel::prelude::*;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = app_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub full_name: String,
    /// Role string.
    pub role: String,
    /// Active flag.
    pub is_active: bool,
}
