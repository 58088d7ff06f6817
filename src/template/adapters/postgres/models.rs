//! Diesel row models for template persistence.

use super::schema::task_templates;
use crate::template::domain::TaskTemplate;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for template records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TemplateRow {
    /// Template identifier.
    pub id: uuid::Uuid,
    /// Template title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional default time-of-day.
    pub default_time: Option<String>,
    /// Owning coordinator identifier.
    pub created_by: uuid::Uuid,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert and update model for template records.
///
/// `None` values map to SQL `NULL` on update so a revision can clear
/// the optional fields.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = task_templates)]
#[diesel(treat_none_as_null = true)]
pub struct NewTemplateRow {
    /// Template identifier.
    pub id: uuid::Uuid,
    /// Template title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional default time-of-day.
    pub default_time: Option<String>,
    /// Owning coordinator identifier.
    pub created_by: uuid::Uuid,
    /// Active flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewTemplateRow {
    /// Builds a row from a domain template.
    #[must_use]
    pub fn from_template(template: &TaskTemplate) -> Self {
        Self {
            id: template.id().into_inner(),
            title: template.title().as_str().to_owned(),
            description: template.description().map(str::to_owned),
            default_time: template.default_time().map(|time| time.to_string()),
            created_by: template.created_by().into_inner(),
            is_active: template.is_active(),
            created_at: template.created_at(),
        }
    }
}
