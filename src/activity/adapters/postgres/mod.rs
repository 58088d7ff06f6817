//! `PostgreSQL` adapter for the activity audit log.

pub(crate) mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{ActivityPgPool, PostgresActivityLog};
