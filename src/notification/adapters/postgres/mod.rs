//! `PostgreSQL` adapter for the notification feed.

pub(crate) mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{NotificationPgPool, PostgresNotificationFeed};
