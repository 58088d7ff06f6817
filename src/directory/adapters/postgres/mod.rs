//! `PostgreSQL` adapter for the user directory.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{DirectoryPgPool, PostgresUserDirectory};
