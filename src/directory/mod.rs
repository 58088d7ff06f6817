//! User directory for the caregiving coordination core.
//!
//! The directory is an external collaborator: account management and
//! credential storage live elsewhere, and this module only exposes the
//! narrow lookup surface the lifecycle engine needs (user by identifier,
//! users by role). The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
