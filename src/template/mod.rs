//! Task template management for the caregiving coordination core.
//!
//! A template is a reusable task definition owned by the coordinator who
//! created it; task instances are stamped out of templates and assigned
//! to caregivers. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
