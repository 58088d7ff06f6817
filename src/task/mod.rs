//! Task lifecycle engine for the caregiving coordination core.
//!
//! This module owns the task instance state machine: creating pending
//! instances from templates, caregiver status transitions, coordinator
//! reschedules (which reopen the task), ratings on completed work, and
//! deletion. Every successful mutation commits atomically with one
//! audit entry and one counterpart notification. The module follows
//! hexagonal architecture:
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
