//! Activity audit log for the caregiving coordination core.
//!
//! Every successful mutating operation records exactly one append-only
//! entry: who acted, which action, on which entity, when. Entries are
//! only ever written as part of a mutation commit — the repository ports
//! of the mutated entities accept the entry alongside the entity write —
//! and this module exposes the read side for after-the-fact
//! reconstruction. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
