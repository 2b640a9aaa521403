//! Outbound adapters implementing the domain ports.
//!
//! - **persistence**: PostgreSQL entity store on Diesel
//! - **memory**: process-local entity store for development and tests
//! - **notify**: log-only and HTTP mail relay notifiers
//!
//! Adapters translate between domain types and their storage or wire form
//! and hold no business rules.

pub mod memory;
pub mod notify;
pub mod persistence;
