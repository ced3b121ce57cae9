//! Domain models persisted through the generic repository toolkit.
//!
//! # Responsibility
//! - Define the caller-facing shapes of tenants, labels and cluster records.
//! - Stay free of SQL and row layout; converters own that mapping.
//!
//! # Invariants
//! - Every model is identified by a stable string id.

pub mod cluster;
pub mod label;
pub mod tenant;
