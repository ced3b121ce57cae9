//! Generic persistence toolkit and the repositories built on it.
//!
//! # Responsibility
//! - Provide table-agnostic statement generators (create, upsert, get,
//!   paged list, update, delete, exists) configured once per table.
//! - Keep all SQL text and driver error codes inside this module.
//!
//! # Invariants
//! - Table and column identifiers come only from construction-time
//!   `TableSpec`s and are validated before use.
//! - Every value reaches the store through a bound placeholder.
//! - Generators hold no mutable state and can be shared across threads.
//! - Every failure is returned as a classified `RepoError`; nothing retries.

pub mod cluster_repo;
pub mod condition;
pub mod creator;
pub mod deleter;
pub mod entity;
pub mod error;
mod exec;
pub mod exists;
pub mod getter;
pub mod label_repo;
pub mod order;
pub mod pageable;
pub mod pagination;
pub mod scope;
pub mod table;
pub mod tenant_repo;
pub mod updater;
pub mod upserter;
