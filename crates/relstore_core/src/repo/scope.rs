//! Per-call execution scope.
//!
//! # Responsibility
//! - Carry the open connection (or transaction) a call runs against.
//! - Carry the tenant a tenant-scoped generator filters by.
//!
//! # Invariants
//! - Generators never look up a handle on their own; every call receives one.
//! - Transaction lifecycle belongs to the caller.

use crate::repo::error::RepoResult;
use rusqlite::Connection;

/// Capability that yields the active database handle for one call.
pub trait ExecutionScope {
    fn resolve_handle(&self) -> RepoResult<&Connection>;

    /// Owning tenant of this call, if any.
    fn tenant(&self) -> Option<&str>;
}

/// Scope backed by a borrowed connection.
///
/// A `rusqlite::Transaction` derefs to `Connection`, so `DbScope::global(&tx)`
/// runs every statement inside the caller's transaction.
#[derive(Clone, Copy)]
pub struct DbScope<'conn> {
    conn: &'conn Connection,
    tenant: Option<&'conn str>,
}

impl<'conn> DbScope<'conn> {
    pub fn global(conn: &'conn Connection) -> Self {
        Self { conn, tenant: None }
    }

    pub fn for_tenant(conn: &'conn Connection, tenant: &'conn str) -> Self {
        Self {
            conn,
            tenant: Some(tenant),
        }
    }
}

impl ExecutionScope for DbScope<'_> {
    fn resolve_handle(&self) -> RepoResult<&Connection> {
        Ok(self.conn)
    }

    fn tenant(&self) -> Option<&str> {
        self.tenant
    }
}
