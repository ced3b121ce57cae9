//! Cluster reconciliation gate.
//!
//! # Responsibility
//! - Answer whether a cluster observed by the reconciler is managed here.
//!
//! # Invariants
//! - A missing record is a normal `false`, not an error.
//! - Any other repository failure is returned unchanged for the caller's
//!   retry policy.

use crate::model::cluster::ClusterRecord;
use crate::repo::cluster_repo::ClusterLookup;
use crate::repo::error::RepoResult;
use crate::repo::scope::ExecutionScope;
use log::debug;

pub struct ClusterService<R: ClusterLookup> {
    repo: R,
}

impl<R: ClusterLookup> ClusterService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the persisted record for `name`, or `None` when unknown.
    pub fn find(&self, scope: &dyn ExecutionScope, name: &str) -> RepoResult<Option<ClusterRecord>> {
        match self.repo.find_by_name(scope, name) {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Whether the reconciler should act on the cluster called `name`.
    pub fn should_reconcile(&self, scope: &dyn ExecutionScope, name: &str) -> RepoResult<bool> {
        let managed = self.find(scope, name)?.is_some();
        if !managed {
            debug!("event=cluster_gate module=service status=skip reason=not_persisted");
        }
        Ok(managed)
    }
}
