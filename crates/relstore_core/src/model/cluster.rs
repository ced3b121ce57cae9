//! Persisted cluster record consulted by the reconciliation consumer.

use serde::{Deserialize, Serialize};

/// Cluster registered by provisioning; `name` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: String,
    pub name: String,
    pub project: String,
    /// Seed the cluster is scheduled on, if already assigned.
    pub seed: Option<String>,
}
