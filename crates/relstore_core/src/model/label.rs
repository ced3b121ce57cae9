//! Tenant-owned key/value label model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label attached to a tenant; `key` is unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    /// Owning tenant id.
    pub tenant: String,
    pub key: String,
    /// Free-form value; `None` marks a flag-style label.
    pub value: Option<String>,
    /// Optimistic-concurrency counter, bumped by every update.
    pub version: i64,
}

impl Label {
    pub fn new(tenant: impl Into<String>, key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant: tenant.into(),
            key: key.into(),
            value,
            version: 1,
        }
    }
}
