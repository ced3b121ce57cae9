//! Business tenant mapping model.
//!
//! # Invariants
//! - `id` is the internal tenant id and never changes.
//! - `external_tenant` is unique across all mappings.
//! - Inactive tenants stay persisted; readers filter them explicitly.

use crate::repo::pagination::PageInfo;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Lifecycle state of a tenant mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Active,
    Inactive,
}

impl TenantStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl Display for TenantStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping between an internal tenant id and the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTenantMapping {
    /// Internal tenant id, referenced by tenant-scoped tables.
    pub id: String,
    /// Human-readable tenant name from the provider.
    pub name: String,
    /// Tenant id as known by the external provider.
    pub external_tenant: String,
    /// Name of the provider that owns `external_tenant`.
    pub provider: String,
    pub status: TenantStatus,
}

impl BusinessTenantMapping {
    /// Creates an active mapping with a generated internal id.
    pub fn new(
        name: impl Into<String>,
        external_tenant: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            external_tenant: external_tenant.into(),
            provider: provider.into(),
            status: TenantStatus::Active,
        }
    }

    pub fn deactivate(&mut self) {
        self.status = TenantStatus::Inactive;
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

/// One page of tenant mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTenantMappingPage {
    pub data: Vec<BusinessTenantMapping>,
    pub page_info: PageInfo,
    pub total_count: u64,
}
