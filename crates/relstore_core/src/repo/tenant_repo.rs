//! Business tenant mapping repository.
//!
//! # Responsibility
//! - Persist the tenant registry through global generators.
//! - Keep the row shape (`TenantEntity`) behind `TenantConverter`.
//!
//! # Invariants
//! - The registry is never tenant-scoped: it defines the tenants.
//! - Single-tenant reads hide `INACTIVE` mappings through an explicit
//!   condition; existence checks and listing do not.

use crate::model::tenant::{BusinessTenantMapping, BusinessTenantMappingPage, TenantStatus};
use crate::repo::condition::Condition;
use crate::repo::creator::Creator;
use crate::repo::deleter::Deleter;
use crate::repo::entity::{Converter, Entity};
use crate::repo::error::{RepoError, RepoResult, ResourceType};
use crate::repo::exists::ExistQuerier;
use crate::repo::getter::SingleGetter;
use crate::repo::order::NO_ORDER_BY;
use crate::repo::pageable::PageableQuerier;
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use crate::repo::updater::Updater;
use crate::repo::upserter::Upserter;
use rusqlite::types::Value;
use rusqlite::Row;

pub const TENANT_TABLE: &str = "business_tenant_mappings";

const TENANT_COLUMNS: &[&str] = &[
    "id",
    "external_name",
    "external_tenant",
    "provider_name",
    "status",
];
const TENANT_UPDATE_COLUMNS: &[&str] = &["external_name", "external_tenant", "provider_name", "status"];

/// Row shape of `business_tenant_mappings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantEntity {
    pub id: String,
    pub external_name: String,
    pub external_tenant: String,
    pub provider_name: String,
    pub status: String,
}

impl Entity for TenantEntity {
    const COLUMNS: &'static [&'static str] = TENANT_COLUMNS;

    fn column_value(&self, column: &str) -> Option<Value> {
        let text = match column {
            "id" => &self.id,
            "external_name" => &self.external_name,
            "external_tenant" => &self.external_tenant,
            "provider_name" => &self.provider_name,
            "status" => &self.status,
            _ => return None,
        };
        Some(Value::Text(text.clone()))
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            external_name: row.get("external_name")?,
            external_tenant: row.get("external_tenant")?,
            provider_name: row.get("provider_name")?,
            status: row.get("status")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TenantConverter;

impl Converter for TenantConverter {
    type Model = BusinessTenantMapping;
    type Entity = TenantEntity;

    fn to_entity(&self, model: &BusinessTenantMapping) -> TenantEntity {
        TenantEntity {
            id: model.id.clone(),
            external_name: model.name.clone(),
            external_tenant: model.external_tenant.clone(),
            provider_name: model.provider.clone(),
            status: model.status.as_str().to_string(),
        }
    }

    fn from_entity(&self, entity: TenantEntity) -> RepoResult<BusinessTenantMapping> {
        let status = TenantStatus::parse(&entity.status).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid status `{}` in {TENANT_TABLE}.status",
                entity.status
            ))
        })?;
        Ok(BusinessTenantMapping {
            id: entity.id,
            name: entity.external_name,
            external_tenant: entity.external_tenant,
            provider: entity.provider_name,
            status,
        })
    }
}

/// Tenant registry use-cases.
pub trait TenantRepository {
    fn create(&self, scope: &dyn ExecutionScope, item: &BusinessTenantMapping) -> RepoResult<()>;
    /// Inserts or refreshes the mapping keyed by `external_tenant`.
    fn upsert(
        &self,
        scope: &dyn ExecutionScope,
        item: Option<&BusinessTenantMapping>,
    ) -> RepoResult<()>;
    /// Gets one active mapping by internal id.
    fn get(&self, scope: &dyn ExecutionScope, id: &str) -> RepoResult<BusinessTenantMapping>;
    /// Gets one active mapping by provider tenant id.
    fn get_by_external_tenant(
        &self,
        scope: &dyn ExecutionScope,
        external_tenant: &str,
    ) -> RepoResult<BusinessTenantMapping>;
    fn exists(&self, scope: &dyn ExecutionScope, id: &str) -> RepoResult<bool>;
    fn exists_by_external_tenant(
        &self,
        scope: &dyn ExecutionScope,
        external_tenant: &str,
    ) -> RepoResult<bool>;
    /// Lists all mappings ordered by internal id.
    fn list(
        &self,
        scope: &dyn ExecutionScope,
        page_size: u32,
        cursor: &str,
    ) -> RepoResult<BusinessTenantMappingPage>;
    fn update(
        &self,
        scope: &dyn ExecutionScope,
        item: Option<&BusinessTenantMapping>,
    ) -> RepoResult<()>;
    fn delete_by_external_tenant(
        &self,
        scope: &dyn ExecutionScope,
        external_tenant: &str,
    ) -> RepoResult<()>;
}

/// SQL-backed tenant registry built from global generators.
pub struct SqlTenantRepository {
    creator: Creator<TenantEntity>,
    upserter: Upserter<TenantEntity>,
    getter: SingleGetter<TenantEntity>,
    pager: PageableQuerier<TenantEntity>,
    updater: Updater<TenantEntity>,
    deleter: Deleter,
    exist_querier: ExistQuerier,
    conv: TenantConverter,
}

impl SqlTenantRepository {
    pub fn new() -> RepoResult<Self> {
        let spec = TableSpec::global(ResourceType::Tenant, TENANT_TABLE, TENANT_COLUMNS)?;
        Ok(Self {
            creator: Creator::new(spec.clone())?,
            upserter: Upserter::new(
                spec.clone(),
                &["external_tenant"],
                &["external_name", "provider_name", "status"],
            )?,
            getter: SingleGetter::new(spec.clone())?,
            pager: PageableQuerier::new(spec.clone())?,
            updater: Updater::new(spec.clone(), TENANT_UPDATE_COLUMNS, &["id"])?,
            deleter: Deleter::new(spec.clone()),
            exist_querier: ExistQuerier::new(spec),
            conv: TenantConverter,
        })
    }

    fn get_active(
        &self,
        scope: &dyn ExecutionScope,
        field: &'static str,
        value: &str,
    ) -> RepoResult<BusinessTenantMapping> {
        let entity = self.getter.get(
            scope,
            &[
                Condition::equal(field, value),
                Condition::not_equal("status", TenantStatus::Inactive.as_str()),
            ],
            &NO_ORDER_BY,
        )?;
        self.conv.from_entity(entity)
    }
}

impl TenantRepository for SqlTenantRepository {
    fn create(&self, scope: &dyn ExecutionScope, item: &BusinessTenantMapping) -> RepoResult<()> {
        self.creator.create(scope, Some(&self.conv.to_entity(item)))
    }

    fn upsert(
        &self,
        scope: &dyn ExecutionScope,
        item: Option<&BusinessTenantMapping>,
    ) -> RepoResult<()> {
        let entity = item.map(|model| self.conv.to_entity(model));
        self.upserter.upsert(scope, entity.as_ref())
    }

    fn get(&self, scope: &dyn ExecutionScope, id: &str) -> RepoResult<BusinessTenantMapping> {
        self.get_active(scope, "id", id)
    }

    fn get_by_external_tenant(
        &self,
        scope: &dyn ExecutionScope,
        external_tenant: &str,
    ) -> RepoResult<BusinessTenantMapping> {
        self.get_active(scope, "external_tenant", external_tenant)
    }

    fn exists(&self, scope: &dyn ExecutionScope, id: &str) -> RepoResult<bool> {
        self.exist_querier
            .exists(scope, &[Condition::equal("id", id)])
    }

    fn exists_by_external_tenant(
        &self,
        scope: &dyn ExecutionScope,
        external_tenant: &str,
    ) -> RepoResult<bool> {
        self.exist_querier
            .exists(scope, &[Condition::equal("external_tenant", external_tenant)])
    }

    fn list(
        &self,
        scope: &dyn ExecutionScope,
        page_size: u32,
        cursor: &str,
    ) -> RepoResult<BusinessTenantMappingPage> {
        let page = self
            .pager
            .list(scope, &[], page_size, cursor, "id")?
            .try_map(|entity| self.conv.from_entity(entity))?;
        Ok(BusinessTenantMappingPage {
            data: page.items,
            page_info: page.page_info,
            total_count: page.total_count,
        })
    }

    fn update(
        &self,
        scope: &dyn ExecutionScope,
        item: Option<&BusinessTenantMapping>,
    ) -> RepoResult<()> {
        let entity = item.map(|model| self.conv.to_entity(model));
        self.updater.update(scope, entity.as_ref())
    }

    fn delete_by_external_tenant(
        &self,
        scope: &dyn ExecutionScope,
        external_tenant: &str,
    ) -> RepoResult<()> {
        self.deleter
            .delete_one(scope, &[Condition::equal("external_tenant", external_tenant)])
    }
}

#[cfg(test)]
mod tests {
    use super::{TenantConverter, TenantEntity};
    use crate::model::tenant::{BusinessTenantMapping, TenantStatus};
    use crate::repo::entity::Converter;
    use crate::repo::error::RepoError;

    #[test]
    fn converter_round_trips_every_field() {
        let conv = TenantConverter;
        let mut model = BusinessTenantMapping::new("Acme", "ext-1", "provider-a");
        model.deactivate();

        let restored = conv.from_entity(conv.to_entity(&model)).unwrap();
        assert_eq!(restored, model);
        assert_eq!(restored.status, TenantStatus::Inactive);
    }

    #[test]
    fn converter_rejects_unknown_status() {
        let entity = TenantEntity {
            id: "t1".to_string(),
            external_name: "n".to_string(),
            external_tenant: "e".to_string(),
            provider_name: "p".to_string(),
            status: "ARCHIVED".to_string(),
        };
        assert!(matches!(
            TenantConverter.from_entity(entity),
            Err(RepoError::InvalidData(_))
        ));
    }
}
