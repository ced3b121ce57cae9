//! Tenant-scoped label repository.
//!
//! # Invariants
//! - Every statement is filtered by the scope tenant; a scope without a
//!   tenant is rejected before SQL is issued.
//! - Updates and conflicting upserts bump `version`; an update carrying a
//!   stale `version` reports `Conflict`.

use crate::model::label::Label;
use crate::repo::condition::Condition;
use crate::repo::creator::Creator;
use crate::repo::deleter::Deleter;
use crate::repo::entity::{Converter, Entity};
use crate::repo::error::{RepoResult, ResourceType};
use crate::repo::exists::ExistQuerier;
use crate::repo::getter::SingleGetter;
use crate::repo::order::NO_ORDER_BY;
use crate::repo::pageable::PageableQuerier;
use crate::repo::pagination::Page;
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use crate::repo::updater::Updater;
use crate::repo::upserter::Upserter;
use rusqlite::types::Value;
use rusqlite::Row;

pub const LABEL_TABLE: &str = "labels";

const LABEL_COLUMNS: &[&str] = &["id", "tenant_id", "key", "value", "version"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntity {
    pub id: String,
    pub tenant_id: String,
    pub key: String,
    pub value: Option<String>,
    pub version: i64,
}

impl Entity for LabelEntity {
    const COLUMNS: &'static [&'static str] = LABEL_COLUMNS;

    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Text(self.id.clone())),
            "tenant_id" => Some(Value::Text(self.tenant_id.clone())),
            "key" => Some(Value::Text(self.key.clone())),
            "value" => Some(self.value.clone().map_or(Value::Null, Value::Text)),
            "version" => Some(Value::Integer(self.version)),
            _ => None,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            tenant_id: row.get("tenant_id")?,
            key: row.get("key")?,
            value: row.get("value")?,
            version: row.get("version")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LabelConverter;

impl Converter for LabelConverter {
    type Model = Label;
    type Entity = LabelEntity;

    fn to_entity(&self, model: &Label) -> LabelEntity {
        LabelEntity {
            id: model.id.clone(),
            tenant_id: model.tenant.clone(),
            key: model.key.clone(),
            value: model.value.clone(),
            version: model.version,
        }
    }

    fn from_entity(&self, entity: LabelEntity) -> RepoResult<Label> {
        Ok(Label {
            id: entity.id,
            tenant: entity.tenant_id,
            key: entity.key,
            value: entity.value,
            version: entity.version,
        })
    }
}

/// Label use-cases for the tenant bound to the call scope.
pub struct LabelRepository {
    creator: Creator<LabelEntity>,
    upserter: Upserter<LabelEntity>,
    getter: SingleGetter<LabelEntity>,
    pager: PageableQuerier<LabelEntity>,
    updater: Updater<LabelEntity>,
    deleter: Deleter,
    exist_querier: ExistQuerier,
    conv: LabelConverter,
}

impl LabelRepository {
    pub fn new() -> RepoResult<Self> {
        let spec =
            TableSpec::tenant_scoped(ResourceType::Label, LABEL_TABLE, LABEL_COLUMNS, "tenant_id")?;
        Ok(Self {
            creator: Creator::new(spec.clone())?,
            upserter: Upserter::versioned(
                spec.clone(),
                &["tenant_id", "key"],
                &["value"],
                "version",
            )?,
            getter: SingleGetter::new(spec.clone())?,
            pager: PageableQuerier::new(spec.clone())?,
            updater: Updater::versioned(spec.clone(), &["key", "value"], &["id"], "version")?,
            deleter: Deleter::new(spec.clone()),
            exist_querier: ExistQuerier::new(spec),
            conv: LabelConverter,
        })
    }

    pub fn create(&self, scope: &dyn ExecutionScope, label: &Label) -> RepoResult<()> {
        self.creator.create(scope, Some(&self.conv.to_entity(label)))
    }

    /// Sets `value` for `key`, creating the label when absent.
    pub fn upsert(&self, scope: &dyn ExecutionScope, label: Option<&Label>) -> RepoResult<()> {
        let entity = label.map(|model| self.conv.to_entity(model));
        self.upserter.upsert(scope, entity.as_ref())
    }

    pub fn get_by_key(&self, scope: &dyn ExecutionScope, key: &str) -> RepoResult<Label> {
        let entity = self
            .getter
            .get(scope, &[Condition::equal("key", key)], &NO_ORDER_BY)?;
        self.conv.from_entity(entity)
    }

    pub fn exists_by_key(&self, scope: &dyn ExecutionScope, key: &str) -> RepoResult<bool> {
        self.exist_querier
            .exists(scope, &[Condition::equal("key", key)])
    }

    pub fn list(
        &self,
        scope: &dyn ExecutionScope,
        page_size: u32,
        cursor: &str,
    ) -> RepoResult<Page<Label>> {
        self.pager
            .list(scope, &[], page_size, cursor, "key")?
            .try_map(|entity| self.conv.from_entity(entity))
    }

    /// Updates key and value if `label.version` is still current.
    pub fn update(&self, scope: &dyn ExecutionScope, label: Option<&Label>) -> RepoResult<()> {
        let entity = label.map(|model| self.conv.to_entity(model));
        self.updater.update(scope, entity.as_ref())
    }

    pub fn delete_by_key(&self, scope: &dyn ExecutionScope, key: &str) -> RepoResult<()> {
        self.deleter
            .delete_one(scope, &[Condition::equal("key", key)])
    }

    /// Removes every label of the scope tenant.
    pub fn delete_all(&self, scope: &dyn ExecutionScope) -> RepoResult<usize> {
        self.deleter.delete_many(scope, &[])
    }
}
