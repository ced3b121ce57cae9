//! Read-mostly repository over provisioned cluster records.
//!
//! The reconciliation consumer only needs "find by name or not-found";
//! registration exists so provisioning and tests can seed records.

use crate::model::cluster::ClusterRecord;
use crate::repo::condition::Condition;
use crate::repo::creator::Creator;
use crate::repo::entity::{Converter, Entity};
use crate::repo::error::{RepoResult, ResourceType};
use crate::repo::exists::ExistQuerier;
use crate::repo::getter::SingleGetter;
use crate::repo::order::NO_ORDER_BY;
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use rusqlite::types::Value;
use rusqlite::Row;

pub const CLUSTER_TABLE: &str = "gardener_clusters";

const CLUSTER_COLUMNS: &[&str] = &["id", "cluster_name", "project_name", "seed_name"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEntity {
    pub id: String,
    pub cluster_name: String,
    pub project_name: String,
    pub seed_name: Option<String>,
}

impl Entity for ClusterEntity {
    const COLUMNS: &'static [&'static str] = CLUSTER_COLUMNS;

    fn column_value(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(Value::Text(self.id.clone())),
            "cluster_name" => Some(Value::Text(self.cluster_name.clone())),
            "project_name" => Some(Value::Text(self.project_name.clone())),
            "seed_name" => Some(self.seed_name.clone().map_or(Value::Null, Value::Text)),
            _ => None,
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            cluster_name: row.get("cluster_name")?,
            project_name: row.get("project_name")?,
            seed_name: row.get("seed_name")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterConverter;

impl Converter for ClusterConverter {
    type Model = ClusterRecord;
    type Entity = ClusterEntity;

    fn to_entity(&self, model: &ClusterRecord) -> ClusterEntity {
        ClusterEntity {
            id: model.id.clone(),
            cluster_name: model.name.clone(),
            project_name: model.project.clone(),
            seed_name: model.seed.clone(),
        }
    }

    fn from_entity(&self, entity: ClusterEntity) -> RepoResult<ClusterRecord> {
        Ok(ClusterRecord {
            id: entity.id,
            name: entity.cluster_name,
            project: entity.project_name,
            seed: entity.seed_name,
        })
    }
}

/// Narrow read capability required by cluster reconciliation.
pub trait ClusterLookup {
    /// Returns the record or a `NotFound` error.
    fn find_by_name(&self, scope: &dyn ExecutionScope, name: &str) -> RepoResult<ClusterRecord>;
}

pub struct ClusterRepository {
    creator: Creator<ClusterEntity>,
    getter: SingleGetter<ClusterEntity>,
    exist_querier: ExistQuerier,
    conv: ClusterConverter,
}

impl ClusterRepository {
    pub fn new() -> RepoResult<Self> {
        let spec = TableSpec::global(ResourceType::Cluster, CLUSTER_TABLE, CLUSTER_COLUMNS)?;
        Ok(Self {
            creator: Creator::new(spec.clone())?,
            getter: SingleGetter::new(spec.clone())?,
            exist_querier: ExistQuerier::new(spec),
            conv: ClusterConverter,
        })
    }

    pub fn register(&self, scope: &dyn ExecutionScope, cluster: &ClusterRecord) -> RepoResult<()> {
        self.creator
            .create(scope, Some(&self.conv.to_entity(cluster)))
    }

    pub fn exists_by_name(&self, scope: &dyn ExecutionScope, name: &str) -> RepoResult<bool> {
        self.exist_querier
            .exists(scope, &[Condition::equal("cluster_name", name)])
    }
}

impl ClusterLookup for ClusterRepository {
    fn find_by_name(&self, scope: &dyn ExecutionScope, name: &str) -> RepoResult<ClusterRecord> {
        let entity = self.getter.get(
            scope,
            &[Condition::equal("cluster_name", name)],
            &NO_ORDER_BY,
        )?;
        self.conv.from_entity(entity)
    }
}
