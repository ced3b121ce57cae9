//! Single-row UPDATE-by-key generator.
//!
//! # Invariants
//! - Plain mode is last-write-wins: one unconditioned UPDATE per call.
//! - Versioned mode bumps the version column and only matches the version
//!   the caller read; a stale version reports `Conflict`, not `NotFound`.

use crate::repo::condition::{render_where, Condition};
use crate::repo::creator::check_entity_tenant;
use crate::repo::entity::Entity;
use crate::repo::error::{Operation, RepoError, RepoResult};
use crate::repo::exec::{entity_values, execute_named, query_i64};
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use rusqlite::types::Value;
use std::marker::PhantomData;

const SCOPE_TENANT_PARAM: &str = ":scope_tenant";

#[derive(Debug, Clone)]
pub struct Updater<E> {
    spec: TableSpec,
    key_columns: Vec<&'static str>,
    bound_columns: Vec<&'static str>,
    version_column: Option<&'static str>,
    sql: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Updater<E> {
    pub fn new(
        spec: TableSpec,
        update_columns: &[&'static str],
        key_columns: &[&'static str],
    ) -> RepoResult<Self> {
        Self::build(spec, update_columns, key_columns, None)
    }

    /// Updater that requires the stored `version_column` to match the
    /// entity's value and increments it on success.
    pub fn versioned(
        spec: TableSpec,
        update_columns: &[&'static str],
        key_columns: &[&'static str],
        version_column: &'static str,
    ) -> RepoResult<Self> {
        Self::build(spec, update_columns, key_columns, Some(version_column))
    }

    fn build(
        spec: TableSpec,
        update_columns: &[&'static str],
        key_columns: &[&'static str],
        version_column: Option<&'static str>,
    ) -> RepoResult<Self> {
        spec.require_entity_columns(E::COLUMNS)?;
        if update_columns.is_empty() || key_columns.is_empty() {
            return Err(RepoError::InvalidIdentifier(format!(
                "update on `{}` needs update and key columns",
                spec.table()
            )));
        }
        spec.require_columns(update_columns)?;
        spec.require_columns(key_columns)?;
        if let Some(version) = version_column {
            spec.require_columns(&[version])?;
            if update_columns.contains(&version) || key_columns.contains(&version) {
                return Err(RepoError::InvalidIdentifier(format!(
                    "version column `{version}` cannot be an update or key column"
                )));
            }
        }

        let mut assignments: Vec<String> = update_columns
            .iter()
            .map(|column| format!("{column} = :{column}"))
            .collect();
        let mut predicates: Vec<String> = key_columns
            .iter()
            .map(|column| format!("{column} = :{column}"))
            .collect();
        if let Some(version) = version_column {
            assignments.push(format!("{version} = {version} + 1"));
            predicates.push(format!("{version} = :{version}"));
        }
        if let Some(tenant) = spec.tenant_column() {
            predicates.push(format!("{tenant} = {SCOPE_TENANT_PARAM}"));
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            spec.table(),
            assignments.join(", "),
            predicates.join(" AND ")
        );

        let mut bound_columns: Vec<&'static str> = Vec::new();
        for column in update_columns
            .iter()
            .chain(key_columns.iter())
            .chain(version_column.iter())
        {
            if !bound_columns.contains(column) {
                bound_columns.push(*column);
            }
        }

        Ok(Self {
            spec,
            key_columns: key_columns.to_vec(),
            bound_columns,
            version_column,
            sql,
            _entity: PhantomData,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn update(&self, scope: &dyn ExecutionScope, entity: Option<&E>) -> RepoResult<()> {
        let entity = entity.ok_or(RepoError::NilInput {
            resource: self.spec.resource(),
            operation: Operation::Update,
        })?;
        check_entity_tenant(&self.spec, scope, entity, Operation::Update)?;

        let mut values = entity_values(&self.spec, entity, &self.bound_columns)?;
        if self.spec.tenant_column().is_some() {
            let tenant = self.spec.scope_tenant(scope, Operation::Update)?;
            values.push((SCOPE_TENANT_PARAM.to_string(), Value::Text(tenant.to_string())));
        }

        let conn = scope.resolve_handle()?;
        let changed = execute_named(conn, &self.spec, Operation::Update, &self.sql, &values)?;
        if changed > 0 {
            return Ok(());
        }

        if self.version_column.is_some() && self.key_exists(scope, entity)? {
            return Err(RepoError::Conflict {
                resource: self.spec.resource(),
                operation: Operation::Update,
            });
        }
        Err(RepoError::not_found(self.spec.resource(), Operation::Update))
    }

    fn key_exists(&self, scope: &dyn ExecutionScope, entity: &E) -> RepoResult<bool> {
        let mut conditions: Vec<Condition> = entity_values(&self.spec, entity, &self.key_columns)?
            .into_iter()
            .zip(self.key_columns.iter())
            .map(|((_, value), column)| Condition::equal(*column, value))
            .collect();
        conditions.extend(self.spec.scope_condition(scope, Operation::Update)?);

        let clause = render_where(&self.spec, &conditions)?;
        let sql = format!("SELECT 1 FROM {}{} LIMIT 1", self.spec.table(), clause.sql);
        let conn = scope.resolve_handle()?;
        Ok(query_i64(conn, &self.spec, Operation::Update, &sql, &clause.binds)?.is_some())
    }
}
