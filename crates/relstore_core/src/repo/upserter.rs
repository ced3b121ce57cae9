//! INSERT … ON CONFLICT DO UPDATE generator.
//!
//! # Invariants
//! - One statement per call; the store's conflict clause provides atomicity.
//! - No existence lookup precedes the insert.
//! - A versioned upserter bumps the version column on every conflict update,
//!   so readers holding the previous version see `Conflict` on update.

use crate::repo::creator::check_entity_tenant;
use crate::repo::entity::Entity;
use crate::repo::error::{Operation, RepoError, RepoResult};
use crate::repo::exec::{entity_values, execute_named};
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub struct Upserter<E> {
    spec: TableSpec,
    sql: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Upserter<E> {
    /// `conflict_columns` name the unique key the conflict clause targets;
    /// `update_columns` are overwritten from the incoming row on conflict.
    pub fn new(
        spec: TableSpec,
        conflict_columns: &[&'static str],
        update_columns: &[&'static str],
    ) -> RepoResult<Self> {
        Self::build(spec, conflict_columns, update_columns, None)
    }

    /// Upserter for tables updated through `Updater::versioned`; a conflict
    /// update increments `version_column` instead of copying it.
    pub fn versioned(
        spec: TableSpec,
        conflict_columns: &[&'static str],
        update_columns: &[&'static str],
        version_column: &'static str,
    ) -> RepoResult<Self> {
        Self::build(spec, conflict_columns, update_columns, Some(version_column))
    }

    fn build(
        spec: TableSpec,
        conflict_columns: &[&'static str],
        update_columns: &[&'static str],
        version_column: Option<&'static str>,
    ) -> RepoResult<Self> {
        spec.require_entity_columns(E::COLUMNS)?;
        if conflict_columns.is_empty() || update_columns.is_empty() {
            return Err(RepoError::InvalidIdentifier(format!(
                "upsert on `{}` needs conflict and update columns",
                spec.table()
            )));
        }
        spec.require_columns(conflict_columns)?;
        spec.require_columns(update_columns)?;
        if let Some(version) = version_column {
            spec.require_columns(&[version])?;
            if update_columns.contains(&version) || conflict_columns.contains(&version) {
                return Err(RepoError::InvalidIdentifier(format!(
                    "version column `{version}` cannot be a conflict or update column"
                )));
            }
        }

        let table = spec.table();
        let placeholders = spec
            .columns()
            .iter()
            .map(|column| format!(":{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut assignments = update_columns
            .iter()
            .map(|column| format!("{column} = excluded.{column}"))
            .collect::<Vec<_>>();
        if let Some(version) = version_column {
            assignments.push(format!("{version} = {table}.{version} + 1"));
        }
        let assignments = assignments.join(", ");
        let mut sql = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders}) ON CONFLICT ({}) DO UPDATE SET {assignments}",
            spec.column_list(),
            conflict_columns.join(", ")
        );
        if let Some(tenant_column) = spec.tenant_column() {
            sql.push_str(&format!(
                " WHERE {table}.{tenant_column} = excluded.{tenant_column}"
            ));
        }

        Ok(Self {
            spec,
            sql,
            _entity: PhantomData,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn upsert(&self, scope: &dyn ExecutionScope, entity: Option<&E>) -> RepoResult<()> {
        let entity = entity.ok_or(RepoError::NilInput {
            resource: self.spec.resource(),
            operation: Operation::Upsert,
        })?;
        check_entity_tenant(&self.spec, scope, entity, Operation::Upsert)?;

        let values = entity_values(&self.spec, entity, self.spec.columns())?;
        let conn = scope.resolve_handle()?;
        let changed = execute_named(conn, &self.spec, Operation::Upsert, &self.sql, &values)?;

        // The scoped conflict guard suppresses updates of another tenant's row.
        if changed == 0 {
            return Err(RepoError::AlreadyExists {
                resource: self.spec.resource(),
                operation: Operation::Upsert,
                source: None,
            });
        }
        Ok(())
    }
}
