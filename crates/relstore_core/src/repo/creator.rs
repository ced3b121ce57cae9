//! INSERT generator.

use crate::repo::entity::Entity;
use crate::repo::error::{Operation, RepoError, RepoResult};
use crate::repo::exec::{entity_values, execute_named};
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use rusqlite::types::Value;
use std::marker::PhantomData;

/// Inserts one entity into the configured table.
#[derive(Debug, Clone)]
pub struct Creator<E> {
    spec: TableSpec,
    sql: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Creator<E> {
    pub fn new(spec: TableSpec) -> RepoResult<Self> {
        spec.require_entity_columns(E::COLUMNS)?;
        let placeholders = spec
            .columns()
            .iter()
            .map(|column| format!(":{column}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            spec.table(),
            spec.column_list(),
            placeholders
        );

        Ok(Self {
            spec,
            sql,
            _entity: PhantomData,
        })
    }

    /// Rendered statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn create(&self, scope: &dyn ExecutionScope, entity: Option<&E>) -> RepoResult<()> {
        let entity = entity.ok_or(RepoError::NilInput {
            resource: self.spec.resource(),
            operation: Operation::Create,
        })?;
        check_entity_tenant(&self.spec, scope, entity, Operation::Create)?;

        let values = entity_values(&self.spec, entity, self.spec.columns())?;
        let conn = scope.resolve_handle()?;
        execute_named(conn, &self.spec, Operation::Create, &self.sql, &values)?;
        Ok(())
    }
}

/// Rejects writes whose tenant column differs from the scope tenant.
pub(crate) fn check_entity_tenant<E: Entity>(
    spec: &TableSpec,
    scope: &dyn ExecutionScope,
    entity: &E,
    operation: Operation,
) -> RepoResult<()> {
    let Some(column) = spec.tenant_column() else {
        return Ok(());
    };

    let tenant = spec.scope_tenant(scope, operation)?;
    match entity.column_value(column) {
        Some(Value::Text(value)) if value == tenant => Ok(()),
        _ => Err(RepoError::TenantMismatch {
            resource: spec.resource(),
            operation,
        }),
    }
}
