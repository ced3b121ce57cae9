//! Construction-time table configuration shared by all generators.
//!
//! # Responsibility
//! - Hold the table name, column set and optional tenant column of one
//!   persisted resource.
//! - Validate every identifier before it can reach SQL text.
//!
//! # Invariants
//! - Identifiers are `'static` literals from code, never request input.
//! - A constructed `TableSpec` has passed identifier validation.

use crate::repo::condition::Condition;
use crate::repo::error::{Operation, RepoError, RepoResult, ResourceType};
use crate::repo::scope::ExecutionScope;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static COLUMN_IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid column regex"));
static TABLE_IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid table regex")
});

/// Validated description of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    resource: ResourceType,
    table: &'static str,
    columns: Vec<&'static str>,
    tenant_column: Option<&'static str>,
}

impl TableSpec {
    /// Spec for a resource addressed without tenant filtering.
    pub fn global(
        resource: ResourceType,
        table: &'static str,
        columns: &[&'static str],
    ) -> RepoResult<Self> {
        Self::build(resource, table, columns, None)
    }

    /// Spec for a resource whose rows are owned by a tenant.
    ///
    /// `tenant_column` must be part of `columns`.
    pub fn tenant_scoped(
        resource: ResourceType,
        table: &'static str,
        columns: &[&'static str],
        tenant_column: &'static str,
    ) -> RepoResult<Self> {
        Self::build(resource, table, columns, Some(tenant_column))
    }

    fn build(
        resource: ResourceType,
        table: &'static str,
        columns: &[&'static str],
        tenant_column: Option<&'static str>,
    ) -> RepoResult<Self> {
        if !TABLE_IDENT_RE.is_match(table) {
            return Err(RepoError::InvalidIdentifier(format!(
                "table name `{table}` for {resource}"
            )));
        }
        if columns.is_empty() {
            return Err(RepoError::InvalidIdentifier(format!(
                "table `{table}` has no columns"
            )));
        }

        let mut seen = HashSet::new();
        for column in columns {
            validate_column(column)?;
            if !seen.insert(*column) {
                return Err(RepoError::InvalidIdentifier(format!(
                    "duplicate column `{column}` in table `{table}`"
                )));
            }
        }

        let spec = Self {
            resource,
            table,
            columns: columns.to_vec(),
            tenant_column,
        };
        if let Some(column) = tenant_column {
            spec.require_columns(&[column])?;
        }
        Ok(spec)
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn tenant_column(&self) -> Option<&'static str> {
        self.tenant_column
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|known| *known == column)
    }

    /// Fails with `InvalidIdentifier` unless every column is configured.
    pub fn require_columns(&self, columns: &[&'static str]) -> RepoResult<()> {
        for column in columns {
            validate_column(column)?;
            if !self.has_column(column) {
                return Err(RepoError::InvalidIdentifier(format!(
                    "column `{column}` is not part of table `{}`",
                    self.table
                )));
            }
        }
        Ok(())
    }

    /// Fails with `InvalidIdentifier` unless every configured column is
    /// declared by the entity type.
    pub fn require_entity_columns(&self, entity_columns: &[&'static str]) -> RepoResult<()> {
        for column in &self.columns {
            if !entity_columns.contains(column) {
                return Err(RepoError::InvalidIdentifier(format!(
                    "entity for table `{}` does not declare column `{column}`",
                    self.table
                )));
            }
        }
        Ok(())
    }

    /// Tenant filter to append for the given scope, if this table is tenant-scoped.
    pub(crate) fn scope_condition(
        &self,
        scope: &dyn ExecutionScope,
        operation: Operation,
    ) -> RepoResult<Option<Condition>> {
        match self.tenant_column {
            None => Ok(None),
            Some(column) => {
                let tenant = self.scope_tenant(scope, operation)?;
                Ok(Some(Condition::equal(column, tenant)))
            }
        }
    }

    pub(crate) fn scope_tenant<'s>(
        &self,
        scope: &'s dyn ExecutionScope,
        operation: Operation,
    ) -> RepoResult<&'s str> {
        scope.tenant().ok_or(RepoError::MissingTenant {
            resource: self.resource,
            operation,
        })
    }

    pub(crate) fn column_list(&self) -> String {
        self.columns.join(", ")
    }
}

fn validate_column(column: &str) -> RepoResult<()> {
    if COLUMN_IDENT_RE.is_match(column) {
        Ok(())
    } else {
        Err(RepoError::InvalidIdentifier(format!("column name `{column}`")))
    }
}
