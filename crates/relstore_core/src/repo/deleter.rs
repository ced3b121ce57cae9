//! DELETE generator.
//!
//! # Invariants
//! - `delete_one` removes a row only when exactly one row matches; the
//!   match count is checked inside the same statement.

use crate::repo::condition::{render_where, Condition, WhereClause};
use crate::repo::error::{Operation, RepoError, RepoResult};
use crate::repo::exec::{execute_positional, query_i64};
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;

#[derive(Debug, Clone)]
pub struct Deleter {
    spec: TableSpec,
}

impl Deleter {
    pub fn new(spec: TableSpec) -> Self {
        Self { spec }
    }

    /// Deletes exactly one row.
    ///
    /// Zero matches report `NotFound`; several matches report `MultipleRows`
    /// and delete nothing.
    pub fn delete_one(&self, scope: &dyn ExecutionScope, conditions: &[Condition]) -> RepoResult<()> {
        if conditions.is_empty() {
            return Err(RepoError::EmptyConditions {
                resource: self.spec.resource(),
                operation: Operation::Delete,
            });
        }

        let clause = self.scoped_where(scope, conditions)?;
        let table = self.spec.table();
        // Both subqueries reuse the same `?N` placeholders as the outer WHERE.
        let sql = format!(
            "DELETE FROM {table}{where_sql} AND (SELECT COUNT(*) FROM (SELECT 1 FROM {table}{where_sql} LIMIT 2)) = 1",
            where_sql = clause.sql
        );

        let conn = scope.resolve_handle()?;
        if execute_positional(conn, &self.spec, Operation::Delete, &sql, &clause.binds)? == 1 {
            return Ok(());
        }

        let count_sql = format!("SELECT COUNT(*) FROM (SELECT 1 FROM {table}{} LIMIT 2)", clause.sql);
        match query_i64(conn, &self.spec, Operation::Delete, &count_sql, &clause.binds)? {
            Some(matched) if matched > 1 => Err(RepoError::MultipleRows {
                resource: self.spec.resource(),
                operation: Operation::Delete,
                matched: matched as usize,
            }),
            _ => Err(RepoError::not_found(self.spec.resource(), Operation::Delete)),
        }
    }

    /// Deletes every matching row and returns how many were removed.
    ///
    /// Idempotent: deleting nothing is not an error.
    pub fn delete_many(
        &self,
        scope: &dyn ExecutionScope,
        conditions: &[Condition],
    ) -> RepoResult<usize> {
        let clause = self.scoped_where(scope, conditions)?;
        let sql = format!("DELETE FROM {}{}", self.spec.table(), clause.sql);

        let conn = scope.resolve_handle()?;
        execute_positional(conn, &self.spec, Operation::Delete, &sql, &clause.binds)
    }

    fn scoped_where(
        &self,
        scope: &dyn ExecutionScope,
        conditions: &[Condition],
    ) -> RepoResult<WhereClause> {
        let mut all = conditions.to_vec();
        all.extend(self.spec.scope_condition(scope, Operation::Delete)?);
        render_where(&self.spec, &all)
    }
}
