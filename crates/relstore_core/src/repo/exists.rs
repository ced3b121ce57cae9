//! Existence check generator.

use crate::repo::condition::{render_where, Condition};
use crate::repo::error::{Operation, RepoResult};
use crate::repo::exec::query_i64;
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;

/// Answers "does any row match" without ever reporting `NotFound`.
#[derive(Debug, Clone)]
pub struct ExistQuerier {
    spec: TableSpec,
}

impl ExistQuerier {
    pub fn new(spec: TableSpec) -> Self {
        Self { spec }
    }

    pub fn exists(&self, scope: &dyn ExecutionScope, conditions: &[Condition]) -> RepoResult<bool> {
        let mut all = conditions.to_vec();
        all.extend(self.spec.scope_condition(scope, Operation::Exists)?);
        let clause = render_where(&self.spec, &all)?;
        let sql = format!("SELECT 1 FROM {}{} LIMIT 1", self.spec.table(), clause.sql);

        let conn = scope.resolve_handle()?;
        let found = query_i64(conn, &self.spec, Operation::Exists, &sql, &clause.binds)?;
        Ok(found.is_some())
    }
}
