//! Single-row SELECT generator.
//!
//! # Invariants
//! - No implicit status or soft-delete filtering; callers pass it explicitly.
//! - More than one matching row is a data-integrity fault, not a pick.

use crate::repo::condition::{render_where, Condition};
use crate::repo::entity::Entity;
use crate::repo::error::{Operation, RepoError, RepoResult};
use crate::repo::exec::query_entities;
use crate::repo::order::{render_order_by, OrderBy};
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub struct SingleGetter<E> {
    spec: TableSpec,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> SingleGetter<E> {
    pub fn new(spec: TableSpec) -> RepoResult<Self> {
        spec.require_entity_columns(E::COLUMNS)?;
        Ok(Self {
            spec,
            _entity: PhantomData,
        })
    }

    pub fn get(
        &self,
        scope: &dyn ExecutionScope,
        conditions: &[Condition],
        order: &[OrderBy],
    ) -> RepoResult<E> {
        if conditions.is_empty() {
            return Err(RepoError::EmptyConditions {
                resource: self.spec.resource(),
                operation: Operation::Get,
            });
        }

        let mut all = conditions.to_vec();
        all.extend(self.spec.scope_condition(scope, Operation::Get)?);
        let clause = render_where(&self.spec, &all)?;
        let sql = format!(
            "SELECT {} FROM {}{}{} LIMIT 2",
            self.spec.column_list(),
            self.spec.table(),
            clause.sql,
            render_order_by(&self.spec, order)?
        );

        let conn = scope.resolve_handle()?;
        let mut rows = query_entities::<E>(conn, &self.spec, Operation::Get, &sql, &clause.binds)?;
        match rows.len() {
            0 => Err(RepoError::not_found(self.spec.resource(), Operation::Get)),
            1 => Ok(rows.remove(0)),
            matched => Err(RepoError::MultipleRows {
                resource: self.spec.resource(),
                operation: Operation::Get,
                matched,
            }),
        }
    }
}
