//! Statement execution against a resolved handle.
//!
//! # Responsibility
//! - Bind values, run statements and decode rows.
//! - Route every driver failure through `classify`.
//! - Emit metadata-only `repo_exec` log events.
//!
//! # Invariants
//! - Row decoding aborts on the first error; partial results are dropped.
//! - Logged fields never include bound values.

use crate::repo::entity::Entity;
use crate::repo::error::{classify, Operation, RepoError, RepoResult};
use crate::repo::table::TableSpec;
use log::debug;
use rusqlite::types::{ToSql, Value};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::time::Instant;

/// Named bind values, keyed by placeholder name including the `:` prefix.
pub(crate) type NamedValues = Vec<(String, Value)>;

/// Collects `:column -> value` pairs for `columns` from `entity`.
pub(crate) fn entity_values<E: Entity>(
    spec: &TableSpec,
    entity: &E,
    columns: &[&'static str],
) -> RepoResult<NamedValues> {
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let value = entity.column_value(column).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "entity for table `{}` returned no value for column `{column}`",
                spec.table()
            ))
        })?;
        values.push((format!(":{column}"), value));
    }
    Ok(values)
}

pub(crate) fn execute_named(
    conn: &Connection,
    spec: &TableSpec,
    operation: Operation,
    sql: &str,
    values: &NamedValues,
) -> RepoResult<usize> {
    let started_at = Instant::now();
    let named: Vec<(&str, &dyn ToSql)> = values
        .iter()
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect();
    let changed = conn
        .execute(sql, named.as_slice())
        .map_err(|err| classify(err, spec.resource(), operation))?;
    log_ok(spec, operation, started_at, changed);
    Ok(changed)
}

pub(crate) fn execute_positional(
    conn: &Connection,
    spec: &TableSpec,
    operation: Operation,
    sql: &str,
    binds: &[Value],
) -> RepoResult<usize> {
    let started_at = Instant::now();
    let changed = conn
        .execute(sql, params_from_iter(binds.iter()))
        .map_err(|err| classify(err, spec.resource(), operation))?;
    log_ok(spec, operation, started_at, changed);
    Ok(changed)
}

pub(crate) fn query_entities<E: Entity>(
    conn: &Connection,
    spec: &TableSpec,
    operation: Operation,
    sql: &str,
    binds: &[Value],
) -> RepoResult<Vec<E>> {
    let started_at = Instant::now();
    let classify_err = |err: rusqlite::Error| classify(err, spec.resource(), operation);

    let mut stmt = conn.prepare(sql).map_err(classify_err)?;
    let mut rows = stmt.query(params_from_iter(binds.iter())).map_err(classify_err)?;
    let mut entities = Vec::new();
    while let Some(row) = rows.next().map_err(classify_err)? {
        entities.push(E::from_row(row).map_err(classify_err)?);
    }

    log_ok(spec, operation, started_at, entities.len());
    Ok(entities)
}

pub(crate) fn query_i64(
    conn: &Connection,
    spec: &TableSpec,
    operation: Operation,
    sql: &str,
    binds: &[Value],
) -> RepoResult<Option<i64>> {
    let started_at = Instant::now();
    let value = conn
        .query_row(sql, params_from_iter(binds.iter()), |row| row.get::<_, i64>(0))
        .optional()
        .map_err(|err| classify(err, spec.resource(), operation))?;
    log_ok(spec, operation, started_at, usize::from(value.is_some()));
    Ok(value)
}

/// First column of the first row, or `None` when nothing matches.
pub(crate) fn query_value(
    conn: &Connection,
    spec: &TableSpec,
    operation: Operation,
    sql: &str,
    binds: &[Value],
) -> RepoResult<Option<Value>> {
    let started_at = Instant::now();
    let value = conn
        .query_row(sql, params_from_iter(binds.iter()), |row| row.get::<_, Value>(0))
        .optional()
        .map_err(|err| classify(err, spec.resource(), operation))?;
    log_ok(spec, operation, started_at, usize::from(value.is_some()));
    Ok(value)
}

fn log_ok(spec: &TableSpec, operation: Operation, started_at: Instant, rows: usize) {
    debug!(
        "event=repo_exec module=repo status=ok resource={} table={} op={} rows={} duration_ms={}",
        spec.resource(),
        spec.table(),
        operation,
        rows,
        started_at.elapsed().as_millis()
    );
}
