//! Keyset-paginated SELECT generator.
//!
//! # Invariants
//! - Pages are ordered ascending by a single order column; the caller must
//!   pick a unique, monotonic column or pages may skip or repeat rows.
//! - Every page is an independent short query; no transaction spans pages.
//! - Exactly `page_size + 1` rows are fetched; the extra row only decides
//!   `has_next_page` and is never returned.
//! - A cursor key must have the same storage kind as the order column;
//!   a mismatch is `MalformedCursor`.

use crate::repo::condition::{render_where, Condition};
use crate::repo::entity::Entity;
use crate::repo::error::{Operation, RepoError, RepoResult};
use crate::repo::exec::{query_entities, query_i64, query_value};
use crate::repo::pagination::{Cursor, CursorKey, Page, PageInfo};
use crate::repo::scope::ExecutionScope;
use crate::repo::table::TableSpec;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub struct PageableQuerier<E> {
    spec: TableSpec,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PageableQuerier<E> {
    pub fn new(spec: TableSpec) -> RepoResult<Self> {
        spec.require_entity_columns(E::COLUMNS)?;
        Ok(Self {
            spec,
            _entity: PhantomData,
        })
    }

    pub fn list(
        &self,
        scope: &dyn ExecutionScope,
        conditions: &[Condition],
        page_size: u32,
        cursor: &str,
        order_column: &'static str,
    ) -> RepoResult<Page<E>> {
        if page_size == 0 {
            return Err(RepoError::InvalidPageSize(page_size));
        }
        if !self.spec.has_column(order_column) {
            return Err(RepoError::UnknownColumn {
                resource: self.spec.resource(),
                column: order_column,
            });
        }

        let after = match Cursor::decode(cursor)? {
            None => None,
            Some(decoded) if decoded.column == order_column => Some(decoded.after),
            Some(decoded) => {
                return Err(RepoError::MalformedCursor(format!(
                    "cursor was issued for column `{}`, not `{order_column}`",
                    decoded.column
                )))
            }
        };

        let mut matching = conditions.to_vec();
        matching.extend(self.spec.scope_condition(scope, Operation::List)?);
        let conn = scope.resolve_handle()?;

        let count_clause = render_where(&self.spec, &matching)?;
        let count_sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            self.spec.table(),
            count_clause.sql
        );
        let total_count = checked_count(
            self.spec.table(),
            query_i64(
                conn,
                &self.spec,
                Operation::Count,
                &count_sql,
                &count_clause.binds,
            )?
            .unwrap_or(0),
        )?;

        let mut bounded = matching.clone();
        if let Some(key) = &after {
            bounded.push(Condition::greater_than(order_column, key.clone().into_value()));
        }
        let clause = render_where(&self.spec, &bounded)?;
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {order_column} ASC LIMIT {}",
            self.spec.column_list(),
            self.spec.table(),
            clause.sql,
            u64::from(page_size) + 1
        );
        let mut items = query_entities::<E>(conn, &self.spec, Operation::List, &sql, &clause.binds)?;

        if let Some(key) = &after {
            let sample = match items.first() {
                Some(first) => first.column_value(order_column),
                None => self.sample_order_value(conn, &matching, order_column)?,
            };
            if sample.is_some_and(|value| !key.matches_kind(&value)) {
                return Err(RepoError::MalformedCursor(format!(
                    "cursor key kind does not match column `{order_column}`"
                )));
            }
        }

        let has_next_page = items.len() > page_size as usize;
        items.truncate(page_size as usize);

        let end_cursor = match items.last() {
            Some(last) => {
                let value = last.column_value(order_column).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "entity for table `{}` returned no value for column `{order_column}`",
                        self.spec.table()
                    ))
                })?;
                Cursor {
                    column: order_column.to_string(),
                    after: CursorKey::from_value(value)?,
                }
                .encode()?
            }
            None => String::new(),
        };

        Ok(Page {
            items,
            total_count,
            page_info: PageInfo {
                start_cursor: cursor.trim().to_string(),
                end_cursor,
                has_next_page,
            },
        })
    }

    /// Non-null order key of any row in the matching set, ignoring the cursor.
    fn sample_order_value(
        &self,
        conn: &Connection,
        matching: &[Condition],
        order_column: &'static str,
    ) -> RepoResult<Option<Value>> {
        let mut keyed = matching.to_vec();
        keyed.push(Condition::is_not_null(order_column));
        let clause = render_where(&self.spec, &keyed)?;
        let sql = format!(
            "SELECT {order_column} FROM {}{} LIMIT 1",
            self.spec.table(),
            clause.sql
        );
        query_value(conn, &self.spec, Operation::List, &sql, &clause.binds)
    }
}

fn checked_count(table: &str, raw: i64) -> RepoResult<u64> {
    u64::try_from(raw).map_err(|_| {
        RepoError::InvalidData(format!("negative row count {raw} for table `{table}`"))
    })
}

#[cfg(test)]
mod tests {
    use super::checked_count;
    use crate::repo::error::RepoError;

    #[test]
    fn negative_count_is_invalid_data() {
        assert_eq!(checked_count("t", 0).unwrap(), 0);
        assert_eq!(checked_count("t", 12).unwrap(), 12);
        assert!(matches!(
            checked_count("t", -1),
            Err(RepoError::InvalidData(_))
        ));
    }
}
