//! Typed filter predicates and WHERE clause rendering.
//!
//! # Invariants
//! - Conditions in one list are ANDed.
//! - Values are always bound through positional placeholders, never inlined.
//! - A field outside the configured column set is rejected at render time.

use crate::repo::error::{RepoError, RepoResult};
use crate::repo::table::TableSpec;
use rusqlite::types::Value;

/// Conversion into an owned value bindable to a placeholder.
pub trait IntoSqlValue {
    fn into_sql_value(self) -> Value;
}

impl IntoSqlValue for Value {
    fn into_sql_value(self) -> Value {
        self
    }
}

impl IntoSqlValue for &str {
    fn into_sql_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoSqlValue for String {
    fn into_sql_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoSqlValue for &String {
    fn into_sql_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoSqlValue for i64 {
    fn into_sql_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoSqlValue for i32 {
    fn into_sql_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoSqlValue for u32 {
    fn into_sql_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoSqlValue for bool {
    fn into_sql_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl<T: IntoSqlValue> IntoSqlValue for Option<T> {
    fn into_sql_value(self) -> Value {
        self.map_or(Value::Null, IntoSqlValue::into_sql_value)
    }
}

/// Comparison applied by one [`Condition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Equal(Value),
    NotEqual(Value),
    GreaterThan(Value),
    LessThan(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    IsNull,
    IsNotNull,
    Like(String),
}

/// One `field <op> value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    field: &'static str,
    operator: Operator,
}

impl Condition {
    pub fn equal(field: &'static str, value: impl IntoSqlValue) -> Self {
        Self::new(field, Operator::Equal(value.into_sql_value()))
    }

    pub fn not_equal(field: &'static str, value: impl IntoSqlValue) -> Self {
        Self::new(field, Operator::NotEqual(value.into_sql_value()))
    }

    pub fn greater_than(field: &'static str, value: impl IntoSqlValue) -> Self {
        Self::new(field, Operator::GreaterThan(value.into_sql_value()))
    }

    pub fn less_than(field: &'static str, value: impl IntoSqlValue) -> Self {
        Self::new(field, Operator::LessThan(value.into_sql_value()))
    }

    pub fn in_values<I, V>(field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoSqlValue,
    {
        Self::new(
            field,
            Operator::In(values.into_iter().map(IntoSqlValue::into_sql_value).collect()),
        )
    }

    pub fn not_in_values<I, V>(field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoSqlValue,
    {
        Self::new(
            field,
            Operator::NotIn(values.into_iter().map(IntoSqlValue::into_sql_value).collect()),
        )
    }

    pub fn is_null(field: &'static str) -> Self {
        Self::new(field, Operator::IsNull)
    }

    pub fn is_not_null(field: &'static str) -> Self {
        Self::new(field, Operator::IsNotNull)
    }

    pub fn like(field: &'static str, pattern: impl Into<String>) -> Self {
        Self::new(field, Operator::Like(pattern.into()))
    }

    pub fn new(field: &'static str, operator: Operator) -> Self {
        Self { field, operator }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    fn render(&self, sql: &mut String, binds: &mut Vec<Value>) {
        let field = self.field;
        match &self.operator {
            Operator::Equal(value) => push_bound(sql, binds, field, "=", value),
            Operator::NotEqual(value) => push_bound(sql, binds, field, "!=", value),
            Operator::GreaterThan(value) => push_bound(sql, binds, field, ">", value),
            Operator::LessThan(value) => push_bound(sql, binds, field, "<", value),
            Operator::In(values) => push_list(sql, binds, field, "IN", values, "1 = 0"),
            Operator::NotIn(values) => push_list(sql, binds, field, "NOT IN", values, "1 = 1"),
            Operator::IsNull => sql.push_str(&format!("{field} IS NULL")),
            Operator::IsNotNull => sql.push_str(&format!("{field} IS NOT NULL")),
            Operator::Like(pattern) => {
                push_bound(sql, binds, field, "LIKE", &Value::Text(pattern.clone()))
            }
        }
    }
}

/// Ordered, ANDed list of conditions.
pub type Conditions = Vec<Condition>;

/// Rendered predicate text plus its positional bind values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub binds: Vec<Value>,
}

/// Renders ` WHERE c1 AND c2 …` (with a leading space) or an empty string.
pub fn render_where(spec: &TableSpec, conditions: &[Condition]) -> RepoResult<WhereClause> {
    let mut clause = WhereClause::default();
    for (index, condition) in conditions.iter().enumerate() {
        if !spec.has_column(condition.field) {
            return Err(RepoError::UnknownColumn {
                resource: spec.resource(),
                column: condition.field,
            });
        }
        clause.sql.push_str(if index == 0 { " WHERE " } else { " AND " });
        condition.render(&mut clause.sql, &mut clause.binds);
    }
    Ok(clause)
}

fn push_bound(sql: &mut String, binds: &mut Vec<Value>, field: &str, op: &str, value: &Value) {
    binds.push(value.clone());
    sql.push_str(&format!("{field} {op} ?{}", binds.len()));
}

fn push_list(
    sql: &mut String,
    binds: &mut Vec<Value>,
    field: &str,
    op: &str,
    values: &[Value],
    empty: &str,
) {
    if values.is_empty() {
        sql.push_str(empty);
        return;
    }

    let mut placeholders = Vec::with_capacity(values.len());
    for value in values {
        binds.push(value.clone());
        placeholders.push(format!("?{}", binds.len()));
    }
    sql.push_str(&format!("{field} {op} ({})", placeholders.join(", ")));
}
