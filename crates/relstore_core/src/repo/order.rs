//! ORDER BY rendering.

use crate::repo::error::{RepoError, RepoResult};
use crate::repo::table::TableSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: OrderDirection::Desc,
        }
    }
}

/// Ordering applied to a query; empty means driver default.
pub type OrderByParams = Vec<OrderBy>;

/// Sentinel for "unordered".
pub const NO_ORDER_BY: OrderByParams = Vec::new();

/// Renders ` ORDER BY a ASC, b DESC` (leading space) or an empty string.
pub fn render_order_by(spec: &TableSpec, order: &[OrderBy]) -> RepoResult<String> {
    if order.is_empty() {
        return Ok(String::new());
    }

    let mut parts = Vec::with_capacity(order.len());
    for item in order {
        if !spec.has_column(item.column) {
            return Err(RepoError::UnknownColumn {
                resource: spec.resource(),
                column: item.column,
            });
        }
        parts.push(format!("{} {}", item.column, item.direction.as_sql()));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}
