//! Declarative list-query primitives shared by all repositories.
//!
//! # Responsibility
//! - Model filter predicates, ordering and pagination as plain data.
//! - Assemble parameterized SQL fragments from that data.
//!
//! # Invariants
//! - Column names are validated against a per-table allow list before they
//!   reach SQL text; values only ever travel as bind parameters.
//! - Result order is deterministic: ties always break by `id ASC`.

use super::{RepoError, RepoResult};
use rusqlite::types::Value;

/// Sort direction for [`Ordering`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Order clause: one named column plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Descending,
        }
    }
}

/// Comparison applied to one column.
#[derive(Debug, Clone)]
pub enum FilterOp {
    Eq(Value),
    Ne(Value),
    Lt(Value),
    Le(Value),
    Gt(Value),
    Ge(Value),
    /// Set membership. An empty set matches nothing.
    OneOf(Vec<Value>),
}

/// One filter clause; clauses combine with AND.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq(value.into()),
        }
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Ne(value.into()),
        }
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Lt(value.into()),
        }
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Le(value.into()),
        }
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Gt(value.into()),
        }
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Ge(value.into()),
        }
    }

    pub fn one_of(
        column: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::OneOf(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// Query options for repository list operations.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Filter clauses, combined with AND.
    pub filters: Vec<Filter>,
    /// Optional order clause. Defaults to insertion order (`id ASC`).
    pub order: Option<Ordering>,
    /// Include soft-deleted rows. Ignored by entities without a tombstone.
    pub include_deleted: bool,
    /// Maximum rows to return. `None` means unbounded.
    pub limit: Option<u32>,
    /// Rows to skip after ordering.
    pub offset: u32,
}

/// Appends `AND <column> <op> ?` fragments for each filter clause.
pub(crate) fn append_filters(
    sql: &mut String,
    binds: &mut Vec<Value>,
    filters: &[Filter],
    table: &'static str,
    allowed: &[&str],
) -> RepoResult<()> {
    for filter in filters {
        ensure_column(table, allowed, &filter.column)?;
        match &filter.op {
            FilterOp::Eq(value) => push_comparison(sql, binds, &filter.column, "=", value),
            FilterOp::Ne(value) => push_comparison(sql, binds, &filter.column, "<>", value),
            FilterOp::Lt(value) => push_comparison(sql, binds, &filter.column, "<", value),
            FilterOp::Le(value) => push_comparison(sql, binds, &filter.column, "<=", value),
            FilterOp::Gt(value) => push_comparison(sql, binds, &filter.column, ">", value),
            FilterOp::Ge(value) => push_comparison(sql, binds, &filter.column, ">=", value),
            FilterOp::OneOf(values) => {
                if values.is_empty() {
                    sql.push_str(" AND 1 = 0");
                } else {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    sql.push_str(&format!(" AND {} IN ({placeholders})", filter.column));
                    binds.extend(values.iter().cloned());
                }
            }
        }
    }
    Ok(())
}

/// Appends the `ORDER BY` / `LIMIT` / `OFFSET` tail of a list query.
pub(crate) fn append_order_and_page(
    sql: &mut String,
    binds: &mut Vec<Value>,
    query: &ListQuery,
    table: &'static str,
    allowed: &[&str],
) -> RepoResult<()> {
    match &query.order {
        Some(order) => {
            ensure_column(table, allowed, &order.column)?;
            sql.push_str(&format!(
                " ORDER BY {} {}, id ASC",
                order.column,
                order.direction.as_sql()
            ));
        }
        None => sql.push_str(" ORDER BY id ASC"),
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        binds.push(Value::Integer(i64::from(limit)));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            binds.push(Value::Integer(i64::from(query.offset)));
        }
    } else if query.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        binds.push(Value::Integer(i64::from(query.offset)));
    }

    Ok(())
}

fn push_comparison(
    sql: &mut String,
    binds: &mut Vec<Value>,
    column: &str,
    op: &str,
    value: &Value,
) {
    sql.push_str(&format!(" AND {column} {op} ?"));
    binds.push(value.clone());
}

fn ensure_column(table: &'static str, allowed: &[&str], column: &str) -> RepoResult<()> {
    if allowed.contains(&column) {
        Ok(())
    } else {
        Err(RepoError::UnknownColumn {
            table,
            column: column.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{append_filters, append_order_and_page, Filter, ListQuery, Ordering};
    use crate::repo::RepoError;
    use rusqlite::types::Value;

    const COLUMNS: &[&str] = &["id", "code", "price"];

    #[test]
    fn filters_render_placeholders_and_collect_binds() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        let filters = vec![
            Filter::eq("code", "P001".to_string()),
            Filter::gt("price", 10i64),
        ];

        append_filters(&mut sql, &mut binds, &filters, "products", COLUMNS).unwrap();

        assert_eq!(sql, " AND code = ? AND price > ?");
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn empty_set_membership_matches_nothing() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        let filters = vec![Filter::one_of("price", Vec::<i64>::new())];

        append_filters(&mut sql, &mut binds, &filters, "products", COLUMNS).unwrap();

        assert_eq!(sql, " AND 1 = 0");
        assert!(binds.is_empty());
    }

    #[test]
    fn unknown_column_is_rejected() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        let filters = vec![Filter::eq("nope", 1i64)];

        let err = append_filters(&mut sql, &mut binds, &filters, "products", COLUMNS).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnknownColumn { table: "products", column } if column == "nope"
        ));
    }

    #[test]
    fn order_defaults_to_insertion_order_and_ties_break_by_id() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        append_order_and_page(&mut sql, &mut binds, &ListQuery::default(), "products", COLUMNS)
            .unwrap();
        assert_eq!(sql, " ORDER BY id ASC");

        let mut sql = String::new();
        let query = ListQuery {
            order: Some(Ordering::descending("price")),
            ..ListQuery::default()
        };
        append_order_and_page(&mut sql, &mut binds, &query, "products", COLUMNS).unwrap();
        assert_eq!(sql, " ORDER BY price DESC, id ASC");
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let mut sql = String::new();
        let mut binds = Vec::new();
        let query = ListQuery {
            offset: 3,
            ..ListQuery::default()
        };

        append_order_and_page(&mut sql, &mut binds, &query, "products", COLUMNS).unwrap();

        assert_eq!(sql, " ORDER BY id ASC LIMIT -1 OFFSET ?");
        assert_eq!(binds, vec![Value::Integer(3)]);
    }
}
