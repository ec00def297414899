//! Statement rendering onto `sqlx::QueryBuilder`.
//!
//! Every value is pushed as a bind parameter; identifiers are always
//! double-quoted. `NULL` is written inline since an untyped bind would be
//! sent as `text` and rejected by non-text columns.

use sqlx::{Postgres, QueryBuilder};

use crate::expr::{
    Assignment, Column, ColumnList, Expr, Operator, OrderBy, SearchParams, SortOrder, Table, Value,
};

/// Trait for pushing nodes onto a query builder.
pub trait PushSql {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>);
}

/// Double-quote an identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl PushSql for Table {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if !self.schema.is_empty() {
            qb.push(quote_ident(self.schema));
            qb.push(".");
        }
        qb.push(quote_ident(self.name));
    }
}

impl PushSql for Column {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(quote_ident(self.name()));
    }
}

impl PushSql for ColumnList {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        for (i, column) in self.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            column.push_sql(qb);
        }
    }
}

impl PushSql for Value {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self.clone() {
            Value::Null => qb.push("NULL"),
            Value::Bool(v) => qb.push_bind(v),
            Value::SmallInt(v) => qb.push_bind(v),
            Value::Int(v) => qb.push_bind(v),
            Value::BigInt(v) => qb.push_bind(v),
            Value::Real(v) => qb.push_bind(v),
            Value::Double(v) => qb.push_bind(v),
            Value::Text(v) => qb.push_bind(v),
            Value::Uuid(v) => qb.push_bind(v),
            Value::Timestamp(v) => qb.push_bind(v),
            Value::TimestampTz(v) => qb.push_bind(v),
            Value::Date(v) => qb.push_bind(v),
        };
    }
}

impl PushSql for Expr {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Expr::Compare { column, op, value } => {
                column.push_sql(qb);
                match (op, value.is_null()) {
                    (Operator::Eq, true) => {
                        qb.push(" IS NULL");
                    }
                    (Operator::Ne, true) => {
                        qb.push(" IS NOT NULL");
                    }
                    _ => {
                        qb.push(" ").push(op.as_sql()).push(" ");
                        value.push_sql(qb);
                    }
                }
            }
            Expr::IsNull(column) => {
                column.push_sql(qb);
                qb.push(" IS NULL");
            }
            Expr::IsNotNull(column) => {
                column.push_sql(qb);
                qb.push(" IS NOT NULL");
            }
            Expr::In { values, .. } if values.is_empty() => {
                qb.push("FALSE");
            }
            Expr::In { column, values } => {
                column.push_sql(qb);
                qb.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    value.push_sql(qb);
                }
                qb.push(")");
            }
            Expr::And(parts) => push_joined(qb, parts, " AND ", "TRUE"),
            Expr::Or(parts) => push_joined(qb, parts, " OR ", "FALSE"),
            Expr::Not(inner) => {
                qb.push("NOT (");
                inner.push_sql(qb);
                qb.push(")");
            }
        }
    }
}

/// Join predicates, parenthesizing nested multi-part groups.
fn push_joined(qb: &mut QueryBuilder<'_, Postgres>, parts: &[Expr], joiner: &str, empty: &str) {
    if parts.is_empty() {
        qb.push(empty);
        return;
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        let grouped = matches!(part, Expr::And(p) | Expr::Or(p) if p.len() > 1);
        if grouped {
            qb.push("(");
        }
        part.push_sql(qb);
        if grouped {
            qb.push(")");
        }
    }
}

impl PushSql for OrderBy {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        self.column.push_sql(qb);
        qb.push(match self.order {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
    }
}

impl PushSql for Assignment {
    fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        let column = self.column();
        column.push_sql(qb);
        qb.push(" = ");
        match self {
            Assignment::Set(_, value) => value.push_sql(qb),
            Assignment::Excluded(_) => {
                qb.push("EXCLUDED.");
                column.push_sql(qb);
            }
        }
    }
}

/// `ON CONFLICT (targets) DO UPDATE SET assignments`
#[derive(Debug, Clone, Copy)]
pub struct OnConflict<'a> {
    pub targets: &'a ColumnList,
    pub assignments: &'a [Assignment],
}

fn push_returning(qb: &mut QueryBuilder<'_, Postgres>, returning: &ColumnList) {
    if !returning.is_empty() {
        qb.push(" RETURNING ");
        returning.push_sql(qb);
    }
}

/// Generate SELECT.
pub fn select(
    table: &Table,
    columns: &ColumnList,
    params: &SearchParams,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    if columns.is_empty() {
        qb.push("*");
    } else {
        columns.push_sql(&mut qb);
    }

    qb.push(" FROM ");
    table.push_sql(&mut qb);

    if let Some(filter) = &params.filter {
        qb.push(" WHERE ");
        filter.push_sql(&mut qb);
    }

    if !params.order_by.is_empty() {
        qb.push(" ORDER BY ");
        for (i, order) in params.order_by.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            order.push_sql(&mut qb);
        }
    }

    if let Some(n) = params.limit {
        qb.push(format!(" LIMIT {}", n));
    }

    if let Some(n) = params.offset {
        qb.push(format!(" OFFSET {}", n));
    }

    qb
}

/// Generate INSERT with one VALUES tuple per row.
///
/// Each row holds one value per column, in column order. With no columns
/// every row is inserted with its defaults.
pub fn insert(
    table: &Table,
    columns: &ColumnList,
    rows: &[Vec<Value>],
    on_conflict: Option<OnConflict<'_>>,
    returning: &ColumnList,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO ");
    table.push_sql(&mut qb);

    if columns.is_empty() && rows.len() <= 1 {
        qb.push(" DEFAULT VALUES");
    } else if columns.is_empty() {
        qb.push(" VALUES ");
        qb.push(vec!["(DEFAULT)"; rows.len()].join(", "));
    } else {
        qb.push(" (");
        columns.push_sql(&mut qb);
        qb.push(") VALUES ");
        for (r, row) in rows.iter().enumerate() {
            if r > 0 {
                qb.push(", ");
            }
            qb.push("(");
            for (i, value) in row.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                value.push_sql(&mut qb);
            }
            qb.push(")");
        }
    }

    if let Some(conflict) = on_conflict {
        qb.push(" ON CONFLICT (");
        conflict.targets.push_sql(&mut qb);
        qb.push(") DO UPDATE SET ");
        for (i, assignment) in conflict.assignments.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            assignment.push_sql(&mut qb);
        }
    }

    push_returning(&mut qb, returning);
    qb
}

/// Generate UPDATE. `assignments` must not be empty; `crud::update` checks
/// this before rendering.
pub fn update(
    table: &Table,
    assignments: &[Assignment],
    filter: &Expr,
    returning: &ColumnList,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE ");
    table.push_sql(&mut qb);

    qb.push(" SET ");
    for (i, assignment) in assignments.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        assignment.push_sql(&mut qb);
    }

    qb.push(" WHERE ");
    filter.push_sql(&mut qb);

    push_returning(&mut qb, returning);
    qb
}

/// Generate DELETE.
pub fn delete(table: &Table, filter: &Expr) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("DELETE FROM ");
    table.push_sql(&mut qb);
    qb.push(" WHERE ");
    filter.push_sql(&mut qb);
    qb
}
