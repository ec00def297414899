//! Typed building blocks for statements: columns, values, predicates,
//! ordering and assignments.
//!
//! `sqlx::QueryBuilder` only appends text and binds, so predicates have to
//! exist as values before they are pushed. Everything here is plain data;
//! rendering lives in [`crate::sql`].
//!
//! ```
//! use daokit::expr::{col, SearchParams};
//!
//! let params = SearchParams::new()
//!     .filter(col("active").eq(true).and(col("age").gte(18)))
//!     .order_by(col("created_at").desc())
//!     .limit(10);
//! assert_eq!(params.limit, Some(10));
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// A bindable SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Uuid(Uuid),
    /// `timestamp` (without time zone)
    Timestamp(NaiveDateTime),
    /// `timestamptz`
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::SmallInt(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}", n),
            Value::Real(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Uuid(u) => write!(f, "'{}'", u),
            Value::Timestamp(ts) => write!(f, "'{}'", ts),
            Value::TimestampTz(ts) => write!(f, "'{}'", ts.to_rfc3339()),
            Value::Date(d) => write!(f, "'{}'", d),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl From<Option<$ty>> for Value {
                fn from(v: Option<$ty>) -> Self {
                    v.map_or(Value::Null, Value::$variant)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Real,
    f64 => Double,
    String => Text,
    Uuid => Uuid,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    NaiveDate => Date,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Option<&str>> for Value {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Value::Null, |s| Value::Text(s.to_string()))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
        }
    }
}

/// A column reference by SQL name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column(&'static str);

/// Shorthand for [`Column::new`].
pub const fn col(name: &'static str) -> Column {
    Column::new(name)
}

impl Column {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }

    fn compare(self, op: Operator, value: impl Into<Value>) -> Expr {
        Expr::Compare {
            column: self,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.compare(Operator::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Expr {
        self.compare(Operator::Ne, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.compare(Operator::Gt, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Expr {
        self.compare(Operator::Gte, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.compare(Operator::Lt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Expr {
        self.compare(Operator::Lte, value)
    }

    pub fn like(self, pattern: impl Into<Value>) -> Expr {
        self.compare(Operator::Like, pattern)
    }

    pub fn ilike(self, pattern: impl Into<Value>) -> Expr {
        self.compare(Operator::ILike, pattern)
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(self)
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNotNull(self)
    }

    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Expr {
        Expr::In {
            column: self,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn asc(self) -> OrderBy {
        OrderBy {
            column: self,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(self) -> OrderBy {
        OrderBy {
            column: self,
            order: SortOrder::Desc,
        }
    }

    /// `column = value`
    pub fn set(self, value: impl Into<Value>) -> Assignment {
        Assignment::Set(self, value.into())
    }

    /// `column = EXCLUDED.column`, for `ON CONFLICT ... DO UPDATE`.
    pub fn set_excluded(self) -> Assignment {
        Assignment::Excluded(self)
    }
}

/// A boolean predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        column: Column,
        op: Operator,
        value: Value,
    },
    IsNull(Column),
    IsNotNull(Column),
    In {
        column: Column,
        values: Vec<Value>,
    },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// Conjunction; chains of `and` stay flat.
    pub fn and(self, other: Expr) -> Expr {
        match self {
            Expr::And(mut parts) => {
                parts.push(other);
                Expr::And(parts)
            }
            first => Expr::And(vec![first, other]),
        }
    }

    /// Disjunction; chains of `or` stay flat.
    pub fn or(self, other: Expr) -> Expr {
        match self {
            Expr::Or(mut parts) => {
                parts.push(other);
                Expr::Or(parts)
            }
            first => Expr::Or(vec![first, other]),
        }
    }

    /// OR of every predicate, `None` when there are none.
    pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        exprs.into_iter().reduce(Expr::or)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub order: SortOrder,
}

/// One `SET` item of an `UPDATE` or an `ON CONFLICT ... DO UPDATE`.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Set(Column, Value),
    Excluded(Column),
}

impl Assignment {
    pub fn column(&self) -> Column {
        match self {
            Assignment::Set(c, _) | Assignment::Excluded(c) => *c,
        }
    }
}

/// Ordered list of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnList(Vec<Column>);

impl ColumnList {
    pub fn new(columns: Vec<Column>) -> Self {
        Self(columns)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Every column except the named ones.
    pub fn except(&self, names: &[&str]) -> ColumnList {
        self.0
            .iter()
            .filter(|c| !names.contains(&c.name()))
            .copied()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Column> for ColumnList {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ColumnList {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A table: schema, name and every column in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub schema: &'static str,
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl Table {
    pub const fn new(
        schema: &'static str,
        name: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            schema,
            name,
            columns,
        }
    }

    pub fn all_columns(&self) -> ColumnList {
        self.columns.iter().copied().map(Column::new).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns
            .iter()
            .find(|c| **c == name)
            .copied()
            .map(Column::new)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.schema.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.schema, self.name)
        }
    }
}

/// Optional filtering, ordering and paging for `index`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the WHERE predicate, AND-ing it onto any existing one.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
