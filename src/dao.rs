//! The Data Access Object capability set.
//!
//! A DAO describes one table to the CRUD helpers in [`crate::crud`]: which
//! columns to read and write, how a primary key becomes a predicate, and how
//! to stamp a row's update time. The `daokit gen` command emits a unit
//! struct implementing all of these per table; [`Dao`] is implemented
//! automatically for any type that has the full set.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::postgres::PgRow;

use crate::expr::{Assignment, ColumnList, Expr, Table, Value};

/// A row type the helpers can decode and bind.
///
/// `value` exposes a field by its SQL column name; `None` means the row has
/// no such column.
pub trait Model: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    fn value(&self, column: &str) -> Option<Value>;
}

/// The table a DAO reads from and writes to.
pub trait TableSource {
    type Row: Model;

    fn table(&self) -> &Table;
}

/// Column sets for reads and writes.
pub trait BaseCols {
    /// Columns written by `insert` / `insert_many`.
    fn insert_cols(&self) -> ColumnList;
    /// Columns written by `update`, `upsert` and `upsert_many`.
    fn update_cols(&self) -> ColumnList;
    /// Columns selected and returned.
    fn all_cols(&self) -> ColumnList;
}

/// `ON CONFLICT` handling for upserts. The clause is only emitted when both
/// lists are non-empty.
pub trait ConflictCols {
    fn on_conflict_cols(&self) -> ColumnList {
        ColumnList::empty()
    }

    fn update_on_conflict_cols(&self) -> Vec<Assignment> {
        Vec::new()
    }
}

/// Turns a primary key into a predicate matching exactly that row.
pub trait PkMatcher {
    type Pk: Send + Sync;

    fn pk_match(&self, pk: &Self::Pk) -> Expr;
}

/// Stamps the row's update-time column before `update` and `upsert`.
pub trait UpdatedAt: TableSource {
    fn touch_updated_at(&self, _row: &mut Self::Row, _now: DateTime<Utc>) {}
}

/// The full capability set.
pub trait Dao: TableSource + BaseCols + ConflictCols + PkMatcher + UpdatedAt + Send + Sync {}

impl<T> Dao for T where
    T: TableSource + BaseCols + ConflictCols + PkMatcher + UpdatedAt + Send + Sync
{
}

/// Read `columns` off `row`, in order.
pub(crate) fn row_values<D: Dao + ?Sized>(
    dao: &D,
    row: &D::Row,
    columns: &ColumnList,
) -> crate::error::DaoResult<Vec<Value>> {
    columns
        .iter()
        .map(|c| {
            row.value(c.name())
                .ok_or_else(|| crate::error::DaoError::unknown_column(dao.table().name, c.name()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DaoError;
    use crate::expr::col;

    const NOTES: Table = Table::new("public", "notes", &["id", "body"]);

    #[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
    struct Note {
        id: i32,
        body: Option<String>,
    }

    impl Model for Note {
        fn value(&self, column: &str) -> Option<Value> {
            match column {
                "id" => Some(self.id.into()),
                "body" => Some(self.body.clone().into()),
                _ => None,
            }
        }
    }

    struct Notes;

    impl TableSource for Notes {
        type Row = Note;

        fn table(&self) -> &Table {
            &NOTES
        }
    }

    impl BaseCols for Notes {
        fn insert_cols(&self) -> ColumnList {
            NOTES.all_columns().except(&["id"])
        }

        fn update_cols(&self) -> ColumnList {
            ColumnList::new(vec![col("body"), col("title")])
        }

        fn all_cols(&self) -> ColumnList {
            NOTES.all_columns()
        }
    }

    impl ConflictCols for Notes {}

    impl PkMatcher for Notes {
        type Pk = i32;

        fn pk_match(&self, pk: &i32) -> Expr {
            col("id").eq(*pk)
        }
    }

    impl UpdatedAt for Notes {}

    fn assert_dao<D: Dao>(_: &D) {}

    #[test]
    fn test_full_capability_set_is_a_dao() {
        assert_dao(&Notes);
        assert!(Notes.on_conflict_cols().is_empty());
        assert!(Notes.update_on_conflict_cols().is_empty());
    }

    #[test]
    fn test_row_values_in_column_order() {
        let note = Note { id: 3, body: None };
        let values = row_values(&Notes, &note, &Notes.all_cols()).unwrap();
        assert_eq!(values, vec![Value::Int(3), Value::Null]);
    }

    #[test]
    fn test_row_values_unknown_column() {
        let note = Note { id: 3, body: Some("hi".into()) };
        let err = row_values(&Notes, &note, &Notes.update_cols()).unwrap_err();
        assert!(matches!(
            err,
            DaoError::UnknownColumn { ref table, ref column }
                if table == "notes" && column == "title"
        ));
    }

    #[test]
    fn test_touch_updated_at_defaults_to_noop() {
        let mut note = Note { id: 1, body: None };
        Notes.touch_updated_at(&mut note, Utc::now());
        assert_eq!(note, Note { id: 1, body: None });
    }
}
