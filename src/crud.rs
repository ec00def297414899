//! Generic CRUD helpers over any [`Dao`].
//!
//! Each helper renders exactly one statement and runs it on the executor it
//! is given: `&PgPool`, `&mut PgConnection` or `&mut *tx`. Writes use
//! `RETURNING` and copy the stored row back into the caller's value, so
//! database defaults (serial ids, timestamps) are visible afterwards.
//!
//! ```rust,ignore
//! let mut user = User { id: 0, email: "a@x.io".into(), updated_at: None };
//! crud::insert(&BaseUsers, &mut user, &pool).await?;
//! assert!(user.id > 0);
//!
//! let page = crud::index(&BaseUsers, Some(&SearchParams::new().limit(20)), &pool).await?;
//! ```

use chrono::Utc;
use sqlx::{Executor, Postgres};
use tracing::debug;

use crate::dao::{Dao, row_values};
use crate::error::{DaoError, DaoResult};
use crate::expr::{Assignment, ColumnList, Expr, SearchParams};
use crate::sql::{self, OnConflict};

/// List rows, optionally filtered, ordered and paged.
pub async fn index<'e, D, E>(
    dao: &D,
    params: Option<&SearchParams>,
    db: E,
) -> DaoResult<Vec<D::Row>>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let default = SearchParams::default();
    let params = params.unwrap_or(&default);

    let mut qb = sql::select(dao.table(), &dao.all_cols(), params);
    debug!(table = %dao.table(), sql = qb.sql(), "index");

    let rows = qb.build_query_as::<D::Row>().fetch_all(db).await?;
    Ok(rows)
}

/// Fetch the row with the given primary key; [`DaoError::NotFound`] if none.
pub async fn get_one<'e, D, E>(dao: &D, pk: &D::Pk, db: E) -> DaoResult<D::Row>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let params = SearchParams::new().filter(dao.pk_match(pk)).limit(1);

    let mut qb = sql::select(dao.table(), &dao.all_cols(), &params);
    debug!(table = %dao.table(), sql = qb.sql(), "get_one");

    qb.build_query_as::<D::Row>()
        .fetch_one(db)
        .await
        .map_err(DaoError::from_fetch)
}

/// Fetch every row whose primary key is in `pks`. Missing keys are skipped;
/// an empty `pks` returns an empty list without touching the database.
pub async fn get_many<'e, D, E>(dao: &D, pks: &[D::Pk], db: E) -> DaoResult<Vec<D::Row>>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let Some(filter) = Expr::any(pks.iter().map(|pk| dao.pk_match(pk))) else {
        return Ok(Vec::new());
    };
    let params = SearchParams::new().filter(filter);

    let mut qb = sql::select(dao.table(), &dao.all_cols(), &params);
    debug!(table = %dao.table(), sql = qb.sql(), keys = pks.len(), "get_many");

    let rows = qb.build_query_as::<D::Row>().fetch_all(db).await?;
    Ok(rows)
}

/// Insert `row` using the DAO's insert columns.
pub async fn insert<'e, D, E>(dao: &D, row: &mut D::Row, db: E) -> DaoResult<()>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let columns = dao.insert_cols();
    let values = row_values(dao, row, &columns)?;

    let mut qb = sql::insert(dao.table(), &columns, &[values], None, &dao.all_cols());
    debug!(table = %dao.table(), sql = qb.sql(), "insert");

    *row = qb.build_query_as::<D::Row>().fetch_one(db).await?;
    Ok(())
}

/// Insert all `rows` in one statement. An empty slice is a no-op.
pub async fn insert_many<'e, D, E>(dao: &D, rows: &mut [D::Row], db: E) -> DaoResult<()>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    if rows.is_empty() {
        return Ok(());
    }
    let columns = dao.insert_cols();
    let values = rows
        .iter()
        .map(|row| row_values(dao, row, &columns))
        .collect::<DaoResult<Vec<_>>>()?;

    let mut qb = sql::insert(dao.table(), &columns, &values, None, &dao.all_cols());
    debug!(table = %dao.table(), sql = qb.sql(), rows = rows.len(), "insert_many");

    let stored = qb.build_query_as::<D::Row>().fetch_all(db).await?;
    write_back(rows, stored);
    Ok(())
}

/// Insert `row` with the DAO's update columns, resolving conflicts with
/// `ON CONFLICT ... DO UPDATE` when the DAO declares one.
pub async fn upsert<'e, D, E>(dao: &D, row: &mut D::Row, db: E) -> DaoResult<()>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let columns = dao.update_cols();
    if columns.is_empty() {
        return Err(DaoError::EmptyUpdate {
            table: dao.table().name.to_string(),
        });
    }

    dao.touch_updated_at(row, Utc::now());
    let values = row_values(dao, row, &columns)?;
    let targets = dao.on_conflict_cols();
    let assignments = dao.update_on_conflict_cols();

    let mut qb = sql::insert(
        dao.table(),
        &columns,
        &[values],
        conflict_clause(&targets, &assignments),
        &dao.all_cols(),
    );
    debug!(table = %dao.table(), sql = qb.sql(), "upsert");

    *row = qb.build_query_as::<D::Row>().fetch_one(db).await?;
    Ok(())
}

/// Multi-row [`upsert`]. An empty slice is a no-op.
pub async fn upsert_many<'e, D, E>(dao: &D, rows: &mut [D::Row], db: E) -> DaoResult<()>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    if rows.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    for row in rows.iter_mut() {
        dao.touch_updated_at(row, now);
    }

    let columns = dao.update_cols();
    let values = rows
        .iter()
        .map(|row| row_values(dao, row, &columns))
        .collect::<DaoResult<Vec<_>>>()?;
    let targets = dao.on_conflict_cols();
    let assignments = dao.update_on_conflict_cols();

    let mut qb = sql::insert(
        dao.table(),
        &columns,
        &values,
        conflict_clause(&targets, &assignments),
        &dao.all_cols(),
    );
    debug!(table = %dao.table(), sql = qb.sql(), rows = rows.len(), "upsert_many");

    let stored = qb.build_query_as::<D::Row>().fetch_all(db).await?;
    write_back(rows, stored);
    Ok(())
}

/// Overwrite the row with primary key `pk` from `row`'s update columns.
/// [`DaoError::NotFound`] if no row has that key, [`DaoError::EmptyUpdate`]
/// before any statement if the DAO has no update columns.
pub async fn update<'e, D, E>(dao: &D, row: &mut D::Row, pk: &D::Pk, db: E) -> DaoResult<()>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let columns = dao.update_cols();
    if columns.is_empty() {
        return Err(DaoError::EmptyUpdate {
            table: dao.table().name.to_string(),
        });
    }

    dao.touch_updated_at(row, Utc::now());
    let values = row_values(dao, row, &columns)?;
    let assignments = set_all(&columns, values);

    let mut qb = sql::update(dao.table(), &assignments, &dao.pk_match(pk), &dao.all_cols());
    debug!(table = %dao.table(), sql = qb.sql(), "update");

    *row = qb
        .build_query_as::<D::Row>()
        .fetch_one(db)
        .await
        .map_err(DaoError::from_fetch)?;
    Ok(())
}

/// Delete the row with primary key `pk`, returning the number of rows removed.
pub async fn delete<'e, D, E>(dao: &D, pk: &D::Pk, db: E) -> DaoResult<u64>
where
    D: Dao,
    E: Executor<'e, Database = Postgres>,
{
    let mut qb = sql::delete(dao.table(), &dao.pk_match(pk));
    debug!(table = %dao.table(), sql = qb.sql(), "delete");

    let result = qb.build().execute(db).await?;
    Ok(result.rows_affected())
}

/// The conflict clause, only when both targets and assignments exist.
fn conflict_clause<'a>(
    targets: &'a ColumnList,
    assignments: &'a [Assignment],
) -> Option<OnConflict<'a>> {
    (!targets.is_empty() && !assignments.is_empty()).then_some(OnConflict {
        targets,
        assignments,
    })
}

fn set_all(columns: &ColumnList, values: Vec<crate::expr::Value>) -> Vec<Assignment> {
    columns.iter().zip(values).map(|(c, v)| c.set(v)).collect()
}

/// Replace rows with their stored versions, in statement order.
fn write_back<R>(rows: &mut [R], stored: Vec<R>) {
    for (row, fresh) in rows.iter_mut().zip(stored) {
        *row = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{BaseCols, ConflictCols, Model, PkMatcher, TableSource, UpdatedAt};
    use crate::expr::{Table, Value, col};
    use chrono::DateTime;
    use sqlx::postgres::PgPoolOptions;

    const FLAGS: Table = Table::new("public", "flags", &["id"]);

    #[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
    struct Flag {
        id: i32,
        touched: bool,
    }

    impl Model for Flag {
        fn value(&self, column: &str) -> Option<Value> {
            match column {
                "id" => Some(self.id.into()),
                _ => None,
            }
        }
    }

    struct Flags;

    impl TableSource for Flags {
        type Row = Flag;

        fn table(&self) -> &Table {
            &FLAGS
        }
    }

    impl BaseCols for Flags {
        fn insert_cols(&self) -> ColumnList {
            FLAGS.all_columns()
        }

        fn update_cols(&self) -> ColumnList {
            FLAGS.all_columns().except(&["id"])
        }

        fn all_cols(&self) -> ColumnList {
            FLAGS.all_columns()
        }
    }

    impl ConflictCols for Flags {}

    impl PkMatcher for Flags {
        type Pk = i32;

        fn pk_match(&self, pk: &i32) -> Expr {
            col("id").eq(*pk)
        }
    }

    impl UpdatedAt for Flags {
        fn touch_updated_at(&self, row: &mut Flag, _now: DateTime<Utc>) {
            row.touched = true;
        }
    }

    #[tokio::test]
    async fn test_update_without_columns_fails_before_executing() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/daokit")
            .unwrap();
        let mut row = Flag { id: 1, touched: false };

        let err = update(&Flags, &mut row, &1, &pool).await.unwrap_err();
        assert!(matches!(err, DaoError::EmptyUpdate { ref table } if table == "flags"), "{err}");
        assert!(!row.touched);
        assert_eq!(err.to_string(), "No columns to update on table 'flags'");
    }

    #[test]
    fn test_conflict_clause_needs_both_parts() {
        let targets = ColumnList::new(vec![col("id")]);
        let none = ColumnList::empty();
        let assignments = vec![col("email").set_excluded()];

        assert!(conflict_clause(&targets, &assignments).is_some());
        assert!(conflict_clause(&none, &assignments).is_none());
        assert!(conflict_clause(&targets, &[]).is_none());
    }

    #[test]
    fn test_set_all_pairs_in_order() {
        let columns = ColumnList::new(vec![col("email"), col("active")]);
        let assignments = set_all(&columns, vec![Value::from("a@x.io"), Value::from(true)]);
        assert_eq!(
            assignments,
            vec![col("email").set("a@x.io"), col("active").set(true)]
        );
    }

    #[test]
    fn test_write_back() {
        let mut rows = vec![1, 2, 3];
        write_back(&mut rows, vec![10, 20, 30]);
        assert_eq!(rows, vec![10, 20, 30]);
    }
}
