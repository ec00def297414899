//! Live schema lookup for the generator.
//!
//! Reads `information_schema` so `daokit gen` can run with only a table
//! name and a database URL.

use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::error::{DaoError, DaoResult};
use crate::parser::ColumnSpec;
use crate::types::SqlType;

#[derive(Debug, FromRow)]
struct ColumnRow {
    column_name: String,
    udt_name: String,
    is_nullable: String,
}

/// Columns and primary key of one table, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<ColumnSpec>,
    pub primary_keys: Vec<ColumnSpec>,
}

const COLUMNS_SQL: &str = "SELECT column_name::text AS column_name, udt_name::text AS udt_name, \
     is_nullable::text AS is_nullable \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

const PRIMARY_KEY_SQL: &str = "SELECT kcu.column_name::text \
     FROM information_schema.table_constraints tc \
     JOIN information_schema.key_column_usage kcu \
       ON tc.constraint_name = kcu.constraint_name \
      AND tc.table_schema = kcu.table_schema \
      AND tc.table_name = kcu.table_name \
     WHERE tc.constraint_type = 'PRIMARY KEY' \
       AND tc.table_schema = $1 AND tc.table_name = $2 \
     ORDER BY kcu.ordinal_position";

/// Load the columns and primary key of `schema.table`.
///
/// Fails with [`DaoError::Generate`] when the table does not exist or has
/// no primary key, and with [`DaoError::UnsupportedType`] on a column whose
/// type has no mapping.
pub async fn table_schema(pool: &PgPool, schema: &str, table: &str) -> DaoResult<TableSchema> {
    let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
        .bind(schema)
        .bind(table)
        .fetch_all(pool)
        .await?;

    if rows.is_empty() {
        return Err(DaoError::Generate(format!("table {}.{} not found", schema, table)));
    }

    let columns = rows
        .into_iter()
        .map(|row| {
            let ty = SqlType::parse(&row.udt_name)?;
            Ok(ColumnSpec::new(row.column_name, ty, row.is_nullable == "YES"))
        })
        .collect::<DaoResult<Vec<_>>>()?;

    let pk_names: Vec<String> = sqlx::query_scalar(PRIMARY_KEY_SQL)
        .bind(schema)
        .bind(table)
        .fetch_all(pool)
        .await?;

    if pk_names.is_empty() {
        return Err(DaoError::Generate(format!("table {}.{} has no primary key", schema, table)));
    }

    let primary_keys = primary_keys_of(&columns, &pk_names)?;
    debug!(
        table = %format!("{}.{}", schema, table),
        columns = columns.len(),
        primary_keys = primary_keys.len(),
        "introspected"
    );

    Ok(TableSchema { columns, primary_keys })
}

/// Pick the key columns out of `columns`, in key order. Key columns are never
/// nullable even if the catalog says otherwise.
fn primary_keys_of(columns: &[ColumnSpec], names: &[String]) -> DaoResult<Vec<ColumnSpec>> {
    names
        .iter()
        .map(|name| {
            columns
                .iter()
                .find(|c| &c.name == name)
                .map(|c| ColumnSpec::new(c.name.clone(), c.ty, false))
                .ok_or_else(|| DaoError::Generate(format!("primary key '{}' has no column", name)))
        })
        .collect()
}
