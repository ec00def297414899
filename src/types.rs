//! SQL type names understood by the generator.

use std::fmt;

use crate::error::{DaoError, DaoResult};

/// A PostgreSQL column type with a Rust mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Uuid,
    SmallInt,
    Int,
    BigInt,
    Bool,
    Real,
    Double,
    Timestamp,
    TimestampTz,
    Date,
}

impl SqlType {
    /// Map a type name, accepting SQL spellings, `udt_name` aliases and a few
    /// Rust-ish shorthands. Case and surrounding whitespace are ignored.
    pub fn parse(name: &str) -> DaoResult<Self> {
        let t = name.trim().to_lowercase();
        let t = t.split_whitespace().collect::<Vec<_>>().join(" ");

        let ty = match t.as_str() {
            "text" | "varchar" | "char" | "bpchar" | "character" | "character varying" | "citext"
            | "name" | "string" | "str" => SqlType::Text,
            "uuid" => SqlType::Uuid,
            "smallint" | "int2" | "int16" | "i16" => SqlType::SmallInt,
            "integer" | "int" | "int4" | "int32" | "i32" | "serial" | "serial4" => SqlType::Int,
            "bigint" | "int8" | "int64" | "i64" | "bigserial" | "serial8" => SqlType::BigInt,
            "boolean" | "bool" => SqlType::Bool,
            "real" | "float4" | "f32" => SqlType::Real,
            "double precision" | "float8" | "float" | "float64" | "f64" => SqlType::Double,
            "timestamp" | "timestamp without time zone" => SqlType::Timestamp,
            "timestamptz" | "timestamp with time zone" => SqlType::TimestampTz,
            "date" => SqlType::Date,
            _ => return Err(DaoError::UnsupportedType(name.trim().to_string())),
        };
        Ok(ty)
    }

    /// The Rust type generated for a non-null column.
    pub fn rust_type(&self) -> &'static str {
        match self {
            SqlType::Text => "String",
            SqlType::Uuid => "uuid::Uuid",
            SqlType::SmallInt => "i16",
            SqlType::Int => "i32",
            SqlType::BigInt => "i64",
            SqlType::Bool => "bool",
            SqlType::Real => "f32",
            SqlType::Double => "f64",
            SqlType::Timestamp => "chrono::NaiveDateTime",
            SqlType::TimestampTz => "chrono::DateTime<chrono::Utc>",
            SqlType::Date => "chrono::NaiveDate",
        }
    }

    /// Whether the type is `Copy` in Rust, so values can be read without a clone.
    pub fn is_copy(&self) -> bool {
        !matches!(self, SqlType::Text)
    }

    /// Expression turning `now: DateTime<Utc>` into a value of this type, for
    /// timestamp columns.
    pub fn from_now(&self) -> Option<&'static str> {
        match self {
            SqlType::TimestampTz => Some("now"),
            SqlType::Timestamp => Some("now.naive_utc()"),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Text => "text",
            SqlType::Uuid => "uuid",
            SqlType::SmallInt => "smallint",
            SqlType::Int => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Bool => "boolean",
            SqlType::Real => "real",
            SqlType::Double => "double precision",
            SqlType::Timestamp => "timestamp",
            SqlType::TimestampTz => "timestamptz",
            SqlType::Date => "date",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(SqlType::parse("text").unwrap(), SqlType::Text);
        assert_eq!(SqlType::parse(" Character   Varying ").unwrap(), SqlType::Text);
        assert_eq!(SqlType::parse("int4").unwrap(), SqlType::Int);
        assert_eq!(SqlType::parse("BIGINT").unwrap(), SqlType::BigInt);
        assert_eq!(SqlType::parse("double precision").unwrap(), SqlType::Double);
        assert_eq!(SqlType::parse("timestamp with time zone").unwrap(), SqlType::TimestampTz);
        assert_eq!(SqlType::parse("timestamp").unwrap(), SqlType::Timestamp);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = SqlType::parse("numeric").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported type: 'numeric'");
    }

    #[test]
    fn test_display_round_trips() {
        for ty in [SqlType::Text, SqlType::Double, SqlType::TimestampTz, SqlType::Date] {
            assert_eq!(SqlType::parse(&ty.to_string()).unwrap(), ty);
        }
    }

    #[test]
    fn test_from_now() {
        assert_eq!(SqlType::TimestampTz.from_now(), Some("now"));
        assert_eq!(SqlType::Timestamp.from_now(), Some("now.naive_utc()"));
        assert_eq!(SqlType::Date.from_now(), None);
    }
}
