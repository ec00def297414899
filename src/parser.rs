//! Column spec parser using nom.
//!
//! The generator takes primary keys and columns as compact lists:
//!
//! ```text
//! id:bigint, org_id:integer, bio:text?, created_at:timestamp with time zone
//! ─┬ ───┬──                  ───┬──── ┬
//!  │    │                       │     └── nullable marker (columns only)
//!  │    │                       └── type name, may contain spaces
//!  │    └── type
//!  └── column name, any case style
//! ```
//!
//! Column names come back in snake_case; types are resolved to [`SqlType`].

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::opt,
    multi::separated_list1,
    sequence::{delimited, tuple},
    IResult,
};

use crate::case::to_snake_case;
use crate::error::{DaoError, DaoResult};
use crate::types::SqlType;

/// One `name:type[?]` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// snake_case SQL column name.
    pub name: String,
    pub ty: SqlType,
    pub nullable: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, ty: SqlType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable,
        }
    }
}

/// Raw entry before the type is resolved.
struct RawEntry<'a> {
    name: &'a str,
    ty: &'a str,
    nullable: bool,
    position: usize,
}

/// Parse a column list such as `id:bigint,bio:text?`.
pub fn parse_columns(input: &str) -> DaoResult<Vec<ColumnSpec>> {
    parse_entries(input)?
        .into_iter()
        .map(|raw| {
            let ty = SqlType::parse(raw.ty)?;
            Ok(ColumnSpec::new(to_snake_case(raw.name), ty, raw.nullable))
        })
        .collect()
}

/// Parse a primary key list such as `org_id:integer,user_id:bigint`.
///
/// Key columns cannot be nullable.
pub fn parse_primary_keys(input: &str) -> DaoResult<Vec<ColumnSpec>> {
    parse_entries(input)?
        .into_iter()
        .map(|raw| {
            if raw.nullable {
                return Err(DaoError::spec(
                    raw.position,
                    format!("primary key column '{}' cannot be nullable", raw.name),
                ));
            }
            let ty = SqlType::parse(raw.ty)?;
            Ok(ColumnSpec::new(to_snake_case(raw.name), ty, false))
        })
        .collect()
}

/// Parse a comma-separated list of bare column names, normalized to
/// snake_case. Blank entries are dropped.
pub fn parse_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(to_snake_case)
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_entries(input: &str) -> DaoResult<Vec<RawEntry<'_>>> {
    let full = input;
    let input = input.trim();
    let offset = full.len() - full.trim_start().len();

    match separated_list1(char(','), parse_entry)(input) {
        Ok((remaining, entries)) => {
            if !remaining.is_empty() {
                return Err(DaoError::spec(
                    offset + input.len() - remaining.len(),
                    format!("unexpected trailing content: '{}'", remaining),
                ));
            }
            Ok(entries
                .into_iter()
                .map(|(rest_len, name, ty, nullable)| RawEntry {
                    name,
                    ty,
                    nullable,
                    position: offset + input.len() - rest_len,
                })
                .collect())
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(DaoError::spec(
            offset + input.len() - e.input.len(),
            "expected 'name:type'",
        )),
        Err(nom::Err::Incomplete(_)) => Err(DaoError::spec(
            offset + input.len(),
            "unexpected end of input",
        )),
    }
}

/// Parse `name : type [?]`, returning the remaining length at the start of
/// the entry for error positions.
fn parse_entry(input: &str) -> IResult<&str, (usize, &str, &str, bool)> {
    let (input, _) = multispace0(input)?;
    let start = input.len();
    let (input, (name, _, ty, nullable)) = tuple((
        parse_identifier,
        delimited(multispace0, char(':'), multispace0),
        parse_type_name,
        opt(char('?')),
    ))(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, (start, name, ty.trim_end(), nullable.is_some())))
}

/// Parse a column identifier.
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

/// Parse a type name; may contain inner spaces (`double precision`).
fn parse_type_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == ' ')(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_pk() {
        let pks = parse_primary_keys("id:bigint").unwrap();
        assert_eq!(pks, vec![ColumnSpec::new("id", SqlType::BigInt, false)]);
    }

    #[test]
    fn test_composite_pk_with_spaces() {
        let pks = parse_primary_keys(" orgId : integer , user_id:int8 ").unwrap();
        assert_eq!(
            pks,
            vec![
                ColumnSpec::new("org_id", SqlType::Int, false),
                ColumnSpec::new("user_id", SqlType::BigInt, false),
            ]
        );
    }

    #[test]
    fn test_columns_with_nullable_and_multiword_types() {
        let cols = parse_columns(
            "id:bigint,bio:text?,CreatedAt:timestamp with time zone,score:double precision?",
        )
        .unwrap();
        assert_eq!(
            cols,
            vec![
                ColumnSpec::new("id", SqlType::BigInt, false),
                ColumnSpec::new("bio", SqlType::Text, true),
                ColumnSpec::new("created_at", SqlType::TimestampTz, false),
                ColumnSpec::new("score", SqlType::Double, true),
            ]
        );
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let err = parse_primary_keys("id").unwrap_err();
        assert!(matches!(err, DaoError::InvalidSpec { .. }), "{err}");
    }

    #[test]
    fn test_trailing_garbage_position() {
        let err = parse_columns("id:bigint;").unwrap_err();
        match err {
            DaoError::InvalidSpec { position, .. } => assert_eq!(position, 9),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nullable_pk_is_rejected() {
        let err = parse_primary_keys("id:bigint,parent_id:bigint?").unwrap_err();
        match err {
            DaoError::InvalidSpec { position, message } => {
                assert_eq!(position, 10);
                assert!(message.contains("parent_id"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_type() {
        let err = parse_columns("total:numeric").unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedType(t) if t == "numeric"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_names("id, CreatedAt,,updatedAt"), vec!["id", "created_at", "updated_at"]);
        assert!(parse_names("").is_empty());
    }
}
