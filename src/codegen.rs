//! Per-table DAO source generator.
//!
//! Given a table, its columns and its primary key, emits a Rust file with
//! the table constant, the row struct and its [`Model`](crate::dao::Model)
//! impl, and a unit DAO struct implementing the full
//! [`Dao`](crate::dao::Dao) capability set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::case::{field_ident, normalize, to_snake_case};
use crate::error::{DaoError, DaoResult};
use crate::parser::ColumnSpec;
use crate::types::SqlType;

/// Default struct prefix, giving `BaseUsers` for `users`.
pub const DEFAULT_PREFIX: &str = "Base";
/// Default update-time column.
pub const DEFAULT_UPDATED_COL: &str = "UpdatedAt";

/// Which column, if any, `touch_updated_at` writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatedCol {
    /// Disabled.
    None,
    /// The default name; silently dropped when the table has no such column.
    Default(String),
    /// Named by the user; must exist and be a timestamp.
    Explicit(String),
}

impl UpdatedCol {
    /// Interpret the `--updated-col` flag. Absent means the default column;
    /// `""`, `nil` and `none` disable it.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            None => UpdatedCol::Default(to_snake_case(DEFAULT_UPDATED_COL)),
            Some("" | "nil" | "none") => UpdatedCol::None,
            Some(name) => UpdatedCol::Explicit(to_snake_case(name)),
        }
    }
}

/// Everything the generator needs for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenOptions {
    pub schema: String,
    pub table: String,
    pub prefix: String,
    pub crate_path: String,
    pub primary_keys: Vec<ColumnSpec>,
    pub columns: Vec<ColumnSpec>,
    pub excl_insert: Vec<String>,
    pub excl_update: Vec<String>,
    pub updated_col: UpdatedCol,
}

impl GenOptions {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            crate_path: "daokit".to_string(),
            primary_keys: Vec::new(),
            columns: Vec::new(),
            excl_insert: Vec::new(),
            excl_update: Vec::new(),
            updated_col: UpdatedCol::from_flag(None),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    pub fn primary_keys(mut self, pks: Vec<ColumnSpec>) -> Self {
        self.primary_keys = pks;
        self
    }

    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    pub fn excl_insert(mut self, names: Vec<String>) -> Self {
        self.excl_insert = names;
        self
    }

    pub fn excl_update(mut self, names: Vec<String>) -> Self {
        self.excl_update = names;
        self
    }

    pub fn updated_col(mut self, updated_col: UpdatedCol) -> Self {
        self.updated_col = updated_col;
        self
    }

    /// SQL table name.
    pub fn sql_table(&self) -> String {
        to_snake_case(&self.table)
    }

    /// Name of the generated file.
    pub fn file_name(&self) -> String {
        format!("{}_dao.rs", self.sql_table())
    }
}

/// A generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub file_name: String,
    pub source: String,
}

impl Generated {
    /// Write into `out_dir`, creating it if needed.
    pub fn write_to(&self, out_dir: &Path) -> DaoResult<PathBuf> {
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(&self.file_name);
        std::fs::write(&path, &self.source)?;
        info!(path = %path.display(), "generated");
        Ok(path)
    }
}

/// Type names already in scope in a generated file, through the prelude
/// glob or the std prelude. A row struct with one of these names gets a
/// `Row` suffix.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Assignment", "BaseCols", "Column", "ColumnList", "ConflictCols", "Dao", "DaoError",
    "DaoResult", "Expr", "Model", "OrderBy", "PkMatcher", "Queries", "SearchParams", "Session",
    "SortOrder", "Table", "TableSource", "UpdatedAt", "Value", "Option", "Some", "None",
    "String", "Vec", "Self",
];

/// rustfmt's default `max_width`; generated lines are kept within it.
const MAX_WIDTH: usize = 100;

/// Names derived from the options, computed once.
struct Names {
    table: String,
    konst: String,
    row: String,
    dao: String,
    pk: String,
}

/// Inputs after validation. Column names are the ones in `opts.columns`.
struct Plan<'a> {
    opts: &'a GenOptions,
    names: Names,
    primary_keys: Vec<ColumnSpec>,
    excl_insert: Vec<&'a str>,
    excl_update: Vec<&'a str>,
    updated: Option<&'a ColumnSpec>,
}

/// Validate the options and render the file.
pub fn generate(opts: &GenOptions) -> DaoResult<Generated> {
    let plan = plan(opts)?;
    let source = render(&plan);
    Ok(Generated {
        file_name: opts.file_name(),
        source,
    })
}

fn plan(opts: &GenOptions) -> DaoResult<Plan<'_>> {
    if opts.table.trim().is_empty() {
        return Err(DaoError::MissingArgument("table"));
    }
    if opts.schema.trim().is_empty() {
        return Err(DaoError::MissingArgument("schema"));
    }
    if opts.primary_keys.is_empty() {
        return Err(DaoError::MissingArgument("pk"));
    }
    if opts.columns.is_empty() {
        return Err(DaoError::MissingArgument("columns"));
    }

    let table = opts.sql_table();
    let names = names(opts, table)?;

    let mut seen = HashSet::new();
    for column in &opts.columns {
        if !seen.insert(column.name.as_str()) {
            return Err(DaoError::Generate(format!(
                "column '{}' is listed twice",
                column.name
            )));
        }
    }

    // Introspected columns keep their database spelling, so names given on
    // the command line also match by snake_case.
    let find = move |name: &str| {
        opts.columns.iter().find(|c| c.name == name).or_else(|| {
            let snake = to_snake_case(name);
            opts.columns.iter().find(|c| to_snake_case(&c.name) == snake)
        })
    };

    let mut primary_keys = Vec::with_capacity(opts.primary_keys.len());
    for pk in &opts.primary_keys {
        let column = find(pk.name.as_str()).ok_or_else(|| {
            DaoError::Generate(format!(
                "primary key '{}' is not a column of {}",
                pk.name, names.table
            ))
        })?;
        if column.ty != pk.ty {
            return Err(DaoError::Generate(format!(
                "primary key '{}' is {} but the column is {}",
                pk.name, pk.ty, column.ty
            )));
        }
        primary_keys.push(ColumnSpec::new(column.name.clone(), pk.ty, false));
    }

    let mut excluded = [Vec::new(), Vec::new()];
    for (slot, (label, names_given)) in
        excluded.iter_mut().zip([("insert", &opts.excl_insert), ("update", &opts.excl_update)])
    {
        for name in names_given {
            let column = find(name.as_str()).ok_or_else(|| {
                DaoError::Generate(format!(
                    "excluded {} column '{}' is not a column of {}",
                    label, name, names.table
                ))
            })?;
            slot.push(column.name.as_str());
        }
    }
    let [excl_insert, excl_update] = excluded;

    if opts.columns.iter().all(|c| excl_update.contains(&c.name.as_str())) {
        return Err(DaoError::Generate(format!(
            "every column of {} is excluded from update",
            names.table
        )));
    }

    let updated = match &opts.updated_col {
        UpdatedCol::None => None,
        UpdatedCol::Default(name) => match find(name.as_str()) {
            Some(c) if c.ty.from_now().is_some() => Some(c),
            Some(c) => {
                warn!(
                    column = %c.name,
                    ty = %c.ty,
                    "default updated column is not a timestamp, skipping"
                );
                None
            }
            None => None,
        },
        UpdatedCol::Explicit(name) => {
            let column = find(name.as_str()).ok_or_else(|| {
                DaoError::Generate(format!(
                    "updated column '{}' is not a column of {}",
                    name, names.table
                ))
            })?;
            if column.ty.from_now().is_none() {
                return Err(DaoError::Generate(format!(
                    "updated column '{}' is {}, expected timestamp or timestamptz",
                    name, column.ty
                )));
            }
            Some(column)
        }
    };

    Ok(Plan {
        opts,
        names,
        primary_keys,
        excl_insert,
        excl_update,
        updated,
    })
}

fn names(opts: &GenOptions, table: String) -> DaoResult<Names> {
    let pascal = normalize(&opts.table);
    if pascal.is_empty() {
        return Err(DaoError::Generate(format!(
            "table name '{}' has no identifier characters",
            opts.table
        )));
    }
    let prefix = normalize(&opts.prefix);
    if prefix.is_empty() {
        return Err(DaoError::MissingArgument("prefix"));
    }

    let row = if RESERVED_TYPE_NAMES.contains(&pascal.as_str()) {
        format!("{}Row", pascal)
    } else {
        pascal.clone()
    };
    let dao = format!("{}{}", prefix, pascal);
    let pk = format!("{}Pk", dao);

    for generated in [&dao, &pk] {
        if RESERVED_TYPE_NAMES.contains(&generated.as_str()) {
            return Err(DaoError::Generate(format!(
                "generated name '{}' collides with a daokit item, use another prefix",
                generated
            )));
        }
    }

    Ok(Names {
        konst: table.to_uppercase(),
        table,
        row,
        dao,
        pk,
    })
}

fn render(plan: &Plan<'_>) -> String {
    let opts = plan.opts;
    let n = &plan.names;
    let mut lines: Vec<String> = Vec::new();

    lines.push("// Code generated by `daokit gen`. DO NOT EDIT.".to_string());
    lines.push(format!("// Table: {}.{}", opts.schema, n.table));
    lines.push(String::new());

    let uses_chrono = plan.updated.is_some()
        || opts.columns.iter().any(|c| c.ty.rust_type().starts_with("chrono::"));
    let uses_uuid = opts.columns.iter().any(|c| c.ty == SqlType::Uuid);
    if uses_chrono {
        lines.push(format!("use {}::chrono;", opts.crate_path));
    }
    if uses_uuid {
        lines.push(format!("use {}::uuid;", opts.crate_path));
    }
    lines.push(format!("use {}::prelude::*;", opts.crate_path));
    lines.push(String::new());

    render_table(plan, &mut lines);
    render_row(plan, &mut lines);
    if plan.primary_keys.len() > 1 {
        render_pk_struct(plan, &mut lines);
    }
    render_dao(plan, &mut lines);

    let mut source = lines.join("\n");
    source.push('\n');
    source
}

fn quoted_list<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| format!("\"{}\"", n.as_ref())).collect()
}

/// The table constant, wrapped the way rustfmt would when it is too long.
fn render_table(plan: &Plan<'_>, lines: &mut Vec<String>) {
    let n = &plan.names;
    let columns = quoted_list(&plan.opts.columns.iter().map(|c| &c.name).collect::<Vec<_>>());
    let head = format!("pub const {}: Table =", n.konst);
    let call = format!(
        "Table::new(\"{}\", \"{}\", &[{}]);",
        plan.opts.schema,
        n.table,
        columns.join(", ")
    );

    if head.len() + 1 + call.len() <= MAX_WIDTH {
        lines.push(format!("{} {}", head, call));
    } else if 4 + call.len() <= MAX_WIDTH {
        lines.push(head);
        lines.push(format!("    {}", call));
    } else {
        lines.push(format!("{} Table::new(", head));
        lines.push(format!("    \"{}\",", plan.opts.schema));
        lines.push(format!("    \"{}\",", n.table));
        lines.push("    &[".to_string());
        for column in &columns {
            lines.push(format!("        {},", column));
        }
        lines.push("    ],".to_string());
        lines.push(");".to_string());
    }
    lines.push(String::new());
}

fn field_type(column: &ColumnSpec) -> String {
    if column.nullable {
        format!("Option<{}>", column.ty.rust_type())
    } else {
        column.ty.rust_type().to_string()
    }
}

fn render_row(plan: &Plan<'_>, lines: &mut Vec<String>) {
    let n = &plan.names;

    lines.push("#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]".to_string());
    lines.push(format!("pub struct {} {{", n.row));
    for column in &plan.opts.columns {
        let field = field_ident(&column.name);
        if field != column.name {
            lines.push(format!("    #[sqlx(rename = \"{}\")]", column.name));
        }
        lines.push(format!("    pub {}: {},", field, field_type(column)));
    }
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("impl Model for {} {{", n.row));
    lines.push("    fn value(&self, column: &str) -> Option<Value> {".to_string());
    lines.push("        match column {".to_string());
    for column in &plan.opts.columns {
        let field = field_ident(&column.name);
        let read = if column.ty.is_copy() {
            format!("self.{}", field)
        } else {
            format!("self.{}.clone()", field)
        };
        lines.push(format!("            \"{}\" => Some({}.into()),", column.name, read));
    }
    lines.push("            _ => None,".to_string());
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
}

fn render_pk_struct(plan: &Plan<'_>, lines: &mut Vec<String>) {
    lines.push("#[derive(Debug, Clone, PartialEq)]".to_string());
    lines.push(format!("pub struct {} {{", plan.names.pk));
    for pk in &plan.primary_keys {
        lines.push(format!("    pub {}: {},", field_ident(&pk.name), pk.ty.rust_type()));
    }
    lines.push("}".to_string());
    lines.push(String::new());
}

/// `<TABLE>.all_columns().except(&[...])`
fn except_call(konst: &str, names: &[&str]) -> String {
    format!("{}.all_columns().except(&[{}])", konst, quoted_list(names).join(", "))
}

/// `col("id").eq(...)` for one key column; `access` is the key expression.
fn pk_compare(pk: &ColumnSpec, access: &str, composite: bool) -> String {
    let value = match (pk.ty.is_copy(), composite) {
        (true, false) => format!("*{}", access),
        (true, true) => access.to_string(),
        (false, true) => format!("&{}", access),
        (false, false) => access.to_string(),
    };
    format!("col(\"{}\").eq({})", pk.name, value)
}

fn render_dao(plan: &Plan<'_>, lines: &mut Vec<String>) {
    let n = &plan.names;

    lines.push("#[derive(Debug, Clone, Copy, Default)]".to_string());
    lines.push(format!("pub struct {};", n.dao));
    lines.push(String::new());

    // TableSource
    lines.push(format!("impl TableSource for {} {{", n.dao));
    lines.push(format!("    type Row = {};", n.row));
    lines.push(String::new());
    lines.push("    fn table(&self) -> &Table {".to_string());
    lines.push(format!("        &{}", n.konst));
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    // BaseCols
    lines.push(format!("impl BaseCols for {} {{", n.dao));
    lines.push("    fn insert_cols(&self) -> ColumnList {".to_string());
    lines.push(format!("        {}", except_call(&n.konst, &plan.excl_insert)));
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push("    fn update_cols(&self) -> ColumnList {".to_string());
    lines.push(format!("        {}", except_call(&n.konst, &plan.excl_update)));
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push("    fn all_cols(&self) -> ColumnList {".to_string());
    lines.push(format!("        {}.all_columns()", n.konst));
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    // ConflictCols
    lines.push(format!("impl ConflictCols for {} {{", n.dao));
    lines.push("    fn on_conflict_cols(&self) -> ColumnList {".to_string());
    lines.push("        ColumnList::empty()".to_string());
    lines.push("    }".to_string());
    lines.push(String::new());
    lines.push("    fn update_on_conflict_cols(&self) -> Vec<Assignment> {".to_string());
    lines.push("        Vec::new()".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    // PkMatcher
    let keys = &plan.primary_keys;
    let composite = keys.len() > 1;
    let pk_type = if composite {
        n.pk.clone()
    } else {
        keys[0].ty.rust_type().to_string()
    };
    let predicate = if composite {
        let parts: Vec<String> = keys
            .iter()
            .map(|pk| pk_compare(pk, &format!("pk.{}", field_ident(&pk.name)), true))
            .collect();
        parts.join("\n            .and(") + &")".repeat(parts.len() - 1)
    } else {
        pk_compare(&keys[0], "pk", false)
    };
    lines.push(format!("impl PkMatcher for {} {{", n.dao));
    lines.push(format!("    type Pk = {};", pk_type));
    lines.push(String::new());
    lines.push("    fn pk_match(&self, pk: &Self::Pk) -> Expr {".to_string());
    lines.push(format!("        {}", predicate));
    lines.push("    }".to_string());
    lines.push("}".to_string());

    // UpdatedAt
    lines.push(String::new());
    match plan.updated {
        Some(column) => {
            let now = column.ty.from_now().unwrap_or("now");
            let value = if column.nullable {
                format!("Some({})", now)
            } else {
                now.to_string()
            };
            lines.push(format!("impl UpdatedAt for {} {{", n.dao));
            lines.push(format!(
                "    fn touch_updated_at(&self, row: &mut {}, now: chrono::DateTime<chrono::Utc>) {{",
                n.row
            ));
            lines.push(format!("        row.{} = {};", field_ident(&column.name), value));
            lines.push("    }".to_string());
            lines.push("}".to_string());
        }
        None => lines.push(format!("impl UpdatedAt for {} {{}}", n.dao)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_columns, parse_primary_keys};

    fn users() -> GenOptions {
        GenOptions::new("public", "users")
            .primary_keys(parse_primary_keys("id:bigint").unwrap())
            .columns(
                parse_columns(
                    "id:bigint,email:text,bio:text?,created_at:timestamptz,updated_at:timestamptz?",
                )
                .unwrap(),
            )
            .excl_insert(vec!["id".into(), "created_at".into()])
            .excl_update(vec!["id".into()])
    }

    #[test]
    fn test_names_and_file() {
        let opts = GenOptions::new("public", "UserAccounts");
        assert_eq!(opts.sql_table(), "user_accounts");
        assert_eq!(opts.file_name(), "user_accounts_dao.rs");
    }

    #[test]
    fn test_updated_col_flag() {
        assert_eq!(UpdatedCol::from_flag(None), UpdatedCol::Default("updated_at".into()));
        assert_eq!(UpdatedCol::from_flag(Some("nil")), UpdatedCol::None);
        assert_eq!(UpdatedCol::from_flag(Some("")), UpdatedCol::None);
        assert_eq!(
            UpdatedCol::from_flag(Some("ModifiedAt")),
            UpdatedCol::Explicit("modified_at".into())
        );
    }

    #[test]
    fn test_single_pk_output() {
        let out = generate(&users()).unwrap();
        assert_eq!(out.file_name, "users_dao.rs");
        let src = &out.source;

        assert!(src.contains(
            "pub const USERS: Table =\n    Table::new(\"public\", \"users\", &[\"id\", \"email\", \"bio\", \"created_at\", \"updated_at\"]);"
        ));
        assert!(src.contains("pub struct Users {"));
        assert!(src.contains("    pub bio: Option<String>,"));
        assert!(src.contains("            \"email\" => Some(self.email.clone().into()),"));
        assert!(src.contains("            \"id\" => Some(self.id.into()),"));
        assert!(src.contains("pub struct BaseUsers;"));
        assert!(src.contains(r#"USERS.all_columns().except(&["id", "created_at"])"#));
        assert!(src.contains(r#"USERS.all_columns().except(&["id"])"#));
        assert!(src.contains("    type Pk = i64;"));
        assert!(src.contains(r#"        col("id").eq(*pk)"#));
        assert!(src.contains("        row.updated_at = Some(now);"));
        assert!(src.contains("use daokit::chrono;"));
        assert!(!src.contains("use daokit::uuid;"));
    }

    #[test]
    fn test_composite_text_pk() {
        let opts = GenOptions::new("app", "memberships")
            .prefix("dao")
            .primary_keys(parse_primary_keys("org_id:uuid,user_name:text").unwrap())
            .columns(parse_columns("org_id:uuid,user_name:text,role:text").unwrap())
            .updated_col(UpdatedCol::None);
        let src = generate(&opts).unwrap().source;

        assert!(src.contains("pub struct DaoMembershipsPk {"));
        assert!(src.contains("    pub org_id: uuid::Uuid,"));
        assert!(src.contains("pub struct DaoMemberships;"));
        assert!(src.contains("    type Pk = DaoMembershipsPk;"));
        assert!(src.contains(
            "        col(\"org_id\").eq(pk.org_id)\n            .and(col(\"user_name\").eq(&pk.user_name))"
        ));
        assert!(src.contains("impl UpdatedAt for DaoMemberships {}"));
        assert!(src.contains("use daokit::uuid;"));
        assert!(!src.contains("chrono"));
    }

    #[test]
    fn test_keyword_column_gets_rename() {
        let opts = GenOptions::new("public", "events")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int,type:text").unwrap());
        let src = generate(&opts).unwrap().source;
        assert!(src.contains("    #[sqlx(rename = \"type\")]\n    pub r#type: String,"));
        assert!(src.contains("\"type\" => Some(self.r#type.clone().into()),"));
    }

    #[test]
    fn test_default_updated_col_missing_is_skipped() {
        let opts = GenOptions::new("public", "tags")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int,name:text").unwrap());
        let src = generate(&opts).unwrap().source;
        assert!(src.contains("impl UpdatedAt for BaseTags {}"));
    }

    #[test]
    fn test_naive_timestamp_updated_col() {
        let opts = GenOptions::new("public", "notes")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int,changed:timestamp").unwrap())
            .updated_col(UpdatedCol::from_flag(Some("changed")));
        let src = generate(&opts).unwrap().source;
        assert!(src.contains("        row.changed = now.naive_utc();"));
    }

    #[test]
    fn test_validation_errors() {
        let no_pk = GenOptions::new("public", "users").columns(parse_columns("id:int").unwrap());
        assert!(matches!(generate(&no_pk), Err(DaoError::MissingArgument("pk"))));

        let no_schema = GenOptions::new(" ", "users");
        assert!(matches!(generate(&no_schema), Err(DaoError::MissingArgument("schema"))));

        let wrong_pk = users().primary_keys(parse_primary_keys("uid:bigint").unwrap());
        assert!(matches!(generate(&wrong_pk), Err(DaoError::Generate(m)) if m.contains("'uid'")));

        let pk_type = users().primary_keys(parse_primary_keys("id:int").unwrap());
        assert!(matches!(generate(&pk_type), Err(DaoError::Generate(m)) if m.contains("bigint")));

        let bad_excl = users().excl_update(vec!["nickname".into()]);
        let err = generate(&bad_excl);
        assert!(matches!(err, Err(DaoError::Generate(m)) if m.contains("nickname")));

        let bad_updated = users().updated_col(UpdatedCol::Explicit("email".into()));
        let err = generate(&bad_updated);
        assert!(matches!(err, Err(DaoError::Generate(m)) if m.contains("timestamp")));

        let dup = users().columns(parse_columns("id:bigint,id:bigint").unwrap());
        assert!(matches!(generate(&dup), Err(DaoError::Generate(m)) if m.contains("twice")));
    }

    #[test]
    fn test_row_struct_avoids_prelude_names() {
        let opts = GenOptions::new("public", "model")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int,body:text").unwrap());
        let src = generate(&opts).unwrap().source;

        assert!(src.contains("pub struct ModelRow {"));
        assert!(src.contains("impl Model for ModelRow {"));
        assert!(src.contains("    type Row = ModelRow;"));
        assert!(src.contains("pub struct BaseModel;"));

        let value = GenOptions::new("public", "value")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int").unwrap());
        assert!(generate(&value).unwrap().source.contains("pub struct ValueRow {"));
    }

    #[test]
    fn test_dao_name_colliding_with_prelude_is_rejected() {
        let opts = GenOptions::new("public", "cols")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int").unwrap());
        let err = generate(&opts);
        assert!(matches!(err, Err(DaoError::Generate(m)) if m.contains("'BaseCols'")));

        let renamed = opts.prefix("my");
        assert!(generate(&renamed).unwrap().source.contains("pub struct MyCols;"));
    }

    #[test]
    fn test_every_column_excluded_from_update() {
        let opts = users().excl_update(
            ["id", "email", "bio", "created_at", "updated_at"].map(String::from).to_vec(),
        );
        let err = generate(&opts);
        assert!(matches!(err, Err(DaoError::Generate(m)) if m.contains("excluded from update")));
    }

    #[test]
    fn test_exclusions_match_introspected_spelling() {
        let opts = GenOptions::new("public", "audits")
            .primary_keys(vec![ColumnSpec::new("id", SqlType::Int, false)])
            .columns(vec![
                ColumnSpec::new("id", SqlType::Int, false),
                ColumnSpec::new("createdAt", SqlType::TimestampTz, false),
                ColumnSpec::new("note", SqlType::Text, true),
            ])
            .excl_insert(crate::parser::parse_names("id,createdAt"))
            .excl_update(crate::parser::parse_names("CreatedAt"))
            .updated_col(UpdatedCol::None);
        let src = generate(&opts).unwrap().source;

        assert!(src.contains(r#"AUDITS.all_columns().except(&["id", "createdAt"])"#));
        assert!(src.contains(r#"AUDITS.all_columns().except(&["createdAt"])"#));
        assert!(src.contains("    #[sqlx(rename = \"createdAt\")]\n    pub created_at:"));
        assert!(src.contains("            \"createdAt\" => Some(self.created_at.into()),"));
    }

    #[test]
    fn test_table_const_wraps_long_column_lists() {
        let short = GenOptions::new("public", "tags")
            .primary_keys(parse_primary_keys("id:int").unwrap())
            .columns(parse_columns("id:int,name:text").unwrap());
        let src = generate(&short).unwrap().source;
        assert!(src.contains(
            r#"pub const TAGS: Table = Table::new("public", "tags", &["id", "name"]);"#
        ));

        let columns: Vec<String> = (1..=12).map(|i| format!("measurement_{}:int", i)).collect();
        let wide = GenOptions::new("public", "readings")
            .primary_keys(parse_primary_keys("measurement_1:int").unwrap())
            .columns(parse_columns(&columns.join(",")).unwrap());
        let src = generate(&wide).unwrap().source;
        assert!(src.contains("pub const READINGS: Table = Table::new(\n    \"public\",\n"));
        assert!(src.contains("    &[\n        \"measurement_1\",\n"));
        assert!(src.contains("        \"measurement_12\",\n    ],\n);\n"));
        assert!(src.lines().all(|line| line.len() <= MAX_WIDTH));
    }
}
