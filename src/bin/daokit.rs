//! daokit: DAO generator CLI
//!
//! # Usage
//!
//! ```bash
//! # Generate from explicit column specs
//! daokit gen --schema public --table users --pk id:bigint \
//!     --columns "id:bigint,email:text,bio:text?,updated_at:timestamptz"
//!
//! # Introspect a live database
//! daokit gen --schema public --table users --database-url postgres://localhost/app
//!
//! # Preview without writing
//! daokit gen --schema public --table users --database-url $DATABASE_URL --dry-run
//!
//! # Check how identifiers are normalized
//! daokit case user_id httpServer
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use daokit::codegen::{self, GenOptions, UpdatedCol};
use daokit::config::Config;
use daokit::error::DaoError;
use daokit::introspect;
use daokit::parser::{ColumnSpec, parse_columns, parse_names, parse_primary_keys};
use daokit::session::Session;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daokit")]
#[command(version)]
#[command(about = "Generate typed CRUD DAOs for PostgreSQL tables", long_about = None)]
#[command(after_help = "EXAMPLES:
    daokit gen --schema public --table users --pk id:bigint --columns 'id:bigint,email:text'
    daokit gen --schema public --table users --database-url postgres://localhost/app --dry-run
    daokit case user_id httpServer")]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a DAO file for one table
    Gen(GenArgs),
    /// Show the PascalCase and snake_case forms of identifiers
    Case {
        /// Identifiers to normalize
        #[arg(required = true)]
        idents: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct GenArgs {
    /// Table name
    #[arg(long)]
    table: Option<String>,

    /// Schema name
    #[arg(long)]
    schema: Option<String>,

    /// Primary key columns, e.g. "org_id:integer,user_id:bigint"
    #[arg(long)]
    pk: Option<String>,

    /// All columns, e.g. "id:bigint,email:text,bio:text?"
    #[arg(long)]
    columns: Option<String>,

    /// Columns left out of INSERT
    #[arg(long, default_value = "")]
    excl_insert: String,

    /// Columns left out of UPDATE and upsert
    #[arg(long, default_value = "")]
    excl_update: String,

    /// Column set to the current time on update; "", "nil" or "none" disables
    #[arg(long)]
    updated_col: Option<String>,

    /// Prefix of the generated DAO struct
    #[arg(long, env = "DAOKIT_PREFIX")]
    prefix: Option<String>,

    /// Path the generated code uses to reach this library
    #[arg(long)]
    crate_path: Option<String>,

    /// Directory the file is written to
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Database to introspect when --pk or --columns is omitted
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Config file (default: ./daokit.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the generated code instead of writing it
    #[arg(short, long)]
    dry_run: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Serialize)]
struct CaseForms<'a> {
    input: &'a str,
    pascal: String,
    snake: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Gen(args) => run_gen(args).await,
        Commands::Case { idents, format } => show_case(&idents, &format),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "daokit=debug" } else { "daokit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_gen(args: GenArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let codegen_cfg = config.codegen;

    let table = args.table.unwrap_or_default();
    let schema = args.schema.or(codegen_cfg.schema).unwrap_or_default();
    let database_url = args.database_url.or(config.postgres.url);

    let (primary_keys, columns) = resolve_columns(
        &schema,
        &table,
        args.pk.as_deref(),
        args.columns.as_deref(),
        database_url.as_deref(),
    )
    .await?;

    let updated_flag = args.updated_col.or(codegen_cfg.updated_col);
    let mut opts = GenOptions::new(schema, table)
        .primary_keys(primary_keys)
        .columns(columns)
        .excl_insert(parse_names(&args.excl_insert))
        .excl_update(parse_names(&args.excl_update))
        .updated_col(UpdatedCol::from_flag(updated_flag.as_deref()));
    if let Some(prefix) = args.prefix.or(codegen_cfg.prefix) {
        opts = opts.prefix(prefix);
    }
    if let Some(path) = args.crate_path.or(codegen_cfg.crate_path) {
        opts = opts.crate_path(path);
    }

    let generated = codegen::generate(&opts)?;

    if args.dry_run {
        println!("{} {}", "// would write".dimmed(), generated.file_name.cyan());
        print!("{}", generated.source);
        return Ok(());
    }

    let out_dir = args
        .out_dir
        .or(codegen_cfg.out_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let path = generated
        .write_to(&out_dir)
        .with_context(|| format!("writing into {}", out_dir.display()))?;
    println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
    Ok(())
}

/// Explicit specs win; whatever is missing comes from the database.
async fn resolve_columns(
    schema: &str,
    table: &str,
    pk: Option<&str>,
    columns: Option<&str>,
    database_url: Option<&str>,
) -> Result<(Vec<ColumnSpec>, Vec<ColumnSpec>)> {
    let pk = pk.map(parse_primary_keys).transpose()?;
    let columns = columns.map(parse_columns).transpose()?;

    if let (Some(pk), Some(columns)) = (&pk, &columns) {
        return Ok((pk.clone(), columns.clone()));
    }

    let Some(url) = database_url else {
        let missing = if pk.is_none() { "pk" } else { "columns" };
        return Err(DaoError::MissingArgument(missing).into());
    };
    if schema.trim().is_empty() {
        return Err(DaoError::MissingArgument("schema").into());
    }
    if table.trim().is_empty() {
        return Err(DaoError::MissingArgument("table").into());
    }

    let session = Session::connect(url, 1).await.context("connecting to database")?;
    let pool = session.pool().context("introspection needs a pool session")?;
    let found = introspect::table_schema(pool, schema, &daokit::case::to_snake_case(table)).await?;
    pool.close().await;

    Ok((
        pk.unwrap_or(found.primary_keys),
        columns.unwrap_or(found.columns),
    ))
}

fn show_case(idents: &[String], format: &OutputFormat) -> Result<()> {
    let forms: Vec<CaseForms<'_>> = idents
        .iter()
        .map(|ident| CaseForms {
            input: ident,
            pascal: daokit::normalize(ident),
            snake: daokit::case::to_snake_case(ident),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forms)?),
        OutputFormat::Table => {
            let width = forms.iter().map(|f| f.input.len()).max().unwrap_or(0);
            for f in &forms {
                let input = format!("{:width$}", f.input, width = width);
                println!(
                    "{}  {}  {}  {}",
                    input.white(),
                    "→".dimmed(),
                    f.pascal.cyan().bold(),
                    f.snake.yellow()
                );
            }
        }
    }
    Ok(())
}
