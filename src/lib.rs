//! # daokit
//!
//! Generic CRUD over [`sqlx`] + PostgreSQL, driven by small per-table DAO
//! types, and a generator that writes those types for you.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use daokit::prelude::*;
//!
//! // users_dao.rs was written by `daokit gen --table users --pk id:bigint ...`
//! let session = Session::connect("postgres://localhost/app", 5).await?;
//! let users = Queries::new(BaseUsers);
//!
//! let active = users
//!     .index(&session, Some(&SearchParams::new().filter(col("active").eq(true)).limit(10)))
//!     .await?;
//!
//! let tx = session.begin().await?;
//! users.delete(&tx, &42).await?;
//! tx.commit().await?;
//! ```
//!
//! ## Layout
//!
//! | Module        | Role                                             |
//! |---------------|--------------------------------------------------|
//! | [`dao`]       | capability traits a table's DAO implements       |
//! | [`crud`]      | the nine operations, over any sqlx executor      |
//! | [`session`]   | pool or shared transaction                       |
//! | [`queries`]   | a DAO bound to a session                         |
//! | [`codegen`]   | emits a DAO file for one table                   |

pub mod case;
pub mod codegen;
pub mod config;
pub mod crud;
pub mod dao;
pub mod error;
pub mod expr;
pub mod introspect;
pub mod parser;
pub mod queries;
pub mod session;
pub mod sql;
pub mod types;

// Generated files refer to these through the crate path.
pub use chrono;
pub use uuid;

pub mod prelude {
    pub use crate::dao::{BaseCols, ConflictCols, Dao, Model, PkMatcher, TableSource, UpdatedAt};
    pub use crate::error::*;
    pub use crate::expr::{
        Assignment, Column, ColumnList, Expr, OrderBy, SearchParams, SortOrder, Table, Value, col,
    };
    pub use crate::queries::Queries;
    pub use crate::session::Session;
}

/// Normalize an identifier to PascalCase.
///
/// # Example
///
/// ```
/// assert_eq!(daokit::normalize("user_id"), "UserId");
/// assert_eq!(daokit::normalize("httpServer"), "HttpServer");
/// ```
pub fn normalize(identifier: &str) -> String {
    case::normalize(identifier)
}
