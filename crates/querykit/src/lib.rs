//! # querykit
//!
//! A composable SQL query builder for Postgres-style positional SQL.
//!
//! ## Features
//!
//! - **Injection-safe**: literal values always travel as `$n` parameters; identifiers and
//!   operators are validated against strict rules before they touch SQL text
//! - **Composable**: nested predicate groups, subqueries, joins, CTEs, windows and set
//!   operations share one parameter sequence
//! - **Deterministic**: `compile()` is pure, so equal builders produce identical SQL
//! - **Postgres upserts**: `ON CONFLICT ... DO NOTHING / DO UPDATE` on the `Postgres` dialect
//! - **Transaction-friendly**: run compiled statements on anything implementing
//!   [`GenericClient`], including pooled clients and transactions
//!
//! ## Example
//!
//! ```ignore
//! use querykit::prelude::*;
//!
//! let q = select_from("users")
//!     .columns(["id", "email"])
//!     .where_eq("status", "active")
//!     .where_field("age", ">=", 18)
//!     .order_by("created_at", Direction::Desc)
//!     .limit(10)
//!     .compile()?;
//!
//! assert_eq!(
//!     q.sql(),
//!     "SELECT id, email FROM users WHERE status = $1 AND age >= $2 ORDER BY created_at DESC LIMIT 10"
//! );
//!
//! let rows = q.fetch_all(&client).await?;
//!
//! update_table("users", [("status", "inactive")])
//!     .where_eq("id", 7)
//!     .returning("id")
//!     .fetch_one(&client)
//!     .await?;
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod operator;
pub mod prelude;
pub mod qb;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

pub use cache::{CacheStats, CachedClient};
pub use client::GenericClient;
pub use config::ClientConfig;
pub use error::{BuildError, BuildResult, DbError, DbResult};
pub use ident::{Ident, IdentPart, validate_identifier};
pub use operator::{Operator, validate_operator};
pub use value::Value;

pub use qb::{
    Compiled, Connective, Dialect, Direction, Filter, Fragment, JoinKind, Nulls, ParamSequencer,
    Placeholder, Predicate, PredicateGroup, Quantifier, QueryBuilder, QueryKind, RawExpr,
    SetOperator, delete_from, insert_into, raw, select_from, update_table,
};

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

// Re-export the driver types callers need to consume results.
pub use tokio_postgres;
pub use tokio_postgres::Row;
