//! Composable query builder.
//!
//! A builder accumulates the structure of one statement through consuming, chainable calls
//! and compiles it into SQL text plus an ordered parameter array. Literal values always
//! travel as `$n` parameters; identifiers and operators are validated and spliced.
//!
//! # Usage
//!
//! ```ignore
//! use querykit::prelude::*;
//!
//! let q = select_from("users")
//!     .where_eq("active", true)
//!     .where_any_group(|g| g.where_eq("role", "admin").where_eq("role", "owner"))
//!     .order_by("id", Direction::Asc)
//!     .limit(10)
//!     .compile()?;
//!
//! assert_eq!(
//!     q.sql(),
//!     "SELECT * FROM users WHERE active = $1 AND (role = $2 OR role = $3) ORDER BY id ASC LIMIT 10"
//! );
//!
//! // Postgres upsert
//! let q = Dialect::Postgres
//!     .insert_into("t", [("k", 1)])
//!     .on_conflict_do_update_fields(["k"], ["v"])
//!     .compile()?;
//! ```
//!
//! Top-level predicates are AND-combined; `where_any_group` / `where_all_group` add a
//! parenthesized OR / AND group.

mod builder;
mod compile;
mod cte;
mod fragment;
mod join;
mod order;
mod param;
mod predicate;
mod upsert;
mod window;

pub use builder::{QueryBuilder, QueryKind};
pub use compile::Compiled;
pub(crate) use compile::sql_fingerprint;
pub use fragment::{Fragment, RawExpr, raw};
pub use join::JoinKind;
pub use order::{Direction, Nulls};
pub use param::{ParamSequencer, Placeholder};
pub use predicate::{Connective, Filter, Predicate, PredicateGroup, Quantifier};
pub use window::SetOperator;

use crate::value::Value;

/// SQL flavor selected at construction.
///
/// Both flavors use `$n` placeholders. Only `Postgres` builders accept `ON CONFLICT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Standard,
    Postgres,
}

impl Dialect {
    pub fn select_from(self, table: &str) -> QueryBuilder {
        QueryBuilder::new(QueryKind::Select, self, table)
    }

    pub fn insert_into<I, K, V>(self, table: &str, values: I) -> QueryBuilder
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        QueryBuilder::new(QueryKind::Insert, self, table).values(values)
    }

    pub fn update_table<I, K, V>(self, table: &str, values: I) -> QueryBuilder
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        QueryBuilder::new(QueryKind::Update, self, table).values(values)
    }

    pub fn delete_from(self, table: &str) -> QueryBuilder {
        QueryBuilder::new(QueryKind::Delete, self, table)
    }
}

/// Create a SELECT builder. The select list defaults to `*`.
///
/// # Example
/// ```ignore
/// let qb = querykit::select_from("users").columns(["id", "email"]);
/// ```
pub fn select_from(table: &str) -> QueryBuilder {
    Dialect::Standard.select_from(table)
}

/// Create an INSERT builder; column order follows `values`.
///
/// # Example
/// ```ignore
/// let qb = querykit::insert_into("users", [("email", "a@example.com"), ("name", "Ann")]);
/// ```
pub fn insert_into<I, K, V>(table: &str, values: I) -> QueryBuilder
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    Dialect::Standard.insert_into(table, values)
}

/// Create an UPDATE builder.
pub fn update_table<I, K, V>(table: &str, values: I) -> QueryBuilder
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<Value>,
{
    Dialect::Standard.update_table(table, values)
}

/// Create a DELETE builder.
pub fn delete_from(table: &str) -> QueryBuilder {
    Dialect::Standard.delete_from(table)
}

#[cfg(test)]
mod tests;
