//! Convenient imports for typical `querykit` usage.
//!
//! ```ignore
//! use querykit::prelude::*;
//! ```

pub use crate::{
    BuildError, BuildResult, CachedClient, ClientConfig, Compiled, DbError, DbResult, Dialect,
    Direction, Filter, GenericClient, JoinKind, Nulls, QueryBuilder, Value, delete_from,
    insert_into, params, raw, select_from, update_table,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
