//! Linearizes a [`QueryBuilder`] into SQL text plus its parameter array.
//!
//! Clauses are emitted in a fixed grammar order and a single sequencer is threaded through
//! the whole statement, including every nested subquery, so placeholders follow the text.

use crate::error::{BuildError, BuildResult};
use crate::qb::builder::{AssignValue, QueryBuilder, QueryKind, SelectItem};
use crate::qb::cte::write_ctes;
use crate::qb::order::write_order_by;
use crate::qb::param::SqlWriter;
use crate::qb::predicate::write_clause;
use crate::qb::window::{write_set_operations, write_windows};
use crate::value::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio_postgres::types::ToSql;

/// Compiled SQL text with its ordered parameters.
///
/// Literal values never appear in `sql`; `params[i]` binds placeholder `$(i + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    sql: String,
    params: Vec<Value>,
}

impl Compiled {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Parameters as the slice shape tokio-postgres expects.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    /// Structural fingerprint: equal for statements that differ only in bound values.
    pub fn fingerprint(&self) -> u64 {
        sql_fingerprint(&self.sql)
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Hash of compiled SQL text; literal values never reach the text, so it only sees shape.
pub(crate) fn sql_fingerprint(sql: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    hasher.finish()
}

impl QueryBuilder {
    /// Compile to SQL text and parameters.
    ///
    /// A pure projection of the builder: calling it twice without mutation yields identical
    /// output. Returns the first latched validation error, if any, and never partial SQL.
    pub fn compile(&self) -> BuildResult<Compiled> {
        let mut w = SqlWriter::new();
        self.write_query(&mut w)?;
        let (sql, params) = w.finish();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "querykit.compile",
            kind = %self.kind,
            dialect = ?self.dialect,
            param_count = params.len(),
            sql = %sql,
            "compiled query"
        );

        Ok(Compiled { sql, params })
    }

    /// The SQL text of [`compile`](Self::compile).
    pub fn build_sql(&self) -> BuildResult<String> {
        self.compile().map(|c| c.sql)
    }

    /// The parameter array of [`compile`](Self::compile).
    pub fn build_params(&self) -> BuildResult<Vec<Value>> {
        self.compile().map(|c| c.params)
    }

    /// Reject clauses that are present but do not apply to this kind.
    fn check_clauses(&self) -> BuildResult<()> {
        let kind = self.kind;
        let inapplicable = |clause: &str| {
            BuildError::missing_clause(format!("{clause} does not apply to {kind}"))
        };

        if kind != QueryKind::Select {
            let select_only = [
                ("select list", !self.select_items.is_empty()),
                ("DISTINCT", self.distinct),
                ("JOIN", !self.joins.is_empty()),
                ("GROUP BY", !self.group_by.is_empty()),
                ("HAVING", !self.having.is_empty()),
                ("WINDOW", !self.windows.is_empty()),
                ("set operation", !self.set_operations.is_empty()),
                ("ORDER BY", !self.order_by.is_empty()),
                ("LIMIT", self.limit.is_some()),
                ("OFFSET", self.offset.is_some()),
                ("FOR UPDATE", self.lock.is_some()),
            ];
            if let Some((clause, _)) = select_only.iter().find(|(_, present)| *present) {
                return Err(inapplicable(clause));
            }
        }

        match kind {
            QueryKind::Select => {
                if !self.assignments.is_empty() {
                    return Err(inapplicable("SET/VALUES"));
                }
                if !self.returning.is_empty() {
                    return Err(inapplicable("RETURNING"));
                }
            }
            QueryKind::Insert => {
                if self.assignments.is_empty() {
                    return Err(BuildError::missing_clause(
                        "INSERT requires at least one column value",
                    ));
                }
                if !self.filters.is_empty() {
                    return Err(inapplicable("WHERE"));
                }
            }
            QueryKind::Update => {
                if self.assignments.is_empty() {
                    return Err(BuildError::missing_clause(
                        "UPDATE requires at least one column value",
                    ));
                }
            }
            QueryKind::Delete => {
                if !self.assignments.is_empty() {
                    return Err(inapplicable("SET/VALUES"));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn write_query(&self, w: &mut SqlWriter) -> BuildResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.check_clauses()?;
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| BuildError::compile_failed("builder has no target table"))?;

        write_ctes(w, &self.ctes)?;

        match self.kind {
            QueryKind::Select => {
                // One paren per chained set operation but the last keeps evaluation left to
                // right; INTERSECT would otherwise bind tighter than UNION/EXCEPT.
                for _ in 1..self.set_operations.len() {
                    w.push('(');
                }
                w.push_str("SELECT ");
                if self.distinct {
                    w.push_str("DISTINCT ");
                }
                if self.select_items.is_empty() {
                    w.push('*');
                } else {
                    w.push_sep(&self.select_items, ", ", |w, item| -> BuildResult<()> {
                        match item {
                            SelectItem::Column(column) => w.push_column(column),
                            SelectItem::Expression { fragment, alias } => {
                                fragment.write_to(w);
                                if let Some(alias) = alias {
                                    w.push_str(" AS ");
                                    w.push_ident(alias);
                                }
                            }
                        }
                        Ok(())
                    })?;
                }
                w.push_str(" FROM ");
            }
            QueryKind::Insert => w.push_str("INSERT INTO "),
            QueryKind::Update => w.push_str("UPDATE "),
            QueryKind::Delete => w.push_str("DELETE FROM "),
        }
        w.push_ident(table);
        if let Some(alias) = &self.alias {
            w.push_str(" AS ");
            w.push_ident(alias);
        }

        match self.kind {
            QueryKind::Insert => {
                w.push_str(" (");
                for (i, a) in self.assignments.iter().enumerate() {
                    if i > 0 {
                        w.push_str(", ");
                    }
                    w.push_ident(&a.column);
                }
                w.push_str(") VALUES (");
                for (i, a) in self.assignments.iter().enumerate() {
                    if i > 0 {
                        w.push_str(", ");
                    }
                    write_assign_value(w, &a.value);
                }
                w.push(')');
            }
            QueryKind::Update => {
                w.push_str(" SET ");
                for (i, a) in self.assignments.iter().enumerate() {
                    if i > 0 {
                        w.push_str(", ");
                    }
                    w.push_ident(&a.column);
                    w.push_str(" = ");
                    write_assign_value(w, &a.value);
                }
            }
            QueryKind::Select | QueryKind::Delete => {}
        }

        for join in &self.joins {
            join.write_to(w)?;
        }

        write_clause(w, "WHERE", &self.filters)?;

        if !self.group_by.is_empty() {
            w.push_str(" GROUP BY ");
            w.push_ident_list(&self.group_by);
        }
        write_clause(w, "HAVING", &self.having)?;

        write_windows(w, &self.windows);
        write_set_operations(w, &self.set_operations)?;
        write_order_by(w, &self.order_by);

        if let Some(limit) = self.limit {
            w.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            w.push_str(&format!(" OFFSET {offset}"));
        }
        if let Some(lock) = &self.lock {
            lock.write_to(w);
        }

        // Postgres grammar puts ON CONFLICT before RETURNING.
        if let Some(upsert) = &self.upsert {
            upsert.write_to(w)?;
        }
        if !self.returning.is_empty() {
            w.push_str(" RETURNING ");
            for (i, column) in self.returning.iter().enumerate() {
                if i > 0 {
                    w.push_str(", ");
                }
                w.push_column(column);
            }
        }
        Ok(())
    }
}

fn write_assign_value(w: &mut SqlWriter, value: &AssignValue) {
    match value {
        AssignValue::Value(v) => w.push_bind(v),
        AssignValue::Expression(fragment) => fragment.write_to(w),
    }
}

/// Emit `(subquery)` for a nested SELECT, binding its values through the outer sequencer.
pub(crate) fn write_subquery(w: &mut SqlWriter, query: &QueryBuilder, role: &str) -> BuildResult<()> {
    if query.kind != QueryKind::Select {
        return Err(BuildError::compile_failed(format!(
            "{role} must be a SELECT, got {}",
            query.kind
        )));
    }
    w.push('(');
    query.write_query(w)?;
    w.push(')');
    Ok(())
}
