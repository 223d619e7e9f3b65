//! Common Table Expressions (WITH clause).
//!
//! Entries are emitted in insertion order; callers order dependent CTEs themselves.

use crate::error::BuildResult;
use crate::ident::Ident;
use crate::qb::QueryBuilder;
use crate::qb::param::SqlWriter;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cte {
    pub(crate) name: Ident,
    pub(crate) columns: Vec<Ident>,
    pub(crate) recursive: bool,
    pub(crate) query: Box<QueryBuilder>,
}

/// Emit `WITH [RECURSIVE] name [(cols)] AS (...), ... ` (with trailing space).
///
/// `RECURSIVE` is emitted once if any entry asked for it.
pub(crate) fn write_ctes(w: &mut SqlWriter, ctes: &[Cte]) -> BuildResult<()> {
    if ctes.is_empty() {
        return Ok(());
    }

    w.push_str("WITH ");
    if ctes.iter().any(|c| c.recursive) {
        w.push_str("RECURSIVE ");
    }
    w.push_sep(ctes, ", ", |w, cte| -> BuildResult<()> {
        w.push_ident(&cte.name);
        if !cte.columns.is_empty() {
            w.push_str(" (");
            w.push_ident_list(&cte.columns);
            w.push(')');
        }
        w.push_str(" AS (");
        cte.query.write_query(w)?;
        w.push(')');
        Ok(())
    })?;
    w.push(' ');
    Ok(())
}
