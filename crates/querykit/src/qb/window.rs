//! Named WINDOW definitions and set operations (UNION / INTERSECT / EXCEPT).

use crate::error::BuildResult;
use crate::ident::Ident;
use crate::qb::QueryBuilder;
use crate::qb::compile::write_subquery;
use crate::qb::fragment::Fragment;
use crate::qb::param::SqlWriter;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NamedWindow {
    pub(crate) name: Ident,
    pub(crate) definition: Fragment,
}

pub(crate) fn write_windows(w: &mut SqlWriter, windows: &[NamedWindow]) {
    if windows.is_empty() {
        return;
    }
    w.push_str(" WINDOW ");
    for (i, window) in windows.iter().enumerate() {
        if i > 0 {
            w.push_str(", ");
        }
        w.push_ident(&window.name);
        w.push_str(" AS (");
        window.definition.write_to(w);
        w.push(')');
    }
}

/// Set operator combining two SELECTs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::UnionAll => "UNION ALL",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SetOperation {
    pub(crate) op: SetOperator,
    pub(crate) query: Box<QueryBuilder>,
}

/// Emit ` OP (rhs)` for each entry, left to right.
///
/// Every operand but the last closes one of the parens opened before the leading SELECT, so
/// `a.union(b).intersect(c)` reads `(a UNION (b)) INTERSECT (c)`.
pub(crate) fn write_set_operations(w: &mut SqlWriter, ops: &[SetOperation]) -> BuildResult<()> {
    let last = ops.len().saturating_sub(1);
    for (i, set_op) in ops.iter().enumerate() {
        w.push(' ');
        w.push_str(set_op.op.as_sql());
        w.push(' ');
        write_subquery(w, &set_op.query, "set operation operand")?;
        if i < last {
            w.push(')');
        }
    }
    Ok(())
}
