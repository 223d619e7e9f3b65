//! JOIN clauses.

use crate::error::BuildResult;
use crate::ident::Ident;
use crate::operator::Operator;
use crate::qb::QueryBuilder;
use crate::qb::compile::write_subquery;
use crate::qb::fragment::Fragment;
use crate::qb::param::SqlWriter;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JoinTarget {
    /// A table or CTE name.
    Table(Ident),
    Subquery(Box<QueryBuilder>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JoinCondition {
    None,
    On {
        left: Ident,
        op: Operator,
        right: Ident,
    },
    Using(Vec<Ident>),
    Expression(Fragment),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) lateral: bool,
    pub(crate) target: JoinTarget,
    pub(crate) alias: Option<Ident>,
    pub(crate) condition: JoinCondition,
}

impl Join {
    pub(crate) fn write_to(&self, w: &mut SqlWriter) -> BuildResult<()> {
        w.push(' ');
        w.push_str(self.kind.as_sql());
        if self.lateral {
            w.push_str(" LATERAL");
        }
        w.push(' ');
        match &self.target {
            JoinTarget::Table(table) => w.push_ident(table),
            JoinTarget::Subquery(query) => write_subquery(w, query, "join target")?,
        }
        if let Some(alias) = &self.alias {
            w.push_str(" AS ");
            w.push_ident(alias);
        }

        match &self.condition {
            JoinCondition::None => {}
            JoinCondition::On { left, op, right } => {
                w.push_str(" ON ");
                w.push_ident(left);
                w.push(' ');
                w.push_str(op.as_sql());
                w.push(' ');
                w.push_ident(right);
            }
            JoinCondition::Using(columns) => {
                w.push_str(" USING (");
                w.push_ident_list(columns);
                w.push(')');
            }
            JoinCondition::Expression(fragment) => {
                w.push_str(" ON ");
                fragment.write_to(w);
            }
        }
        Ok(())
    }
}
