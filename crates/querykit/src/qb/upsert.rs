//! Postgres `INSERT ... ON CONFLICT` clause.
//!
//! Only INSERT builders created with [`Dialect::Postgres`](crate::qb::Dialect::Postgres)
//! accept it; the builder rejects every other combination when the clause is added.

use crate::error::BuildResult;
use crate::ident::Ident;
use crate::qb::fragment::Fragment;
use crate::qb::param::SqlWriter;
use crate::qb::predicate::{Predicate, write_clause};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConflictAssignment {
    /// `col = EXCLUDED.col`
    Excluded(Ident),
    /// `col = <expression>`
    Expression(Ident, Fragment),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConflictAction {
    Nothing,
    Update {
        assignments: Vec<ConflictAssignment>,
        filter: Vec<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Upsert {
    pub(crate) target: Vec<Ident>,
    pub(crate) action: ConflictAction,
}

impl Upsert {
    pub(crate) fn write_to(&self, w: &mut SqlWriter) -> BuildResult<()> {
        w.push_str(" ON CONFLICT");
        if !self.target.is_empty() {
            w.push_str(" (");
            w.push_ident_list(&self.target);
            w.push(')');
        }

        match &self.action {
            ConflictAction::Nothing => w.push_str(" DO NOTHING"),
            ConflictAction::Update {
                assignments,
                filter,
            } => {
                w.push_str(" DO UPDATE SET ");
                for (i, assignment) in assignments.iter().enumerate() {
                    if i > 0 {
                        w.push_str(", ");
                    }
                    match assignment {
                        ConflictAssignment::Excluded(column) => {
                            w.push_ident(column);
                            w.push_str(" = EXCLUDED.");
                            w.push_ident(column);
                        }
                        ConflictAssignment::Expression(column, fragment) => {
                            w.push_ident(column);
                            w.push_str(" = ");
                            fragment.write_to(w);
                        }
                    }
                }
                write_clause(w, "WHERE", filter)?;
            }
        }
        Ok(())
    }
}
