//! Comparison operator allow-list.
//!
//! Operators are spliced into SQL text, so free-form caller strings are only accepted
//! when they normalize to one of the tokens below. Matching is case-insensitive and
//! tolerates runs of whitespace (`not   like`).

use crate::error::{BuildError, BuildResult};
use std::fmt;

/// A validated comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    /// `<>`
    NotEq,
    /// `!=`
    BangEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    ILike,
    NotLike,
    Is,
    IsNot,
    In,
    NotIn,
}

impl Operator {
    /// The SQL token for this operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::BangEq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// Plain binary comparisons, the only ones usable in join conditions.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::NotEq
                | Operator::BangEq
                | Operator::Lt
                | Operator::Lte
                | Operator::Gt
                | Operator::Gte
        )
    }

    /// Operators that may precede `ANY (...)` / `ALL (...)`: comparisons and pattern matches.
    pub fn is_quantifiable(&self) -> bool {
        self.is_comparison() || matches!(self, Operator::Like | Operator::ILike | Operator::NotLike)
    }

    pub(crate) fn is_negative_equality(&self) -> bool {
        matches!(self, Operator::NotEq | Operator::BangEq)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Check an operator token against the allow-list.
pub fn validate_operator(token: &str) -> BuildResult<Operator> {
    let normalized = token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    let op = match normalized.as_str() {
        "=" => Operator::Eq,
        "<>" => Operator::NotEq,
        "!=" => Operator::BangEq,
        "<" => Operator::Lt,
        "<=" => Operator::Lte,
        ">" => Operator::Gt,
        ">=" => Operator::Gte,
        "LIKE" => Operator::Like,
        "ILIKE" => Operator::ILike,
        "NOT LIKE" => Operator::NotLike,
        "IS" => Operator::Is,
        "IS NOT" => Operator::IsNot,
        "IN" => Operator::In,
        "NOT IN" => Operator::NotIn,
        _ => return Err(BuildError::unsupported_operator(format!("'{token}'"))),
    };
    Ok(op)
}

/// Like [`validate_operator`], restricted to plain binary comparisons.
pub(crate) fn validate_comparison(token: &str) -> BuildResult<Operator> {
    let op = validate_operator(token)?;
    if !op.is_comparison() {
        return Err(BuildError::unsupported_operator(format!(
            "'{token}' is not a comparison operator"
        )));
    }
    Ok(op)
}

/// Like [`validate_operator`], restricted to operators usable with `ANY`/`ALL`.
pub(crate) fn validate_quantified(token: &str) -> BuildResult<Operator> {
    let op = validate_operator(token)?;
    if !op.is_quantifiable() {
        return Err(BuildError::unsupported_operator(format!(
            "'{token}' cannot be used with ANY/ALL"
        )));
    }
    Ok(op)
}
