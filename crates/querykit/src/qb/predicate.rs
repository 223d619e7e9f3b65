//! Predicate trees for WHERE / HAVING / ON CONFLICT filters.
//!
//! A predicate list is an implicit AND of its entries. Explicit groups carry their own
//! connective and are always parenthesized when rendered, whatever the nesting depth.

use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::operator::{Operator, validate_operator, validate_quantified};
use crate::qb::QueryBuilder;
use crate::qb::compile::write_subquery;
use crate::qb::fragment::{Fragment, RawExpr};
use crate::qb::param::SqlWriter;
use crate::value::Value;

/// Boolean connective of a predicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    fn separator(&self) -> &'static str {
        match self {
            Connective::And => " AND ",
            Connective::Or => " OR ",
        }
    }
}

/// `ANY` / `ALL` quantifier for subquery comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    All,
}

/// A node of the predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field op $n`
    Compare {
        field: Ident,
        op: Operator,
        value: Value,
    },
    /// `field IS [NOT] NULL`
    Null { field: Ident, negated: bool },
    /// `field [NOT] IN ($a, $b, ...)`
    InList {
        field: Ident,
        values: Vec<Value>,
        negated: bool,
    },
    /// `field [NOT] BETWEEN $a AND $b`
    Between {
        field: Ident,
        lower: Value,
        upper: Value,
        negated: bool,
    },
    /// `field [NOT] IN (subquery)`
    InSubquery {
        field: Ident,
        query: Box<QueryBuilder>,
        negated: bool,
    },
    /// `field op ANY|ALL (subquery)`
    Quantified {
        field: Ident,
        op: Operator,
        quantifier: Quantifier,
        query: Box<QueryBuilder>,
    },
    /// `[NOT] EXISTS (subquery)`
    Exists {
        query: Box<QueryBuilder>,
        negated: bool,
    },
    /// Raw expression with its own parameters; rendered parenthesized.
    Expression(Fragment),
    /// Parenthesized group joined by its connective.
    Group(Connective, Vec<Predicate>),
}

impl Predicate {
    /// `field op value`, validating both the identifier and the operator.
    ///
    /// NULL values turn `=`/`IS` into `IS NULL` and `<>`/`!=`/`IS NOT` into `IS NOT NULL`.
    pub fn field(field: &str, op: &str, value: impl Into<Value>) -> BuildResult<Self> {
        let field = Ident::parse(field)?;
        let op = validate_operator(op)?;
        let value = value.into();

        match op {
            Operator::Is | Operator::IsNot if !value.is_null() => Err(
                BuildError::invalid_argument(format!("{op} only accepts NULL, got {value:?}")),
            ),
            Operator::Eq | Operator::Is if value.is_null() => Ok(Self::Null {
                field,
                negated: false,
            }),
            Operator::IsNot => Ok(Self::Null {
                field,
                negated: true,
            }),
            _ if op.is_negative_equality() && value.is_null() => Ok(Self::Null {
                field,
                negated: true,
            }),
            Operator::In | Operator::NotIn => Ok(Self::InList {
                field,
                values: vec![value],
                negated: op == Operator::NotIn,
            }),
            _ => Ok(Self::Compare { field, op, value }),
        }
    }

    /// `field = value`
    pub fn eq(field: &str, value: impl Into<Value>) -> BuildResult<Self> {
        Self::field(field, "=", value)
    }

    pub fn null(field: &str, negated: bool) -> BuildResult<Self> {
        Ok(Self::Null {
            field: Ident::parse(field)?,
            negated,
        })
    }

    pub fn in_list<V: Into<Value>>(
        field: &str,
        values: impl IntoIterator<Item = V>,
        negated: bool,
    ) -> BuildResult<Self> {
        Ok(Self::InList {
            field: Ident::parse(field)?,
            values: values.into_iter().map(Into::into).collect(),
            negated,
        })
    }

    pub fn between(
        field: &str,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
        negated: bool,
    ) -> BuildResult<Self> {
        Ok(Self::Between {
            field: Ident::parse(field)?,
            lower: lower.into(),
            upper: upper.into(),
            negated,
        })
    }

    pub fn in_subquery(field: &str, query: QueryBuilder, negated: bool) -> BuildResult<Self> {
        Ok(Self::InSubquery {
            field: Ident::parse(field)?,
            query: Box::new(query),
            negated,
        })
    }

    pub fn quantified(
        field: &str,
        op: &str,
        quantifier: Quantifier,
        query: QueryBuilder,
    ) -> BuildResult<Self> {
        Ok(Self::Quantified {
            field: Ident::parse(field)?,
            op: validate_quantified(op)?,
            quantifier,
            query: Box::new(query),
        })
    }

    pub fn exists(query: QueryBuilder, negated: bool) -> Self {
        Self::Exists {
            query: Box::new(query),
            negated,
        }
    }

    pub fn expression(expr: impl Into<RawExpr>) -> BuildResult<Self> {
        expr.into().into_fragment().map(Self::Expression)
    }

    /// Disjunction group.
    pub fn any(children: Vec<Predicate>) -> Self {
        Self::Group(Connective::Or, children)
    }

    /// Conjunction group.
    pub fn all(children: Vec<Predicate>) -> Self {
        Self::Group(Connective::And, children)
    }

    /// Groups with no (non-empty) children render nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Group(_, children) => children.iter().all(Predicate::is_empty),
            _ => false,
        }
    }

    pub(crate) fn write_to(&self, w: &mut SqlWriter) -> BuildResult<()> {
        match self {
            Self::Compare { field, op, value } => {
                w.push_ident(field);
                w.push(' ');
                w.push_str(op.as_sql());
                w.push(' ');
                w.push_bind(value);
            }
            Self::Null { field, negated } => {
                w.push_ident(field);
                w.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::InList {
                field,
                values,
                negated,
            } => {
                if values.is_empty() {
                    w.push_str(if *negated { "1=1" } else { "1=0" });
                } else {
                    w.push_ident(field);
                    w.push_str(if *negated { " NOT IN (" } else { " IN (" });
                    w.push_bind_list(values);
                    w.push(')');
                }
            }
            Self::Between {
                field,
                lower,
                upper,
                negated,
            } => {
                w.push_ident(field);
                w.push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                w.push_bind(lower);
                w.push_str(" AND ");
                w.push_bind(upper);
            }
            Self::InSubquery {
                field,
                query,
                negated,
            } => {
                w.push_ident(field);
                w.push_str(if *negated { " NOT IN " } else { " IN " });
                write_subquery(w, query, "IN operand")?;
            }
            Self::Quantified {
                field,
                op,
                quantifier,
                query,
            } => {
                w.push_ident(field);
                w.push(' ');
                w.push_str(op.as_sql());
                w.push_str(match quantifier {
                    Quantifier::Any => " ANY ",
                    Quantifier::All => " ALL ",
                });
                write_subquery(w, query, "ANY/ALL operand")?;
            }
            Self::Exists { query, negated } => {
                w.push_str(if *negated { "NOT EXISTS " } else { "EXISTS " });
                write_subquery(w, query, "EXISTS operand")?;
            }
            Self::Expression(fragment) => {
                w.push('(');
                fragment.write_to(w);
                w.push(')');
            }
            Self::Group(connective, children) => {
                w.push('(');
                write_joined(w, children, connective.separator())?;
                w.push(')');
            }
        }
        Ok(())
    }
}

fn write_joined(w: &mut SqlWriter, items: &[Predicate], sep: &str) -> BuildResult<()> {
    let live: Vec<&Predicate> = items.iter().filter(|p| !p.is_empty()).collect();
    for (i, p) in live.iter().enumerate() {
        if i > 0 {
            w.push_str(sep);
        }
        p.write_to(w)?;
    }
    Ok(())
}

/// Emit ` KEYWORD p1 AND p2 ...` for a top-level predicate list; no-op when empty.
pub(crate) fn write_clause(w: &mut SqlWriter, keyword: &str, items: &[Predicate]) -> BuildResult<()> {
    if items.iter().all(Predicate::is_empty) {
        return Ok(());
    }
    w.push(' ');
    w.push_str(keyword);
    w.push(' ');
    write_joined(w, items, " AND ")
}

/// Child builder handed to grouping callbacks.
///
/// Its only observable effect is the group node it produces in the parent's predicate list.
#[derive(Debug)]
#[must_use]
pub struct PredicateGroup {
    children: Vec<Predicate>,
    error: Option<BuildError>,
}

impl PredicateGroup {
    pub(crate) fn collect(
        connective: Connective,
        f: impl FnOnce(PredicateGroup) -> PredicateGroup,
    ) -> BuildResult<Predicate> {
        let group = f(PredicateGroup {
            children: Vec::new(),
            error: None,
        });
        match group.error {
            Some(err) => Err(err),
            None => Ok(Predicate::Group(connective, group.children)),
        }
    }
}

/// Fluent predicate accumulation shared by [`QueryBuilder`] (WHERE) and [`PredicateGroup`].
///
/// Every method validates its input at the call site. A failure is latched and reported by
/// `compile()` (or by the enclosing group); later calls never replace the first failure.
pub trait Filter: Sized {
    #[doc(hidden)]
    fn push_predicate(&mut self, predicate: BuildResult<Predicate>);

    /// Add a prebuilt predicate (or predicate tree).
    fn where_predicate(mut self, predicate: Predicate) -> Self {
        self.push_predicate(Ok(predicate));
        self
    }

    /// `field op value`
    fn where_field(mut self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.push_predicate(Predicate::field(field, op, value));
        self
    }

    /// `field = value` (`IS NULL` for NULL).
    fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.push_predicate(Predicate::eq(field, value));
        self
    }

    fn where_null(mut self, field: &str) -> Self {
        self.push_predicate(Predicate::null(field, false));
        self
    }

    fn where_not_null(mut self, field: &str) -> Self {
        self.push_predicate(Predicate::null(field, true));
        self
    }

    /// `field IN (...)`; an empty list never matches.
    fn where_in<V: Into<Value>>(mut self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.push_predicate(Predicate::in_list(field, values, false));
        self
    }

    /// `field NOT IN (...)`; an empty list always matches.
    fn where_not_in<V: Into<Value>>(
        mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.push_predicate(Predicate::in_list(field, values, true));
        self
    }

    fn where_between(mut self, field: &str, lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        self.push_predicate(Predicate::between(field, lower, upper, false));
        self
    }

    fn where_not_between(
        mut self,
        field: &str,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.push_predicate(Predicate::between(field, lower, upper, true));
        self
    }

    fn where_in_subquery(mut self, field: &str, subquery: QueryBuilder) -> Self {
        self.push_predicate(Predicate::in_subquery(field, subquery, false));
        self
    }

    fn where_not_in_subquery(mut self, field: &str, subquery: QueryBuilder) -> Self {
        self.push_predicate(Predicate::in_subquery(field, subquery, true));
        self
    }

    fn where_exists(mut self, subquery: QueryBuilder) -> Self {
        self.push_predicate(Ok(Predicate::exists(subquery, false)));
        self
    }

    fn where_not_exists(mut self, subquery: QueryBuilder) -> Self {
        self.push_predicate(Ok(Predicate::exists(subquery, true)));
        self
    }

    /// `field op ANY (subquery)`
    fn where_any(mut self, field: &str, op: &str, subquery: QueryBuilder) -> Self {
        self.push_predicate(Predicate::quantified(field, op, Quantifier::Any, subquery));
        self
    }

    /// `field op ALL (subquery)`
    fn where_all(mut self, field: &str, op: &str, subquery: QueryBuilder) -> Self {
        self.push_predicate(Predicate::quantified(field, op, Quantifier::All, subquery));
        self
    }

    /// Raw expression with `$n` parameter slots and `{{name}}` identifier slots.
    fn where_expression(mut self, expr: impl Into<RawExpr>) -> Self {
        self.push_predicate(Predicate::expression(expr));
        self
    }

    /// OR-group of everything `f` adds.
    fn where_any_group(mut self, f: impl FnOnce(PredicateGroup) -> PredicateGroup) -> Self {
        self.push_predicate(PredicateGroup::collect(Connective::Or, f));
        self
    }

    /// AND-group of everything `f` adds.
    fn where_all_group(mut self, f: impl FnOnce(PredicateGroup) -> PredicateGroup) -> Self {
        self.push_predicate(PredicateGroup::collect(Connective::And, f));
        self
    }
}

impl Filter for PredicateGroup {
    fn push_predicate(&mut self, predicate: BuildResult<Predicate>) {
        match predicate {
            Ok(p) => self.children.push(p),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
    }
}
