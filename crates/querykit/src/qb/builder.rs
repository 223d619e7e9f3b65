//! The fluent [`QueryBuilder`].
//!
//! Every mutation validates its input immediately. The first failure is latched on the
//! builder (see [`QueryBuilder::error`]) and returned by `compile()`; later calls keep
//! chaining but never replace it.

use crate::error::{BuildError, BuildResult};
use crate::ident::{ColumnRef, Ident};
use crate::operator::validate_comparison;
use crate::qb::Dialect;
use crate::qb::cte::Cte;
use crate::qb::fragment::{Fragment, RawExpr};
use crate::qb::join::{Join, JoinCondition, JoinKind, JoinTarget};
use crate::qb::order::{Direction, Lock, Nulls, OrderItem, OrderTarget};
use crate::qb::predicate::{Connective, Filter, Predicate, PredicateGroup};
use crate::qb::upsert::{ConflictAction, ConflictAssignment, Upsert};
use crate::qb::window::{NamedWindow, SetOperation, SetOperator};
use crate::value::Value;
use std::fmt;

/// Statement kind, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SelectItem {
    Column(ColumnRef),
    Expression {
        fragment: Fragment,
        alias: Option<Ident>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AssignValue {
    Value(Value),
    Expression(Fragment),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Assignment {
    pub(crate) column: Ident,
    pub(crate) value: AssignValue,
}

/// Accumulates the structure of one statement and compiles it on demand.
///
/// Created by [`select_from`](crate::qb::select_from), [`insert_into`](crate::qb::insert_into),
/// [`update_table`](crate::qb::update_table), [`delete_from`](crate::qb::delete_from) or the
/// same methods on [`Dialect`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct QueryBuilder {
    pub(crate) kind: QueryKind,
    pub(crate) dialect: Dialect,
    pub(crate) table: Option<Ident>,
    pub(crate) alias: Option<Ident>,
    pub(crate) distinct: bool,
    pub(crate) select_items: Vec<SelectItem>,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) ctes: Vec<Cte>,
    pub(crate) joins: Vec<Join>,
    pub(crate) filters: Vec<Predicate>,
    pub(crate) group_by: Vec<Ident>,
    pub(crate) having: Vec<Predicate>,
    pub(crate) windows: Vec<NamedWindow>,
    pub(crate) set_operations: Vec<SetOperation>,
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) lock: Option<Lock>,
    pub(crate) returning: Vec<ColumnRef>,
    pub(crate) upsert: Option<Upsert>,
    pub(crate) error: Option<BuildError>,
}

fn parse_idents<I, S>(names: I) -> BuildResult<Vec<Ident>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| Ident::parse(n.as_ref()))
        .collect()
}

/// Columns that are emitted next to `EXCLUDED.` must be bare names.
fn parse_bare_column(name: &str) -> BuildResult<Ident> {
    let ident = Ident::parse(name)?;
    if ident.parts().len() != 1 {
        return Err(BuildError::invalid_identifier(format!(
            "'{name}': expected an unqualified column name"
        )));
    }
    Ok(ident)
}

impl QueryBuilder {
    pub(crate) fn new(kind: QueryKind, dialect: Dialect, table: &str) -> Self {
        let mut qb = Self {
            kind,
            dialect,
            table: None,
            alias: None,
            distinct: false,
            select_items: Vec::new(),
            assignments: Vec::new(),
            ctes: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            windows: Vec::new(),
            set_operations: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            lock: None,
            returning: Vec::new(),
            upsert: None,
            error: None,
        };
        qb.table = qb.latch(Ident::parse(table));
        qb
    }

    /// Record the first failure; return the value on success.
    fn latch<T>(&mut self, result: BuildResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.error.get_or_insert(e);
                None
            }
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The validated target table, if its name was valid.
    pub fn table(&self) -> Option<&Ident> {
        self.table.as_ref()
    }

    /// The first validation failure recorded so far.
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    // ==================== Target / SELECT list ====================

    /// Alias the target table (`FROM users AS u`).
    pub fn alias(mut self, alias: &str) -> Self {
        if let Some(alias) = self.latch(Ident::parse(alias)) {
            self.alias = Some(alias);
        }
        self
    }

    /// `SELECT DISTINCT`
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append select-list columns. `*` and `t.*` are accepted.
    ///
    /// With no columns at all the select list defaults to `*`.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed: BuildResult<Vec<ColumnRef>> = columns
            .into_iter()
            .map(|c| ColumnRef::parse(c.as_ref()))
            .collect();
        if let Some(parsed) = self.latch(parsed) {
            self.select_items
                .extend(parsed.into_iter().map(SelectItem::Column));
        }
        self
    }

    /// Append one select-list column.
    pub fn column(self, column: &str) -> Self {
        self.columns([column])
    }

    /// Append a computed select-list entry, optionally aliased.
    pub fn select_expression(mut self, expr: impl Into<RawExpr>, alias: Option<&str>) -> Self {
        let item = expr.into().into_fragment().and_then(|fragment| {
            let alias = alias.map(Ident::parse).transpose()?;
            Ok(SelectItem::Expression { fragment, alias })
        });
        if let Some(item) = self.latch(item) {
            self.select_items.push(item);
        }
        self
    }

    // ==================== INSERT / UPDATE values ====================

    /// Add `column -> value` pairs in iteration order.
    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (column, value) in values {
            self.push_assignment(column.as_ref(), Ok(AssignValue::Value(value.into())));
        }
        self
    }

    /// Set one column to a bound value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.push_assignment(column, Ok(AssignValue::Value(value.into())));
        self
    }

    /// Set one column to a raw expression (`n = n + $1`).
    pub fn set_expression(mut self, column: &str, expr: impl Into<RawExpr>) -> Self {
        let value = expr.into().into_fragment().map(AssignValue::Expression);
        self.push_assignment(column, value);
        self
    }

    fn push_assignment(&mut self, column: &str, value: BuildResult<AssignValue>) {
        let assignment = Ident::parse(column).and_then(|column| {
            if self.assignments.iter().any(|a| a.column == column) {
                return Err(BuildError::invalid_argument(format!(
                    "column {column} assigned twice"
                )));
            }
            Ok(Assignment {
                column,
                value: value?,
            })
        });
        if let Some(assignment) = self.latch(assignment) {
            self.assignments.push(assignment);
        }
    }

    // ==================== JOIN ====================

    /// `INNER JOIN table [AS alias] ON left op right`
    pub fn inner_join(
        self,
        table: &str,
        alias: Option<&str>,
        left: &str,
        op: &str,
        right: &str,
    ) -> Self {
        self.join_on(JoinKind::Inner, table, alias, left, op, right)
    }

    /// `LEFT JOIN table [AS alias] ON left op right`
    pub fn left_join(
        self,
        table: &str,
        alias: Option<&str>,
        left: &str,
        op: &str,
        right: &str,
    ) -> Self {
        self.join_on(JoinKind::Left, table, alias, left, op, right)
    }

    /// `RIGHT JOIN table [AS alias] ON left op right`
    pub fn right_join(
        self,
        table: &str,
        alias: Option<&str>,
        left: &str,
        op: &str,
        right: &str,
    ) -> Self {
        self.join_on(JoinKind::Right, table, alias, left, op, right)
    }

    /// `FULL OUTER JOIN table [AS alias] ON left op right`
    pub fn full_join(
        self,
        table: &str,
        alias: Option<&str>,
        left: &str,
        op: &str,
        right: &str,
    ) -> Self {
        self.join_on(JoinKind::Full, table, alias, left, op, right)
    }

    /// Join a table on `left op right`, where both sides are column references.
    pub fn join_on(
        mut self,
        kind: JoinKind,
        table: &str,
        alias: Option<&str>,
        left: &str,
        op: &str,
        right: &str,
    ) -> Self {
        let condition = (|| -> BuildResult<_> {
            Ok(JoinCondition::On {
                left: Ident::parse(left)?,
                op: validate_comparison(op)?,
                right: Ident::parse(right)?,
            })
        })();
        let target = Ident::parse(table).map(JoinTarget::Table);
        self.push_join(kind, false, target, alias, condition);
        self
    }

    /// `CROSS JOIN table [AS alias]`
    pub fn cross_join(mut self, table: &str, alias: Option<&str>) -> Self {
        let target = Ident::parse(table).map(JoinTarget::Table);
        self.push_join(JoinKind::Cross, false, target, alias, Ok(JoinCondition::None));
        self
    }

    /// `<kind> JOIN table [AS alias] USING (columns)`
    pub fn join_using<I, S>(
        mut self,
        kind: JoinKind,
        table: &str,
        alias: Option<&str>,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let condition = parse_idents(columns).and_then(|cols| {
            if cols.is_empty() {
                return Err(BuildError::invalid_argument("USING requires at least one column"));
            }
            Ok(JoinCondition::Using(cols))
        });
        let target = Ident::parse(table).map(JoinTarget::Table);
        self.push_join(kind, false, target, alias, condition);
        self
    }

    /// `<kind> JOIN (subquery) AS alias ON <expression>`
    pub fn join_subquery(
        mut self,
        kind: JoinKind,
        subquery: QueryBuilder,
        alias: &str,
        on: impl Into<RawExpr>,
    ) -> Self {
        let condition = on.into().into_fragment().map(JoinCondition::Expression);
        let target = Ok(JoinTarget::Subquery(Box::new(subquery)));
        self.push_join(kind, false, target, Some(alias), condition);
        self
    }

    /// `<kind> JOIN LATERAL (subquery) AS alias ON <expression>`
    ///
    /// The subquery may reference columns of the tables joined before it.
    pub fn join_lateral(
        mut self,
        kind: JoinKind,
        subquery: QueryBuilder,
        alias: &str,
        on: impl Into<RawExpr>,
    ) -> Self {
        let condition = on.into().into_fragment().map(JoinCondition::Expression);
        let target = Ok(JoinTarget::Subquery(Box::new(subquery)));
        self.push_join(kind, true, target, Some(alias), condition);
        self
    }

    /// `CROSS JOIN LATERAL (subquery) AS alias`
    pub fn cross_join_lateral(mut self, subquery: QueryBuilder, alias: &str) -> Self {
        let target = Ok(JoinTarget::Subquery(Box::new(subquery)));
        self.push_join(JoinKind::Cross, true, target, Some(alias), Ok(JoinCondition::None));
        self
    }

    fn push_join(
        &mut self,
        kind: JoinKind,
        lateral: bool,
        target: BuildResult<JoinTarget>,
        alias: Option<&str>,
        condition: BuildResult<JoinCondition>,
    ) {
        let join = (|| -> BuildResult<_> {
            let condition = condition?;
            match (kind, &condition) {
                (JoinKind::Cross, JoinCondition::None) => {}
                (JoinKind::Cross, _) => {
                    return Err(BuildError::invalid_argument("CROSS JOIN takes no condition"));
                }
                (_, JoinCondition::None) => {
                    return Err(BuildError::invalid_argument(format!(
                        "{} requires a condition",
                        kind.as_sql()
                    )));
                }
                _ => {}
            }
            Ok(Join {
                kind,
                lateral,
                target: target?,
                alias: alias.map(Ident::parse).transpose()?,
                condition,
            })
        })();
        if let Some(join) = self.latch(join) {
            self.joins.push(join);
        }
    }

    // ==================== GROUP BY / HAVING ====================

    pub fn group_by(self, field: &str) -> Self {
        self.group_by_fields([field])
    }

    pub fn group_by_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(fields) = self.latch(parse_idents(fields)) {
            self.group_by.extend(fields);
        }
        self
    }

    fn push_having(&mut self, predicate: BuildResult<Predicate>) {
        if let Some(p) = self.latch(predicate) {
            self.having.push(p);
        }
    }

    /// `HAVING field op value`
    pub fn having_field(mut self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.push_having(Predicate::field(field, op, value));
        self
    }

    pub fn having_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.push_having(Predicate::eq(field, value));
        self
    }

    /// `HAVING (<expression>)`, e.g. `raw("count(*) > $1", params![5])`.
    pub fn having_expression(mut self, expr: impl Into<RawExpr>) -> Self {
        self.push_having(Predicate::expression(expr));
        self
    }

    pub fn having_any_group(mut self, f: impl FnOnce(PredicateGroup) -> PredicateGroup) -> Self {
        self.push_having(PredicateGroup::collect(Connective::Or, f));
        self
    }

    pub fn having_all_group(mut self, f: impl FnOnce(PredicateGroup) -> PredicateGroup) -> Self {
        self.push_having(PredicateGroup::collect(Connective::And, f));
        self
    }

    // ==================== CTE ====================

    /// `WITH name AS (query)`
    pub fn with_cte(mut self, name: &str, query: QueryBuilder) -> Self {
        self.push_cte(name, None::<[&str; 0]>, false, query);
        self
    }

    /// `WITH name (columns) AS (query)`
    pub fn with_cte_columns<I, S>(mut self, name: &str, columns: I, query: QueryBuilder) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_cte(name, Some(columns), false, query);
        self
    }

    /// `WITH RECURSIVE name AS (query)`
    pub fn with_recursive_cte(mut self, name: &str, query: QueryBuilder) -> Self {
        self.push_cte(name, None::<[&str; 0]>, true, query);
        self
    }

    /// `WITH RECURSIVE name (columns) AS (query)`
    pub fn with_recursive_cte_columns<I, S>(
        mut self,
        name: &str,
        columns: I,
        query: QueryBuilder,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push_cte(name, Some(columns), true, query);
        self
    }

    fn push_cte<I, S>(&mut self, name: &str, columns: Option<I>, recursive: bool, query: QueryBuilder)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cte = (|| -> BuildResult<_> {
            let name = Ident::parse(name)?;
            if self.ctes.iter().any(|c| c.name == name) {
                return Err(BuildError::invalid_argument(format!(
                    "CTE {name} defined twice"
                )));
            }
            Ok(Cte {
                name,
                columns: columns.map(parse_idents).transpose()?.unwrap_or_default(),
                recursive,
                query: Box::new(query),
            })
        })();
        if let Some(cte) = self.latch(cte) {
            self.ctes.push(cte);
        }
    }

    // ==================== WINDOW / set operations ====================

    /// `WINDOW name AS (<definition>)`
    pub fn window(mut self, name: &str, definition: impl Into<RawExpr>) -> Self {
        let window = (|| -> BuildResult<_> {
            Ok(NamedWindow {
                name: Ident::parse(name)?,
                definition: definition.into().into_fragment()?,
            })
        })();
        if let Some(window) = self.latch(window) {
            self.windows.push(window);
        }
        self
    }

    pub fn union(self, other: QueryBuilder) -> Self {
        self.set_operation(SetOperator::Union, other)
    }

    pub fn union_all(self, other: QueryBuilder) -> Self {
        self.set_operation(SetOperator::UnionAll, other)
    }

    pub fn intersect(self, other: QueryBuilder) -> Self {
        self.set_operation(SetOperator::Intersect, other)
    }

    pub fn except(self, other: QueryBuilder) -> Self {
        self.set_operation(SetOperator::Except, other)
    }

    /// Combine with another SELECT; operations apply left to right.
    pub fn set_operation(mut self, op: SetOperator, other: QueryBuilder) -> Self {
        self.set_operations.push(SetOperation {
            op,
            query: Box::new(other),
        });
        self
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.push_order(Ident::parse(field).map(OrderTarget::Column), direction, None);
        self
    }

    pub fn order_by_nulls(mut self, field: &str, direction: Direction, nulls: Nulls) -> Self {
        self.push_order(
            Ident::parse(field).map(OrderTarget::Column),
            direction,
            Some(nulls),
        );
        self
    }

    pub fn order_by_expression(
        mut self,
        expr: impl Into<RawExpr>,
        direction: Direction,
        nulls: Option<Nulls>,
    ) -> Self {
        let target = expr.into().into_fragment().map(OrderTarget::Expression);
        self.push_order(target, direction, nulls);
        self
    }

    fn push_order(&mut self, target: BuildResult<OrderTarget>, direction: Direction, nulls: Option<Nulls>) {
        if let Some(target) = self.latch(target) {
            self.order_by.push(OrderItem {
                target,
                direction,
                nulls,
            });
        }
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    // ==================== Locking ====================

    /// `FOR UPDATE`
    pub fn for_update(mut self) -> Self {
        self.lock.get_or_insert_with(Lock::default);
        self
    }

    /// `FOR UPDATE OF t1, t2`
    pub fn for_update_of<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(tables) = self.latch(parse_idents(tables)) {
            self.lock.get_or_insert_with(Lock::default).of.extend(tables);
        }
        self
    }

    /// `SKIP LOCKED`; implies `FOR UPDATE`.
    pub fn skip_locked(mut self) -> Self {
        self.lock.get_or_insert_with(Lock::default).skip_locked = true;
        self
    }

    // ==================== RETURNING ====================

    pub fn returning(self, field: &str) -> Self {
        self.returning_fields([field])
    }

    pub fn returning_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed: BuildResult<Vec<ColumnRef>> = fields
            .into_iter()
            .map(|f| ColumnRef::parse(f.as_ref()))
            .collect();
        if let Some(parsed) = self.latch(parsed) {
            self.returning.extend(parsed);
        }
        self
    }

    // ==================== ON CONFLICT (Postgres) ====================

    fn check_upsert_applicable(&self) -> BuildResult<()> {
        if self.kind != QueryKind::Insert {
            return Err(BuildError::missing_clause(format!(
                "ON CONFLICT applies only to INSERT, not {}",
                self.kind
            )));
        }
        if self.dialect != Dialect::Postgres {
            return Err(BuildError::missing_clause(
                "ON CONFLICT requires a Postgres-dialect builder",
            ));
        }
        Ok(())
    }

    fn set_upsert(&mut self, upsert: impl FnOnce() -> BuildResult<Upsert>) {
        let upsert = self.check_upsert_applicable().and_then(|()| upsert());
        if let Some(upsert) = self.latch(upsert) {
            self.upsert = Some(upsert);
        }
    }

    /// `ON CONFLICT DO NOTHING`
    pub fn on_conflict_do_nothing(mut self) -> Self {
        self.set_upsert(|| -> BuildResult<_> {
            Ok(Upsert {
                target: Vec::new(),
                action: ConflictAction::Nothing,
            })
        });
        self
    }

    /// `ON CONFLICT (columns) DO NOTHING`
    pub fn on_conflict_columns_do_nothing<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_upsert(|| -> BuildResult<_> {
            Ok(Upsert {
                target: parse_idents(columns)?,
                action: ConflictAction::Nothing,
            })
        });
        self
    }

    /// `ON CONFLICT (columns) DO UPDATE SET f = EXCLUDED.f, ...`
    pub fn on_conflict_do_update_fields<I, S, F, T>(mut self, columns: I, fields: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.set_upsert(|| -> BuildResult<_> {
            let assignments = fields
                .into_iter()
                .map(|f| parse_bare_column(f.as_ref()).map(ConflictAssignment::Excluded))
                .collect::<BuildResult<Vec<_>>>()?;
            conflict_update(parse_idents(columns)?, assignments)
        });
        self
    }

    /// `ON CONFLICT (columns) DO UPDATE SET col = <expression>, ...`
    ///
    /// Expressions carry their own parameters, threaded through the shared sequencer.
    pub fn on_conflict_do_update_assignments<I, S, A, K>(mut self, columns: I, assignments: A) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        A: IntoIterator<Item = (K, RawExpr)>,
        K: AsRef<str>,
    {
        self.set_upsert(|| -> BuildResult<_> {
            let assignments = assignments
                .into_iter()
                .map(|(column, expr)| {
                    Ok(ConflictAssignment::Expression(
                        parse_bare_column(column.as_ref())?,
                        expr.into_fragment()?,
                    ))
                })
                .collect::<BuildResult<Vec<_>>>()?;
            conflict_update(parse_idents(columns)?, assignments)
        });
        self
    }

    /// Restrict `DO UPDATE` with `WHERE (<expression>)`.
    pub fn on_conflict_where(mut self, expr: impl Into<RawExpr>) -> Self {
        let filter = self.check_upsert_applicable().and_then(|()| {
            let predicate = Predicate::expression(expr)?;
            match &mut self.upsert {
                Some(Upsert {
                    action: ConflictAction::Update { filter, .. },
                    ..
                }) => {
                    filter.push(predicate);
                    Ok(())
                }
                _ => Err(BuildError::missing_clause(
                    "ON CONFLICT WHERE requires a preceding DO UPDATE",
                )),
            }
        });
        self.latch(filter);
        self
    }
}

fn conflict_update(target: Vec<Ident>, assignments: Vec<ConflictAssignment>) -> BuildResult<Upsert> {
    if target.is_empty() {
        return Err(BuildError::missing_clause(
            "ON CONFLICT DO UPDATE requires conflict target columns",
        ));
    }
    if assignments.is_empty() {
        return Err(BuildError::invalid_argument(
            "ON CONFLICT DO UPDATE requires at least one assignment",
        ));
    }
    Ok(Upsert {
        target,
        action: ConflictAction::Update {
            assignments,
            filter: Vec::new(),
        },
    })
}

impl Filter for QueryBuilder {
    fn push_predicate(&mut self, predicate: BuildResult<Predicate>) {
        if let Some(p) = self.latch(predicate) {
            self.filters.push(p);
        }
    }
}
