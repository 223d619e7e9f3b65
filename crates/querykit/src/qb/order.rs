//! ORDER BY items and row locking.

use crate::ident::Ident;
use crate::qb::fragment::Fragment;
use crate::qb::param::SqlWriter;

/// Sort direction. Always emitted explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// `NULLS FIRST` / `NULLS LAST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

impl Nulls {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Nulls::First => "NULLS FIRST",
            Nulls::Last => "NULLS LAST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OrderTarget {
    Column(Ident),
    Expression(Fragment),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderItem {
    pub(crate) target: OrderTarget,
    pub(crate) direction: Direction,
    pub(crate) nulls: Option<Nulls>,
}

pub(crate) fn write_order_by(w: &mut SqlWriter, items: &[OrderItem]) {
    if items.is_empty() {
        return;
    }
    w.push_str(" ORDER BY ");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.push_str(", ");
        }
        match &item.target {
            OrderTarget::Column(column) => w.push_ident(column),
            OrderTarget::Expression(fragment) => fragment.write_to(w),
        }
        w.push(' ');
        w.push_str(item.direction.as_sql());
        if let Some(nulls) = item.nulls {
            w.push(' ');
            w.push_str(nulls.as_sql());
        }
    }
}

/// `FOR UPDATE [OF t1, t2] [SKIP LOCKED]`
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Lock {
    pub(crate) of: Vec<Ident>,
    pub(crate) skip_locked: bool,
}

impl Lock {
    pub(crate) fn write_to(&self, w: &mut SqlWriter) {
        w.push_str(" FOR UPDATE");
        if !self.of.is_empty() {
            w.push_str(" OF ");
            w.push_ident_list(&self.of);
        }
        if self.skip_locked {
            w.push_str(" SKIP LOCKED");
        }
    }
}
