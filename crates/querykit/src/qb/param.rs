//! Positional parameter sequencing.
//!
//! A single [`ParamSequencer`] is threaded through an entire compile, including every
//! nested subquery, so placeholder numbers always follow the textual order of the final SQL.

use crate::ident::{ColumnRef, Ident};
use crate::value::Value;
use std::fmt;

/// A positional placeholder (`$n`, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(usize);

impl Placeholder {
    /// The 1-based position of the bound value.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Append-only list of bound values plus the running placeholder counter.
#[derive(Debug, Default)]
pub struct ParamSequencer {
    params: Vec<Value>,
}

impl ParamSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value and return the placeholder that refers to it.
    pub fn bind(&mut self, value: Value) -> Placeholder {
        self.params.push(value);
        Placeholder(self.params.len())
    }

    /// Number of values bound so far.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// SQL text under construction together with its sequencer.
#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    seq: ParamSequencer,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub(crate) fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    pub(crate) fn push_ident(&mut self, ident: &Ident) {
        ident.write_sql(&mut self.sql);
    }

    pub(crate) fn push_column(&mut self, column: &ColumnRef) {
        column.write_sql(&mut self.sql);
    }

    /// Emit `a, b, c`.
    pub(crate) fn push_ident_list(&mut self, idents: &[Ident]) {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            ident.write_sql(&mut self.sql);
        }
    }

    /// Bind a value and emit its placeholder.
    pub(crate) fn push_bind(&mut self, value: &Value) {
        use std::fmt::Write;
        let placeholder = self.seq.bind(value.clone());
        let _ = write!(self.sql, "{placeholder}");
    }

    /// Bind a run of values, emitting `$a, $b, ...`.
    pub(crate) fn push_bind_list(&mut self, values: &[Value]) {
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(v);
        }
    }

    /// Emit items separated by `sep`.
    pub(crate) fn push_sep<T, E>(
        &mut self,
        items: &[T],
        sep: &str,
        mut push_elem: impl FnMut(&mut Self, &T) -> Result<(), E>,
    ) -> Result<(), E> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(sep);
            }
            push_elem(self, item)?;
        }
        Ok(())
    }

    pub(crate) fn sequencer_mut(&mut self) -> &mut ParamSequencer {
        &mut self.seq
    }

    pub(crate) fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.seq.into_params())
    }
}
