//! Safe SQL identifier handling.
//!
//! Identifiers can never travel through the parameter channel, so every table,
//! column, alias or CTE name is validated here before it is spliced into SQL text.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_]*` and must not be a
//!   reserved keyword
//! - Quoted parts keep their case and may be keywords, but never contain quotes,
//!   whitespace or NUL
//! - Parts are joined with `.` (`schema.table`, `table.column`)
//!
//! # Example
//! ```ignore
//! use querykit::Ident;
//!
//! let t = Ident::parse("public.users")?;
//! let c = Ident::parse(r#""CamelCase"."UserTable""#)?;
//! # Ok::<(), querykit::BuildError>(())
//! ```

use crate::error::{BuildError, BuildResult};
use std::fmt;

/// Keywords that are rejected as bare (unquoted) identifier parts.
const RESERVED: &[&str] = &[
    "all", "alter", "and", "any", "as", "case", "create", "delete", "distinct", "drop", "else",
    "end", "except", "false", "for", "from", "grant", "group", "having", "in", "insert",
    "intersect", "into", "is", "join", "lateral", "like", "limit", "not", "null", "offset", "on",
    "or", "order", "returning", "select", "set", "table", "then", "true", "truncate", "union",
    "update", "values", "when", "where", "window", "with",
];

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_]*`.
    Unquoted(String),
    /// Quoted identifier: no quotes, whitespace or NUL.
    Quoted(String),
}

/// A validated SQL identifier (column, table, alias or schema name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

/// Validate a caller-supplied name.
///
/// Pure and total: returns the safe identifier or the reason it was rejected.
pub fn validate_identifier(name: &str) -> BuildResult<Ident> {
    Ident::parse(name)
}

fn invalid(name: &str, reason: impl fmt::Display) -> BuildError {
    BuildError::invalid_identifier(format!("'{name}': {reason}"))
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Mixed: `public."UserTable".id`
    pub fn parse(s: &str) -> BuildResult<Self> {
        if s.is_empty() {
            return Err(BuildError::invalid_argument("identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(invalid(s, "contains NUL character"));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(invalid(s, "trailing '.'"));
                        }
                    }
                    Some(c) => {
                        return Err(invalid(s, format!("expected '.' between parts, got '{c}'")));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            return Err(invalid(s, "embedded quote in quoted identifier"));
                        }
                        Some('"') => break,
                        Some(c) if c.is_whitespace() => {
                            return Err(invalid(s, "whitespace in quoted identifier"));
                        }
                        Some(c) => name.push(c),
                        None => return Err(invalid(s, "unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(invalid(s, "empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let ok = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c.is_ascii_alphanumeric()
                };
                if !ok {
                    return Err(invalid(s, format!("invalid character '{c}'")));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(invalid(s, "empty identifier segment"));
            }
            if RESERVED.iter().any(|kw| kw.eq_ignore_ascii_case(&name)) {
                return Err(invalid(s, format!("'{name}' is a reserved keyword")));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        Ok(Self { parts })
    }

    /// The identifier parts, outermost first.
    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    out.push_str(s);
                    out.push('"');
                }
            }
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// A select-list or RETURNING target: a column identifier or a (qualified) star.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ColumnRef {
    Star(Option<Ident>),
    Column(Ident),
}

impl ColumnRef {
    pub(crate) fn parse(s: &str) -> BuildResult<Self> {
        if s == "*" {
            return Ok(Self::Star(None));
        }
        if let Some(qualifier) = s.strip_suffix(".*") {
            return Ok(Self::Star(Some(Ident::parse(qualifier)?)));
        }
        Ident::parse(s).map(Self::Column)
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Self::Star(None) => out.push('*'),
            Self::Star(Some(q)) => {
                q.write_sql(out);
                out.push_str(".*");
            }
            Self::Column(c) => c.write_sql(out),
        }
    }
}
