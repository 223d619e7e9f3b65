//! Raw SQL fragments with their own parameters and identifier bindings.
//!
//! Callers write parameter slots as `$1..$n` local to the template and identifier slots as
//! `{{name}}`:
//!
//! ```ignore
//! use querykit::{params, raw};
//!
//! let expr = raw("lower({{col}}) = $1 OR created_at > $2", params!["ann", cutoff])
//!     .ident("col", "u.email");
//! ```
//!
//! Parsing happens when the expression is handed to a builder. Identifiers are validated
//! and spliced into the text right away; parameter slots stay symbolic and are renumbered
//! against the shared sequencer at compile time.

use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::qb::param::{Placeholder, SqlWriter};
use crate::value::Value;

/// An unparsed template with its parameters and identifier bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExpr {
    template: String,
    params: Vec<Value>,
    idents: Vec<(String, String)>,
}

/// Create a raw expression from a template and its parameters.
pub fn raw(template: impl Into<String>, params: Vec<Value>) -> RawExpr {
    RawExpr {
        template: template.into(),
        params,
        idents: Vec::new(),
    }
}

impl RawExpr {
    /// Bind `{{name}}` in the template to a (validated) identifier.
    pub fn ident(mut self, name: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.idents.push((name.into(), identifier.into()));
        self
    }

    /// Bind several identifiers at once.
    pub fn idents<N, I>(mut self, bindings: impl IntoIterator<Item = (N, I)>) -> Self
    where
        N: Into<String>,
        I: Into<String>,
    {
        self.idents
            .extend(bindings.into_iter().map(|(n, i)| (n.into(), i.into())));
        self
    }

    pub(crate) fn into_fragment(self) -> BuildResult<Fragment> {
        Fragment::parse(&self.template, self.params, &self.idents)
    }
}

impl From<&str> for RawExpr {
    fn from(template: &str) -> Self {
        raw(template, Vec::new())
    }
}

impl From<String> for RawExpr {
    fn from(template: String) -> Self {
        raw(template, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    /// 0-based index into the fragment's own parameter list.
    Param(usize),
}

/// A parsed template: text pieces, local parameter slots, and the values for those slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pieces: Vec<Piece>,
    params: Vec<Value>,
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c == '$' || c.is_ascii_alphanumeric()
}

impl Fragment {
    fn parse(template: &str, params: Vec<Value>, idents: &[(String, String)]) -> BuildResult<Self> {
        if template.trim().is_empty() {
            return Err(BuildError::invalid_argument("expression cannot be empty"));
        }

        let chars: Vec<char> = template.chars().collect();
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut used = vec![false; params.len()];
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' | '"' => {
                    // Copy quoted literal/identifier verbatim; `''` and `""` escapes fall out
                    // naturally as a close followed by a reopen.
                    let end = chars[i + 1..]
                        .iter()
                        .position(|&x| x == c)
                        .ok_or_else(|| {
                            BuildError::invalid_argument(format!(
                                "unterminated {c} quote in expression '{template}'"
                            ))
                        })?;
                    text.extend(&chars[i..=i + 1 + end]);
                    i += end + 2;
                }
                '{' if chars.get(i + 1) == Some(&'{') => {
                    let rest: String = chars[i + 2..].iter().collect();
                    let close = rest.find("}}").ok_or_else(|| {
                        BuildError::invalid_argument(format!(
                            "unterminated identifier binding in '{template}'"
                        ))
                    })?;
                    let name = rest[..close].trim();
                    let (_, raw_ident) =
                        idents.iter().find(|(n, _)| n == name).ok_or_else(|| {
                            BuildError::invalid_argument(format!(
                                "no identifier bound for '{{{{{name}}}}}'"
                            ))
                        })?;
                    Ident::parse(raw_ident)?.write_sql(&mut text);
                    i += 2 + rest[..close].chars().count() + 2;
                }
                '$' if i == 0 || !is_ident_char(chars[i - 1]) => {
                    let digits: String = chars[i + 1..]
                        .iter()
                        .take_while(|d| d.is_ascii_digit())
                        .collect();
                    if !digits.is_empty() {
                        let k: usize = digits.parse().map_err(|_| {
                            BuildError::invalid_argument(format!("bad placeholder ${digits}"))
                        })?;
                        if k == 0 || k > params.len() {
                            return Err(BuildError::invalid_argument(format!(
                                "placeholder ${k} has no parameter ({} supplied)",
                                params.len()
                            )));
                        }
                        used[k - 1] = true;
                        if !text.is_empty() {
                            pieces.push(Piece::Text(std::mem::take(&mut text)));
                        }
                        pieces.push(Piece::Param(k - 1));
                        i += 1 + digits.len();
                        continue;
                    }
                    // Dollar-quoted string: $tag$ ... $tag$
                    let tag_len = chars[i + 1..]
                        .iter()
                        .take_while(|t| t.is_ascii_alphanumeric() || **t == '_')
                        .count();
                    if chars.get(i + 1 + tag_len) == Some(&'$') {
                        let tag: String = chars[i..i + tag_len + 2].iter().collect();
                        let body_start = i + tag_len + 2;
                        let rest: String = chars[body_start..].iter().collect();
                        let end = rest.find(&tag).ok_or_else(|| {
                            BuildError::invalid_argument(format!(
                                "unterminated dollar-quoted string in '{template}'"
                            ))
                        })?;
                        let consumed = rest[..end].chars().count() + tag.chars().count();
                        text.extend(&chars[i..body_start + consumed]);
                        i = body_start + consumed;
                    } else {
                        text.push(c);
                        i += 1;
                    }
                }
                ';' => {
                    return Err(BuildError::invalid_argument(format!(
                        "statement separator in expression '{template}'"
                    )));
                }
                '-' if chars.get(i + 1) == Some(&'-') => {
                    return Err(BuildError::invalid_argument(format!(
                        "comment in expression '{template}'"
                    )));
                }
                '/' if chars.get(i + 1) == Some(&'*') => {
                    return Err(BuildError::invalid_argument(format!(
                        "comment in expression '{template}'"
                    )));
                }
                _ => {
                    text.push(c);
                    i += 1;
                }
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }

        if let Some(unused) = used.iter().position(|u| !u) {
            return Err(BuildError::invalid_argument(format!(
                "parameter ${} is never referenced in '{template}'",
                unused + 1
            )));
        }

        Ok(Self { pieces, params })
    }

    /// Number of values this fragment binds.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Bind this fragment's values through the shared sequencer and emit its text.
    ///
    /// Each value is bound where its slot first appears, so placeholder numbers ascend
    /// through the text; repeated slots reuse the first placeholder.
    pub(crate) fn write_to(&self, w: &mut SqlWriter) {
        let mut bound: Vec<Option<Placeholder>> = vec![None; self.params.len()];
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => w.push_str(t),
                Piece::Param(idx) => {
                    let placeholder = match bound[*idx] {
                        Some(placeholder) => placeholder,
                        None => {
                            let placeholder = w.sequencer_mut().bind(self.params[*idx].clone());
                            bound[*idx] = Some(placeholder);
                            placeholder
                        }
                    };
                    w.push_str(&placeholder.to_string());
                }
            }
        }
    }
}
