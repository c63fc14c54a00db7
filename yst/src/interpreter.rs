//! Template interpreter - walks a template and substitutes markers
//!
//! Literal fragments are scanned for three constructs:
//!
//! - `$expr$` emits the result of `expr` (HTML-encoded unless in raw mode)
//! - `$#expr$` evaluates `expr` for its side effects and emits nothing
//! - `\$` emits a literal `$`; a backslash before any other character is kept,
//!   so `\n` stays `\n`
//!
//! A failing marker is replaced by an inline `[YST_Error! - message]` span and
//! the rest of the fragment continues. A marker without a closing `$` is not
//! recovered here; the error propagates to the enclosing operation.

use tracing::{debug, warn};

use crate::context::{Context, Scope};
use crate::engine::Session;
use crate::entities;
use crate::error::{Result, YstError};
use crate::expr::{self, value::to_text};
use crate::template::Node;

/// A lexical piece of a literal fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Marker { expr: &'a str, emit: bool },
}

/// Lazily splits a fragment into segments, failing at an unbalanced marker
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.src[self.pos..];
        let first = rest.chars().next()?;

        match first {
            '\\' => match rest[1..].chars().next() {
                Some('$') => {
                    self.pos += 2;
                    Some(Ok(Segment::Text(&rest[1..2])))
                }
                Some(c) => {
                    let len = 1 + c.len_utf8();
                    self.pos += len;
                    Some(Ok(Segment::Text(&rest[..len])))
                }
                None => {
                    self.pos += 1;
                    Some(Ok(Segment::Text(rest)))
                }
            },
            '$' => {
                let (emit, start) = if rest[1..].starts_with('#') { (false, 2) } else { (true, 1) };
                match rest[start..].find('$') {
                    Some(len) => {
                        self.pos += start + len + 1;
                        Some(Ok(Segment::Marker {
                            expr: &rest[start..start + len],
                            emit,
                        }))
                    }
                    None => {
                        self.pos = self.src.len();
                        Some(Err(YstError::UnbalancedMarker {
                            expr: rest[start..].to_string(),
                        }))
                    }
                }
            }
            _ => {
                let len = rest.find(['\\', '$']).unwrap_or(rest.len());
                self.pos += len;
                Some(Ok(Segment::Text(&rest[..len])))
            }
        }
    }
}

impl Session<'_> {
    /// Evaluate `template` in `ctx`, concatenating the output of every node
    pub fn evaluate(&self, ctx: &Context, template: &[Node], raw: bool) -> Result<String> {
        let scope = self.scope(ctx);
        let mut out = String::new();

        for node in template {
            match node {
                Node::Text(fragment) => self.substitute(&scope, fragment, raw, &mut out)?,
                Node::Group(nodes) => out.push_str(&self.evaluate(ctx, nodes, raw)?),
                Node::Op(op) => out.push_str(&self.dispatch(ctx, op)?),
            }
        }

        Ok(out)
    }

    /// Append `fragment` to `out` with every marker substituted
    ///
    /// A failing marker becomes an inline error span, or is dropped for
    /// `$#...$` markers. Without `alert_errors` the failure propagates.
    pub fn substitute(&self, scope: &Scope<'_>, fragment: &str, raw: bool, out: &mut String) -> Result<()> {
        for segment in Scanner::new(fragment) {
            match segment? {
                Segment::Text(text) => out.push_str(text),
                Segment::Marker { expr, emit } => match self.eval_marker(scope, expr, emit, raw) {
                    Ok(Some(text)) => out.push_str(&text),
                    Ok(None) => {}
                    Err(e) if !self.config().alert_errors => return Err(e),
                    Err(e) if emit => {
                        warn!(expr, error = %e, "substitute: marker failed");
                        out.push_str(&inline_error(&e));
                    }
                    Err(e) => {
                        debug!(expr, error = %e, "substitute: side-effect marker failed");
                    }
                },
            }
        }
        Ok(())
    }

    /// Evaluate one marker body
    ///
    /// Returns the text to emit, or `None` for null results and `$#...$`
    /// markers. An undefined result is an error in both marker forms.
    pub fn eval_marker(&self, scope: &Scope<'_>, expr: &str, emit: bool, raw: bool) -> Result<Option<String>> {
        let source = entities::decode(expr);
        let value = expr::eval_str(&source, scope)?.ok_or(YstError::UndefinedExpression { expr: source })?;

        if !emit || value.is_null() {
            return Ok(None);
        }

        let value = if raw { value } else { entities::encode(value) };
        Ok(Some(to_text(&value)))
    }
}

/// Inline error span for a failed marker
pub fn inline_error(err: &YstError) -> String {
    format!("[YST_Error! - {}]", err)
}
