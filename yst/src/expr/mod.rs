//! Sandboxed expression language
//!
//! Markers, set attributes, conditions and attribute specs are all written in
//! a small script-like expression language. Expressions never see ambient
//! state: every name is resolved through an explicit [`Bindings`] value.

mod ast;
mod eval;
mod lexer;
mod parser;
pub mod value;

use serde_json::Value;
use thiserror::Error;

pub use ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
pub use eval::evaluate;
pub use parser::parse;

/// Errors raised while parsing or evaluating an expression
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExprError {
    #[error("Syntax error in expression '{source_text}': {message}")]
    Syntax { source_text: String, message: String },

    #[error("{0}")]
    Type(String),
}

impl ExprError {
    pub(crate) fn syntax(source: &str, message: impl Into<String>) -> Self {
        Self::Syntax {
            source_text: source.to_string(),
            message: message.into(),
        }
    }
}

/// Name resolution for expression evaluation
pub trait Bindings {
    /// Resolve a name; `None` means undefined
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Store the result of an assignment expression
    fn assign(&self, name: &str, value: Option<Value>);
}

/// Parse and evaluate in one step
pub fn eval_str(source: &str, bindings: &dyn Bindings) -> Result<Option<Value>, ExprError> {
    let expr = parse(source)?;
    evaluate(&expr, bindings)
}
