//! Template evaluation error types

use thiserror::Error;

use crate::expr::ExprError;

pub type Result<T> = std::result::Result<T, YstError>;

/// Errors that can occur while evaluating a template
#[derive(Debug, Error)]
pub enum YstError {
    #[error("Undefined expression: {expr}")]
    UndefinedExpression { expr: String },

    #[error("Unbalanced $ in expression: ${expr}")]
    UnbalancedMarker { expr: String },

    #[error("Error evaluating ystSet attribute ('{expr}'): {message}")]
    ValueSetEvaluation { expr: String, message: String },

    #[error("Undefined expression: {expr} in set attribute")]
    UndefinedValueSet { expr: String },

    #[error("ystSet attribute ('{expr}') must be an array or a count, found {found}")]
    InvalidValueSet { expr: String, found: String },

    #[error("Invalid params attribute ({params}): {message}")]
    ParamsParse { params: String, message: String },

    #[error("Template not found: {target}")]
    IncludeResolution { target: String },

    #[error("Error evaluating ystBool attribute ({spec}) {message}")]
    BooleanAttribute { spec: String, message: String },

    #[error(transparent)]
    Expression(#[from] ExprError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl YstError {
    /// Failures raised by evaluating a value-set expression
    pub fn is_value_set(&self) -> bool {
        matches!(
            self,
            YstError::ValueSetEvaluation { .. } | YstError::UndefinedValueSet { .. } | YstError::InvalidValueSet { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_expression_message() {
        let err = YstError::UndefinedExpression {
            expr: "missingVar".to_string(),
        };
        assert_eq!(err.to_string(), "Undefined expression: missingVar");
    }

    #[test]
    fn test_unbalanced_marker_message() {
        let err = YstError::UnbalancedMarker { expr: "def".to_string() };
        assert_eq!(err.to_string(), "Unbalanced $ in expression: $def");
    }

    #[test]
    fn test_value_set_messages() {
        let err = YstError::UndefinedValueSet {
            expr: "items".to_string(),
        };
        assert_eq!(err.to_string(), "Undefined expression: items in set attribute");
        assert!(err.is_value_set());

        let err = YstError::ValueSetEvaluation {
            expr: "a.b".to_string(),
            message: "Cannot read property 'b' of undefined".to_string(),
        };
        assert!(err.to_string().starts_with("Error evaluating ystSet attribute ('a.b'): "));
    }

    #[test]
    fn test_expression_error_is_transparent() {
        let err: YstError = ExprError::Type("x is not a function".to_string()).into();
        assert_eq!(err.to_string(), "x is not a function");
    }
}
