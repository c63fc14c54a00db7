//! Value-set resolution for `apply` and `select`

use serde_json::Value;
use tracing::debug;

use crate::context::{Context, ValueSet};
use crate::engine::Session;
use crate::error::{Result, YstError};
use crate::expr;
use crate::template::AMBIENT_SET;

/// Largest count a numeric set expression may expand to
const MAX_COUNT: u64 = 1_000_000;

/// Outcome of resolving a set expression
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSet {
    /// No set expression was given; the caller's context is reused
    Ambient,
    /// A fresh value set to iterate
    Set(ValueSet),
}

impl Session<'_> {
    /// Evaluate a set expression in `ctx`
    ///
    /// With multi-set enabled the text is split on spaces and every part
    /// becomes one dimension. A number `n` yields the indices `0..n`.
    pub fn resolve(&self, ctx: &Context, spec: Option<&str>) -> Result<ResolvedSet> {
        let spec = match spec.map(str::trim) {
            None | Some("") | Some(AMBIENT_SET) => return Ok(ResolvedSet::Ambient),
            Some(spec) => spec,
        };

        let parts: Vec<&str> = if self.config().allow_multi_set {
            spec.split(' ').filter(|part| !part.is_empty()).collect()
        } else {
            vec![spec]
        };

        let scope = self.scope(ctx);
        let mut dimensions = Vec::with_capacity(parts.len());
        for part in parts {
            let value = expr::eval_str(part, &scope).map_err(|e| YstError::ValueSetEvaluation {
                expr: part.to_string(),
                message: e.to_string(),
            })?;
            dimensions.push(dimension(part, value)?);
        }

        debug!(spec, dimensions = dimensions.len(), "resolve: value set");
        Ok(ResolvedSet::Set(ValueSet::from_dimensions(dimensions)))
    }
}

fn dimension(expr: &str, value: Option<Value>) -> Result<Vec<Value>> {
    match value {
        None => Err(YstError::UndefinedValueSet { expr: expr.to_string() }),
        Some(Value::Array(values)) => Ok(values),
        Some(Value::Number(n)) => {
            let count = n.as_f64().unwrap_or(0.0).floor();
            if count <= 0.0 {
                return Ok(Vec::new());
            }
            if count > MAX_COUNT as f64 {
                return Err(YstError::InvalidValueSet {
                    expr: expr.to_string(),
                    found: format!("a count above {}", MAX_COUNT),
                });
            }
            Ok((0..count as u64).map(Value::from).collect())
        }
        Some(other) => Err(YstError::InvalidValueSet {
            expr: expr.to_string(),
            found: describe(&other).to_string(),
        }),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::String(_) => "string",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::Engine;
    use serde_json::json;

    fn engine_with_items(config: Config) -> Engine {
        let mut engine = Engine::new(config);
        engine.set_global("items", json!(["a", "b", "c"]));
        engine.set_global("pairs", json!([1, 2]));
        engine
    }

    fn dimensions(resolved: ResolvedSet) -> Vec<Vec<Value>> {
        match resolved {
            ResolvedSet::Set(set) => (0..set.len())
                .map(|k| set.dimension(k).unwrap_or_default().to_vec())
                .collect(),
            ResolvedSet::Ambient => panic!("expected a fresh value set"),
        }
    }

    #[test]
    fn test_absent_or_sentinel_is_ambient() {
        let engine = Engine::default();
        let session = engine.session();
        let ctx = Context::default();

        assert_eq!(session.resolve(&ctx, None).unwrap(), ResolvedSet::Ambient);
        assert_eq!(session.resolve(&ctx, Some("")).unwrap(), ResolvedSet::Ambient);
        assert_eq!(session.resolve(&ctx, Some(AMBIENT_SET)).unwrap(), ResolvedSet::Ambient);
    }

    #[test]
    fn test_array_becomes_one_dimension() {
        let engine = engine_with_items(Config::default());
        let resolved = engine.session().resolve(&Context::default(), Some("items")).unwrap();
        assert_eq!(dimensions(resolved), vec![vec![json!("a"), json!("b"), json!("c")]]);
    }

    #[test]
    fn test_count_expands_to_indices() {
        let engine = Engine::default();
        let session = engine.session();

        let resolved = session.resolve(&Context::default(), Some("3")).unwrap();
        assert_eq!(dimensions(resolved), vec![vec![json!(0), json!(1), json!(2)]]);

        let resolved = session.resolve(&Context::default(), Some("2.7")).unwrap();
        assert_eq!(dimensions(resolved), vec![vec![json!(0), json!(1)]]);

        let resolved = session.resolve(&Context::default(), Some("-4")).unwrap();
        assert_eq!(dimensions(resolved), vec![Vec::<Value>::new()]);
    }

    #[test]
    fn test_count_is_capped() {
        let mut engine = Engine::default();
        engine.set_global("huge", json!(1e15));
        let err = engine.session().resolve(&Context::default(), Some("huge")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ystSet attribute ('huge') must be an array or a count, found a count above 1000000"
        );
    }

    #[test]
    fn test_set_sees_current_element() {
        let engine = Engine::default();
        let ctx = Context::single(vec![json!({"children": [1, 2]})]);
        let resolved = engine.session().resolve(&ctx, Some("e.children")).unwrap();
        assert_eq!(dimensions(resolved), vec![vec![json!(1), json!(2)]]);
    }

    #[test]
    fn test_undefined_set_is_an_error() {
        let engine = Engine::default();
        let err = engine.session().resolve(&Context::default(), Some("nothing")).unwrap_err();
        assert_eq!(err.to_string(), "Undefined expression: nothing in set attribute");
    }

    #[test]
    fn test_failing_set_expression_is_wrapped() {
        let engine = Engine::default();
        let err = engine.session().resolve(&Context::default(), Some("a.b")).unwrap_err();
        assert!(matches!(err, YstError::ValueSetEvaluation { ref expr, .. } if expr == "a.b"));
        assert!(err.is_value_set());
    }

    #[test]
    fn test_non_array_set_is_rejected() {
        let engine = Engine::default();
        let err = engine.session().resolve(&Context::default(), Some("'abc'")).unwrap_err();
        assert!(matches!(err, YstError::InvalidValueSet { ref found, .. } if found == "string"));

        let err = engine.session().resolve(&Context::default(), Some("null")).unwrap_err();
        assert!(matches!(err, YstError::InvalidValueSet { ref found, .. } if found == "null"));
    }

    #[test]
    fn test_multi_set_splits_on_spaces() {
        let engine = engine_with_items(Config {
            allow_multi_set: true,
            ..Config::default()
        });
        let resolved = engine.session().resolve(&Context::default(), Some("items  pairs")).unwrap();
        assert_eq!(
            dimensions(resolved),
            vec![vec![json!("a"), json!("b"), json!("c")], vec![json!(1), json!(2)]]
        );
    }

    #[test]
    fn test_single_set_mode_keeps_whole_text() {
        let engine = engine_with_items(Config::default());
        let err = engine.session().resolve(&Context::default(), Some("items pairs")).unwrap_err();
        assert!(matches!(err, YstError::ValueSetEvaluation { .. }));
    }
}
