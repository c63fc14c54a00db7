//! Tree-walking evaluator

use serde_json::{Map, Value};

use super::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::value::{loose_eq, number, strict_eq, to_number, to_text, to_text_or_undefined, truthy, type_of};
use super::{Bindings, ExprError};

type Eval = Result<Option<Value>, ExprError>;

/// Evaluate an expression against the given bindings
pub fn evaluate(expr: &Expr, bindings: &dyn Bindings) -> Eval {
    match expr {
        Expr::Undefined => Ok(None),
        Expr::Literal(value) => Ok(Some(value.clone())),
        Expr::Ident(name) => Ok(bindings.lookup(name)),
        Expr::Array(items) => {
            let items = items
                .iter()
                .map(|item| evaluate(item, bindings).map(|v| v.unwrap_or(Value::Null)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Value::Array(items)))
        }
        Expr::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.clone(), evaluate(value, bindings)?.unwrap_or(Value::Null));
            }
            Ok(Some(Value::Object(map)))
        }
        Expr::Member(object, name) => {
            let object = evaluate(object, bindings)?;
            member(object.as_ref(), name)
        }
        Expr::Index(object, index) => {
            let object = evaluate(object, bindings)?;
            let index = evaluate(index, bindings)?;
            match index {
                Some(Value::Number(ref n)) => match (object.as_ref(), n.as_u64()) {
                    (Some(Value::Array(items)), Some(i)) => Ok(items.get(i as usize).cloned()),
                    (Some(Value::String(s)), Some(i)) => {
                        Ok(s.chars().nth(i as usize).map(|c| Value::String(c.to_string())))
                    }
                    _ => member(object.as_ref(), &to_text_or_undefined(index.as_ref())),
                },
                other => member(object.as_ref(), &to_text_or_undefined(other.as_ref())),
            }
        }
        Expr::Call(callee, args) => {
            let Expr::Member(receiver, method) = callee.as_ref() else {
                return Err(ExprError::Type(format!("{} is not a function", describe(callee))));
            };
            let receiver = evaluate(receiver, bindings)?;
            let args = args
                .iter()
                .map(|arg| evaluate(arg, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            call_method(receiver.as_ref(), method, &args)
        }
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, bindings)?;
            match op {
                UnaryOp::Not => Ok(Some(Value::Bool(!truthy(value.as_ref())))),
                UnaryOp::Negate => number(-to_number(value.as_ref())).map(Some),
                UnaryOp::Plus => number(to_number(value.as_ref())).map(Some),
                UnaryOp::TypeOf => Ok(Some(Value::String(type_of(value.as_ref()).to_string()))),
            }
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            binary(*op, left.as_ref(), right.as_ref())
        }
        Expr::Logical(op, left, right) => {
            let left = evaluate(left, bindings)?;
            match (op, truthy(left.as_ref())) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                _ => evaluate(right, bindings),
            }
        }
        Expr::Conditional(test, then, otherwise) => {
            if truthy(evaluate(test, bindings)?.as_ref()) {
                evaluate(then, bindings)
            } else {
                evaluate(otherwise, bindings)
            }
        }
        Expr::Assign(name, value) => {
            let value = evaluate(value, bindings)?;
            bindings.assign(name, value.clone());
            Ok(value)
        }
    }
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member(object, name) => format!("{}.{}", describe(object), name),
        _ => "expression".to_string(),
    }
}

fn member(object: Option<&Value>, name: &str) -> Eval {
    match object {
        None => Err(ExprError::Type(format!("Cannot read property '{}' of undefined", name))),
        Some(Value::Null) => Err(ExprError::Type(format!("Cannot read property '{}' of null", name))),
        Some(Value::String(s)) if name == "length" => number(s.chars().count() as f64).map(Some),
        Some(Value::Array(items)) if name == "length" => number(items.len() as f64).map(Some),
        Some(Value::Array(items)) => Ok(name.parse::<usize>().ok().and_then(|i| items.get(i)).cloned()),
        Some(Value::Object(map)) => Ok(map.get(name).cloned()),
        Some(_) => Ok(None),
    }
}

fn binary(op: BinaryOp, left: Option<&Value>, right: Option<&Value>) -> Eval {
    let num = |n: f64| number(n).map(Some);
    let boolean = |b: bool| -> Eval { Ok(Some(Value::Bool(b))) };

    match op {
        BinaryOp::Add => {
            let textual = |v: Option<&Value>| matches!(v, Some(Value::String(_) | Value::Array(_) | Value::Object(_)));
            if textual(left) || textual(right) {
                let mut text = to_text_or_undefined(left);
                text.push_str(&to_text_or_undefined(right));
                Ok(Some(Value::String(text)))
            } else {
                num(to_number(left) + to_number(right))
            }
        }
        BinaryOp::Sub => num(to_number(left) - to_number(right)),
        BinaryOp::Mul => num(to_number(left) * to_number(right)),
        BinaryOp::Div => num(to_number(left) / to_number(right)),
        BinaryOp::Rem => num(to_number(left) % to_number(right)),
        BinaryOp::Eq => boolean(loose_eq(left, right)),
        BinaryOp::NotEq => boolean(!loose_eq(left, right)),
        BinaryOp::StrictEq => boolean(strict_eq(left, right)),
        BinaryOp::StrictNotEq => boolean(!strict_eq(left, right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => boolean(compare(op, left, right)),
    }
}

fn compare(op: BinaryOp, left: Option<&Value>, right: Option<&Value>) -> bool {
    if let (Some(Value::String(a)), Some(Value::String(b))) = (left, right) {
        return match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            _ => a >= b,
        };
    }

    let (a, b) = (to_number(left), to_number(right));
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        _ => a >= b,
    }
}

fn arg_text(args: &[Option<Value>], index: usize, default: &str) -> String {
    match args.get(index) {
        Some(Some(value)) => to_text(value),
        _ => default.to_string(),
    }
}

fn arg_index(args: &[Option<Value>], index: usize, len: usize) -> Option<usize> {
    let n = to_number(args.get(index)?.as_ref());
    if n.is_nan() {
        return Some(0);
    }
    Some(n.clamp(0.0, len as f64) as usize)
}

/// Resolve a possibly negative slice bound against a length
fn slice_bound(args: &[Option<Value>], index: usize, len: usize) -> Option<usize> {
    let n = to_number(args.get(index)?.as_ref());
    if n.is_nan() {
        return Some(0);
    }
    let n = n.trunc();
    Some(if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    })
}

fn call_method(receiver: Option<&Value>, method: &str, args: &[Option<Value>]) -> Eval {
    match (receiver, method) {
        (None, _) => Err(ExprError::Type(format!("Cannot read property '{}' of undefined", method))),
        (Some(Value::Null), _) => Err(ExprError::Type(format!("Cannot read property '{}' of null", method))),
        (Some(value), "toString") => Ok(Some(Value::String(to_text(value)))),
        (Some(Value::String(s)), _) => string_method(s, method, args),
        (Some(Value::Array(items)), _) => array_method(items, method, args),
        (Some(Value::Number(n)), "toFixed") => {
            let n = n.as_f64().unwrap_or(f64::NAN);
            let digits = args
                .first()
                .map(|d| to_number(d.as_ref()))
                .filter(|d| !d.is_nan())
                .unwrap_or(0.0)
                .clamp(0.0, 20.0) as usize;
            Ok(Some(Value::String(format!("{:.*}", digits, n))))
        }
        _ => Err(ExprError::Type(format!("{} is not a function", method))),
    }
}

fn string_method(s: &str, method: &str, args: &[Option<Value>]) -> Eval {
    let chars: Vec<char> = s.chars().collect();
    let text = |t: String| -> Eval { Ok(Some(Value::String(t))) };

    match method {
        "toUpperCase" => text(s.to_uppercase()),
        "toLowerCase" => text(s.to_lowercase()),
        "trim" => text(s.trim().to_string()),
        "charAt" => {
            let i = arg_index(args, 0, chars.len()).unwrap_or(0);
            text(chars.get(i).map(|c| c.to_string()).unwrap_or_default())
        }
        "indexOf" => {
            let needle = arg_text(args, 0, "undefined");
            let position = s.find(&needle).map(|byte| s[..byte].chars().count() as f64);
            number(position.unwrap_or(-1.0)).map(Some)
        }
        "substring" => {
            let start = arg_index(args, 0, chars.len()).unwrap_or(0);
            let end = arg_index(args, 1, chars.len()).unwrap_or(chars.len());
            let (start, end) = if start > end { (end, start) } else { (start, end) };
            text(chars[start..end].iter().collect())
        }
        "split" => {
            let parts = match args.first() {
                Some(Some(sep)) => {
                    let sep = to_text(sep);
                    if sep.is_empty() {
                        chars.iter().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
                    }
                }
                _ => vec![Value::String(s.to_string())],
            };
            Ok(Some(Value::Array(parts)))
        }
        _ => Err(ExprError::Type(format!("{} is not a function", method))),
    }
}

fn array_method(items: &[Value], method: &str, args: &[Option<Value>]) -> Eval {
    match method {
        "join" => {
            let sep = arg_text(args, 0, ",");
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => to_text(other),
                })
                .collect::<Vec<_>>()
                .join(&sep);
            Ok(Some(Value::String(joined)))
        }
        "indexOf" => {
            let needle = args.first().cloned().flatten();
            let position = items
                .iter()
                .position(|item| strict_eq(Some(item), needle.as_ref()))
                .map(|i| i as f64);
            number(position.unwrap_or(-1.0)).map(Some)
        }
        "slice" => {
            let start = slice_bound(args, 0, items.len()).unwrap_or(0);
            let end = slice_bound(args, 1, items.len()).unwrap_or(items.len());
            let slice = if start < end { items[start..end].to_vec() } else { Vec::new() };
            Ok(Some(Value::Array(slice)))
        }
        _ => Err(ExprError::Type(format!("{} is not a function", method))),
    }
}
