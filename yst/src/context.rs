//! Evaluation context and expression scope

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::expr::Bindings;

/// Named parameters passed down unchanged through nested calls
pub type Params = Map<String, Value>;

/// Ordered sequence of value arrays driving iteration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet(Rc<Vec<Vec<Value>>>);

impl ValueSet {
    /// The top-level set: nothing is bound
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(values: Vec<Value>) -> Self {
        Self(Rc::new(vec![values]))
    }

    pub fn from_dimensions(dimensions: Vec<Vec<Value>>) -> Self {
        Self(Rc::new(dimensions))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of dimensions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iteration length: the longest dimension
    pub fn iteration_len(&self) -> usize {
        self.0.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn dimension(&self, k: usize) -> Option<&[Value]> {
        self.0.get(k).map(Vec::as_slice)
    }

    pub fn element(&self, k: usize, index: usize) -> Option<&Value> {
        self.0.get(k).and_then(|values| values.get(index))
    }
}

/// The `(valueSet, index, params)` triple bound during evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub value_set: ValueSet,
    pub index: usize,
    pub params: Rc<Params>,
}

impl Context {
    pub fn new(value_set: ValueSet, index: usize, params: Params) -> Self {
        Self {
            value_set,
            index,
            params: Rc::new(params),
        }
    }

    /// Context over a single array, positioned at its first element
    pub fn single(values: Vec<Value>) -> Self {
        Self::new(ValueSet::single(values), 0, Params::new())
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Rc::new(params);
        self
    }

    /// A fresh iteration context sharing this context's params
    pub fn iterate(&self, value_set: ValueSet, index: usize) -> Self {
        Self {
            value_set,
            index,
            params: Rc::clone(&self.params),
        }
    }

    /// The element at the current index of the first dimension
    pub fn current(&self) -> Option<&Value> {
        self.value_set.element(0, self.index)
    }
}

/// Variables created by assignments inside expressions, alive for one session
#[derive(Debug, Default)]
pub struct Variables(RefCell<HashMap<String, Value>>);

impl Variables {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: Option<Value>) {
        let mut vars = self.0.borrow_mut();
        match value {
            Some(value) => {
                vars.insert(name.to_string(), value);
            }
            None => {
                vars.remove(name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Name resolution for one evaluation step
///
/// Lookup order: context bindings (`e`, `values`, `i`, `params`, and in
/// multi-set mode `eN`/`valuesN`), then session variables, then globals.
pub struct Scope<'a> {
    context: &'a Context,
    multi_set: bool,
    variables: &'a Variables,
    globals: &'a Map<String, Value>,
}

impl<'a> Scope<'a> {
    pub fn new(context: &'a Context, multi_set: bool, variables: &'a Variables, globals: &'a Map<String, Value>) -> Self {
        Self {
            context,
            multi_set,
            variables,
            globals,
        }
    }

    fn context_binding(&self, name: &str) -> Option<Option<Value>> {
        let set = &self.context.value_set;
        let index = self.context.index;

        if name == "params" {
            return Some(Some(Value::Object((*self.context.params).clone())));
        }
        if set.is_empty() {
            return None;
        }

        match name {
            "e" => return Some(set.element(0, index).cloned()),
            "values" => return Some(set.dimension(0).map(|values| Value::Array(values.to_vec()))),
            "i" => return Some(Some(Value::from(index))),
            _ => {}
        }

        if self.multi_set {
            if let Some(k) = name.strip_prefix("values").and_then(|n| n.parse::<usize>().ok()) {
                if k < set.len() {
                    return Some(set.dimension(k).map(|values| Value::Array(values.to_vec())));
                }
            } else if let Some(k) = name.strip_prefix('e').and_then(|n| n.parse::<usize>().ok()) {
                if k < set.len() {
                    return Some(set.element(k, index).cloned());
                }
            }
        }

        None
    }
}

impl Bindings for Scope<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(bound) = self.context_binding(name) {
            return bound;
        }
        self.variables.get(name).or_else(|| self.globals.get(name).cloned())
    }

    fn assign(&self, name: &str, value: Option<Value>) {
        self.variables.set(name, value);
    }
}
